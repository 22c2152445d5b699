//! The video element builder: configuration state, lazy default
//! resolution, and rendering.

use std::io;
use std::path::Path;

use tracing::debug;

use crate::config::{EnvSiteDefaults, ProbeConfig, SiteDefaults};
use crate::errors::{ConfigError, RenderError};
use crate::markup;
use crate::probe::{DiskFiles, ExistenceProbe, HttpProbe, LocalFiles};
use crate::sources::{self, VideoSources};

/// Filename of the default legacy plugin player, served from the base URL.
const FLASH_PLAYER_FILENAME: &str = "flvplayer.swf";

/// Default media directory joined with the base URL and base path.
const DEFAULT_MEDIA_DIR: &str = "media";

/// Builder for one HTML5 `<video>` fragment.
///
/// Callers construct an element, mutate it through setters in any order,
/// and consume it once with [`render`](Self::render) or
/// [`render_to`](Self::render_to). Base URL, base path, and the fallback
/// player URL are resolved lazily with a fixed precedence chain: explicit
/// argument, then previously resolved value, then site-wide defaults.
///
/// External lookups (site defaults, the remote existence probe, and the
/// local poster check) are injectable, so embedders and tests can replace
/// them without touching the rendering logic.
pub struct VideoElement {
    element_id: Option<String>,
    width: Option<u32>,
    height: Option<u32>,

    filename_base: Option<String>,
    filename_webm: Option<String>,
    filename_mp4: Option<String>,
    filename_ogg: Option<String>,
    poster_image: Option<String>,

    controls: bool,
    autoplay: bool,
    looping: bool,

    media_dir: String,
    remote_root: Option<String>,
    base_url: Option<String>,
    base_path: Option<String>,
    flash_url: Option<String>,
    allow_blank_base_url: bool,

    defaults: Box<dyn SiteDefaults>,
    probe: Box<dyn ExistenceProbe>,
    files: Box<dyn LocalFiles>,
}

impl VideoElement {
    /// Creates an element, optionally with an id and a base filename.
    ///
    /// Empty arguments are ignored, leaving the field unset. Collaborators
    /// default to environment-variable site defaults, a blocking HTTP
    /// probe, and the real filesystem.
    pub fn new(id: Option<&str>, filename_base: Option<&str>) -> Self {
        let mut element = Self {
            element_id: None,
            width: None,
            height: None,
            filename_base: None,
            filename_webm: None,
            filename_mp4: None,
            filename_ogg: None,
            poster_image: None,
            controls: true,
            autoplay: false,
            looping: false,
            media_dir: DEFAULT_MEDIA_DIR.to_string(),
            remote_root: None,
            base_url: None,
            base_path: None,
            flash_url: None,
            allow_blank_base_url: false,
            defaults: Box::new(EnvSiteDefaults),
            probe: Box::new(HttpProbe::new(&ProbeConfig::default())),
            files: Box::new(DiskFiles),
        };

        if let Some(id) = id.filter(|v| !v.is_empty()) {
            element.element_id = Some(id.to_string());
        }
        if let Some(base) = filename_base.filter(|v| !v.trim().is_empty()) {
            // Infallible: the filter above matches set_filenames' rejection.
            let _ = element.set_filenames(base);
        }
        element
    }

    /// Replaces the site-wide defaults provider.
    pub fn with_site_defaults(mut self, defaults: impl SiteDefaults + 'static) -> Self {
        self.defaults = Box::new(defaults);
        self
    }

    /// Replaces the remote existence probe.
    pub fn with_probe(mut self, probe: impl ExistenceProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// Replaces the local file lookup used for the poster check.
    pub fn with_local_files(mut self, files: impl LocalFiles + 'static) -> Self {
        self.files = Box::new(files);
        self
    }

    /// Sets the HTML id attribute. An empty id unsets it.
    pub fn set_element_id(&mut self, id: &str) {
        self.element_id = if id.is_empty() {
            None
        } else {
            Some(id.to_string())
        };
    }

    /// Derives all four dependent filenames from one base name:
    /// `<base>.webm`, `<base>.mp4`, `<base>.ogv`, and poster `<base>.jpg`.
    ///
    /// # Errors
    /// - `ConfigError::EmptyBaseFilename` - `base` is empty or blank
    pub fn set_filenames(&mut self, base: &str) -> Result<(), ConfigError> {
        if base.trim().is_empty() {
            return Err(ConfigError::EmptyBaseFilename);
        }
        self.filename_base = Some(base.to_string());
        self.filename_webm = Some(format!("{base}.webm"));
        self.filename_mp4 = Some(format!("{base}.mp4"));
        self.filename_ogg = Some(format!("{base}.ogv"));
        self.poster_image = Some(format!("{base}.jpg"));
        Ok(())
    }

    /// Sets the width and height attributes. Both are required together.
    ///
    /// # Errors
    /// - `ConfigError::InvalidDimensions` - either dimension is zero
    pub fn set_dimensions(&mut self, width: u32, height: u32) -> Result<(), ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidDimensions { width, height });
        }
        self.width = Some(width);
        self.height = Some(height);
        Ok(())
    }

    /// Sets the media directory joined with the base URL and base path.
    ///
    /// # Errors
    /// - `ConfigError::EmptyMediaDir` - `name` is empty
    pub fn set_media_dir(&mut self, name: &str) -> Result<(), ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::EmptyMediaDir);
        }
        self.media_dir = name.to_string();
        Ok(())
    }

    /// Enables or disables the `controls` attribute. Defaults to enabled.
    pub fn set_controls(&mut self, enabled: bool) {
        self.controls = enabled;
    }

    /// Enables or disables the `autoplay` attribute. Defaults to disabled.
    pub fn set_autoplay(&mut self, enabled: bool) {
        self.autoplay = enabled;
    }

    /// Enables or disables the `loop` attribute. Defaults to disabled.
    pub fn set_loop(&mut self, enabled: bool) {
        self.looping = enabled;
    }

    /// Enables remote-storage source resolution rooted at `root_url`.
    ///
    /// # Errors
    /// - `ConfigError::EmptyRemoteRoot` - `root_url` is empty
    pub fn enable_remote_storage(&mut self, root_url: &str) -> Result<(), ConfigError> {
        if root_url.is_empty() {
            return Err(ConfigError::EmptyRemoteRoot);
        }
        self.remote_root = Some(root_url.to_string());
        Ok(())
    }

    /// Resolves the base URL, caching the result for the instance.
    ///
    /// Precedence: a non-empty `explicit` value, then the cached value,
    /// then the deliberately-blank request (`Some("")`, which is sticky:
    /// later no-argument calls keep returning the empty URL), then the
    /// site-wide default.
    ///
    /// # Errors
    /// - `ConfigError::BaseUrlUnresolvable` - no value derivable
    pub fn resolve_base_url(&mut self, explicit: Option<&str>) -> Result<String, ConfigError> {
        if let Some(url) = explicit.filter(|v| !v.is_empty()) {
            self.base_url = Some(url.to_string());
            return Ok(url.to_string());
        }
        if let Some(url) = &self.base_url {
            return Ok(url.clone());
        }
        if explicit == Some("") || self.allow_blank_base_url {
            self.base_url = Some(String::new());
            self.allow_blank_base_url = true;
            return Ok(String::new());
        }
        if let Some(url) = self.defaults.base_url() {
            debug!("Base URL resolved from site defaults: {}", url);
            self.base_url = Some(url.clone());
            return Ok(url);
        }
        Err(ConfigError::BaseUrlUnresolvable)
    }

    /// Resolves the base filepath, caching the result for the instance.
    ///
    /// Precedence: a non-empty `explicit` value, then the cached value,
    /// then the site-wide default. There is no blank mode for paths.
    ///
    /// # Errors
    /// - `ConfigError::BasePathUnresolvable` - no value derivable
    pub fn resolve_base_path(&mut self, explicit: Option<&str>) -> Result<String, ConfigError> {
        if let Some(path) = explicit.filter(|v| !v.is_empty()) {
            self.base_path = Some(path.to_string());
            return Ok(path.to_string());
        }
        if let Some(path) = &self.base_path {
            return Ok(path.clone());
        }
        if let Some(path) = self.defaults.base_path() {
            debug!("Base filepath resolved from site defaults: {}", path);
            self.base_path = Some(path.clone());
            return Ok(path);
        }
        Err(ConfigError::BasePathUnresolvable)
    }

    /// Resolves the fallback player URL, caching the result.
    ///
    /// Precedence: a non-empty `explicit` value, then the cached value,
    /// then `flvplayer.swf` under the resolved base URL.
    ///
    /// # Errors
    /// - `ConfigError::BaseUrlUnresolvable` - default derivation needed a
    ///   base URL and none was derivable
    pub fn resolve_flash_url(&mut self, explicit: Option<&str>) -> Result<String, ConfigError> {
        if let Some(url) = explicit.filter(|v| !v.is_empty()) {
            self.flash_url = Some(url.to_string());
            return Ok(url.to_string());
        }
        if let Some(url) = &self.flash_url {
            return Ok(url.clone());
        }
        let url = format!("{}{FLASH_PLAYER_FILENAME}", self.resolve_base_url(None)?);
        self.flash_url = Some(url.clone());
        Ok(url)
    }

    /// Locates the playable URL for every format, consulting remote
    /// storage when enabled.
    ///
    /// # Errors
    /// - `ConfigError::BaseUrlUnresolvable` - base URL resolution failed
    pub fn locate_sources(&mut self) -> Result<VideoSources, ConfigError> {
        let base_url = self.resolve_base_url(None)?;
        let inputs = sources::SourceInputs {
            base_url: &base_url,
            media_dir: &self.media_dir,
            filename_ogg: self.filename_ogg.as_deref().unwrap_or_default(),
            filename_mp4: self.filename_mp4.as_deref().unwrap_or_default(),
            filename_webm: self.filename_webm.as_deref().unwrap_or_default(),
            remote_root: self.remote_root.as_deref(),
        };
        Ok(sources::locate(&inputs, self.probe.as_ref()))
    }

    /// Renders the element into an HTML fragment.
    ///
    /// Triggers default resolution for the base URL, base path, and
    /// fallback player URL, locates the sources, and checks the local
    /// filesystem for the poster image.
    ///
    /// # Errors
    /// - `RenderError::NoMediaSources` - no media filename is configured
    /// - `RenderError::Config` - base URL or base path resolution failed
    pub fn render(&mut self) -> Result<String, RenderError> {
        let base_url = self.resolve_base_url(None)?;
        let base_path = self.resolve_base_path(None)?;
        if !self.has_media_sources() {
            return Err(RenderError::NoMediaSources);
        }

        let located = self.locate_sources()?;
        let flash_player_url = self.resolve_flash_url(None)?;
        let poster_url = self.poster_url(&base_url, &base_path);

        // The plugin fallback always pseudo-streams the local MP4, never
        // the remote substitute.
        let local_mp4_url = match self.filename_mp4.as_deref() {
            Some(name) if !name.is_empty() => {
                sources::local_media_url(&base_url, &self.media_dir, name)
            }
            _ => String::new(),
        };

        let view = markup::FragmentView {
            element_id: self.element_id.as_deref(),
            width: self.width,
            height: self.height,
            controls: self.controls,
            autoplay: self.autoplay,
            looping: self.looping,
            poster_url: poster_url.as_deref(),
            sources: &located,
            local_mp4_url: &local_mp4_url,
            flash_player_url: &flash_player_url,
        };
        Ok(markup::fragment(&view))
    }

    /// Renders the element and writes the fragment to `writer`.
    ///
    /// # Errors
    /// - `RenderError::NoMediaSources` - no media filename is configured
    /// - `RenderError::Config` - base URL or base path resolution failed
    /// - `RenderError::Io` - the write failed
    pub fn render_to<W: io::Write>(&mut self, writer: &mut W) -> Result<(), RenderError> {
        let fragment = self.render()?;
        writer.write_all(fragment.as_bytes())?;
        Ok(())
    }

    /// The derived per-format filenames in Ogg, MP4, WebM order.
    pub fn media_filenames(&self) -> (Option<&str>, Option<&str>, Option<&str>) {
        (
            self.filename_ogg.as_deref(),
            self.filename_mp4.as_deref(),
            self.filename_webm.as_deref(),
        )
    }

    /// The derived poster image filename, if a base filename was set.
    pub fn poster_image(&self) -> Option<&str> {
        self.poster_image.as_deref()
    }

    /// The HTML id attribute, if set.
    pub fn element_id(&self) -> Option<&str> {
        self.element_id.as_deref()
    }

    fn has_media_sources(&self) -> bool {
        [&self.filename_webm, &self.filename_ogg, &self.filename_mp4]
            .into_iter()
            .any(|f| f.as_deref().is_some_and(|v| !v.is_empty()))
    }

    /// Returns the poster URL only when the poster file exists under the
    /// resolved base path.
    fn poster_url(&self, base_url: &str, base_path: &str) -> Option<String> {
        let poster = self.poster_image.as_deref().filter(|p| !p.is_empty())?;
        let path = format!("{base_path}{}/{poster}", self.media_dir);
        if !self.files.exists(Path::new(&path)) {
            debug!("Poster image not found at {}, omitting poster", path);
            return None;
        }
        Some(sources::local_media_url(base_url, &self.media_dir, poster))
    }
}

impl Default for VideoElement {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::config::StaticSiteDefaults;
    use crate::probe::ProbeError;

    /// Site defaults that count how often the base URL is consulted.
    struct CountingDefaults {
        base_url: Option<String>,
        base_path: Option<String>,
        base_url_lookups: Rc<Cell<u32>>,
    }

    impl SiteDefaults for CountingDefaults {
        fn base_url(&self) -> Option<String> {
            self.base_url_lookups.set(self.base_url_lookups.get() + 1);
            self.base_url.clone()
        }

        fn base_path(&self) -> Option<String> {
            self.base_path.clone()
        }
    }

    /// Probe answering 200 for URLs containing a needle, 404 otherwise.
    struct MatchProbe(&'static str);

    impl ExistenceProbe for MatchProbe {
        fn probe(&self, url: &str) -> Result<String, ProbeError> {
            if url.contains(self.0) {
                Ok("HTTP/1.1 200 OK".to_string())
            } else {
                Ok("HTTP/1.1 404 Not Found".to_string())
            }
        }
    }

    /// File lookup with a fixed answer.
    struct FixedFiles(bool);

    impl LocalFiles for FixedFiles {
        fn exists(&self, _path: &Path) -> bool {
            self.0
        }
    }

    fn site_defaults() -> StaticSiteDefaults {
        StaticSiteDefaults {
            base_url: Some("/assets/".to_string()),
            base_path: Some("/var/www/".to_string()),
        }
    }

    fn make_element() -> VideoElement {
        VideoElement::new(Some("v1"), Some("clip"))
            .with_site_defaults(site_defaults())
            .with_probe(MatchProbe("never-matches"))
            .with_local_files(FixedFiles(false))
    }

    #[test]
    fn test_set_filenames_derives_all_four() {
        let mut element = VideoElement::default();
        element.set_filenames("clip").unwrap();

        assert_eq!(
            element.media_filenames(),
            (Some("clip.ogv"), Some("clip.mp4"), Some("clip.webm"))
        );
        assert_eq!(element.poster_image(), Some("clip.jpg"));
    }

    #[test]
    fn test_set_filenames_rejects_blank_base() {
        let mut element = VideoElement::default();
        assert!(matches!(
            element.set_filenames(""),
            Err(ConfigError::EmptyBaseFilename)
        ));
        assert!(matches!(
            element.set_filenames("   "),
            Err(ConfigError::EmptyBaseFilename)
        ));
    }

    #[test]
    fn test_set_dimensions_requires_both_positive() {
        let mut element = VideoElement::default();
        assert!(matches!(
            element.set_dimensions(0, 10),
            Err(ConfigError::InvalidDimensions {
                width: 0,
                height: 10
            })
        ));
        assert!(matches!(
            element.set_dimensions(5, 0),
            Err(ConfigError::InvalidDimensions {
                width: 5,
                height: 0
            })
        ));
        element.set_dimensions(640, 360).unwrap();
    }

    #[test]
    fn test_empty_constructor_arguments_are_ignored() {
        let element = VideoElement::new(Some(""), Some(""));
        assert_eq!(element.element_id(), None);
        assert_eq!(element.media_filenames(), (None, None, None));

        // Blank base filenames are treated the same as empty ones, leaving
        // every derived filename unset.
        let element = VideoElement::new(None, Some("   "));
        assert_eq!(element.media_filenames(), (None, None, None));
        assert_eq!(element.poster_image(), None);
    }

    #[test]
    fn test_set_element_id_replaces_and_unsets() {
        let mut element = VideoElement::default();
        element.set_element_id("v2");
        assert_eq!(element.element_id(), Some("v2"));
        element.set_element_id("");
        assert_eq!(element.element_id(), None);
    }

    #[test]
    fn test_resolve_base_url_explicit_wins() {
        let mut element = make_element();
        assert_eq!(element.resolve_base_url(Some("/cdn/")).unwrap(), "/cdn/");
        // Cached value wins over site defaults from now on.
        assert_eq!(element.resolve_base_url(None).unwrap(), "/cdn/");
    }

    #[test]
    fn test_resolve_base_url_is_idempotent() {
        let lookups = Rc::new(Cell::new(0));
        let mut element = VideoElement::default().with_site_defaults(CountingDefaults {
            base_url: Some("/assets/".to_string()),
            base_path: None,
            base_url_lookups: Rc::clone(&lookups),
        });

        assert_eq!(element.resolve_base_url(None).unwrap(), "/assets/");
        assert_eq!(element.resolve_base_url(None).unwrap(), "/assets/");
        assert_eq!(lookups.get(), 1);
    }

    #[test]
    fn test_blank_base_url_is_sticky() {
        // Site defaults are configured, but the deliberate blank request
        // takes precedence and persists for the instance.
        let mut element = make_element();
        assert_eq!(element.resolve_base_url(Some("")).unwrap(), "");
        assert_eq!(element.resolve_base_url(None).unwrap(), "");
    }

    #[test]
    fn test_resolve_base_url_fails_without_any_source() {
        let mut element = VideoElement::default().with_site_defaults(StaticSiteDefaults::default());
        assert!(matches!(
            element.resolve_base_url(None),
            Err(ConfigError::BaseUrlUnresolvable)
        ));
    }

    #[test]
    fn test_resolve_base_path_chain() {
        let mut element = make_element();
        assert_eq!(element.resolve_base_path(None).unwrap(), "/var/www/");

        let mut element = VideoElement::default().with_site_defaults(StaticSiteDefaults::default());
        assert_eq!(element.resolve_base_path(Some("/srv/")).unwrap(), "/srv/");
        assert_eq!(element.resolve_base_path(None).unwrap(), "/srv/");

        let mut element = VideoElement::default().with_site_defaults(StaticSiteDefaults::default());
        assert!(matches!(
            element.resolve_base_path(None),
            Err(ConfigError::BasePathUnresolvable)
        ));
    }

    #[test]
    fn test_flash_url_defaults_under_base_url() {
        let mut element = make_element();
        assert_eq!(
            element.resolve_flash_url(None).unwrap(),
            "/assets/flvplayer.swf"
        );

        let mut element = make_element();
        assert_eq!(
            element.resolve_flash_url(Some("/player.swf")).unwrap(),
            "/player.swf"
        );
        assert_eq!(element.resolve_flash_url(None).unwrap(), "/player.swf");
    }

    #[test]
    fn test_enable_remote_storage_requires_root() {
        let mut element = VideoElement::default();
        assert!(matches!(
            element.enable_remote_storage(""),
            Err(ConfigError::EmptyRemoteRoot)
        ));
        element
            .enable_remote_storage("https://cdn.example.com/v/")
            .unwrap();
    }

    #[test]
    fn test_render_without_sources_fails() {
        let mut element = VideoElement::new(Some("v1"), None)
            .with_site_defaults(site_defaults())
            .with_local_files(FixedFiles(false));

        assert!(matches!(
            element.render(),
            Err(RenderError::NoMediaSources)
        ));
    }

    #[test]
    fn test_render_propagates_unresolvable_base_url() {
        let mut element = VideoElement::new(None, Some("clip"))
            .with_site_defaults(StaticSiteDefaults::default());

        assert!(matches!(
            element.render(),
            Err(RenderError::Config(ConfigError::BaseUrlUnresolvable))
        ));
    }

    #[test]
    fn test_poster_omitted_when_file_missing() {
        let mut element = make_element();
        let html = element.render().unwrap();
        assert!(!html.contains("poster="));
    }

    #[test]
    fn test_poster_included_when_file_exists() {
        let mut element = make_element().with_local_files(FixedFiles(true));
        let html = element.render().unwrap();
        assert!(html.contains(r#"poster="/assets/media/clip.jpg" "#));
        assert!(html.contains("&amp;image=/assets/media/clip.jpg\""));
    }

    #[test]
    fn test_fallback_keeps_local_mp4_when_remote_wins() {
        let mut element = make_element().with_probe(MatchProbe("clip.mp4"));
        element
            .enable_remote_storage("https://cdn.example.com/v/")
            .unwrap();

        let html = element.render().unwrap();
        assert!(html.contains(r#"<source src="https://cdn.example.com/v/clip.mp4""#));
        assert!(html.contains(r#"<source src="/assets/media/clip.ogv""#));
        assert!(html.contains(r#"<source src="/assets/media/clip.webm""#));
        assert!(html.contains("&amp;file=/assets/media/clip.mp4\""));
    }

    #[test]
    fn test_locate_sources_local_shapes() {
        let mut element = make_element();
        let sources = element.locate_sources().unwrap();
        assert_eq!(sources.ogg, "/assets/media/clip.ogv");
        assert_eq!(sources.mp4, "/assets/media/clip.mp4");
        assert_eq!(sources.webm, "/assets/media/clip.webm");
    }

    #[test]
    fn test_render_to_writes_fragment() {
        let mut element = make_element();
        let mut out = Vec::new();
        element.render_to(&mut out).unwrap();

        let written = String::from_utf8(out).unwrap();
        assert!(written.starts_with("\n<video "));
        assert!(written.ends_with("</video>\n"));
    }
}
