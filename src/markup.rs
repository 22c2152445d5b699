//! Fragment serialization.
//!
//! The byte layout is fixed and relied upon by embedders: leading newline,
//! opening tag attributes in the order id, width/height, controls, poster,
//! autoplay, loop, then one source line per format in Ogg, MP4, WebM order,
//! one legacy-plugin fallback line, and the closing tag.

use std::fmt::Write;

use crate::escape;
use crate::sources::VideoSources;

/// MIME and codec string for Ogg/Theora sources.
const OGG_MIME: &str = r#"video/ogg; codecs="theora, vorbis""#;

/// MIME and codec string for MP4 (H.264 baseline / AAC-LC) sources.
const MP4_MIME: &str = r#"video/mp4; codecs="avc1.42E01E, mp4a.40.2""#;

/// MIME and codec string for WebM (VP8/Vorbis) sources.
const WEBM_MIME: &str = r#"video/webm; codecs="vp8, vorbis""#;

/// Fully resolved view of one element, ready for serialization.
pub(crate) struct FragmentView<'a> {
    pub element_id: Option<&'a str>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub controls: bool,
    pub autoplay: bool,
    pub looping: bool,
    /// Poster URL, present only when the poster file exists locally.
    pub poster_url: Option<&'a str>,
    pub sources: &'a VideoSources,
    /// Always the local MP4 URL; the plugin fallback cannot pseudo-stream
    /// from remote storage.
    pub local_mp4_url: &'a str,
    pub flash_player_url: &'a str,
}

/// Serializes the view into the final HTML fragment.
pub(crate) fn fragment(view: &FragmentView<'_>) -> String {
    let mut out = String::from("\n<video ");

    if let Some(id) = view.element_id {
        let _ = write!(out, r#"id="{}" "#, escape::attribute(id));
    }
    if let (Some(width), Some(height)) = (view.width, view.height) {
        let _ = write!(out, r#"width="{width}" height="{height}" "#);
    }
    if view.controls {
        out.push_str(r#"controls="controls" "#);
    }
    if let Some(poster) = view.poster_url {
        let _ = write!(out, r#"poster="{poster}" "#);
    }
    if view.autoplay {
        out.push_str(r#"autoplay="autoplay" "#);
    }
    if view.looping {
        out.push_str(r#"loop="loop" "#);
    }
    out.push_str(">\n");

    let ordered = [
        (&view.sources.ogg, OGG_MIME),
        (&view.sources.mp4, MP4_MIME),
        (&view.sources.webm, WEBM_MIME),
    ];
    for (url, mime) in ordered {
        if !url.is_empty() {
            let _ = writeln!(out, "\t<source src=\"{url}\" type='{mime}'>");
        }
    }

    out.push_str(&plugin_fallback(view));
    out.push_str("</video>\n");
    out
}

/// Serializes the legacy-plugin fallback line.
fn plugin_fallback(view: &FragmentView<'_>) -> String {
    // Unset dimensions still emit empty attribute values here, unlike the
    // opening tag where the attributes are omitted entirely.
    let width = view.width.map(|w| w.to_string()).unwrap_or_default();
    let height = view.height.map(|h| h.to_string()).unwrap_or_default();
    let player_name = view
        .element_id
        .map(escape::attribute)
        .unwrap_or_default();
    let poster_param = view
        .poster_url
        .map(|url| format!("&amp;image={url}"))
        .unwrap_or_default();

    format!(
        "\t<embed height=\"{height}\" width=\"{width}\" \
         flashvars=\"wmode=transparent&amp;height={height}&amp;width={width}&amp;file={file}{poster_param}\" \
         allowfullscreen=\"true\" wmode=\"transparent\" quality=\"high\" \
         name=\"player_{player_name}\" src=\"{src}\" \
         type=\"application/x-shockwave-flash\">\n",
        file = view.local_mp4_url,
        src = view.flash_player_url,
    )
}
