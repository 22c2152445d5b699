//! Videotag - HTML5 video element fragment builder
//!
#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
//!
//! Builds a single `<video>` markup fragment with multiple source
//! encodings, an optional poster image, a legacy-plugin fallback, and
//! optional remote-storage source resolution. Callers configure a
//! [`VideoElement`] with a base filename and a few options and receive
//! correct, escaped markup back:
//!
//! ```no_run
//! use videotag::VideoElement;
//!
//! let mut video = VideoElement::new(Some("v1"), Some("clip"));
//! video.set_dimensions(640, 360)?;
//! let fragment = video.render()?;
//! # Ok::<(), videotag::RenderError>(())
//! ```

pub mod config;
pub mod element;
pub mod errors;
pub mod escape;
pub mod probe;
pub mod sources;

mod markup;

// Re-export main types
pub use config::{EnvSiteDefaults, ProbeConfig, SiteDefaults, StaticSiteDefaults};
pub use element::VideoElement;
pub use errors::{ConfigError, RenderError};
pub use probe::{DiskFiles, ExistenceProbe, HttpProbe, LocalFiles, ProbeError};
pub use sources::VideoSources;
