//! Error types for video element configuration and rendering.

use thiserror::Error;

/// Errors raised by configuration setters and default resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The base filename passed to `set_filenames` was empty or blank.
    #[error("base filename is empty")]
    EmptyBaseFilename,

    /// Width or height was zero.
    #[error("video dimensions must be greater than zero, got {width}x{height}")]
    InvalidDimensions {
        /// The requested width.
        width: u32,
        /// The requested height.
        height: u32,
    },

    /// The media directory name was empty.
    #[error("local media directory name was not specified")]
    EmptyMediaDir,

    /// Remote storage was enabled without a root URL.
    #[error("remote storage root URL was not specified")]
    EmptyRemoteRoot,

    /// No explicit, cached, or site-wide base URL was available.
    #[error("could not determine the base URL for this site")]
    BaseUrlUnresolvable,

    /// No explicit, cached, or site-wide base filepath was available.
    #[error("could not determine the base filepath for this site")]
    BasePathUnresolvable,
}

/// Errors raised when a configured element cannot be rendered.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No media source filenames were configured before rendering.
    #[error("media source files for the video element were not specified")]
    NoMediaSources,

    /// Lazy default resolution failed while preparing the render.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Writing the fragment to the output sink failed.
    #[error("failed to write fragment: {0}")]
    Io(#[from] std::io::Error),
}
