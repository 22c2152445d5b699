//! Per-format source location with optional remote-storage substitution.
//!
//! Local URLs are always built first; when remote storage is enabled, each
//! format independently swaps in its remote candidate if a synchronous
//! existence probe reports the object retrievable. A failed probe for one
//! format never affects the others.

use tracing::{debug, warn};

use crate::escape;
use crate::probe::{ExistenceProbe, is_success_status};

/// Playable URL per supported encoding.
///
/// Field order matches markup emission order: Ogg/Theora first, then MP4,
/// then WebM. An empty string means the format has no configured filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSources {
    /// Ogg/Theora source URL.
    pub ogg: String,
    /// MP4 (H.264/AAC) source URL.
    pub mp4: String,
    /// WebM (VP8/Vorbis) source URL.
    pub webm: String,
}

/// Resolved location settings and raw per-format filenames.
pub(crate) struct SourceInputs<'a> {
    pub base_url: &'a str,
    pub media_dir: &'a str,
    pub filename_ogg: &'a str,
    pub filename_mp4: &'a str,
    pub filename_webm: &'a str,
    pub remote_root: Option<&'a str>,
}

/// Builds the URL of a file inside the local media directory, escaping the
/// caller-supplied segments.
pub(crate) fn local_media_url(base_url: &str, media_dir: &str, filename: &str) -> String {
    format!(
        "{base_url}{}/{}",
        escape::attribute(media_dir),
        escape::attribute(filename)
    )
}

/// Locates the playable URL for every format.
pub(crate) fn locate(inputs: &SourceInputs<'_>, probe: &dyn ExistenceProbe) -> VideoSources {
    VideoSources {
        ogg: locate_format("ogg", inputs.filename_ogg, inputs, probe),
        mp4: locate_format("mp4", inputs.filename_mp4, inputs, probe),
        webm: locate_format("webm", inputs.filename_webm, inputs, probe),
    }
}

/// Locates one format: local URL, remotely substituted when the probe
/// confirms the object exists.
fn locate_format(
    format: &str,
    filename: &str,
    inputs: &SourceInputs<'_>,
    probe: &dyn ExistenceProbe,
) -> String {
    if filename.is_empty() {
        return String::new();
    }

    let local = local_media_url(inputs.base_url, inputs.media_dir, filename);
    let Some(remote_root) = inputs.remote_root else {
        return local;
    };

    let candidate = format!("{remote_root}{}", escape::attribute(filename));
    // The probe path is percent-encoded separately; the candidate keeps the
    // attribute-escaped form used everywhere else in the fragment.
    let probe_path = format!("{remote_root}{}", urlencoding::encode(filename));

    match probe.probe(&probe_path) {
        Ok(status_line) if is_success_status(&status_line) => {
            debug!("Using remote {} source: {}", format, candidate);
            candidate
        }
        Ok(status_line) => {
            debug!(
                "Remote {} source unavailable ({}), using local URL",
                format, status_line
            );
            local
        }
        Err(e) => {
            warn!("Remote {} probe failed ({}), using local URL", format, e);
            local
        }
    }
}
