//! Site-wide default configuration and probe tuning.
//!
//! Deployments usually share one base URL and one base filepath across every
//! rendered element. Those values are read through the [`SiteDefaults`] seam
//! so per-instance configuration can stay empty and tests can substitute
//! values without process-wide state.

use std::env;
use std::time::Duration;

/// Read-only lookup for process-wide base URL and base filepath defaults.
///
/// A value is either present or absent; providers never fail. The resolver
/// consults this only after explicit and previously cached values.
pub trait SiteDefaults {
    /// Returns the site-wide base URL, if one is configured.
    fn base_url(&self) -> Option<String>;

    /// Returns the site-wide base filepath, if one is configured.
    fn base_path(&self) -> Option<String>;
}

/// Environment variable holding the site-wide base URL.
pub const BASE_URL_VAR: &str = "VIDEOTAG_BASE_URL";

/// Environment variable holding the site-wide base filepath.
pub const BASE_PATH_VAR: &str = "VIDEOTAG_BASE_PATH";

/// [`SiteDefaults`] backed by process environment variables.
///
/// Reads [`BASE_URL_VAR`] and [`BASE_PATH_VAR`] on every lookup. Empty
/// values count as absent.
#[derive(Debug, Clone, Default)]
pub struct EnvSiteDefaults;

impl SiteDefaults for EnvSiteDefaults {
    fn base_url(&self) -> Option<String> {
        env::var(BASE_URL_VAR).ok().filter(|v| !v.is_empty())
    }

    fn base_path(&self) -> Option<String> {
        env::var(BASE_PATH_VAR).ok().filter(|v| !v.is_empty())
    }
}

/// [`SiteDefaults`] holding fixed in-memory values.
///
/// Used by embedders that carry their own configuration system, and by
/// tests that need deterministic defaults.
#[derive(Debug, Clone, Default)]
pub struct StaticSiteDefaults {
    /// Site-wide base URL, if any.
    pub base_url: Option<String>,
    /// Site-wide base filepath, if any.
    pub base_path: Option<String>,
}

impl SiteDefaults for StaticSiteDefaults {
    fn base_url(&self) -> Option<String> {
        self.base_url.clone()
    }

    fn base_path(&self) -> Option<String> {
        self.base_path.clone()
    }
}

/// Tuning for the remote existence probe.
///
/// The probe is synchronous and blocks the render call, so the timeout is
/// a hard bound on how long a slow remote endpoint can delay rendering.
/// Timeout expiry is treated identically to a failed probe.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// HTTP request timeout for existence probes.
    pub timeout: Duration,
    /// User agent for probe requests.
    pub user_agent: &'static str,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: "videotag/0.1.0",
        }
    }
}
