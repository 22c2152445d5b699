//! Existence-check seams: remote HTTP probing and local file lookup.
//!
//! Both checks sit behind traits so the source locator and renderer can be
//! exercised without a network or a populated filesystem. The real
//! implementations are [`HttpProbe`] and [`DiskFiles`].

use std::path::Path;

use thiserror::Error;

use crate::config::ProbeConfig;

/// Synchronous HTTP existence probe for remote objects.
///
/// One probe maps to one HEAD-equivalent request. Implementations return
/// the response status line; transport failures, malformed responses, and
/// timeouts are all [`ProbeError`]s. Callers treat any error as "object
/// not retrievable" and fall back.
pub trait ExistenceProbe {
    /// Checks whether the object at `url` is retrievable.
    ///
    /// Returns the status line of the response, e.g. `HTTP/1.1 200 OK`.
    ///
    /// # Errors
    /// - `ProbeError::RequestFailed` - Transport error, timeout, or
    ///   malformed response
    fn probe(&self, url: &str) -> Result<String, ProbeError>;
}

/// Errors that can occur while probing a remote object.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The probe request could not be completed.
    #[error("probe request failed: {reason}")]
    RequestFailed {
        /// The reason the request failed.
        reason: String,
    },
}

/// Returns true when a status line reports HTTP 200.
///
/// The second whitespace-separated token must be exactly `200`, so
/// `HTTP/2.0 200 OK` matches and incidental digits elsewhere in the line
/// cannot.
pub fn is_success_status(status_line: &str) -> bool {
    status_line.split_whitespace().nth(1) == Some("200")
}

/// [`ExistenceProbe`] backed by a blocking reqwest client issuing HEAD
/// requests.
pub struct HttpProbe {
    client: reqwest::blocking::Client,
}

impl HttpProbe {
    /// Creates a probe with the timeout and user agent from `config`.
    ///
    /// # Panics
    /// Panics if the underlying HTTP client cannot be constructed, which
    /// only happens when the TLS backend fails to initialize.
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            client: reqwest::blocking::Client::builder()
                .timeout(config.timeout)
                .user_agent(config.user_agent)
                .redirect(reqwest::redirect::Policy::limited(3))
                .build()
                .expect("HTTP client creation should not fail"),
        }
    }
}

impl ExistenceProbe for HttpProbe {
    fn probe(&self, url: &str) -> Result<String, ProbeError> {
        let response =
            self.client
                .head(url)
                .send()
                .map_err(|e| ProbeError::RequestFailed {
                    reason: e.to_string(),
                })?;

        Ok(format!("{:?} {}", response.version(), response.status()))
    }
}

/// Local file existence lookup.
pub trait LocalFiles {
    /// Returns true when a file exists at `path`.
    fn exists(&self, path: &Path) -> bool;
}

/// [`LocalFiles`] backed by the real filesystem.
#[derive(Debug, Clone, Default)]
pub struct DiskFiles;

impl LocalFiles for DiskFiles {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
