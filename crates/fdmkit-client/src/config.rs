//! Connection settings.

use std::time::Duration;

use fdmkit_core::{ReconcileError, Result};
use url::Url;

/// API prefix of FDM v2 appliances.
pub const DEFAULT_BASE_PATH: &str = "/api/fdm/v2";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how to reach an appliance.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server: Url,
    /// Prefix prepended to every operation path.
    pub base_path: String,
    pub timeout: Duration,
    /// Appliances ship with self-signed certificates, so this is often off.
    pub verify_tls: bool,
    pub user_agent: String,
}

impl ClientConfig {
    /// Settings for `server` with defaults for everything else.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Validation` if `server` is not an absolute
    /// http(s) URL.
    pub fn new(server: &str) -> Result<Self> {
        let parsed = Url::parse(server)
            .map_err(|e| ReconcileError::validation(format!("invalid server URL {server}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ReconcileError::validation(format!(
                "server URL must use http or https: {server}"
            )));
        }

        Ok(Self {
            server: parsed,
            base_path: DEFAULT_BASE_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
            verify_tls: true,
            user_agent: format!("fdmkit/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    #[must_use]
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Absolute URL for an already rendered operation path.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        let server = self.server.as_str().trim_end_matches('/');
        let base = self.base_path.trim_matches('/');
        let path = path.trim_start_matches('/');
        if base.is_empty() {
            format!("{server}/{path}")
        } else {
            format!("{server}/{base}/{path}")
        }
    }
}
