//! Checker configuration.

use dnt_core::{well_known_url, DntError, Domain, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for a [`CheckCoordinator`](crate::CheckCoordinator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Whether checks run at all (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Minimum time between two checks of the same domain (seconds).
    #[serde(default = "default_recheck_interval")]
    pub recheck_interval_secs: u64,

    /// Deadline for a single fetch, pacing excluded (seconds).
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Minimum spacing between any two outbound fetches (milliseconds, 0 = off).
    #[serde(default = "default_pacing_interval")]
    pub pacing_interval_ms: u64,

    /// URL scheme for the well-known resource.
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Explicit port for the well-known resource.
    #[serde(default)]
    pub port: Option<u16>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            recheck_interval_secs: default_recheck_interval(),
            fetch_timeout_secs: default_fetch_timeout(),
            pacing_interval_ms: default_pacing_interval(),
            scheme: default_scheme(),
            port: None,
        }
    }
}

impl CheckerConfig {
    /// Reject settings the coordinator cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.fetch_timeout_secs == 0 {
            return Err(DntError::Config("fetch_timeout_secs must be positive".into()));
        }
        if !matches!(self.scheme.as_str(), "http" | "https") {
            return Err(DntError::Config(format!(
                "unsupported scheme {:?}, expected http or https",
                self.scheme
            )));
        }
        Ok(())
    }

    /// Rate-limit window per domain.
    #[must_use]
    pub const fn recheck_interval(&self) -> Duration {
        Duration::from_secs(self.recheck_interval_secs)
    }

    /// Fetch deadline.
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Outbound pacing interval, if pacing is on.
    #[must_use]
    pub const fn pacing_interval(&self) -> Option<Duration> {
        match self.pacing_interval_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// Locator for the well-known URL.
    #[must_use]
    pub fn locator(&self) -> PolicyLocator {
        PolicyLocator {
            scheme: self.scheme.clone(),
            port: self.port,
        }
    }
}

/// Where a domain's policy is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyLocator {
    /// `https` in production
    pub scheme: String,
    /// Port override, `None` for the scheme default
    pub port: Option<u16>,
}

impl Default for PolicyLocator {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            port: None,
        }
    }
}

impl PolicyLocator {
    /// Locator for a plain-HTTP server on a fixed port (local testing).
    #[must_use]
    pub fn http(port: u16) -> Self {
        Self {
            scheme: String::from("http"),
            port: Some(port),
        }
    }

    /// The well-known URL for `domain`.
    #[must_use]
    pub fn url_for(&self, domain: &Domain) -> String {
        well_known_url(&self.scheme, domain, self.port)
    }
}

// Default value functions for serde.
const fn default_true() -> bool {
    true
}

const fn default_recheck_interval() -> u64 {
    86_400
}

const fn default_fetch_timeout() -> u64 {
    30
}

const fn default_pacing_interval() -> u64 {
    1_000
}

fn default_scheme() -> String {
    String::from("https")
}
