//! Capabilities the check coordinator is assembled from.
//!
//! Each trait is a seam for an external collaborator: the HTTP transport, the
//! persistent recheck-time map, the user's on/off setting and the canonical
//! policy text. Concrete adapters live in `dnt-client` and `dnt-checker`.

use crate::{Domain, PolicyResponse, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Performs the outbound GET for a well-known policy URL.
///
/// Implementations must always eventually resolve, either with a response or
/// with an error. Any error or non-200 status counts as non-compliance.
#[async_trait]
pub trait PolicyFetcher: Send + Sync {
    /// Fetch the resource at `url`
    async fn fetch(&self, url: &str) -> Result<PolicyResponse>;
}

/// Durable map from domain to the moment its last check started.
///
/// Writes are per-domain last-write-wins. Implementations are internally
/// synchronized and must not block for long; the coordinator calls them while
/// holding its own lock.
pub trait RecheckTimeStore: Send + Sync {
    /// Last check time for `domain`, if it was ever checked
    fn get(&self, domain: &Domain) -> Option<DateTime<Utc>>;

    /// Record that a check for `domain` started at `at`
    fn set(&self, domain: &Domain, at: DateTime<Utc>);
}

/// Whether DNT policy checking is currently enabled.
///
/// Read on every check; the value may change at any time.
pub trait SettingsGate: Send + Sync {
    /// Returns true if checks may run
    fn checking_enabled(&self) -> bool;
}

impl<F> SettingsGate for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn checking_enabled(&self) -> bool {
        self()
    }
}

/// The canonical policy text fetched bodies are compared against.
pub trait PolicyTextSource: Send + Sync {
    /// The canonical text, loaded once
    fn policy_text(&self) -> &str;

    /// Returns true if `body` is a byte-for-byte copy of the canonical text
    fn accepts(&self, body: &[u8]) -> bool {
        body == self.policy_text().as_bytes()
    }
}
