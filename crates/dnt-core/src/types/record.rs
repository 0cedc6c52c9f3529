use crate::Domain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// When a domain's policy check was last initiated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecheckRecord {
    /// The checked domain
    pub domain: Domain,

    /// Moment the most recent fetch started
    pub last_checked_at: DateTime<Utc>,
}

impl RecheckRecord {
    /// Create a record
    #[must_use]
    pub const fn new(domain: Domain, last_checked_at: DateTime<Utc>) -> Self {
        Self {
            domain,
            last_checked_at,
        }
    }

    /// Earliest moment a new check for this domain may start
    #[must_use]
    pub fn eligible_at(&self, interval: std::time::Duration) -> DateTime<Utc> {
        chrono::TimeDelta::from_std(interval)
            .ok()
            .and_then(|delta| self.last_checked_at.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
