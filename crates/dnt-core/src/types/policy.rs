use crate::Domain;
use serde::{Deserialize, Serialize};

/// Path of the DNT policy resource on every host
pub const WELL_KNOWN_PATH: &str = "/.well-known/dnt-policy.txt";

/// Build the well-known policy URL for a domain.
///
/// `port` is only needed when the policy is served off the scheme's default
/// port, e.g. by a local test server.
#[must_use]
pub fn well_known_url(scheme: &str, domain: &Domain, port: Option<u16>) -> String {
    match port {
        Some(port) => format!("{scheme}://{domain}:{port}{WELL_KNOWN_PATH}"),
        None => format!("{scheme}://{domain}{WELL_KNOWN_PATH}"),
    }
}

/// Raw outcome of a policy fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyResponse {
    /// HTTP status code
    pub status: u16,

    /// Raw response body bytes (empty for non-200 responses)
    #[serde(default)]
    pub body: Vec<u8>,
}

impl PolicyResponse {
    /// Create a response
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for a 200 response
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_url_with_port() {
        let domain = Domain::parse("eff.example").unwrap();
        assert_eq!(
            well_known_url("http", &domain, Some(8080)),
            "http://eff.example:8080/.well-known/dnt-policy.txt"
        );
    }

    #[test]
    fn test_only_200_is_ok() {
        assert!(PolicyResponse::new(200, "").is_ok());
        assert!(!PolicyResponse::new(204, "").is_ok());
        assert!(!PolicyResponse::new(301, "").is_ok());
    }
}
