use crate::error::{DntError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a DNS name in presentation form, without the root dot
const MAX_DOMAIN_LEN: usize = 253;

/// Maximum length of a single DNS label
const MAX_LABEL_LEN: usize = 63;

/// A normalized hostname used as the dedup and rate-limit key.
///
/// Parsing trims surrounding whitespace, drops one trailing root dot and
/// lowercases (IDNA names are converted to punycode), so two spellings of the
/// same host compare equal. IP literals, ports, paths and schemes are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Domain(String);

impl Domain {
    /// Parse and normalize a hostname
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || DntError::InvalidDomain(input.to_string());

        let trimmed = input.trim();
        let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);

        if trimmed.is_empty() || trimmed.len() > MAX_DOMAIN_LEN {
            return Err(invalid());
        }

        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '\\' | ':' | '@' | '?' | '#' | '%'))
        {
            return Err(invalid());
        }

        match url::Host::parse(trimmed) {
            Ok(url::Host::Domain(name)) if name.split('.').all(is_valid_label) => Ok(Self(name)),
            _ => Err(invalid()),
        }
    }

    /// The normalized hostname
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LEN
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

impl FromStr for Domain {
    type Err = DntError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Domain {
    type Error = DntError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Domain> for String {
    fn from(domain: Domain) -> Self {
        domain.0
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_case_and_trailing_dot() {
        let a = Domain::parse("EFF.org").unwrap();
        let b = Domain::parse("  eff.ORG. ").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "eff.org");
    }

    #[test]
    fn test_rejects_malformed_input() {
        for input in [
            "",
            "   ",
            ".",
            "eff.org..",
            "https://eff.org",
            "eff.org/path",
            "eff.org:443",
            "user@eff.org",
            "eff org",
            "-eff.org",
            "192.168.0.1",
            "[::1]",
        ] {
            assert!(
                matches!(Domain::parse(input), Err(DntError::InvalidDomain(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_idna_is_punycoded() {
        let domain = Domain::parse("Bücher.example").unwrap();
        assert_eq!(domain.as_str(), "xn--bcher-kva.example");
    }

    #[test]
    fn test_serde_validates() {
        let domain: Domain = serde_json::from_str("\"Example.COM\"").unwrap();
        assert_eq!(domain.as_str(), "example.com");
        assert_eq!(serde_json::to_string(&domain).unwrap(), "\"example.com\"");
        assert!(serde_json::from_str::<Domain>("\"not a domain\"").is_err());
    }
}
