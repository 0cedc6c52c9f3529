//! The canonical DNT policy text.

use dnt_core::{DntError, PolicyTextSource, Result};
use std::path::Path;
use tracing::debug;

/// Canonical policy text, loaded once and never modified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyText {
    text: String,
}

impl PolicyText {
    /// Wrap an in-memory policy text
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DntError::PolicyText("policy text is empty".into()));
        }
        Ok(Self { text })
    }

    /// Load the policy text from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            DntError::PolicyText(format!("failed to read {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), bytes = text.len(), "loaded DNT policy text");
        Self::new(text)
    }
}

impl PolicyTextSource for PolicyText {
    fn policy_text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_accepts_exact_copy_only() {
        let policy = PolicyText::new("Do Not Track Policy\n").unwrap();
        assert!(policy.accepts(b"Do Not Track Policy\n"));
        assert!(!policy.accepts(b"Do Not Track Policy"));
        assert!(!policy.accepts(b"do not track policy\n"));
        assert!(!policy.accepts(b""));
    }

    #[test]
    fn test_invalid_utf8_never_matches_replacement_char() {
        let policy = PolicyText::new("\u{fffd}\n").unwrap();
        assert!(policy.accepts("\u{fffd}\n".as_bytes()));
        assert!(!policy.accepts(&[0xff, b'\n']));
    }

    #[test]
    fn test_empty_text_is_rejected() {
        assert!(matches!(PolicyText::new(" \n"), Err(DntError::PolicyText(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Policy body").unwrap();

        let policy = PolicyText::from_file(file.path()).unwrap();
        assert_eq!(policy.policy_text(), "Policy body");
    }

    #[test]
    fn test_missing_file() {
        let err = PolicyText::from_file(Path::new("/nonexistent/dnt-policy.txt")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dnt-policy.txt"));
    }
}
