//! Runtime on/off switch for policy checking.

use dnt_core::SettingsGate;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shared flag implementing [`SettingsGate`].
///
/// Clones share the flag, so the host keeps one handle to flip it while the
/// coordinator reads another.
#[derive(Debug, Clone)]
pub struct SettingsToggle {
    enabled: Arc<AtomicBool>,
}

impl Default for SettingsToggle {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SettingsToggle {
    /// Create a toggle in the given state
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    /// Turn checking on or off
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }
}

impl SettingsGate for SettingsToggle {
    fn checking_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}
