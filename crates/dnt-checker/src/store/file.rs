use chrono::{DateTime, Utc};
use dnt_core::{DntError, Domain, RecheckRecord, RecheckTimeStore, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// Recheck store persisted as a JSON object `{ "domain": "rfc3339" }`.
///
/// The whole map is loaded on open. `set` only updates memory and marks the
/// store dirty; the file is rewritten off the caller's thread on the current
/// Tokio runtime, coalescing bursts of writes. Outside a runtime nothing is
/// written until [`flush`](Self::flush) or drop. The file is replaced
/// atomically through a sibling temp file.
#[derive(Debug)]
pub struct JsonFileRecheckStore {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    path: PathBuf,
    records: Mutex<BTreeMap<Domain, DateTime<Utc>>>,
    dirty: AtomicBool,
    flush_scheduled: AtomicBool,
    // Serializes writers so the last snapshot taken is the last one written.
    write_lock: Mutex<()>,
}

impl JsonFileRecheckStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    DntError::Config(format!("corrupt recheck store {}: {e}", path.display()))
                })?
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), records = records.len(), "opened recheck store");

        Ok(Self {
            shared: Arc::new(Shared {
                path,
                records: Mutex::new(records),
                dirty: AtomicBool::new(false),
                flush_scheduled: AtomicBool::new(false),
                write_lock: Mutex::new(()),
            }),
        })
    }

    /// Location of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    /// All records, sorted by domain
    #[must_use]
    pub fn records(&self) -> Vec<RecheckRecord> {
        self.shared
            .records()
            .iter()
            .map(|(domain, at)| RecheckRecord::new(domain.clone(), *at))
            .collect()
    }

    /// Returns true if some `set` has not reached the file yet
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.shared.dirty.load(Ordering::SeqCst)
    }

    /// Write pending changes to disk now, blocking the caller.
    pub fn flush(&self) -> Result<()> {
        self.shared.flush()
    }

    fn schedule_flush(&self) {
        if self.shared.flush_scheduled.swap(true, Ordering::SeqCst) {
            return;
        }

        match Handle::try_current() {
            Ok(handle) => {
                let shared = Arc::clone(&self.shared);
                handle.spawn_blocking(move || {
                    shared.flush_scheduled.store(false, Ordering::SeqCst);
                    if let Err(e) = shared.flush() {
                        warn!(path = %shared.path.display(), error = %e, "failed to persist recheck store");
                    }
                });
            }
            // Left dirty for an explicit flush or drop.
            Err(_) => self.shared.flush_scheduled.store(false, Ordering::SeqCst),
        }
    }
}

impl Shared {
    fn records(&self) -> std::sync::MutexGuard<'_, BTreeMap<Domain, DateTime<Utc>>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flush(&self) -> Result<()> {
        let _writer = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.dirty.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        let snapshot = self.records().clone();
        self.persist(&snapshot).map_err(|e| {
            self.dirty.store(true, Ordering::SeqCst);
            e
        })
    }

    fn persist(&self, records: &BTreeMap<Domain, DateTime<Utc>>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), records = records.len(), "persisted recheck store");
        Ok(())
    }
}

impl RecheckTimeStore for JsonFileRecheckStore {
    fn get(&self, domain: &Domain) -> Option<DateTime<Utc>> {
        self.shared.records().get(domain).copied()
    }

    fn set(&self, domain: &Domain, at: DateTime<Utc>) {
        self.shared.records().insert(domain.clone(), at);
        self.shared.dirty.store(true, Ordering::SeqCst);
        self.schedule_flush();
    }
}

impl Drop for JsonFileRecheckStore {
    fn drop(&mut self) {
        if let Err(e) = self.shared.flush() {
            warn!(path = %self.shared.path.display(), error = %e, "failed to persist recheck store");
        }
    }
}
