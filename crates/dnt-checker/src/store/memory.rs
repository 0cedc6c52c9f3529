use chrono::{DateTime, Utc};
use dnt_core::{Domain, RecheckRecord, RecheckTimeStore};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Process-lifetime recheck store
#[derive(Debug, Default)]
pub struct MemoryRecheckStore {
    records: Mutex<HashMap<Domain, DateTime<Utc>>>,
}

impl MemoryRecheckStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of domains ever checked
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no domain was checked yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All records, sorted by domain
    #[must_use]
    pub fn records(&self) -> Vec<RecheckRecord> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let mut out: Vec<_> = records
            .iter()
            .map(|(domain, at)| RecheckRecord::new(domain.clone(), *at))
            .collect();
        out.sort_by(|a, b| a.domain.cmp(&b.domain));
        out
    }
}

impl RecheckTimeStore for MemoryRecheckStore {
    fn get(&self, domain: &Domain) -> Option<DateTime<Utc>> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(domain)
            .copied()
    }

    fn set(&self, domain: &Domain, at: DateTime<Utc>) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(domain.clone(), at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_last_write_wins() {
        let store = MemoryRecheckStore::new();
        let domain = Domain::parse("eff.org").unwrap();
        let first = Utc::now();
        let second = first + TimeDelta::seconds(5);

        assert!(store.get(&domain).is_none());
        store.set(&domain, second);
        store.set(&domain, first);

        assert_eq!(store.get(&domain), Some(first));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_records_sorted() {
        let store = MemoryRecheckStore::new();
        let now = Utc::now();
        for name in ["zeta.example", "alpha.example", "mid.example"] {
            store.set(&Domain::parse(name).unwrap(), now);
        }

        let names: Vec<_> = store
            .records()
            .into_iter()
            .map(|r| r.domain.to_string())
            .collect();
        assert_eq!(names, ["alpha.example", "mid.example", "zeta.example"]);
    }
}
