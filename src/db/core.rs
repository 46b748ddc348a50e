//! The core keyspace structure.
//!
//! Two parallel maps: `data` holds the typed value per key, `expirations`
//! holds the absolute instant a key goes stale. A key may exist in `data`
//! without an `expirations` entry (no TTL), but never the reverse.

use crate::db::types::DataType;
use std::collections::HashMap;
use std::time::Instant;

/// The shared, coarse-locked keyspace. One instance per server, wrapped
/// in `Arc<tokio::sync::Mutex<Keyspace>>` so it can be held across the
/// `await` points of connection handling without becoming a deadlock risk.
pub struct Keyspace {
    pub(crate) data: HashMap<String, DataType>,
    pub(crate) expirations: HashMap<String, Instant>,
}

impl Keyspace {
    /// Create an empty keyspace.
    pub fn new() -> Self {
        Keyspace {
            data: HashMap::new(),
            expirations: HashMap::new(),
        }
    }

    /// If `key` has an elapsed expiry, remove it (and its expiry entry)
    /// from both maps. This is the lazy-expiration hook: every read or
    /// write that resolves a key must call this first.
    pub(crate) fn expire_if_due(&mut self, key: &str) {
        if let Some(&at) = self.expirations.get(key) {
            if Instant::now() >= at {
                self.data.remove(key);
                self.expirations.remove(key);
            }
        }
    }

    /// Remove `key` entirely if its value is a collection that has just
    /// become empty. Must be called within the same critical section as
    /// the mutation that may have emptied it.
    pub(crate) fn remove_if_emptied(&mut self, key: &str) {
        let emptied = self
            .data
            .get(key)
            .map(DataType::is_empty_collection)
            .unwrap_or(false);
        if emptied {
            self.data.remove(key);
            self.expirations.remove(key);
        }
    }

    /// Number of live keys. Does not perform a sweep; expired-but-not-yet-
    /// collected keys are excluded by querying through `exists`.
    #[cfg(test)]
    pub(crate) fn raw_len(&self) -> usize {
        self.data.len()
    }
}

impl Default for Keyspace {
    fn default() -> Self {
        Self::new()
    }
}
