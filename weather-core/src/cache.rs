use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// One memoized response body.
#[derive(Debug, Clone)]
struct CacheEntry {
    stored_at: Instant,
    payload: Bytes,
}

/// Short-lived response cache keyed by request signature.
///
/// The signature is the method plus the full query-qualified path in the
/// order the client sent it; two query strings differing only in key
/// order are distinct entries. Entries are never deleted, only
/// overwritten when re-stored after going stale, so the table grows with
/// the number of distinct signatures seen since startup. That is a
/// deliberate memory trade-off; [`ResponseCache::with_capacity`] bounds
/// it for deployments that want a ceiling.
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    capacity: Option<usize>,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            capacity: None,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Like [`ResponseCache::new`], but evicts the oldest entry once
    /// `capacity` distinct signatures are stored.
    pub fn with_capacity(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: Some(capacity),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Builds the request signature: method plus the path with its query
    /// string exactly as the client sent it.
    pub fn signature(method: &str, path_and_query: &str) -> String {
        format!("{method} {path_and_query}")
    }

    /// Returns the stored payload if a fresh entry exists.
    ///
    /// Stale entries are left in place; they get overwritten by the next
    /// [`ResponseCache::store`] for the same signature.
    pub fn lookup(&self, signature: &str) -> Option<Bytes> {
        let entries = self.entries.lock();
        let entry = entries.get(signature)?;
        if entry.stored_at.elapsed() >= self.ttl {
            return None;
        }
        debug!(signature, "cache hit");
        Some(entry.payload.clone())
    }

    /// Stores a payload under the signature, overwriting any previous entry.
    pub fn store(&self, signature: &str, payload: Bytes) {
        let mut entries = self.entries.lock();
        if let Some(capacity) = self.capacity
            && !entries.contains_key(signature)
            && entries.len() >= capacity
        {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(key, _)| key.clone());
            if let Some(key) = oldest {
                debug!(signature = %key, "cache full, evicting oldest entry");
                entries.remove(&key);
            }
        }
        debug!(signature, bytes = payload.len(), "cache store");
        entries.insert(
            signature.to_owned(),
            CacheEntry {
                stored_at: Instant::now(),
                payload,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
