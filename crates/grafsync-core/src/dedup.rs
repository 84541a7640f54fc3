//! Content-addressed dedup of remote writes.
//!
//! Hashes are kept for the process lifetime; there is no eviction, so a payload
//! is submitted at most once per process no matter which object carries it.

use dashmap::DashSet;
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of the payload bytes
pub fn content_hash(payload: &str) -> String {
    const_hex::encode(Sha256::digest(payload.as_bytes()))
}

#[derive(Debug, Default)]
pub struct ContentDedupStore {
    seen: DashSet<String>,
}

impl ContentDedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `hash` was already recorded. Otherwise records it and
    /// returns false. Atomic across concurrent callers.
    pub fn check_and_mark(&self, hash: &str) -> bool {
        !self.seen.insert(hash.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    #[test]
    fn test_content_hash() {
        assert_eq!(
            content_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(content_hash("{\"a\":1}"), content_hash("{\"a\":1}"));
        assert_ne!(content_hash("{\"a\":1}"), content_hash("{\"a\": 1}"));
    }

    #[test]
    fn test_check_and_mark() {
        let store = ContentDedupStore::new();
        let hash = content_hash("payload");

        assert!(store.seen.is_empty());
        assert!(!store.check_and_mark(&hash));
        assert!(store.check_and_mark(&hash));
        assert!(store.check_and_mark(&hash));
        assert!(store.seen.contains(&hash));
        assert_eq!(store.seen.len(), 1);
    }

    #[test]
    fn test_concurrent_check_and_mark_admits_one() {
        let store = Arc::new(ContentDedupStore::new());
        let admitted = Arc::new(AtomicUsize::new(0));
        let hash = content_hash("same content");

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                let admitted = admitted.clone();
                let hash = hash.clone();
                std::thread::spawn(move || {
                    if !store.check_and_mark(&hash) {
                        admitted.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(admitted.load(Ordering::SeqCst), 1);
    }
}
