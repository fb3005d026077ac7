//! Property tests for the notification core and event-log ring.
//!
//! Runs on host (x86_64) only — proptest is not available for ESP32
//! targets. On ESP32, these tests are compiled out.

#![cfg(not(target_os = "espidf"))]

use feeder_notify::app::notifier::{Notifier, Priority, join_endpoint};
use feeder_notify::app::ports::{StorageError, StoragePort};
use feeder_notify::eventlog::{EVENT_MESSAGE_CAP, EVENT_RING_SLOTS, EventLog, EventSeverity};
use proptest::prelude::*;
use std::collections::HashMap;

// ── Endpoint derivation ───────────────────────────────────────

proptest! {
    /// For any base URL and topic, the endpoint is the slash-trimmed
    /// base plus exactly one separator plus the topic.
    #[test]
    fn endpoint_join_invariant(
        base in "[a-z]{1,10}(\\.[a-z]{2,5}){0,2}",
        slashes in 0usize..4,
        topic in "[A-Za-z0-9_-]{1,24}",
    ) {
        let server = format!("https://{}{}", base, "/".repeat(slashes));
        let n = Notifier::new(&server, &topic);

        let expected = format!("https://{}/{}", base, topic);
        prop_assert_eq!(n.endpoint(), expected.as_str());
        let joined = join_endpoint(&server, &topic);
        prop_assert_eq!(n.endpoint(), joined.as_str());
        // Exactly one separator: nothing doubled after the scheme.
        let after_scheme = &n.endpoint()["https://".len()..];
        prop_assert!(!after_scheme.contains("//"));
    }

    /// Every raw level clamps into the valid 1–5 range, and the header
    /// string always matches the clamped level.
    #[test]
    fn priority_clamp_invariant(level in 0u8..=255) {
        let p = Priority::from_level(level);
        prop_assert!((1..=5).contains(&p.level()));
        let level_str = p.level().to_string();
        prop_assert_eq!(p.as_str(), level_str.as_str());
        if (1..=5).contains(&level) {
            prop_assert_eq!(p.level(), level);
        }
    }
}

// ── Event-log ring invariants ─────────────────────────────────

struct MemStore(HashMap<String, Vec<u8>>);

impl StoragePort for MemStore {
    fn read(&self, ns: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        match self.0.get(&format!("{ns}::{key}")) {
            Some(v) => {
                let n = v.len().min(buf.len());
                buf[..n].copy_from_slice(&v[..n]);
                Ok(n)
            }
            None => Err(StorageError::NotFound),
        }
    }
    fn write(&mut self, ns: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.0.insert(format!("{ns}::{key}"), data.to_vec());
        Ok(())
    }
    fn delete(&mut self, ns: &str, key: &str) -> Result<(), StorageError> {
        self.0.remove(&format!("{ns}::{key}"));
        Ok(())
    }
    fn exists(&self, ns: &str, key: &str) -> bool {
        self.0.contains_key(&format!("{ns}::{key}"))
    }
}

proptest! {
    /// Arbitrary append sequences never exceed the ring capacity, stay
    /// seq-ordered, and always store intact UTF-8 messages.
    #[test]
    fn ring_capacity_and_order(
        messages in proptest::collection::vec(".{0,200}", 1..=24),
    ) {
        let mut store = MemStore(HashMap::new());
        let mut log = EventLog::new();
        log.init(&store);

        for (i, msg) in messages.iter().enumerate() {
            log.append(&mut store, i as u64, EventSeverity::Info, msg).unwrap();
        }

        let entries = log.read_all(&store);
        prop_assert!(entries.len() <= EVENT_RING_SLOTS);
        prop_assert_eq!(entries.len(), messages.len().min(EVENT_RING_SLOTS));
        for pair in entries.windows(2) {
            prop_assert!(pair[0].seq < pair[1].seq);
        }
        for e in &entries {
            prop_assert!(e.message.len() <= EVENT_MESSAGE_CAP);
            // heapless::String guarantees UTF-8; the truncation point
            // must also be a prefix of the original message.
            let original = &messages[e.seq as usize];
            prop_assert!(original.starts_with(e.message.as_str()));
        }

        // Clear always empties the ring.
        log.clear(&mut store);
        prop_assert!(log.read_all(&store).is_empty());
    }
}
