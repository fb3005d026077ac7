//! Fuzz target: `EventLog` ring buffer
//!
//! Drives arbitrary `append` / `read_all` / `clear` sequences with
//! fuzz-derived message bytes and verifies:
//! - No panics under arbitrary (possibly non-UTF-8-boundary) inputs
//! - The ring never returns more than `EVENT_RING_SLOTS` (8) entries
//! - `clear` always leaves the log empty
//!
//! cargo fuzz run fuzz_event_log

#![no_main]

use feeder_notify::eventlog::{EVENT_RING_SLOTS, EventLog, EventSeverity};
use libfuzzer_sys::fuzz_target;

// ── In-memory StoragePort for fuzz testing ────────────────────

use feeder_notify::app::ports::{StorageError, StoragePort};
use std::collections::HashMap;

struct MemStore {
    data: HashMap<String, Vec<u8>>,
}

impl MemStore {
    fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }
}

impl StoragePort for MemStore {
    fn read(&self, ns: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        match self.data.get(&format!("{ns}::{key}")) {
            Some(v) => {
                let n = v.len().min(buf.len());
                buf[..n].copy_from_slice(&v[..n]);
                Ok(n)
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, ns: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.data.insert(format!("{ns}::{key}"), data.to_vec());
        Ok(())
    }

    fn delete(&mut self, ns: &str, key: &str) -> Result<(), StorageError> {
        self.data.remove(&format!("{ns}::{key}"));
        Ok(())
    }

    fn exists(&self, ns: &str, key: &str) -> bool {
        self.data.contains_key(&format!("{ns}::{key}"))
    }
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let mut store = MemStore::new();
    let mut log = EventLog::new();
    log.init(&store);

    // Drive 1–16 appends, slicing messages out of the fuzz input at
    // arbitrary (lossy-decoded) offsets.
    let num_writes = (data[0] as usize % 16) + 1;
    for i in 0..num_writes {
        let start = (i * 7) % data.len();
        let len = (data.get(i + 1).copied().unwrap_or(0) as usize) % 128;
        let end = (start + len).min(data.len());
        let message = String::from_utf8_lossy(&data[start..end]);

        let severity = match data.get(i).copied().unwrap_or(0) % 3 {
            0 => EventSeverity::Info,
            1 => EventSeverity::Warning,
            _ => EventSeverity::Error,
        };

        let _ = log.append(&mut store, i as u64, severity, &message);
    }

    // read_all must return at most EVENT_RING_SLOTS entries, ordered.
    let entries = log.read_all(&store);
    assert!(
        entries.len() <= EVENT_RING_SLOTS,
        "read_all returned {} entries — exceeds ring capacity",
        entries.len()
    );
    for pair in entries.windows(2) {
        assert!(pair[0].seq < pair[1].seq, "entries out of sequence order");
    }

    // clear must succeed without panics and leave the log empty.
    log.clear(&mut store);
    assert!(
        log.read_all(&store).is_empty(),
        "read_all after clear is not empty"
    );
});
