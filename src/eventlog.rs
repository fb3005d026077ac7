//! Persistent operational event log.
//!
//! Append-only record shared by the feeder subsystems (feed scheduler,
//! notifier, sensor monitors). Stores the most recent
//! [`EVENT_RING_SLOTS`] entries in a storage-backed ring buffer under
//! the "evtlog" namespace so the record survives a reboot. Each entry
//! carries a monotonic sequence number, uptime, severity, and a
//! truncated human-readable message.

use serde::{Deserialize, Serialize};

use crate::app::ports::{StorageError, StoragePort};

/// Number of entries the ring retains.
pub const EVENT_RING_SLOTS: usize = 8;

/// Maximum stored message length in bytes.
pub const EVENT_MESSAGE_CAP: usize = 96;

const EVENT_NAMESPACE: &str = "evtlog";
const INDEX_KEY: &str = "evt_idx";
const SEQ_KEY: &str = "evt_seq";
const ENTRY_BUF_SIZE: usize = 160;

/// Severity of a logged event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventSeverity {
    Info = 0,
    Warning = 1,
    Error = 2,
}

impl EventSeverity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARN",
            Self::Error => "ERROR",
        }
    }
}

/// One record in the event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEntry {
    pub seq: u32,
    pub uptime_secs: u64,
    pub severity: EventSeverity,
    pub message: heapless::String<EVENT_MESSAGE_CAP>,
}

impl EventEntry {
    pub fn new(seq: u32, uptime_secs: u64, severity: EventSeverity, message: &str) -> Self {
        let mut m = heapless::String::new();
        let _ = m.push_str(truncate_on_char_boundary(message, EVENT_MESSAGE_CAP));
        Self {
            seq,
            uptime_secs,
            severity,
            message: m,
        }
    }
}

/// Cut `s` to at most `max` bytes without splitting a UTF-8 sequence.
fn truncate_on_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Storage-backed ring buffer of [`EventEntry`] records.
///
/// The write index and sequence counter are persisted alongside the
/// entries; [`init`](EventLog::init) restores them so appends continue
/// where the previous boot left off.
#[derive(Default)]
pub struct EventLog {
    write_index: usize,
    next_seq: u32,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the write index and sequence counter from storage, or
    /// default both to 0.
    pub fn init(&mut self, store: &dyn StoragePort) {
        let mut buf = [0u8; 4];
        if let Ok(4) = store.read(EVENT_NAMESPACE, INDEX_KEY, &mut buf) {
            self.write_index = u32::from_le_bytes(buf) as usize % EVENT_RING_SLOTS;
        }
        if let Ok(4) = store.read(EVENT_NAMESPACE, SEQ_KEY, &mut buf) {
            self.next_seq = u32::from_le_bytes(buf);
        }
    }

    /// Append an event to the next ring slot and advance the index.
    /// Index and sequence persistence is best-effort; only a failed
    /// entry write is reported.
    pub fn append(
        &mut self,
        store: &mut dyn StoragePort,
        uptime_secs: u64,
        severity: EventSeverity,
        message: &str,
    ) -> Result<(), StorageError> {
        let entry = EventEntry::new(self.next_seq, uptime_secs, severity, message);
        let slot_key = Self::slot_key(self.write_index);
        let bytes = postcard::to_allocvec(&entry).map_err(|_| StorageError::IoError)?;
        store.write(EVENT_NAMESPACE, &slot_key, &bytes)?;

        self.write_index = (self.write_index + 1) % EVENT_RING_SLOTS;
        self.next_seq = self.next_seq.wrapping_add(1);
        let _ = store.write(
            EVENT_NAMESPACE,
            INDEX_KEY,
            &(self.write_index as u32).to_le_bytes(),
        );
        let _ = store.write(EVENT_NAMESPACE, SEQ_KEY, &self.next_seq.to_le_bytes());
        Ok(())
    }

    /// Read all stored entries (up to [`EVENT_RING_SLOTS`]), oldest
    /// first by sequence number.
    pub fn read_all(&self, store: &dyn StoragePort) -> heapless::Vec<EventEntry, EVENT_RING_SLOTS> {
        let mut entries: heapless::Vec<EventEntry, EVENT_RING_SLOTS> = heapless::Vec::new();
        for i in 0..EVENT_RING_SLOTS {
            let slot_key = Self::slot_key(i);
            let mut buf = [0u8; ENTRY_BUF_SIZE];
            if let Ok(len) = store.read(EVENT_NAMESPACE, &slot_key, &mut buf) {
                if let Ok(entry) = postcard::from_bytes::<EventEntry>(&buf[..len]) {
                    let _ = entries.push(entry);
                }
            }
        }
        entries.sort_unstable_by_key(|e| e.seq);
        entries
    }

    /// Erase all entries and reset index and sequence counter.
    pub fn clear(&mut self, store: &mut dyn StoragePort) {
        for i in 0..EVENT_RING_SLOTS {
            let _ = store.delete(EVENT_NAMESPACE, &Self::slot_key(i));
        }
        let _ = store.delete(EVENT_NAMESPACE, INDEX_KEY);
        let _ = store.delete(EVENT_NAMESPACE, SEQ_KEY);
        self.write_index = 0;
        self.next_seq = 0;
    }

    /// Number of entries currently stored.
    pub fn count(&self, store: &dyn StoragePort) -> usize {
        (0..EVENT_RING_SLOTS)
            .filter(|i| store.exists(EVENT_NAMESPACE, &Self::slot_key(*i)))
            .count()
    }

    fn slot_key(index: usize) -> heapless::String<16> {
        let mut s = heapless::String::new();
        let _ = core::fmt::Write::write_fmt(&mut s, format_args!("e{}", index));
        s
    }
}
