//! Event-log adapter.
//!
//! Implements [`EventLogPort`] by appending to the persistent
//! [`EventLog`] ring buffer and mirroring every entry to the serial
//! console, so operators see events live while the ring keeps the
//! recent history across reboots.

use log::{error, info, warn};

use crate::app::ports::{EventLogError, EventLogPort, StorageError, StoragePort};
use crate::eventlog::{EVENT_RING_SLOTS, EventEntry, EventLog, EventSeverity};

/// Storage-backed event log with serial mirroring.
pub struct EventLogService<S: StoragePort> {
    store: S,
    ring: EventLog,
    #[cfg(not(target_os = "espidf"))]
    started: std::time::Instant,
}

impl<S: StoragePort> EventLogService<S> {
    /// Wrap `store` and restore the ring position persisted there.
    pub fn new(store: S) -> Self {
        let mut ring = EventLog::new();
        ring.init(&store);
        Self {
            store,
            ring,
            #[cfg(not(target_os = "espidf"))]
            started: std::time::Instant::now(),
        }
    }

    /// Recent entries, oldest first.
    pub fn recent(&self) -> heapless::Vec<EventEntry, EVENT_RING_SLOTS> {
        self.ring.read_all(&self.store)
    }

    /// Erase the persisted history.
    pub fn clear(&mut self) {
        self.ring.clear(&mut self.store);
    }

    /// Seconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    fn uptime_secs(&self) -> u64 {
        // SAFETY: esp_timer_get_time is a monotonic counter read.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000_000
    }

    /// Seconds since service construction (host simulation).
    #[cfg(not(target_os = "espidf"))]
    fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

impl<S: StoragePort> EventLogPort for EventLogService<S> {
    fn log_event(&mut self, severity: EventSeverity, message: &str) -> Result<(), EventLogError> {
        match severity {
            EventSeverity::Info => info!("EVENT | {}", message),
            EventSeverity::Warning => warn!("EVENT | {}", message),
            EventSeverity::Error => error!("EVENT | {}", message),
        }

        let uptime = self.uptime_secs();
        self.ring
            .append(&mut self.store, uptime, severity, message)
            .map_err(|e| match e {
                StorageError::Full => EventLogError::StorageFull,
                _ => EventLogError::IoError,
            })
    }
}
