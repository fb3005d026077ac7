//! Port traits — the hexagonal boundary between the notification core
//! and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Notifier (domain)
//! ```
//!
//! Driven adapters (HTTP transport, event log, blob storage) implement
//! these traits. The [`Notifier`](super::notifier::Notifier) consumes
//! them via generics at call sites, so the core never touches a socket
//! or flash directly.
//!
//! All port errors are typed; the sending paths deliberately contain
//! every variant (a failed notification is logged and dropped, never
//! propagated to the caller).

use crate::eventlog::EventSeverity;

// ───────────────────────────────────────────────────────────────
// HTTP port (driven adapter: domain → network)
// ───────────────────────────────────────────────────────────────

/// One-shot HTTP POST capability supplied by the host environment.
///
/// Implementations perform a single blocking request and return the
/// response status code. No retries, no timeouts beyond the transport's
/// own defaults.
pub trait HttpPort {
    /// POST `body` to `url` with the given header pairs.
    /// Returns the HTTP status code of the response.
    fn post(&mut self, url: &str, body: &[u8], headers: &[(&str, &str)])
    -> Result<u16, HttpError>;
}

/// Errors from [`HttpPort`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// TCP connect or TLS handshake failed.
    Connect,
    /// Request headers or body could not be written.
    RequestWrite,
    /// The response never arrived or could not be read.
    Response,
    /// The transport ran out of heap while building the request.
    /// Display text intentionally contains "memory" so the generic
    /// memory-pressure detection in the notifier applies.
    OutOfMemory,
    /// Platform error with the platform's own message.
    Platform(heapless::String<64>),
}

impl core::fmt::Display for HttpError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Connect => write!(f, "connect failed"),
            Self::RequestWrite => write!(f, "request write failed"),
            Self::Response => write!(f, "response read failed"),
            Self::OutOfMemory => write!(f, "out of memory"),
            Self::Platform(msg) => write!(f, "{}", msg),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Event log port (driven adapter: domain → operational record)
// ───────────────────────────────────────────────────────────────

/// Append-only operational event record shared by the feeder
/// subsystems. The notifier writes `Error` entries here when a send
/// fails; callers in this crate always discard the result — logging is
/// best-effort and must never affect the primary send outcome.
pub trait EventLogPort {
    fn log_event(&mut self, severity: EventSeverity, message: &str) -> Result<(), EventLogError>;
}

/// Errors from [`EventLogPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLogError {
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the log backend.
    IoError,
}

impl core::fmt::Display for EventLogError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: event log ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value blob storage. The event log ring buffer and the
/// stored [`FeederConfig`](crate::config::FeederConfig) live behind this
/// trait: NVS on the device, an in-memory map on the host.
///
/// Keys are namespaced to prevent collisions between subsystems, and
/// writes are atomic (ESP-IDF NVS guarantees this natively; the
/// in-memory backend trivially so).
pub trait StoragePort {
    /// Read a value. Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key. Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
