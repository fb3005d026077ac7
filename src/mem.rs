//! Best-effort heap headroom hints.
//!
//! A TLS handshake on the ESP32 needs tens of kilobytes of contiguous
//! heap, and the feeder runs close to that limit. The notifier brackets
//! every HTTPS request with these hints so low-memory conditions show
//! up in the serial log *before* the transport fails.
//!
//! - **`target_os = "espidf"`** — reads the live heap counters from
//!   ESP-IDF.
//! - **all other targets** — returns a fixed synthetic figure so the
//!   same branches run in simulation.
//!
//! The hints are infallible and purely observational: they can never
//! affect the outcome of the send they bracket.

use log::{debug, warn};

/// Free-heap floor below which a pre-request warning is emitted.
/// Matches the worst-case mbedTLS handshake footprint.
pub const LOW_HEAP_FLOOR_BYTES: u32 = 40 * 1024;

/// Synthetic free-heap figure reported on non-ESP targets.
#[cfg(not(target_os = "espidf"))]
const SIM_FREE_HEAP_BYTES: u32 = 300 * 1024;

/// Current free heap in bytes.
#[cfg(target_os = "espidf")]
pub fn free_heap_bytes() -> u32 {
    // SAFETY: esp_get_free_heap_size is a simple counter read.
    unsafe { esp_idf_svc::sys::esp_get_free_heap_size() }
}

/// Current free heap in bytes (simulation).
#[cfg(not(target_os = "espidf"))]
pub fn free_heap_bytes() -> u32 {
    SIM_FREE_HEAP_BYTES
}

/// Lowest free heap observed since boot, in bytes.
#[cfg(target_os = "espidf")]
pub fn min_free_heap_bytes() -> u32 {
    // SAFETY: esp_get_minimum_free_heap_size is a simple counter read.
    unsafe { esp_idf_svc::sys::esp_get_minimum_free_heap_size() }
}

/// Lowest free heap observed since boot (simulation).
#[cfg(not(target_os = "espidf"))]
pub fn min_free_heap_bytes() -> u32 {
    SIM_FREE_HEAP_BYTES
}

/// Called immediately before an HTTPS request is issued.
pub fn pre_request_hint() {
    let free = free_heap_bytes();
    if free < LOW_HEAP_FLOOR_BYTES {
        warn!(
            "mem: low heap before HTTPS request ({} bytes free, floor {})",
            free, LOW_HEAP_FLOOR_BYTES
        );
    } else {
        debug!("mem: {} bytes free before HTTPS request", free);
    }
}

/// Called after the request completes (success or failure).
pub fn post_request_hint() {
    debug!(
        "mem: {} bytes free after request (lifetime minimum {})",
        free_heap_bytes(),
        min_free_heap_bytes()
    );
}
