//! Feeder notification subsystem — device entry point.
//!
//! Wires the concrete adapters to the notification core and announces
//! boot over the push relay:
//!
//! ```text
//!  NtfyHttpAdapter ──▶ ┌──────────────────────┐
//!  (HttpPort)          │       Notifier        │ ──▶ EventLogService
//!  NvsStorage ────────▶│  (format · POST ·     │     (EventLogPort)
//!  (StoragePort)       │   interpret status)   │
//!                      └──────────────────────┘
//! ```

use anyhow::Result;
use log::{info, warn};

use feeder_notify::adapters::event_log::EventLogService;
use feeder_notify::adapters::http::NtfyHttpAdapter;
use feeder_notify::adapters::storage::NvsStorage;
use feeder_notify::app::notifier::Notifier;
use feeder_notify::config::load_config;
use feeder_notify::mem;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("feeder-notify v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Storage (degraded but functional without it) ───────
    let storage = match NvsStorage::new() {
        Ok(s) => s,
        Err(e) => {
            warn!("NVS init failed ({}), running without persistence", e);
            // Per-operation NVS errors are contained by the event log
            // and config fallbacks; flash should self-heal next boot.
            NvsStorage::default()
        }
    };

    // ── 3. Config (stored, or defaults) ───────────────────────
    let config = load_config(&storage);
    if config.ntfy_topic.is_none() {
        warn!("no ntfy topic provisioned, using the placeholder topic");
    }

    // ── 4. Event log over the same storage ────────────────────
    let mut events = EventLogService::new(storage);

    // ── 5. Notifier + boot announcement ───────────────────────
    let notifier = Notifier::new(&config.ntfy_server, config.topic());
    info!(
        "notifier ready: {} ({} bytes heap free)",
        notifier.endpoint(),
        mem::free_heap_bytes()
    );

    let mut http = NtfyHttpAdapter::new();
    if notifier.send(&mut http, &mut events, "Feeder online") {
        info!("boot notification delivered");
    } else {
        warn!("boot notification not delivered (see event log)");
    }

    Ok(())
}
