//! ntfy HTTP adapter.
//!
//! Implements [`HttpPort`] — the hexagonal boundary for the outbound
//! push-notification POST.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF HTTPS client via
//!   `esp_idf_svc::http::client`, with the bundled CA store for TLS.
//! - **all other targets**: a recording simulation whose status code
//!   and failure mode are scriptable from tests.
//!
//! The connection is created per request and dropped immediately after
//! the status is read; holding an idle TLS session would pin ~40 KB of
//! heap the feeder needs elsewhere.

use log::{info, warn};

use crate::app::ports::{HttpError, HttpPort};

// ───────────────────────────────────────────────────────────────
// Simulation state (host targets)
// ───────────────────────────────────────────────────────────────

/// Last request issued through the simulation backend.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone)]
pub struct SimRequest {
    pub url: String,
    pub body: Vec<u8>,
    pub headers: Vec<(String, String)>,
}

// ───────────────────────────────────────────────────────────────
// Adapter
// ───────────────────────────────────────────────────────────────

/// HTTPS POST adapter for the ntfy relay.
pub struct NtfyHttpAdapter {
    #[cfg(not(target_os = "espidf"))]
    sim_status: u16,
    #[cfg(not(target_os = "espidf"))]
    sim_failure: Option<HttpError>,
    #[cfg(not(target_os = "espidf"))]
    sim_last: Option<SimRequest>,
}

impl Default for NtfyHttpAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl NtfyHttpAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            sim_status: 200,
            #[cfg(not(target_os = "espidf"))]
            sim_failure: None,
            #[cfg(not(target_os = "espidf"))]
            sim_last: None,
        }
    }

    // ── Simulation controls (host targets) ────────────────────

    /// Status code the next simulated requests will return.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_status(&mut self, status: u16) {
        self.sim_status = status;
    }

    /// Make the next simulated requests fail with `err`.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_fail_with(&mut self, err: HttpError) {
        self.sim_failure = Some(err);
    }

    /// The most recent request issued through this adapter, if any.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_last_request(&self) -> Option<&SimRequest> {
        self.sim_last.as_ref()
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_post(
        &mut self,
        url: &str,
        body: &[u8],
        headers: &[(&str, &str)],
    ) -> Result<u16, HttpError> {
        use esp_idf_svc::http::Method;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
        use esp_idf_svc::io::Write;

        let mut conn = EspHttpConnection::new(&Configuration {
            use_global_ca_store: true,
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        })
        .map_err(|e| map_esp_error(e.code(), HttpError::Connect))?;

        conn.initiate_request(Method::Post, url, headers)
            .map_err(|e| map_esp_error(e.code(), HttpError::Connect))?;
        conn.write_all(body)
            .map_err(|e| map_esp_error(e.0.code(), HttpError::RequestWrite))?;
        conn.initiate_response()
            .map_err(|e| map_esp_error(e.code(), HttpError::Response))?;

        Ok(conn.status())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_post(
        &mut self,
        url: &str,
        body: &[u8],
        headers: &[(&str, &str)],
    ) -> Result<u16, HttpError> {
        self.sim_last = Some(SimRequest {
            url: url.to_string(),
            body: body.to_vec(),
            headers: headers
                .iter()
                .map(|(n, v)| ((*n).to_string(), (*v).to_string()))
                .collect(),
        });
        if let Some(err) = self.sim_failure.clone() {
            warn!("http(sim): POST {} failing with '{}'", url, err);
            return Err(err);
        }
        info!(
            "http(sim): POST {} ({} bytes) -> {}",
            url,
            body.len(),
            self.sim_status
        );
        Ok(self.sim_status)
    }
}

/// Map an ESP-IDF error code to a port error, preferring the typed
/// out-of-memory variant so memory pressure is detectable upstream.
#[cfg(target_os = "espidf")]
fn map_esp_error(code: esp_idf_svc::sys::esp_err_t, fallback: HttpError) -> HttpError {
    if code == esp_idf_svc::sys::ESP_ERR_NO_MEM {
        HttpError::OutOfMemory
    } else {
        fallback
    }
}

impl HttpPort for NtfyHttpAdapter {
    fn post(
        &mut self,
        url: &str,
        body: &[u8],
        headers: &[(&str, &str)],
    ) -> Result<u16, HttpError> {
        self.platform_post(url, body, headers)
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
