//! Push-notification sender.
//!
//! [`Notifier`] owns a relay base URL and a topic, derives the POST
//! endpoint once, and sends short status messages through an injected
//! [`HttpPort`]. Failures of any kind are contained here: a failed send
//! logs an event and returns `false`, never an error. One blocking
//! round trip per call; no retries, no queueing.

use log::{info, warn};

use crate::config::{DEFAULT_NTFY_SERVER, DEFAULT_NTFY_TOPIC, FeederConfig};
use crate::eventlog::EventSeverity;
use crate::mem;

use super::ports::{EventLogPort, HttpPort};

/// Title used when the caller does not supply one.
pub const TITLE_DEFAULT: &str = "Fish Feeder";
/// Title for the post-feed confirmation.
pub const TITLE_FEEDING_COMPLETE: &str = "Feeding Complete";
/// Title for feeder malfunction reports.
pub const TITLE_FEEDER_ERROR: &str = "Feeder Error";
/// Title used by the module-level fire-and-forget sender.
pub const TITLE_AUTO_FEEDER: &str = "Auto Feeder";

/// Fixed tag set attached to every [`Notifier`] send.
pub const NOTIFY_TAGS: &str = "fish,food";

/// Event-log message recorded when a transport failure looks like
/// memory exhaustion. The raw error text is deliberately not logged in
/// that case (it may itself be truncated garbage under pressure).
pub const MEMORY_ERROR_EVENT: &str = "Notification MemoryError";

// ───────────────────────────────────────────────────────────────
// Priority
// ───────────────────────────────────────────────────────────────

/// Relay-defined urgency level (1 = min … 5 = max).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Priority {
    Min = 1,
    Low = 2,
    #[default]
    Default = 3,
    High = 4,
    Max = 5,
}

impl Priority {
    /// Clamp a raw level into the valid 1–5 range.
    pub fn from_level(level: u8) -> Self {
        match level {
            0 | 1 => Self::Min,
            2 => Self::Low,
            3 => Self::Default,
            4 => Self::High,
            _ => Self::Max,
        }
    }

    /// Wire form for the `Priority` header.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Min => "1",
            Self::Low => "2",
            Self::Default => "3",
            Self::High => "4",
            Self::Max => "5",
        }
    }

    pub const fn level(self) -> u8 {
        self as u8
    }
}

/// Join a server base URL and topic with exactly one separating slash.
pub fn join_endpoint(server: &str, topic: &str) -> String {
    format!("{}/{}", server.trim_end_matches('/'), topic)
}

fn is_memory_pressure(error_text: &str) -> bool {
    error_text.to_ascii_lowercase().contains("memory")
}

// ───────────────────────────────────────────────────────────────
// Notifier
// ───────────────────────────────────────────────────────────────

/// Sends push notifications to one ntfy.sh topic.
///
/// Constructed once at wiring time; immutable for its lifetime. Ports
/// are injected per call so the same notifier serves whichever
/// transport and event log the host assembled.
pub struct Notifier {
    server: String,
    topic: String,
    endpoint: String,
}

impl Notifier {
    /// `server` is the relay base URL (e.g. `"https://ntfy.sh"`,
    /// trailing slashes tolerated); `topic` the device's channel.
    pub fn new(server: &str, topic: &str) -> Self {
        let server = server.trim_end_matches('/').to_string();
        let endpoint = join_endpoint(&server, topic);
        Self {
            server,
            topic: topic.to_string(),
            endpoint,
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// The derived POST target: `{server}/{topic}`.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send `message` with the default title and priority.
    /// Returns `true` iff the relay answered 200.
    pub fn send(
        &self,
        http: &mut impl HttpPort,
        events: &mut impl EventLogPort,
        message: &str,
    ) -> bool {
        self.send_with(http, events, message, TITLE_DEFAULT, Priority::Default)
    }

    /// Send `message` with an explicit title and priority.
    ///
    /// All four failure classes (transport error, non-200 status,
    /// event-log failure, memory-hint trouble) are contained here; the
    /// caller only ever sees `true` or `false`.
    pub fn send_with(
        &self,
        http: &mut impl HttpPort,
        events: &mut impl EventLogPort,
        message: &str,
        title: &str,
        priority: Priority,
    ) -> bool {
        mem::pre_request_hint();
        let headers = [
            ("Title", title),
            ("Priority", priority.as_str()),
            ("Tags", NOTIFY_TAGS),
        ];
        let result = http.post(&self.endpoint, message.as_bytes(), &headers);
        mem::post_request_hint();

        match result {
            Ok(200) => true,
            Ok(status) => {
                warn!("notify: relay answered HTTP {} for '{}'", status, title);
                let _ = events.log_event(
                    EventSeverity::Error,
                    &format!("Notification failed: HTTP {status}"),
                );
                false
            }
            Err(e) => {
                let text = e.to_string();
                warn!("notify: send failed: {}", text);
                if is_memory_pressure(&text) {
                    let _ = events.log_event(EventSeverity::Error, MEMORY_ERROR_EVENT);
                } else {
                    let _ = events.log_event(
                        EventSeverity::Error,
                        &format!("Notification failed: {text}"),
                    );
                }
                false
            }
        }
    }

    /// Post-feed confirmation, e.g. `send_feeding_notification("08:00")`.
    pub fn send_feeding_notification(
        &self,
        http: &mut impl HttpPort,
        events: &mut impl EventLogPort,
        time_str: &str,
    ) -> bool {
        let message = format!("Fish fed successfully at {time_str}");
        self.send_with(
            http,
            events,
            &message,
            TITLE_FEEDING_COMPLETE,
            Priority::Default,
        )
    }

    /// Malfunction report, raised one priority step above default.
    pub fn send_error_notification(
        &self,
        http: &mut impl HttpPort,
        events: &mut impl EventLogPort,
        error: &str,
    ) -> bool {
        let message = format!("Feeding error: {error}");
        self.send_with(http, events, &message, TITLE_FEEDER_ERROR, Priority::High)
    }
}

// ───────────────────────────────────────────────────────────────
// Module-level sender
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget notification without constructing a [`Notifier`].
///
/// Resolves the topic from `config` at call time (never cached), falling
/// back to the built-in placeholder when no configuration or topic is
/// available. `http = None` means the runtime has no transport at all;
/// the call logs a line and returns without touching the network.
/// Swallows every failure — callers get no success indication.
pub fn send_notification<H: HttpPort, L: EventLogPort>(
    http: Option<&mut H>,
    events: &mut L,
    config: Option<&FeederConfig>,
    message: &str,
) {
    let Some(http) = http else {
        warn!("notify: no HTTP transport available, skipping notification");
        return;
    };

    let server = config.map_or(DEFAULT_NTFY_SERVER, |c| c.ntfy_server.as_str());
    let topic = config
        .and_then(|c| c.ntfy_topic.as_deref())
        .unwrap_or(DEFAULT_NTFY_TOPIC);
    let url = join_endpoint(server, topic);

    mem::pre_request_hint();
    let result = http.post(&url, message.as_bytes(), &[("Title", TITLE_AUTO_FEEDER)]);
    mem::post_request_hint();

    match result {
        Ok(200) => info!("notify: sent '{}'", message),
        Ok(status) => {
            warn!("notify: relay answered HTTP {}", status);
            let _ = events.log_event(
                EventSeverity::Error,
                &format!("Notification failed: HTTP {status}"),
            );
        }
        Err(e) => {
            let text = e.to_string();
            warn!("notify: send failed: {}", text);
            if is_memory_pressure(&text) {
                let _ = events.log_event(EventSeverity::Error, MEMORY_ERROR_EVENT);
            } else {
                let _ = events.log_event(
                    EventSeverity::Error,
                    &format!("Notification failed: {text}"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::{EventLogError, HttpError};

    struct FakeHttp {
        result: Result<u16, HttpError>,
        last_url: Option<String>,
        last_body: Option<Vec<u8>>,
        last_headers: Vec<(String, String)>,
        calls: usize,
    }

    impl FakeHttp {
        fn with_status(status: u16) -> Self {
            Self {
                result: Ok(status),
                last_url: None,
                last_body: None,
                last_headers: Vec::new(),
                calls: 0,
            }
        }

        fn failing(err: HttpError) -> Self {
            Self {
                result: Err(err),
                last_url: None,
                last_body: None,
                last_headers: Vec::new(),
                calls: 0,
            }
        }

        fn header(&self, name: &str) -> Option<&str> {
            self.last_headers
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        }
    }

    impl HttpPort for FakeHttp {
        fn post(
            &mut self,
            url: &str,
            body: &[u8],
            headers: &[(&str, &str)],
        ) -> Result<u16, HttpError> {
            self.calls += 1;
            self.last_url = Some(url.to_string());
            self.last_body = Some(body.to_vec());
            self.last_headers = headers
                .iter()
                .map(|(n, v)| ((*n).to_string(), (*v).to_string()))
                .collect();
            self.result.clone()
        }
    }

    #[derive(Default)]
    struct FakeEvents {
        entries: Vec<(EventSeverity, String)>,
        fail: bool,
    }

    impl EventLogPort for FakeEvents {
        fn log_event(
            &mut self,
            severity: EventSeverity,
            message: &str,
        ) -> Result<(), EventLogError> {
            if self.fail {
                return Err(EventLogError::IoError);
            }
            self.entries.push((severity, message.to_string()));
            Ok(())
        }
    }

    #[test]
    fn endpoint_strips_trailing_slashes() {
        let n = Notifier::new("https://ntfy.sh/", "feeder");
        assert_eq!(n.endpoint(), "https://ntfy.sh/feeder");
        let n = Notifier::new("https://ntfy.sh///", "feeder");
        assert_eq!(n.endpoint(), "https://ntfy.sh/feeder");
        let n = Notifier::new("https://ntfy.sh", "feeder");
        assert_eq!(n.endpoint(), "https://ntfy.sh/feeder");
        assert_eq!(n.server(), "https://ntfy.sh");
        assert_eq!(n.topic(), "feeder");
    }

    #[test]
    fn send_true_only_on_200() {
        let n = Notifier::new("https://ntfy.sh", "t");
        let mut events = FakeEvents::default();

        let mut ok = FakeHttp::with_status(200);
        assert!(n.send(&mut ok, &mut events, "hello"));
        assert_eq!(ok.calls, 1);
        assert!(events.entries.is_empty());

        for status in [201, 301, 404, 500] {
            let mut http = FakeHttp::with_status(status);
            assert!(!n.send(&mut http, &mut events, "hello"));
        }
        assert_eq!(events.entries.len(), 4);
    }

    #[test]
    fn send_uses_default_title_priority_and_tags() {
        let n = Notifier::new("https://ntfy.sh", "t");
        let mut http = FakeHttp::with_status(200);
        let mut events = FakeEvents::default();
        n.send(&mut http, &mut events, "hello fish");

        assert_eq!(http.last_url.as_deref(), Some("https://ntfy.sh/t"));
        assert_eq!(http.last_body.as_deref(), Some(b"hello fish".as_slice()));
        assert_eq!(http.header("Title"), Some(TITLE_DEFAULT));
        assert_eq!(http.header("Priority"), Some("3"));
        assert_eq!(http.header("Tags"), Some(NOTIFY_TAGS));
    }

    #[test]
    fn transport_error_returns_false_and_logs() {
        let n = Notifier::new("https://ntfy.sh", "t");
        let mut http = FakeHttp::failing(HttpError::Connect);
        let mut events = FakeEvents::default();

        assert!(!n.send(&mut http, &mut events, "hello"));
        assert_eq!(events.entries.len(), 1);
        assert_eq!(events.entries[0].0, EventSeverity::Error);
        assert!(events.entries[0].1.contains("connect failed"));
    }

    #[test]
    fn memory_errors_log_generic_message() {
        let n = Notifier::new("https://ntfy.sh", "t");
        let mut events = FakeEvents::default();

        let mut oom = FakeHttp::failing(HttpError::OutOfMemory);
        assert!(!n.send(&mut oom, &mut events, "x"));

        let mut platform = FakeHttp::failing(HttpError::Platform(
            heapless::String::try_from("MemoryError: alloc of 32k failed").unwrap(),
        ));
        assert!(!n.send(&mut platform, &mut events, "x"));

        assert_eq!(events.entries.len(), 2);
        for (_, msg) in &events.entries {
            assert_eq!(msg, MEMORY_ERROR_EVENT);
        }
    }

    #[test]
    fn event_log_failure_does_not_propagate() {
        let n = Notifier::new("https://ntfy.sh", "t");
        let mut http = FakeHttp::failing(HttpError::Response);
        let mut events = FakeEvents {
            fail: true,
            ..Default::default()
        };
        assert!(!n.send(&mut http, &mut events, "hello"));
    }

    #[test]
    fn feeding_notification_message_and_title() {
        let n = Notifier::new("https://ntfy.sh", "t");
        let mut http = FakeHttp::with_status(200);
        let mut events = FakeEvents::default();

        assert!(n.send_feeding_notification(&mut http, &mut events, "08:00"));
        assert_eq!(
            http.last_body.as_deref(),
            Some(b"Fish fed successfully at 08:00".as_slice())
        );
        assert_eq!(http.header("Title"), Some(TITLE_FEEDING_COMPLETE));
        assert_eq!(http.header("Priority"), Some("3"));
    }

    #[test]
    fn error_notification_message_and_priority() {
        let n = Notifier::new("https://ntfy.sh", "t");
        let mut http = FakeHttp::with_status(200);
        let mut events = FakeEvents::default();

        assert!(n.send_error_notification(&mut http, &mut events, "jam"));
        assert_eq!(
            http.last_body.as_deref(),
            Some(b"Feeding error: jam".as_slice())
        );
        assert_eq!(http.header("Title"), Some(TITLE_FEEDER_ERROR));
        assert_eq!(http.header("Priority"), Some("4"));
    }

    #[test]
    fn priority_clamps_raw_levels() {
        assert_eq!(Priority::from_level(0), Priority::Min);
        assert_eq!(Priority::from_level(3), Priority::Default);
        assert_eq!(Priority::from_level(9), Priority::Max);
        assert_eq!(Priority::default().as_str(), "3");
    }

    #[test]
    fn free_function_uses_config_topic() {
        let cfg = FeederConfig {
            ntfy_topic: Some("X".to_string()),
            ..Default::default()
        };
        let mut http = FakeHttp::with_status(200);
        let mut events = FakeEvents::default();
        send_notification(Some(&mut http), &mut events, Some(&cfg), "fed");

        assert_eq!(http.last_url.as_deref(), Some("https://ntfy.sh/X"));
        assert_eq!(http.header("Title"), Some(TITLE_AUTO_FEEDER));
        assert_eq!(http.header("Priority"), None);
    }

    #[test]
    fn free_function_defaults_without_config() {
        let mut http = FakeHttp::with_status(200);
        let mut events = FakeEvents::default();
        send_notification(Some(&mut http), &mut events, None, "fed");
        assert_eq!(
            http.last_url.as_deref(),
            Some(format!("{DEFAULT_NTFY_SERVER}/{DEFAULT_NTFY_TOPIC}").as_str())
        );

        // Config present but topic unset: same fallback.
        let cfg = FeederConfig::default();
        send_notification(Some(&mut http), &mut events, Some(&cfg), "fed");
        assert!(http.last_url.unwrap().ends_with(DEFAULT_NTFY_TOPIC));
    }

    #[test]
    fn free_function_without_transport_is_a_noop() {
        let mut events = FakeEvents::default();
        send_notification(None::<&mut FakeHttp>, &mut events, None, "fed");
        assert!(events.entries.is_empty());
    }

    #[test]
    fn free_function_swallows_transport_errors() {
        let mut http = FakeHttp::failing(HttpError::Connect);
        let mut events = FakeEvents::default();
        send_notification(Some(&mut http), &mut events, None, "fed");
        assert_eq!(events.entries.len(), 1);
        assert!(events.entries[0].1.starts_with("Notification failed:"));
    }
}
