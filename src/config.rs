//! Notification configuration.
//!
//! Tunable parameters for the feeder's push-notification subsystem.
//! Values can be overridden via NVS; a missing or unreadable blob falls
//! back to the built-in defaults so the notifier works on first boot.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{StorageError, StoragePort};

/// Default push-relay base URL.
pub const DEFAULT_NTFY_SERVER: &str = "https://ntfy.sh";

/// Placeholder topic used when no configuration is available.
/// Real deployments provision a device-unique topic.
pub const DEFAULT_NTFY_TOPIC: &str = "FF0x98854";

const CONFIG_NAMESPACE: &str = "feeder";
const CONFIG_KEY: &str = "notifycfg";
const CONFIG_BUF_SIZE: usize = 256;

/// Notification subsystem configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeederConfig {
    /// Push-relay base URL (trailing slashes are tolerated).
    pub ntfy_server: String,
    /// Device-unique subscriber topic. `None` falls back to
    /// [`DEFAULT_NTFY_TOPIC`].
    pub ntfy_topic: Option<String>,
}

impl Default for FeederConfig {
    fn default() -> Self {
        Self {
            ntfy_server: DEFAULT_NTFY_SERVER.to_string(),
            ntfy_topic: None,
        }
    }
}

impl FeederConfig {
    /// The effective topic: the provisioned one, or the placeholder.
    pub fn topic(&self) -> &str {
        self.ntfy_topic.as_deref().unwrap_or(DEFAULT_NTFY_TOPIC)
    }
}

/// Load the notification config from storage, falling back to defaults
/// on a missing or corrupted blob. Never fails — the notifier must come
/// up even when flash is in a bad state.
pub fn load_config(store: &impl StoragePort) -> FeederConfig {
    let mut buf = [0u8; CONFIG_BUF_SIZE];
    match store.read(CONFIG_NAMESPACE, CONFIG_KEY, &mut buf) {
        Ok(len) => match postcard::from_bytes::<FeederConfig>(&buf[..len]) {
            Ok(cfg) => {
                info!("config: loaded from storage ({} bytes)", len);
                cfg
            }
            Err(_) => {
                warn!("config: stored blob corrupted, using defaults");
                FeederConfig::default()
            }
        },
        Err(StorageError::NotFound) => {
            info!("config: no stored config, using defaults");
            FeederConfig::default()
        }
        Err(e) => {
            warn!("config: storage read error ({}), using defaults", e);
            FeederConfig::default()
        }
    }
}

/// Persist the notification config.
pub fn save_config(
    store: &mut impl StoragePort,
    config: &FeederConfig,
) -> Result<(), StorageError> {
    let bytes = postcard::to_allocvec(config).map_err(|_| StorageError::IoError)?;
    store.write(CONFIG_NAMESPACE, CONFIG_KEY, &bytes)?;
    info!("config: saved ({} bytes)", bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

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

    #[test]
    fn default_config_is_sane() {
        let c = FeederConfig::default();
        assert_eq!(c.ntfy_server, "https://ntfy.sh");
        assert!(c.ntfy_topic.is_none());
        assert_eq!(c.topic(), DEFAULT_NTFY_TOPIC);
    }

    #[test]
    fn provisioned_topic_wins() {
        let c = FeederConfig {
            ntfy_topic: Some("tank-42".to_string()),
            ..Default::default()
        };
        assert_eq!(c.topic(), "tank-42");
    }

    #[test]
    fn serde_roundtrip() {
        let c = FeederConfig {
            ntfy_server: "https://push.example.org".to_string(),
            ntfy_topic: Some("feeder-a".to_string()),
        };
        let json = serde_json::to_string(&c).unwrap();
        let c2: FeederConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c, c2);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = FeederConfig {
            ntfy_topic: Some("feeder-b".to_string()),
            ..Default::default()
        };
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: FeederConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c, c2);
    }

    #[test]
    fn load_missing_returns_defaults() {
        let store = MemStore(HashMap::new());
        assert_eq!(load_config(&store), FeederConfig::default());
    }

    #[test]
    fn save_then_load_roundtrip() {
        let mut store = MemStore(HashMap::new());
        let c = FeederConfig {
            ntfy_topic: Some("persisted".to_string()),
            ..Default::default()
        };
        save_config(&mut store, &c).unwrap();
        assert_eq!(load_config(&store), c);
    }

    #[test]
    fn corrupted_blob_falls_back_to_defaults() {
        let mut store = MemStore(HashMap::new());
        store
            .write(CONFIG_NAMESPACE, CONFIG_KEY, &[0xFF; 40])
            .unwrap();
        assert_eq!(load_config(&store), FeederConfig::default());
    }
}
