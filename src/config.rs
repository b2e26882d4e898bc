use crate::error::ProxyError;
use crate::sanitize::SanitizePolicy;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DISCOVERY_PATH: &str = "/.well-known/core";

fn default_discovery_path() -> String {
    DEFAULT_DISCOVERY_PATH.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Local path answered by the discovery responder instead of being
    /// proxied, unless a resource is registered there.
    #[serde(default = "default_discovery_path")]
    pub discovery_path: String,
    /// Replay the Observe option downstream instead of stripping it.
    #[serde(default)]
    pub forward_observe: bool,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub log_format: Option<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            discovery_path: default_discovery_path(),
            forward_observe: false,
            log_level: None,
            log_format: None,
        }
    }
}

impl BridgeConfig {
    pub fn from_file(path: &str) -> Result<Self, ProxyError> {
        let content = std::fs::read_to_string(path)?;
        let config: BridgeConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> Result<(), ProxyError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn sanitize_policy(&self) -> SanitizePolicy {
        SanitizePolicy { forward_observe: self.forward_observe }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.discovery_path, "/.well-known/core");
        assert!(!config.forward_observe);
        assert!(!config.sanitize_policy().forward_observe);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: BridgeConfig = serde_json::from_str(r#"{"forward_observe": true}"#).unwrap();
        assert!(config.forward_observe);
        assert_eq!(config.discovery_path, "/.well-known/core");
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.json");
        let path = path.to_str().unwrap();

        let mut config = BridgeConfig::default();
        config.forward_observe = true;
        config.log_level = Some("debug".to_string());
        config.to_file(path).unwrap();

        let loaded = BridgeConfig::from_file(path).unwrap();
        assert!(loaded.forward_observe);
        assert_eq!(loaded.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            BridgeConfig::from_file("/nonexistent/bridge.json"),
            Err(ProxyError::Io(_))
        ));
    }
}
