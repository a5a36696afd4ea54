//! Intel engine configuration
//!
//! Loaded from TOML. The engine reads it through a [`SharedConfig`] on every
//! submission, so edits take effect without a restart.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::DEFAULT_INTEL_EXPIRE_SECS;

/// Configuration shared live between the engine and whoever edits it
pub type SharedConfig = Arc<RwLock<IntelConfig>>;

/// Errors from configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// A monitored intel channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntelChannel {
    pub name: String,
    /// Region the channel covers, used by the tokenizer to prefer local systems
    #[serde(default)]
    pub region: Option<String>,
}

/// Remote d-scan service settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSettings {
    #[serde(default = "default_scan_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_adashboard_base")]
    pub adashboard_base: String,
    #[serde(default = "default_dscan_info_base")]
    pub dscan_info_base: String,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_scan_timeout(),
            adashboard_base: default_adashboard_base(),
            dscan_info_base: default_dscan_info_base(),
        }
    }
}

fn default_scan_timeout() -> u64 {
    15
}

fn default_adashboard_base() -> String {
    "https://adashboard.info".to_string()
}

fn default_dscan_info_base() -> String {
    "https://dscan.info".to_string()
}

fn default_expire_secs() -> u64 {
    DEFAULT_INTEL_EXPIRE_SECS
}

fn default_compaction_windows() -> u32 {
    4
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntelConfig {
    #[serde(default)]
    pub intel_channels: Vec<IntelChannel>,

    /// How long an entity stays visible after it was reported
    #[serde(default = "default_expire_secs")]
    pub intel_expire_secs: u64,

    /// Raw entries older than this many expiry windows are compacted away (0 = never)
    #[serde(default = "default_compaction_windows")]
    pub compaction_windows: u32,

    #[serde(default)]
    pub scan: ScanSettings,
}

impl Default for IntelConfig {
    fn default() -> Self {
        Self {
            intel_channels: Vec::new(),
            intel_expire_secs: default_expire_secs(),
            compaction_windows: default_compaction_windows(),
            scan: ScanSettings::default(),
        }
    }
}

impl IntelConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: IntelConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.intel_expire_secs == 0 {
            return Err(ConfigError::Invalid(
                "intel_expire_secs must be positive".to_string(),
            ));
        }
        if let Some(channel) = self.intel_channels.iter().find(|c| c.name.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "intel channel with empty name (region {:?})",
                channel.region
            )));
        }
        Ok(())
    }

    pub fn with_channel(mut self, name: &str, region: Option<&str>) -> Self {
        self.intel_channels.push(IntelChannel {
            name: name.to_string(),
            region: region.map(str::to_string),
        });
        self
    }

    pub fn with_expire_secs(mut self, secs: u64) -> Self {
        self.intel_expire_secs = secs;
        self
    }

    pub fn is_intel_channel(&self, channel: &str) -> bool {
        self.intel_channels.iter().any(|c| c.name == channel)
    }

    pub fn region_for(&self, channel: &str) -> Option<&str> {
        self.intel_channels
            .iter()
            .find(|c| c.name == channel)
            .and_then(|c| c.region.as_deref())
    }

    pub fn intel_expiry(&self) -> Duration {
        Duration::from_secs(self.intel_expire_secs)
    }

    /// Age beyond which raw entries may be dropped, if compaction is enabled
    pub fn compaction_age(&self) -> Option<Duration> {
        if self.compaction_windows == 0 {
            None
        } else {
            Some(self.intel_expiry() * self.compaction_windows)
        }
    }

    pub fn into_shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = IntelConfig::default();
        assert_eq!(config.intel_expire_secs, 300);
        assert_eq!(config.scan.timeout_secs, 15);
        assert!(config.intel_channels.is_empty());
        assert_eq!(config.compaction_age(), Some(Duration::from_secs(1200)));
    }

    #[test]
    fn test_parse_toml() {
        let config = IntelConfig::from_toml_str(
            r#"
            intel_expire_secs = 120
            compaction_windows = 0

            [[intel_channels]]
            name = "delve.imperium"
            region = "Delve"

            [[intel_channels]]
            name = "querious.imperium"
            "#,
        )
        .unwrap();

        assert_eq!(config.intel_expire_secs, 120);
        assert!(config.is_intel_channel("delve.imperium"));
        assert!(!config.is_intel_channel("local"));
        assert_eq!(config.region_for("delve.imperium"), Some("Delve"));
        assert_eq!(config.region_for("querious.imperium"), None);
        assert_eq!(config.compaction_age(), None);
        assert_eq!(config.scan.adashboard_base, "https://adashboard.info");
    }

    #[test]
    fn test_rejects_zero_expiry() {
        let result = IntelConfig::from_toml_str("intel_expire_secs = 0");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_blank_channel() {
        let result = IntelConfig::from_toml_str(
            r#"
            [[intel_channels]]
            name = "  "
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[intel_channels]]\nname = \"intel\"").unwrap();

        let config = IntelConfig::load(file.path()).unwrap();
        assert!(config.is_intel_channel("intel"));
    }

    #[test]
    fn test_shared_config_is_live() {
        let shared = IntelConfig::default().into_shared();
        assert!(!shared.read().is_intel_channel("intel"));

        shared.write().intel_channels.push(IntelChannel {
            name: "intel".to_string(),
            region: None,
        });
        assert!(shared.read().is_intel_channel("intel"));
    }
}
