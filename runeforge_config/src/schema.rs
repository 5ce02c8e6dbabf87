use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use runeforge_core::OverrideConfig;

const CONFIG_DIR: &str = "runeforge";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub overrides: OverrideConfig,
}

/// Where the build-evaluation service lives and how hard to try reaching it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    #[serde(default = "ServiceConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "ServiceConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    /// Pause before each catalog retry, in milliseconds.
    #[serde(default = "ServiceConfig::default_retry_delays_ms")]
    pub retry_delays_ms: Vec<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            timeout_secs: Self::default_timeout_secs(),
            retry_delays_ms: Self::default_retry_delays_ms(),
        }
    }
}

impl ServiceConfig {
    fn default_base_url() -> String {
        "http://127.0.0.1:5000".to_string()
    }

    const fn default_timeout_secs() -> u64 {
        30
    }

    fn default_retry_delays_ms() -> Vec<u64> {
        vec![250, 500, 1000]
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn retry_delays(&self) -> Vec<Duration> {
        self.retry_delays_ms
            .iter()
            .copied()
            .map(Duration::from_millis)
            .collect()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    #[serde(default = "RelayConfig::default_debounce_ms")]
    pub enchant_debounce_ms: u64,
    #[serde(default = "RelayConfig::default_enchant_limit")]
    pub enchant_limit: usize,
    #[serde(default = "RelayConfig::default_auto_impact")]
    pub auto_impact: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            enchant_debounce_ms: Self::default_debounce_ms(),
            enchant_limit: Self::default_enchant_limit(),
            auto_impact: Self::default_auto_impact(),
        }
    }
}

impl RelayConfig {
    const fn default_debounce_ms() -> u64 {
        200
    }

    const fn default_enchant_limit() -> usize {
        25
    }

    const fn default_auto_impact() -> bool {
        true
    }

    #[must_use]
    pub const fn enchant_debounce(&self) -> Duration {
        Duration::from_millis(self.enchant_debounce_ms)
    }
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'runeforge init' to create config.",
                config_path.display()
            );
        }

        Self::load_from(&config_path)
    }

    /// Read a config file, repairing an override record with both fill modes on.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&content)?;
        config.overrides = config.overrides.normalized();
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        Self::ensure_config_dir()?;
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    /// Write the starter config to `path`, refusing to clobber an existing file.
    pub fn write_template(path: &Path) -> anyhow::Result<()> {
        if path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                path.display()
            );
        }

        let config_template = r#"{
  "service": {
    "base_url": "http://127.0.0.1:5000",
    "timeout_secs": 30,
    "retry_delays_ms": [250, 500, 1000]
  },
  "relay": {
    "enchant_debounce_ms": 200,
    "enchant_limit": 25,
    "auto_impact": true
  },
  "overrides": {
    "uniform_enabled": false,
    "per_socket_enabled": false,
    "rune_line": "",
    "per_socket": ["", "", "", "", "", ""],
    "pad_sockets": false,
    "enchant_enabled": false,
    "enchant_text": "",
    "enchant_id": "",
    "enchant_recent": [],
    "last_bucket_key": ""
  }
}"#;

        std::fs::write(path, config_template)?;
        Ok(())
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join(CONFIG_FILE);

        Self::write_template(&config_path)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Start the build service and check it with 'runeforge info'");
        println!("   2. Load your build with 'runeforge load-build <path>'");
        println!("   3. Pick runes with 'runeforge set' and try 'runeforge transform <item.txt>'");
        println!();
        println!("🔧 Configuration options:");
        println!("   - service.base_url: where the build service listens");
        println!("   - relay.enchant_debounce_ms: quiet time before an enchant search fires");
        println!("   - overrides: rune, socket and enchant policy (edit with 'runeforge set')");
        println!();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runeforge_core::ConfigUpdate;

    #[test]
    fn template_matches_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        Config::write_template(&path).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(Config::write_template(&path).is_err());
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"service": {"base_url": "http://10.0.0.2:5000"}}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.service.base_url, "http://10.0.0.2:5000");
        assert_eq!(config.service.timeout(), Duration::from_secs(30));
        assert_eq!(config.relay.enchant_debounce(), Duration::from_millis(200));
        assert!(config.relay.auto_impact);
        assert_eq!(config.overrides, OverrideConfig::default());
    }

    #[test]
    fn conflicting_fill_modes_are_repaired_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            r#"{"overrides": {"uniform_enabled": true, "per_socket_enabled": true}}"#,
        )
        .unwrap();

        let overrides = Config::load_from(&path).unwrap().overrides;
        assert!(overrides.uniform_enabled());
        assert!(!overrides.per_socket_enabled());
    }

    #[test]
    fn save_then_load_keeps_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut config = Config::default();
        config
            .overrides
            .apply(ConfigUpdate::PerSocketEnabled(true))
            .unwrap();
        config
            .overrides
            .apply(ConfigUpdate::SocketRune {
                index: 2,
                text: "Glacial Rune".into(),
            })
            .unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.overrides.per_socket()[2], "Glacial Rune");
    }

    #[test]
    fn retry_delays_are_millis() {
        let service = ServiceConfig {
            retry_delays_ms: vec![5, 10],
            ..ServiceConfig::default()
        };
        assert_eq!(
            service.retry_delays(),
            [Duration::from_millis(5), Duration::from_millis(10)]
        );
    }
}
