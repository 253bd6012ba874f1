use serde::{Deserialize, Serialize};

use crate::configs::*;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub spoof: SpoofConfig,
    #[serde(default)]
    pub device: DeviceConfig,
}

use crate::common::types::AnyResult;

impl Config {
    pub fn load() -> AnyResult<Self> {
        let config_path = if std::path::Path::new("config.toml").exists() {
            "config.toml"
        } else if std::path::Path::new("config.default.toml").exists() {
            "config.default.toml"
        } else {
            return Err("config.toml or config.default.toml not found".into());
        };

        println!("Loading configuration from: {}", config_path);

        let config_str = std::fs::read_to_string(config_path)?;
        Self::parse(&config_str).map_err(|e| format!("{}: {}", config_path, e).into())
    }

    pub fn parse(raw: &str) -> AnyResult<Self> {
        if raw.trim().is_empty() {
            return Err("configuration is empty".into());
        }
        Ok(toml::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_applies_defaults() {
        let config = Config::parse(
            r#"
            [server]
            password = "secret"
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.server.password, "secret");
        assert_eq!(config.server.port, 2444);
        assert_eq!(config.spoof.fetch_timeout_ms, 20_000);
        assert_eq!(config.spoof.innertube_api, "https://youtubei.googleapis.com");
        assert!(!config.device.hardware_vp9);
        assert!(config.logging.is_none());
    }

    #[test]
    fn test_parse_full_sections() {
        let config = Config::parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            password = "pw"

            [logging]
            level = "debug"

            [logging.file]
            path = "logs/ytspoof.log"

            [spoof]
            settings_path = "settings.toml"
            fetch_timeout_ms = 500

            [device]
            hardware_vp9 = true
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.spoof.settings_path.as_deref(), Some("settings.toml"));
        assert_eq!(config.spoof.fetch_timeout().as_millis(), 500);
        assert!(config.device.hardware_vp9);
        let file = config.logging.and_then(|l| l.file).expect("file section");
        assert_eq!(file.max_lines, 10_000);
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(Config::parse("   \n").is_err());
    }
}
