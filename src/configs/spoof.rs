use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SpoofConfig {
    /// TOML file backing the settings store. In-memory only when unset.
    pub settings_path: Option<String>,
    /// Upper bound for the blocking renderer wait on video load.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_innertube_api")]
    pub innertube_api: String,
}

fn default_fetch_timeout_ms() -> u64 {
    20_000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_innertube_api() -> String {
    "https://youtubei.googleapis.com".to_string()
}

impl SpoofConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for SpoofConfig {
    fn default() -> Self {
        Self {
            settings_path: None,
            fetch_timeout_ms: default_fetch_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            innertube_api: default_innertube_api(),
        }
    }
}

/// Hardware decoder capabilities, probed once by the host.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default)]
pub struct DeviceConfig {
    #[serde(default)]
    pub hardware_vp9: bool,
    #[serde(default)]
    pub hardware_av1: bool,
}
