use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::common::types::AnyResult;

/// A persisted setting value. Settings are either flags or strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Str(String),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Bool(_) => None,
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Every key the patches read, each with a fixed default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setting {
    SpoofClient,
    SpoofClientGeneral,
    SpoofClientShorts,
    SpoofClientLivestream,
    SpoofClientFallback,
    SpoofClientIosHistoryFix,
    SpoofClientStatsForNerds,
    SpoofStreamingDataIosForceAvc,
    EnableSeekbarTapping,
    HideTimeAndSeekbar,
    HideSeekbarThumbnail,
    EnableCustomSeekbarColor,
    CustomSeekbarColorValue,
    IgnoreCheckWatchHistoryDomainName,
}

impl Setting {
    pub const ALL: &'static [Setting] = &[
        Setting::SpoofClient,
        Setting::SpoofClientGeneral,
        Setting::SpoofClientShorts,
        Setting::SpoofClientLivestream,
        Setting::SpoofClientFallback,
        Setting::SpoofClientIosHistoryFix,
        Setting::SpoofClientStatsForNerds,
        Setting::SpoofStreamingDataIosForceAvc,
        Setting::EnableSeekbarTapping,
        Setting::HideTimeAndSeekbar,
        Setting::HideSeekbarThumbnail,
        Setting::EnableCustomSeekbarColor,
        Setting::CustomSeekbarColorValue,
        Setting::IgnoreCheckWatchHistoryDomainName,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::SpoofClient => "spoof_client",
            Self::SpoofClientGeneral => "spoof_client_general",
            Self::SpoofClientShorts => "spoof_client_shorts",
            Self::SpoofClientLivestream => "spoof_client_livestream",
            Self::SpoofClientFallback => "spoof_client_fallback",
            Self::SpoofClientIosHistoryFix => "spoof_client_ios_history_fix",
            Self::SpoofClientStatsForNerds => "spoof_client_stats_for_nerds",
            Self::SpoofStreamingDataIosForceAvc => "spoof_streaming_data_ios_force_avc",
            Self::EnableSeekbarTapping => "enable_seekbar_tapping",
            Self::HideTimeAndSeekbar => "hide_time_and_seekbar",
            Self::HideSeekbarThumbnail => "hide_seekbar_thumbnail",
            Self::EnableCustomSeekbarColor => "enable_custom_seekbar_color",
            Self::CustomSeekbarColorValue => "custom_seekbar_color_value",
            Self::IgnoreCheckWatchHistoryDomainName => "ignore_check_watch_history_domain_name",
        }
    }

    pub fn default_value(self) -> SettingValue {
        match self {
            Self::SpoofClient => true.into(),
            Self::SpoofClientGeneral => "ANDROID_TESTSUITE".into(),
            Self::SpoofClientShorts => "IOS".into(),
            Self::SpoofClientLivestream => "ANDROID_VR".into(),
            Self::SpoofClientFallback => "ANDROID_UNPLUGGED".into(),
            Self::SpoofClientIosHistoryFix => true.into(),
            Self::SpoofClientStatsForNerds => true.into(),
            Self::SpoofStreamingDataIosForceAvc => false.into(),
            Self::EnableSeekbarTapping => true.into(),
            Self::HideTimeAndSeekbar => false.into(),
            Self::HideSeekbarThumbnail => false.into(),
            Self::EnableCustomSeekbarColor => false.into(),
            Self::CustomSeekbarColorValue => "#FF0000".into(),
            Self::IgnoreCheckWatchHistoryDomainName => false.into(),
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.key() == key)
    }
}

/// Key-value store the patches read their configuration from.
pub trait SettingsStore: Send + Sync {
    fn get_bool(&self, setting: Setting) -> bool;
    fn get_string(&self, setting: Setting) -> String;
    fn save_value(&self, setting: Setting, value: SettingValue);
}

/// In-memory settings, optionally mirrored to a TOML file on every write.
pub struct Settings {
    values: RwLock<HashMap<Setting, SettingValue>>,
    path: Option<PathBuf>,
}

impl Settings {
    pub fn in_memory() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            path: None,
        }
    }

    /// Loads stored values from `path`. A missing file yields an empty store
    /// that will be created on the first write.
    pub fn load(path: impl AsRef<Path>) -> AnyResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut values = HashMap::new();

        if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            let stored: BTreeMap<String, SettingValue> = toml::from_str(&raw)?;
            for (key, value) in stored {
                match Setting::from_key(&key) {
                    Some(setting) => {
                        values.insert(setting, value);
                    }
                    None => warn!("Ignoring unknown setting '{}' in {}", key, path.display()),
                }
            }
            debug!("Loaded {} settings from {}", values.len(), path.display());
        }

        Ok(Self {
            values: RwLock::new(values),
            path: Some(path),
        })
    }

    fn get(&self, setting: Setting) -> SettingValue {
        self.values
            .read()
            .get(&setting)
            .cloned()
            .unwrap_or_else(|| setting.default_value())
    }

    fn persist(&self, values: &HashMap<Setting, SettingValue>) -> AnyResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let ordered: BTreeMap<&str, &SettingValue> =
            values.iter().map(|(s, v)| (s.key(), v)).collect();
        let raw = toml::to_string(&ordered)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, raw)?;
        Ok(())
    }
}

impl SettingsStore for Settings {
    fn get_bool(&self, setting: Setting) -> bool {
        let value = self.get(setting);
        value.as_bool().unwrap_or_else(|| {
            warn!("Setting '{}' is not a boolean: {:?}", setting.key(), value);
            setting.default_value().as_bool().unwrap_or(false)
        })
    }

    fn get_string(&self, setting: Setting) -> String {
        match self.get(setting) {
            SettingValue::Str(s) => s,
            other => {
                warn!("Setting '{}' is not a string: {:?}", setting.key(), other);
                setting
                    .default_value()
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_default()
            }
        }
    }

    fn save_value(&self, setting: Setting, value: SettingValue) {
        let mut values = self.values.write();
        values.insert(setting, value);
        if let Err(e) = self.persist(&values) {
            warn!("Failed to persist setting '{}': {}", setting.key(), e);
        }
    }
}
