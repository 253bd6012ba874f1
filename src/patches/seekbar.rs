use std::sync::Arc;

use thiserror::Error;

use crate::{
    common::Notifier,
    settings::{Setting, SettingsStore},
};

/// The stock seekbar red, as ARGB.
pub const ORIGINAL_SEEKBAR_COLOR: u32 = 0xFFFF_0000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("invalid color '{0}'")]
    Invalid(String),
}

const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0xFF00_0000),
    ("darkgray", 0xFF44_4444),
    ("darkgrey", 0xFF44_4444),
    ("gray", 0xFF88_8888),
    ("grey", 0xFF88_8888),
    ("lightgray", 0xFFCC_CCCC),
    ("lightgrey", 0xFFCC_CCCC),
    ("white", 0xFFFF_FFFF),
    ("red", 0xFFFF_0000),
    ("green", 0xFF00_FF00),
    ("blue", 0xFF00_00FF),
    ("yellow", 0xFFFF_FF00),
    ("cyan", 0xFF00_FFFF),
    ("magenta", 0xFFFF_00FF),
    ("aqua", 0xFF00_FFFF),
    ("fuchsia", 0xFFFF_00FF),
    ("lime", 0xFF00_FF00),
    ("maroon", 0xFF80_0000),
    ("navy", 0xFF00_0080),
    ("olive", 0xFF80_8000),
    ("purple", 0xFF80_0080),
    ("silver", 0xFFC0_C0C0),
    ("teal", 0xFF00_8080),
];

/// Parses `#RRGGBB`, `#AARRGGBB` or a color name into ARGB.
pub fn parse_color(value: &str) -> Result<u32, ColorError> {
    let invalid = || ColorError::Invalid(value.to_string());

    if let Some(hex) = value.strip_prefix('#') {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let parsed = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
        return match hex.len() {
            6 => Ok(0xFF00_0000 | parsed),
            8 => Ok(parsed),
            _ => Err(invalid()),
        };
    }

    let name = value.to_ascii_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, c)| *c)
        .ok_or_else(invalid)
}

pub struct SeekbarLayout {
    settings: Arc<dyn SettingsStore>,
    notifier: Arc<dyn Notifier>,
}

impl SeekbarLayout {
    pub fn new(settings: Arc<dyn SettingsStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { settings, notifier }
    }

    pub fn enable_seekbar_tapping(&self) -> bool {
        self.settings.get_bool(Setting::EnableSeekbarTapping)
    }

    pub fn hide_time_and_seekbar(&self) -> bool {
        self.settings.get_bool(Setting::HideTimeAndSeekbar)
    }

    /// Thumbnail seekbar color. Only the stock red is replaced.
    pub fn get_color(&self, color: u32) -> u32 {
        if color != ORIGINAL_SEEKBAR_COLOR {
            return color;
        }
        if self.settings.get_bool(Setting::HideSeekbarThumbnail) {
            return 0x0000_0000;
        }
        self.override_seekbar_color(ORIGINAL_SEEKBAR_COLOR)
    }

    pub fn override_seekbar_color(&self, color: u32) -> u32 {
        if !self.settings.get_bool(Setting::EnableCustomSeekbarColor) {
            return color;
        }
        match parse_color(&self.settings.get_string(Setting::CustomSeekbarColorValue)) {
            Ok(custom) => custom,
            Err(_) => {
                self.notifier.toast("color_invalid");
                color
            }
        }
    }
}
