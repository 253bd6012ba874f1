use std::sync::Arc;

use tracing::debug;

use crate::{
    configs::DeviceConfig,
    settings::{Setting, SettingsStore},
};

/// Which codecs the spoofed streams may use on this device.
pub struct CodecPolicy {
    device: DeviceConfig,
    settings: Arc<dyn SettingsStore>,
}

impl CodecPolicy {
    pub fn new(device: DeviceConfig, settings: Arc<dyn SettingsStore>) -> Self {
        debug!(
            "Hardware decoding: VP9 {}, AV1 {}",
            if device.hardware_vp9 { "supported" } else { "unsupported" },
            if device.hardware_av1 { "supported" } else { "unsupported" }
        );
        Self { device, settings }
    }

    pub fn allow_vp9(&self) -> bool {
        self.device.hardware_vp9
            && !self
                .settings
                .get_bool(Setting::SpoofStreamingDataIosForceAvc)
    }

    pub fn allow_av1(&self) -> bool {
        self.allow_vp9() && self.device.hardware_av1
    }
}
