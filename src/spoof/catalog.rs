use std::{fmt, str::FromStr};

use serde::Serialize;
use tracing::warn;

use super::error::CatalogError;
use crate::settings::{Setting, SettingsStore};

/// Client identities the player can present itself as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientType {
    Android,
    Ios,
    AndroidUnplugged,
    AndroidVr,
    AndroidTestsuite,
}

/// Fields substituted into outbound requests for one client identity.
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    pub client_type: ClientType,
    /// InnerTube `X-YouTube-Client-Name` value.
    pub id: i32,
    pub client_name: &'static str,
    pub version: &'static str,
    pub model: &'static str,
    pub os_version: &'static str,
    pub user_agent: &'static str,
    pub friendly_name: &'static str,
}

static ANDROID: ClientProfile = ClientProfile {
    client_type: ClientType::Android,
    id: 3,
    client_name: "ANDROID",
    version: "19.09.37",
    model: "Pixel 8",
    os_version: "14",
    user_agent: "com.google.android.youtube/19.09.37 (Linux; U; Android 14) gzip",
    friendly_name: "Android",
};

static IOS: ClientProfile = ClientProfile {
    client_type: ClientType::Ios,
    id: 5,
    client_name: "IOS",
    version: "19.09.3",
    model: "iPhone14,5",
    os_version: "15.6",
    user_agent: "com.google.ios.youtube/19.09.3 (iPhone14,5; U; CPU iOS 15_6 like Mac OS X)",
    friendly_name: "iOS",
};

static ANDROID_UNPLUGGED: ClientProfile = ClientProfile {
    client_type: ClientType::AndroidUnplugged,
    id: 29,
    client_name: "ANDROID_UNPLUGGED",
    version: "8.12.0",
    model: "Google TV Streamer",
    os_version: "14",
    user_agent: "com.google.android.apps.youtube.unplugged/8.12.0 (Linux; U; Android 14; GB) gzip",
    friendly_name: "Android TV",
};

static ANDROID_VR: ClientProfile = ClientProfile {
    client_type: ClientType::AndroidVr,
    id: 28,
    client_name: "ANDROID_VR",
    version: "1.56.21",
    model: "Quest 3",
    os_version: "12",
    user_agent: "com.google.android.apps.youtube.vr.oculus/1.56.21 (Linux; U; Android 12; GB) gzip",
    friendly_name: "Android VR",
};

static ANDROID_TESTSUITE: ClientProfile = ClientProfile {
    client_type: ClientType::AndroidTestsuite,
    id: 30,
    client_name: "ANDROID_TESTSUITE",
    version: "1.9",
    model: "Pixel 8",
    os_version: "14",
    user_agent: "com.google.android.youtube/1.9 (Linux; U; Android 14) gzip",
    friendly_name: "Android Testsuite",
};

impl ClientType {
    pub const ALL: &'static [ClientType] = &[
        ClientType::Android,
        ClientType::Ios,
        ClientType::AndroidUnplugged,
        ClientType::AndroidVr,
        ClientType::AndroidTestsuite,
    ];

    pub fn profile(self) -> &'static ClientProfile {
        match self {
            Self::Android => &ANDROID,
            Self::Ios => &IOS,
            Self::AndroidUnplugged => &ANDROID_UNPLUGGED,
            Self::AndroidVr => &ANDROID_VR,
            Self::AndroidTestsuite => &ANDROID_TESTSUITE,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.profile().client_name
    }

    /// The only identity whose user agent replaces the app's own.
    pub fn carries_user_agent(self) -> bool {
        self == Self::Ios
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientType {
    type Err = CatalogError;

    /// Names are matched exactly, as stored in settings.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == name)
            .ok_or_else(|| CatalogError::UnknownProfile(name.to_string()))
    }
}

pub fn lookup(name: &str) -> Result<&'static ClientProfile, CatalogError> {
    name.parse::<ClientType>().map(ClientType::profile)
}

/// Resolves the profile named by `setting`. An unknown name resets the
/// setting to its default and returns the default profile.
pub fn resolve(settings: &dyn SettingsStore, setting: Setting) -> &'static ClientProfile {
    let name = settings.get_string(setting);
    match lookup(&name) {
        Ok(profile) => profile,
        Err(e) => {
            warn!("{} in '{}', resetting to default", e, setting.key());
            let default = setting.default_value();
            let profile = default
                .as_str()
                .and_then(|d| lookup(d).ok())
                .unwrap_or(&ANDROID_TESTSUITE);
            settings.save_value(setting, default);
            profile
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    #[test]
    fn test_lookup_known_names() {
        assert_eq!(lookup("IOS").unwrap().id, 5);
        assert_eq!(
            lookup("ANDROID_TESTSUITE").unwrap().client_type,
            ClientType::AndroidTestsuite
        );
        for client in ClientType::ALL {
            assert_eq!(lookup(client.as_str()).unwrap().client_type, *client);
        }
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(
            lookup("ios"),
            Err(CatalogError::UnknownProfile("ios".to_string()))
        );
    }

    #[test]
    fn test_only_ios_carries_user_agent() {
        let carriers: Vec<_> = ClientType::ALL
            .iter()
            .filter(|c| c.carries_user_agent())
            .collect();
        assert_eq!(carriers, vec![&ClientType::Ios]);
    }

    #[test]
    fn test_resolve_unknown_name_heals_setting() {
        let settings = Settings::in_memory();
        settings.save_value(Setting::SpoofClientLivestream, "WINDOWS_PHONE".into());

        let profile = resolve(&settings, Setting::SpoofClientLivestream);
        assert_eq!(profile.client_type, ClientType::AndroidVr);
        assert_eq!(
            settings.get_string(Setting::SpoofClientLivestream),
            "ANDROID_VR"
        );

        // second lookup succeeds without another reset
        let again = resolve(&settings, Setting::SpoofClientLivestream);
        assert_eq!(again.client_type, ClientType::AndroidVr);
    }

    #[test]
    fn test_resolve_configured_name() {
        let settings = Settings::in_memory();
        settings.save_value(Setting::SpoofClientGeneral, "IOS".into());
        assert_eq!(
            resolve(&settings, Setting::SpoofClientGeneral).client_type,
            ClientType::Ios
        );
    }
}
