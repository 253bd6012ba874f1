use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use super::{
    catalog::ClientType,
    error::RewriteError,
    selector::{IdentitySelector, SelectionDecision},
    tracking::{self, TrackingParameterSet},
};
use crate::settings::{Setting, SettingsStore};

/// Any unreachable address. Requests pointed here fail fast.
pub const UNREACHABLE_HOST_URI: &str = "https://127.0.0.0";

const GET_WATCH_PATH: &str = "get_watch";
const INIT_PLAYBACK_PATH: &str = "initplayback";
const CSI_TRACKING: &str = "youtube.com/csi";

/// Forces the following text to render left to right.
const LTR_OVERRIDE: char = '\u{202D}';
const THIN_SPACE: char = '\u{2009}';

/// Runs one rewrite. Errors are logged and the original input is kept.
fn best_effort<F>(op: &str, original: &str, rewrite: F) -> String
where
    F: FnOnce() -> Result<Option<String>, RewriteError>,
{
    match rewrite() {
        Ok(Some(replacement)) => {
            debug!("{}: {} -> {}", op, original, replacement);
            replacement
        }
        Ok(None) => original.to_string(),
        Err(e) => {
            debug!("{} left '{}' unchanged: {}", op, original, e);
            original.to_string()
        }
    }
}

/// The client fields of one outbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientFields {
    pub client_id: i32,
    pub client_version: String,
    pub client_model: String,
    pub os_version: String,
    pub user_agent: String,
}

/// Request shaping hooks driven by the selected client identity.
pub struct RequestRewriter {
    enabled: bool,
    settings: Arc<dyn SettingsStore>,
    selector: Arc<IdentitySelector>,
    tracking: RwLock<TrackingParameterSet>,
}

impl RequestRewriter {
    pub fn new(
        enabled: bool,
        settings: Arc<dyn SettingsStore>,
        selector: Arc<IdentitySelector>,
    ) -> Self {
        Self {
            enabled,
            settings,
            selector,
            tracking: RwLock::new(TrackingParameterSet::default()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn current_client(&self) -> ClientType {
        self.selector.current().profile.client_type
    }

    fn history_fix_enabled(&self) -> bool {
        self.settings.get_bool(Setting::SpoofClientIosHistoryFix)
    }

    /// Points `/get_watch` requests at an unreachable host so the player
    /// falls back to the spoofed player request.
    pub fn block_get_watch_request(&self, uri: &str) -> String {
        if !self.enabled {
            return uri.to_string();
        }
        best_effort("block_get_watch_request", uri, || {
            let parsed = Url::parse(uri)?;
            Ok(parsed
                .path()
                .contains(GET_WATCH_PATH)
                .then(|| UNREACHABLE_HOST_URI.to_string()))
        })
    }

    /// Blocks `/initplayback`. The test suite client still needs the real
    /// endpoint, so for it only the query is dropped.
    pub fn block_init_playback_request(&self, uri: &str) -> String {
        if !self.enabled {
            return uri.to_string();
        }
        best_effort("block_init_playback_request", uri, || {
            let mut parsed = Url::parse(uri)?;
            if !parsed.path().contains(INIT_PLAYBACK_PATH) {
                return Ok(None);
            }
            if self.current_client() != ClientType::AndroidTestsuite {
                return Ok(Some(UNREACHABLE_HOST_URI.to_string()));
            }
            parsed.set_query(None);
            Ok(Some(parsed.to_string()))
        })
    }

    pub fn client_type_id(&self, original: i32) -> i32 {
        if self.enabled {
            self.selector.current().profile.id
        } else {
            original
        }
    }

    pub fn client_version(&self, original: &str) -> String {
        if self.enabled {
            self.selector.current().profile.version.to_string()
        } else {
            original.to_string()
        }
    }

    pub fn client_model(&self, original: &str) -> String {
        if self.enabled {
            self.selector.current().profile.model.to_string()
        } else {
            original.to_string()
        }
    }

    pub fn os_version(&self, original: &str) -> String {
        if self.enabled {
            self.selector.current().profile.os_version.to_string()
        } else {
            original.to_string()
        }
    }

    /// Only the iOS identity replaces the user agent.
    pub fn user_agent(&self, original: &str) -> String {
        if self.enabled {
            let profile = self.selector.current().profile;
            if profile.client_type.carries_user_agent() {
                debug!("Replaced user agent '{}' with '{}'", original, profile.user_agent);
                return profile.user_agent.to_string();
            }
        }
        original.to_string()
    }

    /// Substitutes every client field from `decision` at once, so the
    /// result never mixes two profiles.
    pub fn client_fields(&self, decision: &SelectionDecision, original: ClientFields) -> ClientFields {
        if !self.enabled {
            return original;
        }
        let profile = decision.profile;
        ClientFields {
            client_id: profile.id,
            client_version: profile.version.to_string(),
            client_model: profile.model.to_string(),
            os_version: profile.os_version.to_string(),
            user_agent: if profile.client_type.carries_user_agent() {
                profile.user_agent.to_string()
            } else {
                original.user_agent
            },
        }
    }

    pub fn set_cpn(&self, cpn: &str) {
        if !self.enabled {
            return;
        }
        let mut tracking = self.tracking.write();
        if tracking.cpn != cpn {
            tracking.cpn = cpn.to_string();
        }
    }

    /// Captures tracking parameters from playback / watchtime requests.
    pub fn set_tracking_uri_parameter(&self, uri: &str) {
        if !self.enabled || !self.history_fix_enabled() {
            return;
        }
        let parsed = match Url::parse(uri) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("set_tracking_uri_parameter failure for '{}': {}", uri, e);
                return;
            }
        };
        if !tracking::is_capturable(&parsed) {
            return;
        }

        let mut current = self.tracking.write();
        let next = current.observed(&parsed);
        *current = next;
    }

    pub fn tracking_parameters(&self) -> TrackingParameterSet {
        self.tracking.read().clone()
    }

    /// Swaps a `/csi` request for a rebuilt playback stats request, which
    /// is what keeps watch history working under the iOS identity.
    pub fn override_tracking_url(&self, uri: &str) -> String {
        if !self.enabled {
            return uri.to_string();
        }
        best_effort("override_tracking_url", uri, || {
            if self.current_client() != ClientType::Ios
                || !self.history_fix_enabled()
                || !uri.contains(CSI_TRACKING)
            {
                return Ok(None);
            }
            let tracking = self.tracking.read().clone();
            if !tracking.is_complete() {
                return Ok(None);
            }
            tracking.playback_url().map(Some)
        })
    }

    /// Appends the spoofed client name to the stats-for-nerds format line.
    pub fn append_spoofed_client(&self, video_format: &str) -> String {
        if !self.enabled
            || video_format.is_empty()
            || !self.settings.get_bool(Setting::SpoofClientStatsForNerds)
        {
            return video_format.to_string();
        }
        match self.selector.last_decision() {
            Some(decision) => format!(
                "{}{}{}({})",
                LTR_OVERRIDE, video_format, THIN_SPACE, decision.profile.friendly_name
            ),
            None => video_format.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        settings::Settings,
        spoof::renderer::{
            MetadataFetcher, RendererCache,
            testing::{Script, ScriptedSource, runtime},
        },
    };

    struct Fixture {
        _rt: tokio::runtime::Runtime,
        settings: Arc<Settings>,
        selector: Arc<IdentitySelector>,
        rewriter: RequestRewriter,
    }

    fn fixture(enabled: bool, general: &str) -> Fixture {
        let rt = runtime();
        let settings = Arc::new(Settings::in_memory());
        settings.save_value(Setting::SpoofClientGeneral, general.into());
        let cache = RendererCache::new(
            MetadataFetcher::new(ScriptedSource::new(Script::Hang), rt.handle().clone()),
            Duration::from_millis(10),
        );
        let selector = Arc::new(IdentitySelector::new(settings.clone(), cache));
        let rewriter = RequestRewriter::new(enabled, settings.clone(), selector.clone());
        Fixture {
            _rt: rt,
            settings,
            selector,
            rewriter,
        }
    }

    fn capture_all(rewriter: &RequestRewriter) {
        rewriter.set_cpn("CPN");
        rewriter.set_tracking_uri_parameter(
            "https://s.youtube.com/api/stats/playback?docid=vid1&len=212&ei=EI&vm=VM&of=OF",
        );
    }

    #[test]
    fn test_get_watch_is_blocked() {
        let f = fixture(true, "ANDROID_TESTSUITE");
        assert_eq!(
            f.rewriter
                .block_get_watch_request("https://youtubei.googleapis.com/youtubei/v1/get_watch?id=1"),
            UNREACHABLE_HOST_URI
        );
        let player = "https://youtubei.googleapis.com/youtubei/v1/player?id=1";
        assert_eq!(f.rewriter.block_get_watch_request(player), player);
    }

    #[test]
    fn test_get_watch_untouched_when_disabled() {
        let f = fixture(false, "ANDROID_TESTSUITE");
        let uri = "https://youtubei.googleapis.com/youtubei/v1/get_watch?id=1";
        assert_eq!(f.rewriter.block_get_watch_request(uri), uri);
    }

    #[test]
    fn test_unparseable_uri_is_returned_unchanged() {
        let f = fixture(true, "ANDROID_TESTSUITE");
        assert_eq!(f.rewriter.block_get_watch_request("/get_watch"), "/get_watch");
        assert_eq!(f.rewriter.block_init_playback_request("::"), "::");
    }

    #[test]
    fn test_init_playback_strips_query_for_testsuite() {
        let f = fixture(true, "ANDROID_TESTSUITE");
        assert_eq!(
            f.rewriter
                .block_init_playback_request("https://rr1.googlevideo.com/initplayback?source=yt&c=X"),
            "https://rr1.googlevideo.com/initplayback"
        );
    }

    #[test]
    fn test_init_playback_blocked_for_other_clients() {
        let f = fixture(true, "IOS");
        assert_eq!(
            f.rewriter
                .block_init_playback_request("https://rr1.googlevideo.com/initplayback?source=yt"),
            UNREACHABLE_HOST_URI
        );
        let other = "https://rr1.googlevideo.com/videoplayback?source=yt";
        assert_eq!(f.rewriter.block_init_playback_request(other), other);
    }

    #[test]
    fn test_field_substitution() {
        let f = fixture(true, "ANDROID_TESTSUITE");
        assert_eq!(f.rewriter.client_type_id(1), 30);
        assert_eq!(f.rewriter.client_version("18.38.45"), "1.9");
        assert_eq!(f.rewriter.client_model("SM-G991B"), "Pixel 8");
        assert_eq!(f.rewriter.os_version("13"), "14");
        // not the user agent carrying identity
        assert_eq!(f.rewriter.user_agent("original-ua"), "original-ua");
    }

    #[test]
    fn test_user_agent_replaced_for_ios() {
        let f = fixture(true, "IOS");
        assert_eq!(
            f.rewriter.user_agent("original-ua"),
            ClientType::Ios.profile().user_agent
        );
    }

    #[test]
    fn test_client_fields_come_from_one_decision() {
        let f = fixture(true, "IOS");
        let original = ClientFields {
            client_id: 1,
            client_version: "19.0".into(),
            user_agent: "original-ua".into(),
            ..Default::default()
        };

        let decision = f.selector.current();
        f.settings.save_value(Setting::SpoofClientGeneral, "ANDROID_VR".into());

        let fields = f.rewriter.client_fields(&decision, original.clone());
        assert_eq!(fields.client_id, 5);
        assert_eq!(fields.client_version, "19.09.3");
        assert_eq!(fields.client_model, "iPhone14,5");
        assert_eq!(fields.user_agent, ClientType::Ios.profile().user_agent);

        let vr = f.selector.current();
        let fields = f.rewriter.client_fields(&vr, original.clone());
        assert_eq!(fields.client_id, 28);
        assert_eq!(fields.user_agent, "original-ua");

        let disabled = fixture(false, "IOS");
        assert_eq!(disabled.rewriter.client_fields(&decision, original.clone()), original);
    }

    #[test]
    fn test_fields_untouched_when_disabled() {
        let f = fixture(false, "IOS");
        assert_eq!(f.rewriter.client_type_id(3), 3);
        assert_eq!(f.rewriter.client_version("18.38.45"), "18.38.45");
        assert_eq!(f.rewriter.user_agent("original-ua"), "original-ua");
    }

    #[test]
    fn test_tracking_override_rebuilds_playback_url() {
        let f = fixture(true, "IOS");
        capture_all(&f.rewriter);

        let rebuilt = f
            .rewriter
            .override_tracking_url("https://www.youtube.com/csi?v=2&s=youtube");
        assert!(rebuilt.starts_with(tracking::VIDEO_STATS_PLAYBACK_URI));
        for pair in ["docid=vid1", "len=212", "cpn=CPN", "ei=EI", "vm=VM", "of=OF"] {
            assert!(rebuilt.contains(pair), "missing {} in {}", pair, rebuilt);
        }
    }

    #[test]
    fn test_tracking_override_requires_every_field() {
        let f = fixture(true, "IOS");
        f.rewriter.set_tracking_uri_parameter(
            "https://s.youtube.com/api/stats/playback?docid=vid1&len=212&ei=EI&vm=VM&of=OF",
        );
        let csi = "https://www.youtube.com/csi?v=2";
        // nonce never reported
        assert_eq!(f.rewriter.override_tracking_url(csi), csi);
    }

    #[test]
    fn test_tracking_override_requires_ios_and_flag() {
        let f = fixture(true, "ANDROID_TESTSUITE");
        capture_all(&f.rewriter);
        let csi = "https://www.youtube.com/csi?v=2";
        assert_eq!(f.rewriter.override_tracking_url(csi), csi);

        let f = fixture(true, "IOS");
        capture_all(&f.rewriter);
        f.settings
            .save_value(Setting::SpoofClientIosHistoryFix, false.into());
        assert_eq!(f.rewriter.override_tracking_url(csi), csi);
    }

    #[test]
    fn test_non_csi_urls_pass_through() {
        let f = fixture(true, "IOS");
        capture_all(&f.rewriter);
        let other = "https://www.youtube.com/api/stats/qoe?v=2";
        assert_eq!(f.rewriter.override_tracking_url(other), other);
    }

    #[test]
    fn test_capture_ignored_without_history_fix() {
        let f = fixture(true, "IOS");
        f.settings
            .save_value(Setting::SpoofClientIosHistoryFix, false.into());
        capture_all(&f.rewriter);
        let captured = f.rewriter.tracking_parameters();
        assert_eq!(captured.doc_id, "");
        assert_eq!(captured.cpn, "CPN");
    }

    #[test]
    fn test_append_spoofed_client() {
        let f = fixture(true, "IOS");
        // nothing decided yet
        assert_eq!(f.rewriter.append_spoofed_client("1080p"), "1080p");

        f.selector.current();
        assert_eq!(
            f.rewriter.append_spoofed_client("1080p"),
            "\u{202D}1080p\u{2009}(iOS)"
        );
        assert_eq!(f.rewriter.append_spoofed_client(""), "");

        f.settings
            .save_value(Setting::SpoofClientStatsForNerds, false.into());
        assert_eq!(f.rewriter.append_spoofed_client("1080p"), "1080p");
    }
}
