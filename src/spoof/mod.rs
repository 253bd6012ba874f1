//! Client identity spoofing.
//!
//! The player loads a video, [`IdentitySelector`] decides which client it
//! should claim to be, and the [`RequestRewriter`] hooks rewrite outbound
//! requests to match. The live/playability check behind that decision is
//! fetched in the background by [`renderer::MetadataFetcher`].

pub mod catalog;
pub mod error;
pub mod player;
pub mod renderer;
pub mod rewriter;
pub mod selector;
pub mod tracking;

pub use catalog::{ClientProfile, ClientType};
pub use player::PlayerType;
pub use renderer::{RendererSnapshot, RendererSource};
pub use rewriter::{ClientFields, RequestRewriter};
pub use selector::{IdentitySelector, SelectionDecision, SelectionTier};

use std::{sync::Arc, time::Duration};

use tracing::info;

use crate::settings::{Setting, SettingsStore};
use renderer::{MetadataFetcher, RendererCache};

/// Everything the injection points need, built once and shared.
pub struct SpoofClient {
    enabled: bool,
    selector: Arc<IdentitySelector>,
    rewriter: RequestRewriter,
}

impl SpoofClient {
    /// The master flag is read once here; toggling it takes a restart.
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        source: Arc<dyn RendererSource>,
        runtime: tokio::runtime::Handle,
        fetch_timeout: Duration,
    ) -> Self {
        let enabled = settings.get_bool(Setting::SpoofClient);
        let cache = RendererCache::new(MetadataFetcher::new(source, runtime), fetch_timeout);
        let selector = Arc::new(IdentitySelector::new(settings.clone(), cache));
        let rewriter = RequestRewriter::new(enabled, settings, selector.clone());

        info!(
            "Client spoofing {}",
            if enabled { "enabled" } else { "disabled" }
        );

        Self {
            enabled,
            selector,
            rewriter,
        }
    }

    pub fn is_client_spoofing_enabled(&self) -> bool {
        self.enabled
    }

    pub fn selector(&self) -> &IdentitySelector {
        &self.selector
    }

    pub fn rewriter(&self) -> &RequestRewriter {
        &self.rewriter
    }

    /// Video load hook. Observes the player parameters and returns them
    /// unchanged. May block for up to the fetch timeout.
    pub fn set_player_response_video_id<'a>(
        &self,
        video_id: &str,
        parameters: Option<&'a str>,
    ) -> Option<&'a str> {
        if self.enabled {
            self.selector.on_video_load(video_id, parameters);
        }
        parameters
    }

    pub fn enable_player_gesture(&self, original: bool) -> bool {
        self.enabled || original
    }

    /// These identities get no playback speed menu in their player
    /// response, so it has to be created locally.
    pub fn force_create_playback_speed_menu(&self, original: bool) -> bool {
        let missing_menu = self.selector.last_decision().is_some_and(|d| {
            matches!(
                d.profile.client_type,
                ClientType::Ios | ClientType::AndroidUnplugged | ClientType::AndroidTestsuite
            )
        });
        (self.enabled && missing_menu) || original
    }

    pub fn force_enable_background_playback(&self, player: PlayerType) -> bool {
        if self.enabled && self.selector.current().profile.client_type == ClientType::Ios {
            return !player.is_none_hidden_or_sliding_minimized();
        }
        false
    }
}
