use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use parking_lot::RwLock;
use serde::Serialize;
use tracing::debug;

use super::{
    catalog::{self, ClientProfile},
    renderer::{RendererCache, RendererSnapshot},
};
use crate::{
    common::types::now_ms,
    settings::{Setting, SettingsStore},
};

/// Player parameters of clips start with this prefix.
pub const CLIP_PARAMETER_PREFIX: &str = "kAIB";
/// Player parameters of shorts start with this prefix.
pub const SHORTS_PARAMETER_PREFIX: &str = "8AEB";

pub fn is_short_form(parameters: Option<&str>) -> bool {
    parameters.is_some_and(|p| {
        p.starts_with(CLIP_PARAMETER_PREFIX) || p.starts_with(SHORTS_PARAMETER_PREFIX)
    })
}

/// Which rule picked the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionTier {
    Shorts,
    Livestream,
    Fallback,
    General,
}

impl SelectionTier {
    fn setting(self) -> Setting {
        match self {
            Self::Shorts => Setting::SpoofClientShorts,
            Self::Livestream => Setting::SpoofClientLivestream,
            Self::Fallback => Setting::SpoofClientFallback,
            Self::General => Setting::SpoofClientGeneral,
        }
    }

    pub fn evaluate(short_form: bool, snapshot: Option<RendererSnapshot>) -> Self {
        if short_form {
            return Self::Shorts;
        }
        match snapshot {
            Some(s) if s.is_live => Self::Livestream,
            Some(s) if !s.playability_ok => Self::Fallback,
            _ => Self::General,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionDecision {
    pub profile: &'static ClientProfile,
    pub tier: SelectionTier,
    pub video_id: String,
    pub decided_at: u64,
}

#[derive(Debug, Clone, Default)]
struct LoadContext {
    video_id: String,
    short_form: bool,
}

struct Published {
    stamp: u64,
    decision: Arc<SelectionDecision>,
}

/// Picks the client identity for the current video and keeps the result
/// for the request hooks.
///
/// Every evaluation takes a stamp before it reads renderer data. A result is
/// only published when it is for the latest loaded video and no evaluation
/// with a later stamp has been published already.
pub struct IdentitySelector {
    settings: Arc<dyn SettingsStore>,
    cache: RendererCache,
    load: RwLock<LoadContext>,
    evaluations: AtomicU64,
    decision: RwLock<Option<Published>>,
}

impl IdentitySelector {
    pub fn new(settings: Arc<dyn SettingsStore>, cache: RendererCache) -> Self {
        Self {
            settings,
            cache,
            load: RwLock::new(LoadContext::default()),
            evaluations: AtomicU64::new(0),
            decision: RwLock::new(None),
        }
    }

    /// Video load event. Short-form content never touches the network; any
    /// other video starts (or reuses) its renderer fetch and waits for it,
    /// bounded by the cache timeout, before deciding.
    pub fn on_video_load(&self, video_id: &str, parameters: Option<&str>) -> Arc<SelectionDecision> {
        let ctx = LoadContext {
            video_id: video_id.to_string(),
            short_form: is_short_form(parameters),
        };
        *self.load.write() = ctx.clone();

        if ctx.short_form {
            let stamp = self.next_stamp();
            return self.decide(&ctx, stamp, None);
        }

        let general = catalog::resolve(&*self.settings, Setting::SpoofClientGeneral);
        self.cache.request_for(&ctx.video_id, general);
        let snapshot = self.cache.current_snapshot(&ctx.video_id, true);
        // stamped after the wait: anything that read the slot earlier is older
        let stamp = self.next_stamp();
        self.decide(&ctx, stamp, snapshot)
    }

    /// Re-evaluates with whatever renderer data is already available.
    /// Never blocks.
    pub fn current(&self) -> Arc<SelectionDecision> {
        let ctx = self.load.read().clone();
        let stamp = self.next_stamp();
        let snapshot = if ctx.short_form {
            None
        } else {
            self.cache.current_snapshot(&ctx.video_id, false)
        };
        self.decide(&ctx, stamp, snapshot)
    }

    /// Last decision without re-evaluating.
    pub fn last_decision(&self) -> Option<Arc<SelectionDecision>> {
        self.decision.read().as_ref().map(|p| p.decision.clone())
    }

    pub fn is_short_form(&self) -> bool {
        self.load.read().short_form
    }

    fn next_stamp(&self) -> u64 {
        self.evaluations.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publishes the evaluation unless it is stale. A stale caller gets the
    /// published decision when that one is for the latest video.
    fn decide(
        &self,
        ctx: &LoadContext,
        stamp: u64,
        snapshot: Option<RendererSnapshot>,
    ) -> Arc<SelectionDecision> {
        let tier = SelectionTier::evaluate(ctx.short_form, snapshot);
        let profile = catalog::resolve(&*self.settings, tier.setting());

        let decision = Arc::new(SelectionDecision {
            profile,
            tier,
            video_id: ctx.video_id.clone(),
            decided_at: now_ms(),
        });

        let mut slot = self.decision.write();
        {
            let load = self.load.read();
            let stale = slot.as_ref().is_some_and(|p| p.stamp > stamp);
            if load.video_id != ctx.video_id || stale {
                return match slot.as_ref() {
                    Some(p) if p.decision.video_id == load.video_id => p.decision.clone(),
                    _ => decision,
                };
            }
        }

        let changed = slot.as_ref().is_none_or(|p| {
            p.decision.profile.client_type != profile.client_type
                || p.decision.video_id != decision.video_id
        });
        if changed {
            debug!(
                "Spoofing {} as {} ({:?})",
                decision.video_id, profile.client_type, tier
            );
        }
        *slot = Some(Published {
            stamp,
            decision: decision.clone(),
        });
        decision
    }
}
