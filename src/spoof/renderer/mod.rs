pub mod cache;
pub mod innertube;

pub use cache::RendererCache;
pub use innertube::InnertubeRendererSource;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{catalog::ClientProfile, error::FetchError};

/// The parts of a player response the client selection looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RendererSnapshot {
    pub is_live: bool,
    pub playability_ok: bool,
}

impl RendererSnapshot {
    pub fn from_player_response(body: &Value) -> Self {
        let is_live = body
            .get("videoDetails")
            .and_then(|d| d.get("isLive"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        let playability_ok = body
            .get("playabilityStatus")
            .and_then(|p| p.get("status"))
            .and_then(|s| s.as_str())
            == Some("OK");

        Self {
            is_live,
            playability_ok,
        }
    }
}

/// Network side of a renderer fetch.
#[async_trait]
pub trait RendererSource: Send + Sync {
    async fn fetch(
        &self,
        video_id: &str,
        profile: &'static ClientProfile,
    ) -> Result<RendererSnapshot, FetchError>;
}

enum SlotState {
    Pending,
    Done(Option<RendererSnapshot>),
}

struct FetchSlot {
    video_id: String,
    state: Mutex<SlotState>,
    ready: Condvar,
}

/// Shared view of one renderer fetch. Clones observe the same result.
#[derive(Clone)]
pub struct FetchHandle {
    slot: Arc<FetchSlot>,
}

impl FetchHandle {
    fn pending(video_id: &str) -> Self {
        Self {
            slot: Arc::new(FetchSlot {
                video_id: video_id.to_string(),
                state: Mutex::new(SlotState::Pending),
                ready: Condvar::new(),
            }),
        }
    }

    /// First completion wins; later ones are ignored.
    fn complete(&self, result: Option<RendererSnapshot>) {
        let mut state = self.slot.state.lock();
        if matches!(*state, SlotState::Pending) {
            *state = SlotState::Done(result);
            self.slot.ready.notify_all();
        }
    }

    pub fn video_id(&self) -> &str {
        &self.slot.video_id
    }

    pub fn is_done(&self) -> bool {
        matches!(*self.slot.state.lock(), SlotState::Done(_))
    }

    /// Returns the snapshot if the fetch already finished successfully.
    pub fn poll(&self) -> Option<RendererSnapshot> {
        match *self.slot.state.lock() {
            SlotState::Done(result) => result,
            SlotState::Pending => None,
        }
    }

    /// Blocks the calling thread until the fetch finishes or `timeout`
    /// elapses. Timeouts and failed fetches both yield `None`.
    pub fn wait(&self, timeout: Duration) -> Option<RendererSnapshot> {
        let deadline = Instant::now() + timeout;
        let mut state = self.slot.state.lock();
        loop {
            if let SlotState::Done(result) = *state {
                return result;
            }
            if self.slot.ready.wait_until(&mut state, deadline).timed_out() {
                debug!(
                    "Renderer fetch for {} not ready after {:?}",
                    self.slot.video_id, timeout
                );
                return match *state {
                    SlotState::Done(result) => result,
                    SlotState::Pending => None,
                };
            }
        }
    }

    pub fn ptr_eq(&self, other: &FetchHandle) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

/// Resolves the handle as failed if the fetch task ends without reporting,
/// e.g. on panic or runtime shutdown, so waiters are released early.
struct CompletionGuard(FetchHandle);

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.0.complete(None);
    }
}

/// Starts renderer fetches on the background runtime.
#[derive(Clone)]
pub struct MetadataFetcher {
    source: Arc<dyn RendererSource>,
    runtime: tokio::runtime::Handle,
}

impl MetadataFetcher {
    pub fn new(source: Arc<dyn RendererSource>, runtime: tokio::runtime::Handle) -> Self {
        Self { source, runtime }
    }

    /// Spawns the fetch and returns immediately. The task is detached; a
    /// dropped handle does not cancel it.
    pub fn fetch(&self, video_id: &str, profile: &'static ClientProfile) -> FetchHandle {
        let handle = FetchHandle::pending(video_id);
        let guard = CompletionGuard(handle.clone());
        let source = self.source.clone();
        let video_id = video_id.to_string();

        debug!(
            "Fetching renderer for {} as {}",
            video_id, profile.client_type
        );

        self.runtime.spawn(async move {
            match source.fetch(&video_id, profile).await {
                Ok(snapshot) => {
                    debug!("Renderer for {}: {:?}", video_id, snapshot);
                    guard.0.complete(Some(snapshot));
                }
                Err(e) => {
                    warn!("Renderer fetch for {} failed: {}", video_id, e);
                    guard.0.complete(None);
                }
            }
        });

        handle
    }
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::testing::*;
    use super::*;
    use crate::spoof::catalog::ClientType;

    #[test]
    fn test_snapshot_from_player_response() {
        let live = json!({
            "playabilityStatus": { "status": "OK" },
            "videoDetails": { "videoId": "abc", "isLive": true }
        });
        assert_eq!(
            RendererSnapshot::from_player_response(&live),
            RendererSnapshot {
                is_live: true,
                playability_ok: true
            }
        );

        let blocked = json!({
            "playabilityStatus": { "status": "LOGIN_REQUIRED", "reason": "Sign in" }
        });
        assert_eq!(
            RendererSnapshot::from_player_response(&blocked),
            RendererSnapshot {
                is_live: false,
                playability_ok: false
            }
        );
    }

    #[test]
    fn test_fetch_resolves_handle() {
        let rt = runtime();
        let source = ScriptedSource::respond(true, true);
        let fetcher = MetadataFetcher::new(source.clone(), rt.handle().clone());

        let handle = fetcher.fetch("vid1", ClientType::Ios.profile());
        let snapshot = handle.wait(Duration::from_secs(5));

        assert_eq!(
            snapshot,
            Some(RendererSnapshot {
                is_live: true,
                playability_ok: true
            })
        );
        assert!(handle.is_done());
        assert_eq!(handle.poll(), snapshot);
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn test_failed_fetch_degrades_to_none() {
        let rt = runtime();
        let source = ScriptedSource::new(Script::Fail);
        let fetcher = MetadataFetcher::new(source, rt.handle().clone());

        let handle = fetcher.fetch("vid1", ClientType::Android.profile());
        assert_eq!(handle.wait(Duration::from_secs(5)), None);
        assert!(handle.is_done());
    }

    #[test]
    fn test_wait_times_out_and_poll_stays_empty() {
        let rt = runtime();
        let source = ScriptedSource::new(Script::Hang);
        let fetcher = MetadataFetcher::new(source, rt.handle().clone());

        let handle = fetcher.fetch("vid1", ClientType::Android.profile());
        let started = Instant::now();
        assert_eq!(handle.wait(Duration::from_millis(50)), None);
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(handle.poll(), None);
        assert!(!handle.is_done());
    }

    #[test]
    fn test_first_completion_wins() {
        let handle = FetchHandle::pending("vid1");
        let snapshot = RendererSnapshot {
            is_live: false,
            playability_ok: true,
        };
        handle.complete(Some(snapshot));
        handle.complete(None);
        assert_eq!(handle.poll(), Some(snapshot));
    }
}
