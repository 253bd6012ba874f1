use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use super::{FetchHandle, MetadataFetcher, RendererSnapshot};
use crate::spoof::catalog::ClientProfile;

/// Remembers the renderer fetch for the most recently loaded video.
///
/// Requests for the same video id share one fetch. A new video id starts a
/// new fetch and detaches from the previous one, which is left to finish on
/// its own.
pub struct RendererCache {
    fetcher: MetadataFetcher,
    wait_timeout: Duration,
    current: Mutex<Option<FetchHandle>>,
}

impl RendererCache {
    pub fn new(fetcher: MetadataFetcher, wait_timeout: Duration) -> Self {
        Self {
            fetcher,
            wait_timeout,
            current: Mutex::new(None),
        }
    }

    pub fn request_for(&self, video_id: &str, profile: &'static ClientProfile) -> FetchHandle {
        let mut current = self.current.lock();
        if let Some(handle) = current.as_ref() {
            if handle.video_id() == video_id {
                debug!("Reusing renderer fetch for {}", video_id);
                return handle.clone();
            }
        }

        let handle = self.fetcher.fetch(video_id, profile);
        *current = Some(handle.clone());
        handle
    }

    /// Snapshot for `video_id` if it is the current video. `blocking` waits
    /// up to the configured timeout; otherwise only an already finished
    /// fetch is reported.
    pub fn current_snapshot(&self, video_id: &str, blocking: bool) -> Option<RendererSnapshot> {
        // never hold the lock while waiting
        let handle = self.current.lock().clone()?;
        if handle.video_id() != video_id {
            return None;
        }
        if blocking {
            handle.wait(self.wait_timeout)
        } else {
            handle.poll()
        }
    }

    pub fn current_video_id(&self) -> Option<String> {
        self.current
            .lock()
            .as_ref()
            .map(|h| h.video_id().to_string())
    }

    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }
}
