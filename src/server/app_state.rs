use std::sync::Arc;

use crate::{
    configs::Config,
    patches::{CodecPolicy, SeekbarLayout, WatchHistoryDomainCheck},
    spoof::SpoofClient,
};

/// Top-level application state.
pub struct AppState {
    pub config: Config,
    pub spoof: Arc<SpoofClient>,
    pub seekbar: SeekbarLayout,
    pub codec: CodecPolicy,
    pub history_check: Arc<WatchHistoryDomainCheck>,
}
