use serde::Deserialize;

/// Player presentation states reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerType {
    None,
    Hidden,
    WatchWhileMinimized,
    WatchWhileMaximized,
    WatchWhileFullscreen,
    WatchWhileSlidingMaximizedFullscreen,
    WatchWhileSlidingMinimizedMaximized,
    WatchWhileSlidingMinimizedDismissed,
    WatchWhileSlidingFullscreenDismissed,
    InlineMinimal,
    VirtualRealityFullscreen,
    WatchWhilePictureInPicture,
}

impl PlayerType {
    pub fn is_none_or_hidden(self) -> bool {
        matches!(self, Self::None | Self::Hidden)
    }

    /// No player, or the player is being swiped down to the miniplayer.
    pub fn is_none_hidden_or_sliding_minimized(self) -> bool {
        self.is_none_or_hidden()
            || matches!(
                self,
                Self::WatchWhileSlidingMinimizedMaximized | Self::WatchWhileSlidingMinimizedDismissed
            )
    }
}
