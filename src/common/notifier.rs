use tracing::warn;

/// Prompt shown when the watch history endpoint is blocked by DNS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchHistoryDialog {
    pub title_key: &'static str,
    pub message_key: &'static str,
    pub ignore_key: &'static str,
}

impl Default for WatchHistoryDialog {
    fn default() -> Self {
        Self {
            title_key: "dialog_title_warning",
            message_key: "check_watch_history_domain_name_dialog_message",
            ignore_key: "check_watch_history_domain_name_dialog_ignore",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAnswer {
    Dismiss,
    Ignore,
}

/// User-facing message surface. Implementations are best effort; nothing
/// in this crate depends on a message actually being shown.
pub trait Notifier: Send + Sync {
    fn toast(&self, message_key: &str);
    fn dialog(&self, dialog: &WatchHistoryDialog) -> DialogAnswer;
}

/// Notifier for headless hosts: everything goes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn toast(&self, message_key: &str) {
        warn!("toast: {}", message_key);
    }

    fn dialog(&self, dialog: &WatchHistoryDialog) -> DialogAnswer {
        warn!("{}: {}", dialog.title_key, dialog.message_key);
        DialogAnswer::Dismiss
    }
}
