use std::{net::IpAddr, sync::Arc};

use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, warn};

use crate::{
    common::{DialogAnswer, Notifier, WatchHistoryDialog},
    settings::{Setting, SettingsStore},
};

/// Host the watch history requests are sent to.
pub const HISTORY_TRACKING_ENDPOINT: &str = "s.youtube.com";

/// A resolution is blocked when it is missing, loopback or a sinkhole
/// (`0.0.0.0` / `::`).
pub fn is_valid_resolution(address: Option<IpAddr>) -> bool {
    address.is_some_and(|ip| !ip.is_loopback() && !ip.is_unspecified())
}

async fn resolve_first(host: &str) -> Option<IpAddr> {
    match tokio::net::lookup_host((host, 443)).await {
        Ok(mut addrs) => addrs.next().map(|a| a.ip()),
        Err(e) => {
            debug!("{} failed to resolve: {}", host, e);
            None
        }
    }
}

/// Warns once per start when a DNS blocklist sinkholes the watch history
/// host, since history then silently stops working.
pub struct WatchHistoryDomainCheck {
    host: String,
    settings: Arc<dyn SettingsStore>,
    notifier: Arc<dyn Notifier>,
}

impl WatchHistoryDomainCheck {
    pub fn new(settings: Arc<dyn SettingsStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self::for_host(HISTORY_TRACKING_ENDPOINT, settings, notifier)
    }

    pub fn for_host(
        host: impl Into<String>,
        settings: Arc<dyn SettingsStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            host: host.into(),
            settings,
            notifier,
        }
    }

    /// Starts the check in the background. Skipped when offline or when
    /// the user asked to ignore it.
    pub fn check_dns_resolver(
        self: &Arc<Self>,
        connected: bool,
        runtime: &Handle,
    ) -> Option<JoinHandle<()>> {
        if !connected || self.settings.get_bool(Setting::IgnoreCheckWatchHistoryDomainName) {
            return None;
        }

        let this = self.clone();
        Some(runtime.spawn(async move {
            if is_valid_resolution(resolve_first(&this.host).await) {
                return;
            }
            warn!("{} does not resolve, watch history will not work", this.host);
            this.handle_blocked();
        }))
    }

    pub fn handle_blocked(&self) {
        if self.notifier.dialog(&WatchHistoryDialog::default()) == DialogAnswer::Ignore {
            self.settings
                .save_value(Setting::IgnoreCheckWatchHistoryDomainName, true.into());
        }
    }
}
