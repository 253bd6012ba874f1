use std::{net::SocketAddr, sync::Arc};

use tokio::runtime::Handle;
use tracing::{info, warn};
use ytspoof::{
    common::{self, LogNotifier, types::AnyResult},
    configs::Config,
    patches::{CodecPolicy, SeekbarLayout, WatchHistoryDomainCheck},
    server::AppState,
    settings::Settings,
    spoof::{SpoofClient, renderer::InnertubeRendererSource},
    transport,
};

#[tokio::main]
async fn main() -> AnyResult<()> {
    let config = Config::load()?;
    common::logger::init(&config);

    let settings = Arc::new(match &config.spoof.settings_path {
        Some(path) => Settings::load(path)?,
        None => {
            warn!("No settings_path configured, settings will not persist");
            Settings::in_memory()
        }
    });
    let notifier = Arc::new(LogNotifier);

    let source = InnertubeRendererSource::new(
        config.spoof.innertube_api.clone(),
        config.spoof.request_timeout(),
    )?;
    let spoof = SpoofClient::new(
        settings.clone(),
        Arc::new(source),
        Handle::current(),
        config.spoof.fetch_timeout(),
    );

    let history_check = Arc::new(WatchHistoryDomainCheck::new(
        settings.clone(),
        notifier.clone(),
    ));
    history_check.check_dns_resolver(true, &Handle::current());

    let address: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = Arc::new(AppState {
        seekbar: SeekbarLayout::new(settings.clone(), notifier),
        codec: CodecPolicy::new(config.device, settings),
        spoof: Arc::new(spoof),
        history_check,
        config,
    });

    let app = transport::http_server::router(state)
        .layer(tower_http::trace::TraceLayer::new_for_http());

    info!("Hook server listening on {}", address);

    let listener = tokio::net::TcpListener::bind(address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
