pub mod info;
pub mod models;

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Json,
};
use tracing::debug;

use crate::{common::ApiError, server::AppState, spoof::ClientFields};
use models::*;

/// POST /v1/load
///
/// Waits for the renderer fetch, so it runs off the async workers.
pub async fn load_video(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoadRequest>,
) -> Result<Json<LoadResponse>, ApiError> {
    debug!("POST /v1/load: {}", body.video_id);
    if body.video_id.is_empty() {
        return Err(ApiError::bad_request("videoId must not be empty", "/v1/load"));
    }

    let spoof = state.spoof.clone();
    tokio::task::spawn_blocking(move || {
        let parameters = spoof
            .set_player_response_video_id(&body.video_id, body.parameters.as_deref())
            .map(str::to_string);
        let decision = spoof
            .is_client_spoofing_enabled()
            .then(|| spoof.selector().last_decision())
            .flatten()
            .map(|d| (*d).clone());
        Json(LoadResponse {
            parameters,
            decision,
        })
    })
    .await
    .map_err(|e| ApiError::internal(format!("load task failed: {}", e), "/v1/load"))
}

/// GET /v1/client
///
/// The query carries the host's own field values.
pub async fn get_client(
    State(state): State<Arc<AppState>>,
    Query(original): Query<ClientFields>,
) -> Json<ClientResponse> {
    let spoof = &state.spoof;
    let rewriter = spoof.rewriter();

    let (fields, decision) = if spoof.is_client_spoofing_enabled() {
        let decision = spoof.selector().current();
        (
            rewriter.client_fields(&decision, original),
            Some((*decision).clone()),
        )
    } else {
        (original, None)
    };

    Json(ClientResponse {
        enabled: spoof.is_client_spoofing_enabled(),
        fields,
        decision,
        tracking: rewriter.tracking_parameters(),
        allow_vp9: state.codec.allow_vp9(),
        allow_av1: state.codec.allow_av1(),
    })
}

/// GET /v1/player
pub async fn get_player_flags(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PlayerQuery>,
) -> Json<PlayerFlags> {
    let spoof = &state.spoof;
    Json(PlayerFlags {
        player_gesture: spoof.enable_player_gesture(query.gesture),
        playback_speed_menu: spoof.force_create_playback_speed_menu(query.speed_menu),
        background_playback: spoof.force_enable_background_playback(query.player_type),
        seekbar_tapping: state.seekbar.enable_seekbar_tapping(),
        hide_time_and_seekbar: state.seekbar.hide_time_and_seekbar(),
    })
}

/// POST /v1/format
pub async fn append_spoofed_client(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FormatBody>,
) -> Json<FormatBody> {
    Json(FormatBody {
        format: state.spoof.rewriter().append_spoofed_client(&body.format),
    })
}

/// POST /v1/rewrite/watch
pub async fn rewrite_watch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UriBody>,
) -> Json<UriBody> {
    Json(UriBody {
        uri: state.spoof.rewriter().block_get_watch_request(&body.uri),
    })
}

/// POST /v1/rewrite/initplayback
pub async fn rewrite_init_playback(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UriBody>,
) -> Json<UriBody> {
    Json(UriBody {
        uri: state.spoof.rewriter().block_init_playback_request(&body.uri),
    })
}

/// POST /v1/rewrite/tracking
pub async fn rewrite_tracking(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UriBody>,
) -> Json<UriBody> {
    Json(UriBody {
        uri: state.spoof.rewriter().override_tracking_url(&body.uri),
    })
}

/// POST /v1/tracking/observe
pub async fn observe_tracking(State(state): State<Arc<AppState>>, Json(body): Json<UriBody>) {
    state.spoof.rewriter().set_tracking_uri_parameter(&body.uri);
}

/// POST /v1/tracking/cpn
pub async fn set_cpn(State(state): State<Arc<AppState>>, Json(body): Json<CpnRequest>) {
    state.spoof.rewriter().set_cpn(&body.cpn);
}

/// POST /v1/seekbar/color
pub async fn seekbar_color(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ColorBody>,
) -> Json<ColorBody> {
    Json(ColorBody {
        color: state.seekbar.get_color(body.color),
    })
}

/// POST /v1/history/check
pub async fn check_history_domain(
    State(state): State<Arc<AppState>>,
    Json(body): Json<HistoryCheckRequest>,
) -> Json<HistoryCheckResponse> {
    let started = state
        .history_check
        .check_dns_resolver(body.connected, &tokio::runtime::Handle::current())
        .is_some();
    Json(HistoryCheckResponse { started })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::LogNotifier,
        configs::{Config, DeviceConfig},
        patches::{CodecPolicy, SeekbarLayout, WatchHistoryDomainCheck},
        settings::{Setting, SettingsStore, Settings},
        spoof::{SelectionTier, SpoofClient, renderer::testing::ScriptedSource},
    };

    fn state(settings: Arc<Settings>) -> Arc<AppState> {
        let spoof = SpoofClient::new(
            settings.clone(),
            ScriptedSource::respond(true, true),
            tokio::runtime::Handle::current(),
            std::time::Duration::from_secs(5),
        );
        let notifier = Arc::new(LogNotifier);
        Arc::new(AppState {
            config: Config::default(),
            spoof: Arc::new(spoof),
            seekbar: SeekbarLayout::new(settings.clone(), notifier.clone()),
            codec: CodecPolicy::new(
                DeviceConfig {
                    hardware_vp9: true,
                    hardware_av1: false,
                },
                settings.clone(),
            ),
            history_check: Arc::new(WatchHistoryDomainCheck::new(settings, notifier)),
        })
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_load_then_client_reports_livestream_identity() {
        let state = state(Arc::new(Settings::in_memory()));

        let Json(loaded) = load_video(
            State(state.clone()),
            Json(LoadRequest {
                video_id: "live1".into(),
                parameters: Some("CgIQBg".into()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(loaded.parameters.as_deref(), Some("CgIQBg"));
        assert_eq!(loaded.decision.map(|d| d.tier), Some(SelectionTier::Livestream));

        let Json(client) = get_client(State(state), Query(ClientFields::default())).await;
        assert!(client.enabled);
        assert_eq!(client.fields.client_id, 28);
        assert_eq!(client.fields.client_model, "Quest 3");
        assert_eq!(client.fields.user_agent, "");
        assert!(client.allow_vp9);
        assert!(!client.allow_av1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_client_fields_match_decision_during_loads() {
        let state = state(Arc::new(Settings::in_memory()));

        let spoof = state.spoof.clone();
        let loader = tokio::task::spawn_blocking(move || {
            for i in 0..200 {
                if i % 2 == 0 {
                    spoof.set_player_response_video_id(&format!("live{}", i), None);
                } else {
                    spoof.set_player_response_video_id(&format!("short{}", i), Some("8AEBxx"));
                }
            }
        });

        while !loader.is_finished() {
            let Json(client) =
                get_client(State(state.clone()), Query(ClientFields::default())).await;
            let decision = client.decision.expect("spoofing is enabled");
            assert_eq!(client.fields.client_id, decision.profile.id);
            assert_eq!(client.fields.client_version, decision.profile.version);
            assert_eq!(client.fields.client_model, decision.profile.model);
            tokio::task::yield_now().await;
        }
        loader.await.unwrap();
    }

    #[tokio::test]
    async fn test_load_rejects_empty_video_id() {
        let state = state(Arc::new(Settings::in_memory()));
        let result = load_video(
            State(state),
            Json(LoadRequest {
                video_id: String::new(),
                parameters: None,
            }),
        )
        .await;
        assert_eq!(result.err().map(|e| e.status), Some(400));
    }

    #[tokio::test]
    async fn test_disabled_client_passes_requests_through() {
        let settings = Arc::new(Settings::in_memory());
        settings.save_value(Setting::SpoofClient, false.into());
        let state = state(settings);

        let uri = "https://www.youtube.com/youtubei/v1/get_watch?key=1".to_string();
        let Json(rewritten) = rewrite_watch(State(state.clone()), Json(UriBody { uri: uri.clone() })).await;
        assert_eq!(rewritten.uri, uri);

        let Json(client) = get_client(
            State(state),
            Query(ClientFields {
                client_id: 1,
                client_version: "19.0".into(),
                ..Default::default()
            }),
        )
        .await;
        assert!(!client.enabled);
        assert!(client.decision.is_none());
        assert_eq!(client.fields.client_id, 1);
        assert_eq!(client.fields.client_version, "19.0");
    }

    #[tokio::test]
    async fn test_history_check_skipped_when_offline() {
        let state = state(Arc::new(Settings::in_memory()));
        let Json(body) = check_history_domain(
            State(state),
            Json(HistoryCheckRequest { connected: false }),
        )
        .await;
        assert!(!body.started);
    }

    #[tokio::test]
    async fn test_seekbar_color_hook() {
        let settings = Arc::new(Settings::in_memory());
        settings.save_value(Setting::HideSeekbarThumbnail, true.into());
        let state = state(settings);

        let Json(body) = seekbar_color(State(state), Json(ColorBody { color: 0xFFFF_0000 })).await;
        assert_eq!(body.color, 0);
    }
}
