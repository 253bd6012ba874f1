use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    server::AppState,
    transport::{
        hooks::{self, info},
        middleware::{add_response_headers, check_auth},
    },
};

const API_V1: &str = "/v1";

pub fn router(state: Arc<AppState>) -> Router {
    let v1_routes = Router::new()
        .route("/load", post(hooks::load_video))
        .route("/client", get(hooks::get_client))
        .route("/player", get(hooks::get_player_flags))
        .route("/format", post(hooks::append_spoofed_client))
        .route("/seekbar/color", post(hooks::seekbar_color))
        .route("/history/check", post(hooks::check_history_domain))
        .route("/rewrite/watch", post(hooks::rewrite_watch))
        .route("/rewrite/initplayback", post(hooks::rewrite_init_playback))
        .route("/rewrite/tracking", post(hooks::rewrite_tracking))
        .route("/tracking/observe", post(hooks::observe_tracking))
        .route("/tracking/cpn", post(hooks::set_cpn));

    Router::new()
        .nest(API_V1, v1_routes)
        .route("/version", get(info::get_version))
        .layer(middleware::from_fn_with_state(state.clone(), check_auth))
        .layer(middleware::from_fn(add_response_headers))
        .with_state(state)
}
