use axum::response::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub semver: String,
    pub build_time: u64,
    pub git_branch: String,
    pub git_commit: String,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            semver: env!("CARGO_PKG_VERSION").to_string(),
            build_time: option_env!("BUILD_TIME")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            git_branch: option_env!("GIT_BRANCH").unwrap_or("unknown").to_string(),
            git_commit: option_env!("GIT_COMMIT").unwrap_or("unknown").to_string(),
        }
    }
}

/// GET /version
pub async fn get_version() -> Json<VersionInfo> {
    tracing::debug!("GET /version");
    Json(VersionInfo::current())
}
