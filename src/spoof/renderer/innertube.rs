use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use super::{RendererSnapshot, RendererSource};
use crate::spoof::{catalog::ClientProfile, error::FetchError};

/// Queries the InnerTube player endpoint as the given client.
pub struct InnertubeRendererSource {
    http: reqwest::Client,
    api: String,
}

impl InnertubeRendererSource {
    pub fn new(api: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api: api.into().trim_end_matches('/').to_string(),
        })
    }

    fn build_context(profile: &ClientProfile) -> Value {
        json!({
            "client": {
                "clientName": profile.client_name,
                "clientVersion": profile.version,
                "deviceModel": profile.model,
                "osVersion": profile.os_version,
                "userAgent": profile.user_agent,
                "hl": "en",
                "gl": "US"
            },
            "user": { "lockedSafetyMode": false },
            "request": { "useSsl": true }
        })
    }

    pub fn player_url(&self) -> String {
        format!("{}/youtubei/v1/player?prettyPrint=false", self.api)
    }
}

#[async_trait]
impl RendererSource for InnertubeRendererSource {
    async fn fetch(
        &self,
        video_id: &str,
        profile: &'static ClientProfile,
    ) -> Result<RendererSnapshot, FetchError> {
        let body = json!({
            "context": Self::build_context(profile),
            "videoId": video_id,
            "contentCheckOk": true,
            "racyCheckOk": true
        });

        let res = self
            .http
            .post(self.player_url())
            .header("User-Agent", profile.user_agent)
            .header("X-YouTube-Client-Name", profile.id.to_string())
            .header("X-YouTube-Client-Version", profile.version)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let text = res.text().await?;
        let response: Value = serde_json::from_str(&text)?;
        debug!(
            "Player response for {} ({} bytes) as {}",
            video_id,
            text.len(),
            profile.client_name
        );

        Ok(RendererSnapshot::from_player_response(&response))
    }
}
