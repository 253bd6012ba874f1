use serde::{Deserialize, Serialize};

use crate::spoof::{ClientFields, PlayerType, SelectionDecision, tracking::TrackingParameterSet};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadRequest {
    pub video_id: String,
    pub parameters: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResponse {
    pub parameters: Option<String>,
    pub decision: Option<SelectionDecision>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UriBody {
    pub uri: String,
}

#[derive(Debug, Deserialize)]
pub struct CpnRequest {
    pub cpn: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct FormatBody {
    pub format: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ColorBody {
    pub color: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientResponse {
    pub enabled: bool,
    /// Taken from `decision` when spoofing, the host's values otherwise.
    #[serde(flatten)]
    pub fields: ClientFields,
    pub decision: Option<SelectionDecision>,
    pub tracking: TrackingParameterSet,
    pub allow_vp9: bool,
    pub allow_av1: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerQuery {
    pub player_type: PlayerType,
    #[serde(default)]
    pub gesture: bool,
    #[serde(default)]
    pub speed_menu: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerFlags {
    pub player_gesture: bool,
    pub playback_speed_menu: bool,
    pub background_playback: bool,
    pub seekbar_tapping: bool,
    pub hide_time_and_seekbar: bool,
}

#[derive(Debug, Deserialize)]
pub struct HistoryCheckRequest {
    pub connected: bool,
}

#[derive(Debug, Serialize)]
pub struct HistoryCheckResponse {
    pub started: bool,
}
