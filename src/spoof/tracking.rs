use serde::Serialize;
use url::Url;

use super::error::RewriteError;

/// Watch history endpoint the rebuilt tracking request is sent to.
pub const VIDEO_STATS_PLAYBACK_URI: &str =
    "https://www.youtube.com/api/stats/playback?ns=yt&ver=2&final=1";

const PARAM_DOC_ID: &str = "docid";
const PARAM_LEN: &str = "len";
const PARAM_CPN: &str = "cpn";
const PARAM_EVENT_ID: &str = "ei";
const PARAM_VM: &str = "vm";
const PARAM_OF: &str = "of";

/// Values captured from the player's own tracking requests, used to rebuild
/// a playback stats request the spoofed client would not send itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingParameterSet {
    pub doc_id: String,
    pub len: String,
    pub cpn: String,
    pub event_id: String,
    pub visitor_monitoring_data: String,
    pub of_param: String,
}

/// Whether a tracking url is one the parameters are captured from.
pub fn is_capturable(uri: &Url) -> bool {
    let path = uri.path();
    path.contains("playback") || path.contains("watchtime")
}

fn first_query_value(uri: &Url, key: &str) -> String {
    uri.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

impl TrackingParameterSet {
    /// Replaces every url-derived field with the values in `uri`. Missing
    /// parameters become empty. The nonce is reported separately and kept.
    pub fn observed(&self, uri: &Url) -> Self {
        Self {
            doc_id: first_query_value(uri, PARAM_DOC_ID),
            len: first_query_value(uri, PARAM_LEN),
            cpn: self.cpn.clone(),
            event_id: first_query_value(uri, PARAM_EVENT_ID),
            visitor_monitoring_data: first_query_value(uri, PARAM_VM),
            of_param: first_query_value(uri, PARAM_OF),
        }
    }

    pub fn is_complete(&self) -> bool {
        [
            &self.doc_id,
            &self.len,
            &self.cpn,
            &self.event_id,
            &self.visitor_monitoring_data,
            &self.of_param,
        ]
        .iter()
        .all(|v| !v.is_empty())
    }

    pub fn playback_url(&self) -> Result<String, RewriteError> {
        let mut url = Url::parse(VIDEO_STATS_PLAYBACK_URI)?;
        url.query_pairs_mut()
            .append_pair(PARAM_DOC_ID, &self.doc_id)
            .append_pair(PARAM_LEN, &self.len)
            .append_pair(PARAM_CPN, &self.cpn)
            .append_pair(PARAM_EVENT_ID, &self.event_id)
            .append_pair(PARAM_VM, &self.visitor_monitoring_data)
            .append_pair(PARAM_OF, &self.of_param);
        Ok(url.to_string())
    }
}
