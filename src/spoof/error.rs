use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown client profile '{0}'")]
    UnknownProfile(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("player request failed with status {0}")]
    Status(u16),
    #[error("malformed player response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("invalid uri: {0}")]
    InvalidUri(#[from] url::ParseError),
}
