use thiserror::Error;

pub type Result<T> = std::result::Result<T, FinsightsError>;

/// Failures surfaced by the client. Panels and chat degrade on these instead
/// of propagating them; upload flows stop on them.
#[derive(Error, Debug)]
pub enum FinsightsError {
    #[error("could not read document: {0}")]
    Read(String),

    #[error("content digest failed: {0}")]
    Hash(String),

    #[error("unsupported file type {mime_type} for {filename}, only PDF statements are accepted")]
    UnsupportedFile { filename: String, mime_type: String },

    #[error("request to {endpoint} failed: {message}")]
    Network { endpoint: String, message: String },

    #[error("malformed response: {0}")]
    Parse(String),

    #[error("No Id present: the document has not been submitted yet")]
    MissingIdentity,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("no document selected: upload a statement first")]
    NoDocument,
}

impl FinsightsError {
    pub fn network(endpoint: &str, message: impl std::fmt::Display) -> Self {
        Self::Network {
            endpoint: endpoint.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<rusqlite::Error> for FinsightsError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for FinsightsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
