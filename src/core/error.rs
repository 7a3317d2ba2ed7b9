use super::types::RecordId;
use crate::edit::{EditAction, EditState};
use thiserror::Error;

/// Failure talking to the remote data source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemoteError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Server responded with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("Failed to load records: {0}")]
    FetchFailed(RemoteError),

    #[error("Failed to save changes: {0}")]
    SubmitFailed(RemoteError),

    #[error("Failed to load totals: {0}")]
    TotalsFailed(RemoteError),

    #[error("Record '{0}' not found")]
    NotFound(RecordId),

    #[error("Cannot {action} record '{id}' while it is {state}")]
    InvalidTransition {
        id: RecordId,
        state: EditState,
        action: EditAction,
    },

    #[error("Page {requested} is out of range (1..={total_pages})")]
    PageOutOfRange { requested: u32, total_pages: u32 },

    #[error("A save is already in progress")]
    SubmitInProgress,

    #[error("Unknown editable field '{0}'")]
    UnknownField(String),

    #[error("Invalid value '{value}' for field '{field}'")]
    InvalidValue { field: String, value: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GridError>;
