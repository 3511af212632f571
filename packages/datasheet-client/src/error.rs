//! Client error types.

use thiserror::Error;

/// Errors raised by datasheet operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Field key resolves to neither returned data nor known field metadata
    #[error("Field '{key}' does not exist")]
    UnknownField { key: String },

    /// Operation on a record handle whose row was deleted
    #[error("Record '{record_id}' was deleted")]
    RecordAlreadyDeleted { record_id: String },

    /// Query for exactly one record matched nothing
    #[error("Record does not exist")]
    RecordNotFound,

    /// Bulk write larger than the server accepts per request
    #[error("Cannot write {requested} records in one request (limit: {limit})")]
    BatchSizeExceeded { requested: usize, limit: usize },

    /// Malformed sort or filter parameters
    #[error("Invalid query: {0}")]
    QueryBuild(String),

    /// Server answered with `success: false`
    #[error("Remote operation failed: {message}")]
    RemoteOperationFailed { code: Option<u16>, message: String },

    /// Network or HTTP level failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Local file access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Field-key mode other than `name` or `id`
    #[error("Invalid field key mode: {0}")]
    InvalidFieldKey(String),
}

impl ClientError {
    /// Returns true for errors raised client-side before any request is sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ClientError::UnknownField { .. }
                | ClientError::RecordAlreadyDeleted { .. }
                | ClientError::BatchSizeExceeded { .. }
                | ClientError::QueryBuild(_)
                | ClientError::InvalidFieldKey(_)
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}

impl From<datasheet_types::ParseFieldKeyError> for ClientError {
    fn from(e: datasheet_types::ParseFieldKeyError) -> Self {
        ClientError::InvalidFieldKey(e.0)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
