use crate::client::ApiResponse;
use thiserror::Error;

/// Error types for the KE-chain customization engine
///
/// Every failure is raised before any mutation or I/O, except [`KeChainError::Api`]
/// which reports a push the remote platform refused.
#[derive(Debug, Error)]
pub enum KeChainError {
    /// Caller input outside the contract: wrong type, bad enum value, failed cross-field check
    #[error("Illegal argument: {0}")]
    IllegalArgument(String),

    /// A required value is missing, or an operation has nothing to act on
    #[error("Value error: {0}")]
    Value(String),

    /// A serialized document names a `vtype`, `effect`, `rtype` or widget that does not exist
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// An identifier did not resolve via the client
    #[error("Not found: {0}")]
    NotFound(String),

    /// A JSON document failed its schema
    #[error("Schema validation error: {0}")]
    Schema(String),

    /// The remote platform answered a push with a non-success status
    #[error("API error: {message} ({response})")]
    Api {
        message: String,
        response: ApiResponse,
    },

    /// Malformed JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KeChainError {
    pub fn illegal_argument(message: impl Into<String>) -> Self {
        Self::IllegalArgument(message.into())
    }

    pub fn api(message: impl Into<String>, response: ApiResponse) -> Self {
        Self::Api {
            message: message.into(),
            response,
        }
    }

    /// True for argument-kind failures, which are raised before anything is mutated
    pub fn is_argument_error(&self) -> bool {
        matches!(self, KeChainError::IllegalArgument(_))
    }

    /// The response of a refused push, if this is an API error
    pub fn response(&self) -> Option<&ApiResponse> {
        match self {
            KeChainError::Api { response, .. } => Some(response),
            _ => None,
        }
    }
}
