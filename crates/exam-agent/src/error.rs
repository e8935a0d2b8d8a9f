//! Error types for the exam agent.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Invalid startup configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A mandatory flag was left empty
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    /// The listener address is not `[host]:port`
    #[error("invalid listener address {addr:?}: {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Failures reported by a resource store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested object does not exist
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: &'static str,
        namespace: String,
        name: String,
    },

    /// The object changed concurrently
    #[error("{kind} {namespace}/{name} was modified concurrently")]
    Conflict {
        kind: &'static str,
        namespace: String,
        name: String,
    },

    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors surfaced to HTTP clients; each variant owns its status code and body
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Forbidden")]
    Forbidden,

    #[error("Bad request")]
    BadRequest,

    #[error("Not found")]
    NotFound,

    #[error("Error retrieving instance")]
    RetrieveFailed,

    #[error("Something went wrong. Please retry later")]
    EnvironmentFailed,

    #[error("Instance {0} cannot be saved")]
    SaveFailed(String),

    #[error("Error deleting instance")]
    DeleteFailed,

    /// Internal failure with no body
    #[error("")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::RetrieveFailed
            | Self::EnvironmentFailed
            | Self::SaveFailed(_)
            | Self::DeleteFailed
            | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(ApiError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::BadRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::SaveFailed("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_error_has_empty_body() {
        assert_eq!(ApiError::Internal.to_string(), "");
        assert_eq!(
            ApiError::SaveFailed("x".into()).to_string(),
            "Instance x cannot be saved"
        );
    }
}
