//! Error taxonomy and the JSON error payloads returned to callers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

pub const NO_CATEGORIES: &str = "There are no categories to get.";
pub const CATEGORY_NOT_FOUND: &str = "Category not found.";

/// Classified failure of a repository operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CategoryError {
    /// The requested category (or any category at all) does not exist.
    #[error("{message}")]
    NotFound {
        /// Human readable message.
        message: String,
    },
    /// The store failed to execute a statement.
    #[error("{message}")]
    StorageFailure {
        /// Human readable message.
        message: String,
    },
}

impl CategoryError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn storage_failure(message: impl Into<String>) -> Self {
        Self::StorageFailure {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::StorageFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result type for repository operations.
pub type CategoryResult<T> = Result<T, CategoryError>;

/// `{"error": <message>}`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// `{"Unknown error": <message>}`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UnknownErrorBody {
    #[serde(rename = "Unknown error")]
    pub unknown_error: String,
}

/// Everything a request can fail with, as seen by the transport edge.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Classified by the repository; forwarded as-is.
    #[error(transparent)]
    Category(#[from] CategoryError),
    /// Anything that escaped classification.
    #[error("{message}")]
    Unclassified { message: String },
    #[error("Method not allowed.")]
    MethodNotAllowed,
    #[error("Not found.")]
    RouteNotFound,
}

impl ApiError {
    pub fn unclassified(message: impl Into<String>) -> Self {
        Self::Unclassified {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Category(err) => err.status(),
            Self::Unclassified { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::RouteNotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Unclassified { message } => (
                status,
                axum::Json(UnknownErrorBody {
                    unknown_error: message,
                }),
            )
                .into_response(),
            other => (
                status,
                axum::Json(ErrorBody {
                    error: other.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_errors_carry_their_status() {
        assert_eq!(
            CategoryError::not_found(CATEGORY_NOT_FOUND).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CategoryError::storage_failure("Error trying to get the category.").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_forwarded_category_error_keeps_message_and_status() {
        let err = ApiError::from(CategoryError::not_found(NO_CATEGORIES));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), NO_CATEGORIES);
    }

    #[test]
    fn test_unknown_error_body_uses_spaced_key() {
        let body = UnknownErrorBody {
            unknown_error: "boom".to_string(),
        };
        let value = serde_json::to_value(body).unwrap();
        assert_eq!(value, serde_json::json!({ "Unknown error": "boom" }));
    }

    #[test]
    fn test_unclassified_maps_to_500() {
        let response = ApiError::unclassified("expected value").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = ApiError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
