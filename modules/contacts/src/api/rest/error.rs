use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use crate::domain::error::DomainError;

/// Error half of the response envelope: a status code plus `{"message"}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    /// Map a domain error to the wire, prefixing unexpected failures with
    /// the operation context ("Failed to create contact: ...").
    pub fn from_domain(context: &str, e: DomainError) -> Self {
        match e {
            DomainError::Validation { .. } | DomainError::EmailAlreadyExists { .. } => Self {
                status: StatusCode::BAD_REQUEST,
                message: e.to_string(),
            },
            DomainError::ContactNotFound { .. } => Self {
                status: StatusCode::NOT_FOUND,
                message: "Contact not found".to_string(),
            },
            DomainError::Database { message } => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: format!("{context}: {message}"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn not_found_uses_fixed_message() {
        let err = ApiError::from_domain(
            "Failed to retrieve contact",
            DomainError::contact_not_found(Uuid::new_v4()),
        );
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Contact not found");
    }

    #[test]
    fn duplicate_email_is_a_client_error() {
        let err = ApiError::from_domain(
            "Failed to create contact",
            DomainError::email_already_exists("a@b.com"),
        );
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "The email 'a@b.com' has already been taken");
    }

    #[test]
    fn database_errors_carry_context_and_detail() {
        let err = ApiError::from_domain(
            "Failed to delete contact",
            DomainError::database("connection reset"),
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Failed to delete contact: connection reset");
    }
}
