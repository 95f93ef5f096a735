use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Contact not found")]
    ContactNotFound { id: Uuid },

    #[error("The email '{email}' has already been taken")]
    EmailAlreadyExists { email: String },

    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("{message}")]
    Database { message: String },
}

impl DomainError {
    pub fn contact_not_found(id: Uuid) -> Self {
        Self::ContactNotFound { id }
    }

    pub fn email_already_exists(email: impl Into<String>) -> Self {
        Self::EmailAlreadyExists {
            email: email.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
