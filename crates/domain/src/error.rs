//! Domain error types.

use store::StoreError;
use thiserror::Error;

use crate::policy::Denial;
use crate::validation::ValidationErrors;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The operation needs an authenticated caller.
    #[error("Authentication credentials were not provided.")]
    Unauthenticated,

    /// A bearer token matched no active user.
    #[error("Invalid token.")]
    InvalidToken,

    /// Login failed: unknown email, wrong password or inactive account.
    #[error("No active account found with the given credentials")]
    InvalidCredentials,

    /// The caller's role or ownership does not permit the operation.
    #[error("{0}")]
    Forbidden(Denial),

    /// The owner tried to edit an order that has left `Pending`.
    #[error("Cannot update an order that is in transit or delivered.")]
    EditLocked,

    /// One or more request fields failed validation.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The request body was not valid JSON.
    #[error("JSON parse error - {0}")]
    MalformedBody(String),

    /// The referenced entity does not exist, or is hidden from the caller.
    #[error("No {entity} matches the given query.")]
    NotFound { entity: &'static str },

    /// The requested page lies past the end of the result set.
    #[error("Invalid page.")]
    InvalidPage,

    /// An error occurred in the store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A stored row could not be turned into a domain value.
    #[error("Corrupt {entity} data: {reason}")]
    DataCorruption {
        entity: &'static str,
        reason: String,
    },

    /// The password hasher failed.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

impl DomainError {
    pub(crate) fn order_not_found() -> Self {
        DomainError::NotFound { entity: "Order" }
    }

    pub(crate) fn user_not_found() -> Self {
        DomainError::NotFound { entity: "User" }
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        DomainError::Validation(errors)
    }
}

impl From<Denial> for DomainError {
    fn from(denial: Denial) -> Self {
        DomainError::Forbidden(denial)
    }
}
