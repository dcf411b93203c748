//! Authentication error types.

use thiserror::Error;

use crate::cart::StorageError;
use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] flawless_core::EmailError),

    /// Wrong password, or no account for the email at sign-in.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No account for the email.
    #[error("user not found")]
    UserNotFound,

    /// An account already uses this email.
    #[error("email already in use")]
    EmailAlreadyInUse,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Too many attempts for this account.
    #[error("too many requests")]
    TooManyRequests,

    /// The identity service could not be reached. Only remote providers
    /// return this; [`super::LocalIdentityProvider`] never does.
    #[error("network error: {0}")]
    Network(String),

    /// Sign-in method not supported by this provider.
    #[error("sign-in provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// User record store failed.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Session storage failed.
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// The message shown to the customer.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidEmail(_) => "Please enter a valid email address.",
            Self::InvalidCredentials => "Invalid email or password. Please try again.",
            Self::UserNotFound => "No account found with this email address.",
            Self::EmailAlreadyInUse => "An account with this email already exists.",
            Self::WeakPassword(_) => "Password should be at least 6 characters.",
            Self::TooManyRequests => "Too many requests. Please try again later.",
            Self::Network(_) => "Network error. Please check your connection and try again.",
            Self::ProviderUnavailable(_) => "This sign-in method is not available.",
            Self::Repository(_) | Self::Storage(_) | Self::PasswordHash => {
                "An unexpected error occurred. Please try again."
            }
        }
    }
}
