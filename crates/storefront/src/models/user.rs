//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use flawless_core::{Email, UserId};

/// The signed-in customer as the rest of the storefront sees them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Identity provider's user id.
    pub uid: UserId,
    /// Sign-in email.
    pub email: Email,
    /// Name given at sign-up.
    pub display_name: Option<String>,
    /// Phone number given at sign-up.
    pub phone_number: Option<String>,
}

/// Stored user document (`users/<uid>.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub uid: UserId,
    pub email: Email,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// The public part of the record.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            uid: self.uid.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            phone_number: self.phone_number.clone(),
        }
    }
}
