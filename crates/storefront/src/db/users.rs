//! User repository.
//!
//! User records live in the `users` collection keyed by uid. Email lookups
//! scan the collection.

use std::path::Path;

use tracing::instrument;

use flawless_core::{Email, UserId};

use super::{DocumentCollection, RepositoryError};
use crate::models::user::UserRecord;

/// Collection name for user records.
pub const USERS_COLLECTION: &str = "users";

/// Repository for user records.
#[derive(Debug, Clone)]
pub struct UserRepository {
    users: DocumentCollection<UserRecord>,
}

impl UserRepository {
    /// Open the user collection under `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Io` if the collection cannot be created.
    pub async fn open(data_dir: &Path) -> Result<Self, RepositoryError> {
        Ok(Self {
            users: DocumentCollection::open(data_dir, USERS_COLLECTION).await?,
        })
    }

    /// Get a user by uid.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the record cannot be read.
    pub async fn get_by_id(&self, uid: &UserId) -> Result<Option<UserRecord>, RepositoryError> {
        self.users.get(uid.as_str()).await
    }

    /// Get a user by email address. Emails compare case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the collection cannot be read.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<UserRecord>, RepositoryError> {
        let found = self
            .users
            .list()
            .await?
            .into_iter()
            .map(|(_, record)| record)
            .find(|record| record.email.same_account(email));
        Ok(found)
    }

    /// Store a new user record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or uid is taken.
    #[instrument(skip(self, record), fields(uid = %record.uid))]
    pub async fn create(&self, record: &UserRecord) -> Result<(), RepositoryError> {
        if self.get_by_email(&record.email).await?.is_some() {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        if self.get_by_id(&record.uid).await?.is_some() {
            return Err(RepositoryError::Conflict("uid already exists".to_owned()));
        }

        self.users.put(record.uid.as_str(), record).await
    }
}
