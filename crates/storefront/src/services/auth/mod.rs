//! Customer identity.
//!
//! [`IdentityProvider`] is the port the rest of the storefront talks to:
//! email/password sign-in and sign-up, sign-out, password reset, federated
//! login and a current-user stream. [`LocalIdentityProvider`] implements it
//! over the `users` collection with Argon2 password hashes and keeps the
//! signed-in uid in device storage so a session survives restarts.

mod error;

pub use error::AuthError;

use std::fmt;
use std::future::Future;
use std::num::NonZeroU32;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use flawless_core::{Email, UserId};

use crate::cart::KeyValueStore;
use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::{UserProfile, UserRecord};

/// Storage key holding the signed-in uid.
pub const SESSION_STORAGE_KEY: &str = "session";

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Attempts allowed per email before throttling kicks in.
const ATTEMPT_BURST: NonZeroU32 = NonZeroU32::MIN.saturating_add(4);

/// Federated sign-in providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FederatedProvider {
    Google,
    Facebook,
    Apple,
}

impl fmt::Display for FederatedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Google => write!(f, "google"),
            Self::Facebook => write!(f, "facebook"),
            Self::Apple => write!(f, "apple"),
        }
    }
}

impl std::str::FromStr for FederatedProvider {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "facebook" => Ok(Self::Facebook),
            "apple" => Ok(Self::Apple),
            other => Err(AuthError::ProviderUnavailable(other.to_owned())),
        }
    }
}

/// A sign-up request.
#[derive(Debug)]
pub struct SignUp {
    pub email: String,
    pub password: SecretString,
    pub display_name: String,
    pub phone_number: String,
}

/// Authentication operations the storefront depends on.
pub trait IdentityProvider: Send + Sync {
    /// Sign in with email and password.
    fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<UserProfile, AuthError>> + Send;

    /// Create an account, store its user record and sign it in.
    fn sign_up(&self, request: SignUp)
    -> impl Future<Output = Result<UserProfile, AuthError>> + Send;

    /// Sign out the current user. Signing out while signed out is a no-op.
    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>> + Send;

    /// Ask the provider to send a password reset email.
    fn send_password_reset(&self, email: &str)
    -> impl Future<Output = Result<(), AuthError>> + Send;

    /// Sign in through a federated provider.
    fn sign_in_with_provider(
        &self,
        provider: FederatedProvider,
    ) -> impl Future<Output = Result<UserProfile, AuthError>> + Send;

    /// The signed-in user, if any.
    fn current_user(&self) -> Option<UserProfile>;

    /// A stream of current-user changes. The receiver starts at the current value.
    fn subscribe(&self) -> watch::Receiver<Option<UserProfile>>;
}

// =============================================================================
// Local Provider
// =============================================================================

/// [`IdentityProvider`] backed by the local user collection.
pub struct LocalIdentityProvider<S: KeyValueStore> {
    users: UserRepository,
    session: S,
    current: watch::Sender<Option<UserProfile>>,
    attempts: DefaultKeyedRateLimiter<String>,
}

impl<S: KeyValueStore> fmt::Debug for LocalIdentityProvider<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalIdentityProvider")
            .field("users", &self.users)
            .field("current", &*self.current.borrow())
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> LocalIdentityProvider<S> {
    /// Create the provider, restoring a persisted session.
    ///
    /// A session whose user record no longer exists is dropped.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` or `AuthError::Repository` if the session
    /// or user record cannot be read.
    pub async fn open(users: UserRepository, session: S) -> Result<Self, AuthError> {
        let mut current = None;

        if let Some(uid) = session.get(SESSION_STORAGE_KEY)? {
            match users.get_by_id(&UserId::new(uid.trim())).await? {
                Some(record) => current = Some(record.profile()),
                None => {
                    warn!(uid = %uid.trim(), "Session refers to unknown user, signing out");
                    session.remove(SESSION_STORAGE_KEY)?;
                }
            }
        }

        let quota = Quota::per_minute(NonZeroU32::MIN).allow_burst(ATTEMPT_BURST);

        Ok(Self {
            users,
            session,
            current: watch::channel(current).0,
            attempts: RateLimiter::keyed(quota),
        })
    }

    fn throttle(&self, email: &str) -> Result<(), AuthError> {
        // Emails whose allowance has fully refilled carry no state.
        self.attempts.retain_recent();

        let key = email.trim().to_ascii_lowercase();
        self.attempts
            .check_key(&key)
            .map_err(|_| AuthError::TooManyRequests)
    }

    fn start_session(&self, profile: UserProfile) -> Result<(), AuthError> {
        self.session
            .set(SESSION_STORAGE_KEY, profile.uid.as_str())?;
        self.current.send_replace(Some(profile));
        Ok(())
    }
}

impl<S: KeyValueStore> IdentityProvider for LocalIdentityProvider<S> {
    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<UserProfile, AuthError> {
        self.throttle(email)?;
        let email = Email::parse(email)?;

        let record = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(password.expose_secret(), &record.password_hash)?;

        let profile = record.profile();
        self.start_session(profile.clone())?;
        info!(uid = %profile.uid, "Signed in");

        Ok(profile)
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn sign_up(&self, request: SignUp) -> Result<UserProfile, AuthError> {
        let email = Email::parse(&request.email)?;
        validate_password(request.password.expose_secret())?;
        let password_hash = hash_password(request.password.expose_secret())?;

        let record = UserRecord {
            uid: UserId::generate(),
            email,
            display_name: non_empty(request.display_name),
            phone_number: non_empty(request.phone_number),
            password_hash,
            created_at: Utc::now(),
        };

        self.users.create(&record).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::EmailAlreadyInUse,
            other => AuthError::Repository(other),
        })?;

        let profile = record.profile();
        self.start_session(profile.clone())?;
        info!(uid = %profile.uid, "Account created");

        Ok(profile)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.session.remove(SESSION_STORAGE_KEY)?;
        if self.current.send_replace(None).is_some() {
            info!("Signed out");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        self.throttle(email)?;
        let email = Email::parse(email)?;

        let record = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        // No mail transport is configured for local accounts.
        info!(uid = %record.uid, "Password reset requested");
        Ok(())
    }

    async fn sign_in_with_provider(
        &self,
        provider: FederatedProvider,
    ) -> Result<UserProfile, AuthError> {
        Err(AuthError::ProviderUnavailable(provider.to_string()))
    }

    fn current_user(&self) -> Option<UserProfile> {
        self.current.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<UserProfile>> {
        self.current.subscribe()
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_owned())
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cart::MemoryStore;

    async fn provider(
        dir: &std::path::Path,
        session: Arc<MemoryStore>,
    ) -> LocalIdentityProvider<Arc<MemoryStore>> {
        let users = UserRepository::open(dir).await.unwrap();
        LocalIdentityProvider::open(users, session).await.unwrap()
    }

    fn sign_up_request(email: &str) -> SignUp {
        SignUp {
            email: email.to_owned(),
            password: SecretString::from("hunter22"),
            display_name: "Ama Mensah".to_owned(),
            phone_number: "+233201234567".to_owned(),
        }
    }

    #[test]
    fn test_validate_password() {
        assert!(matches!(
            validate_password("12345"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("  ".to_owned()), None);
        assert_eq!(non_empty(" Ama ".to_owned()).as_deref(), Some("Ama"));
    }

    #[test]
    fn test_federated_provider_parse() {
        assert_eq!(
            "Google".parse::<FederatedProvider>().unwrap(),
            FederatedProvider::Google
        );
        assert!("myspace".parse::<FederatedProvider>().is_err());
    }

    #[tokio::test]
    async fn test_sign_up_signs_in_and_persists_session() {
        let dir = tempfile::tempdir().unwrap();
        let session = Arc::new(MemoryStore::new());
        let auth = provider(dir.path(), Arc::clone(&session)).await;
        let mut changes = auth.subscribe();

        let profile = auth.sign_up(sign_up_request("ama@example.com")).await.unwrap();
        assert_eq!(profile.display_name.as_deref(), Some("Ama Mensah"));
        assert_eq!(auth.current_user(), Some(profile.clone()));
        assert!(changes.has_changed().unwrap());
        assert_eq!(*changes.borrow_and_update(), Some(profile.clone()));

        let restored = provider(dir.path(), session).await;
        assert_eq!(restored.current_user(), Some(profile));
    }

    #[tokio::test]
    async fn test_duplicate_sign_up_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let auth = provider(dir.path(), Arc::new(MemoryStore::new())).await;

        auth.sign_up(sign_up_request("ama@example.com")).await.unwrap();
        let err = auth
            .sign_up(sign_up_request("ama@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailAlreadyInUse));
    }

    #[tokio::test]
    async fn test_sign_out_then_sign_in() {
        let dir = tempfile::tempdir().unwrap();
        let auth = provider(dir.path(), Arc::new(MemoryStore::new())).await;
        auth.sign_up(sign_up_request("ama@example.com")).await.unwrap();

        auth.sign_out().await.unwrap();
        assert_eq!(auth.current_user(), None);

        let wrong = auth
            .sign_in("ama@example.com", &SecretString::from("nope-nope"))
            .await
            .unwrap_err();
        assert!(matches!(wrong, AuthError::InvalidCredentials));

        let profile = auth
            .sign_in("ama@example.com", &SecretString::from("hunter22"))
            .await
            .unwrap();
        assert_eq!(auth.current_user(), Some(profile));
    }

    #[tokio::test]
    async fn test_unknown_email_sign_in_is_invalid_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let auth = provider(dir.path(), Arc::new(MemoryStore::new())).await;

        let err = auth
            .sign_in("ghost@example.com", &SecretString::from("whatever"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_repeated_attempts_are_throttled() {
        let dir = tempfile::tempdir().unwrap();
        let auth = provider(dir.path(), Arc::new(MemoryStore::new())).await;
        let password = SecretString::from("whatever");

        for _ in 0..5 {
            let err = auth.sign_in("ghost@example.com", &password).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials));
        }
        let err = auth.sign_in("GHOST@example.com", &password).await.unwrap_err();
        assert!(matches!(err, AuthError::TooManyRequests));
    }

    #[tokio::test]
    async fn test_pruning_keeps_live_throttles() {
        let dir = tempfile::tempdir().unwrap();
        let auth = provider(dir.path(), Arc::new(MemoryStore::new())).await;
        let password = SecretString::from("whatever");

        for _ in 0..5 {
            let _ = auth.sign_in("ghost@example.com", &password).await;
        }
        for other in ["a@example.com", "b@example.com", "c@example.com"] {
            let err = auth.sign_in(other, &password).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials));
        }

        assert_eq!(auth.attempts.len(), 4);
        let err = auth.sign_in("ghost@example.com", &password).await.unwrap_err();
        assert!(matches!(err, AuthError::TooManyRequests));
    }

    #[tokio::test]
    async fn test_password_reset() {
        let dir = tempfile::tempdir().unwrap();
        let auth = provider(dir.path(), Arc::new(MemoryStore::new())).await;
        auth.sign_up(sign_up_request("ama@example.com")).await.unwrap();

        assert!(auth.send_password_reset("ama@example.com").await.is_ok());
        assert!(matches!(
            auth.send_password_reset("kofi@example.com").await,
            Err(AuthError::UserNotFound)
        ));
        assert!(matches!(
            auth.send_password_reset("not-an-email").await,
            Err(AuthError::InvalidEmail(_))
        ));
    }

    #[tokio::test]
    async fn test_federated_login_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let auth = provider(dir.path(), Arc::new(MemoryStore::new())).await;

        let err = auth
            .sign_in_with_provider(FederatedProvider::Google)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn test_stale_session_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let session = Arc::new(MemoryStore::with_entry(SESSION_STORAGE_KEY, "gone"));
        let auth = provider(dir.path(), Arc::clone(&session)).await;

        assert_eq!(auth.current_user(), None);
        assert_eq!(session.get(SESSION_STORAGE_KEY).unwrap(), None);
    }
}
