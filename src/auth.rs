/// Identity provider
///
/// Exposes "current user id, or none" plus email/password registration and
/// sign-in. `LocalAuth` keeps accounts in a `UserStore` and persists the
/// signed-in user in the key-value store so a session survives restarts.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::analytics::CACHE_KEY;
use crate::domain::UserId;
use crate::storage::{KeyValueStore, StorageError, UserRecord, UserStore};

/// Key holding the signed-in user id
pub const SESSION_KEY: &str = "auth_session";

const MIN_PASSWORD_LEN: usize = 6;

/// Errors from authentication operations
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Password must be at least 6 characters")]
    WeakPassword,

    #[error("Email already in use: {0}")]
    EmailInUse(String),

    #[error("Wrong email or password")]
    InvalidCredentials,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The signed-in user, if any
    fn current_user(&self) -> Option<UserId>;

    /// Create an account and sign it in
    async fn register(&self, email: &str, password: &str) -> Result<UserId, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserId, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Email/password accounts stored locally
pub struct LocalAuth {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn KeyValueStore>,
    current: Mutex<Option<UserId>>,
}

impl LocalAuth {
    /// Create the provider and pick up a previously persisted session
    pub async fn restore(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn KeyValueStore>,
    ) -> Result<Self, AuthError> {
        let current = sessions.get(SESSION_KEY).await?.map(UserId);
        if let Some(user) = &current {
            tracing::debug!("Restored session for user {}", user);
        }

        Ok(Self {
            users,
            sessions,
            current: Mutex::new(current),
        })
    }

    fn current(&self) -> MutexGuard<'_, Option<UserId>> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn start_session(&self, user_id: UserId) -> Result<UserId, AuthError> {
        if self.current_user().as_ref() != Some(&user_id) {
            self.forget_insights().await?;
        }
        self.sessions.set(SESSION_KEY, user_id.as_str()).await?;
        *self.current() = Some(user_id.clone());
        tracing::info!("Signed in as {}", user_id);
        Ok(user_id)
    }

    /// The insight slot is shared by every account on this store
    async fn forget_insights(&self) -> Result<(), AuthError> {
        self.sessions.remove(CACHE_KEY).await?;
        tracing::debug!("Cleared cached insight for session change");
        Ok(())
    }

    fn normalize_email(email: &str) -> Result<String, AuthError> {
        let email = email.trim().to_lowercase();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
            _ => Err(AuthError::InvalidEmail(email)),
        }
    }

    fn digest(salt: &str, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(b":");
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl AuthProvider for LocalAuth {
    fn current_user(&self) -> Option<UserId> {
        self.current().clone()
    }

    async fn register(&self, email: &str, password: &str) -> Result<UserId, AuthError> {
        let email = Self::normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        let salt = Uuid::new_v4().simple().to_string();
        let record = UserRecord {
            id: UserId::generate(),
            email: email.clone(),
            password_hash: Self::digest(&salt, password),
            salt,
            created_at: Utc::now(),
        };

        if !self.users.insert_user(&record).await? {
            return Err(AuthError::EmailInUse(email));
        }

        tracing::info!("Registered user {}", record.id);
        self.start_session(record.id).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserId, AuthError> {
        let email = Self::normalize_email(email)?;
        let user = self
            .users
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if Self::digest(&user.salt, password) != user.password_hash {
            tracing::debug!("Password mismatch for {}", email);
            return Err(AuthError::InvalidCredentials);
        }

        self.start_session(user.id).await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.sessions.remove(SESSION_KEY).await?;
        self.forget_insights().await?;
        *self.current() = None;
        tracing::info!("Signed out");
        Ok(())
    }
}
