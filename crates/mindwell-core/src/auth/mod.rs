//! Account creation and sign-in against a remote identity provider.
//!
//! After an account is created its profile (`email`, `name`, `createdAt`)
//! is written to the record store under `users/<uid>`. The signed-in
//! session is persisted too, so it survives restarts until sign-out.

mod firebase;

pub use firebase::FirebaseAuth;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, CoreError, ValidationError};
use crate::storage::{keys, load_json, save_json, RecordStore};

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user_id: String,
    pub email: String,
    pub id_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_account(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;
    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// Revoke a session with the provider. Token-based providers have no
    /// server-side state to clear.
    async fn sign_out(&self, _session: &AuthSession) -> Result<(), AuthError> {
        Ok(())
    }
}

pub struct AccountService<P> {
    provider: P,
    current: Option<AuthSession>,
}

impl<P: IdentityProvider> AccountService<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&AuthSession> {
        self.current.as_ref()
    }

    /// The session persisted by the last sign-in, if still signed in.
    pub fn stored_session(store: &dyn RecordStore) -> Result<Option<AuthSession>, CoreError> {
        Ok(load_json::<Option<AuthSession>>(store, keys::AUTH_SESSION)?.flatten())
    }

    /// Pick up the persisted session, replacing any in-memory one.
    pub fn restore(&mut self, store: &dyn RecordStore) -> Result<Option<&AuthSession>, CoreError> {
        self.current = Self::stored_session(store)?;
        Ok(self.current.as_ref())
    }

    /// Register a new account and store its profile. The new account is
    /// not signed in.
    pub async fn create_account(
        &self,
        store: &dyn RecordStore,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthSession, CoreError> {
        let email = validate_email(email)?;
        if password.is_empty() {
            return Err(invalid("password", "must not be empty").into());
        }
        let session = self.provider.create_account(email, password).await?;
        let profile = UserProfile {
            email: email.to_string(),
            name: name.trim().to_string(),
            created_at: Utc::now(),
        };
        save_json(store, &keys::user_profile(&session.user_id), &profile)?;
        tracing::info!(user_id = %session.user_id, "account created");
        Ok(session)
    }

    pub async fn sign_in(
        &mut self,
        store: &dyn RecordStore,
        email: &str,
        password: &str,
    ) -> Result<&AuthSession, CoreError> {
        let email = validate_email(email)?;
        let session = self.provider.sign_in(email, password).await?;
        save_json(store, keys::AUTH_SESSION, &session)?;
        tracing::info!(user_id = %session.user_id, "signed in");
        Ok(&*self.current.insert(session))
    }

    /// Sign the current user out with the provider and clear the
    /// persisted session. The user stays signed in if either step fails.
    pub async fn sign_out(&mut self, store: &dyn RecordStore) -> Result<AuthSession, CoreError> {
        let session = self.current.clone().ok_or(AuthError::NotSignedIn)?;
        self.provider.sign_out(&session).await?;
        save_json(store, keys::AUTH_SESSION, &None::<AuthSession>)?;
        self.current = None;
        tracing::info!(user_id = %session.user_id, "signed out");
        Ok(session)
    }

    pub async fn send_password_reset(&self, email: &str) -> Result<(), CoreError> {
        let email = validate_email(email)?;
        self.provider.send_password_reset(email).await?;
        Ok(())
    }

    pub fn profile(store: &dyn RecordStore, user_id: &str) -> Result<Option<UserProfile>, CoreError> {
        load_json(store, &keys::user_profile(user_id))
    }
}

fn invalid(field: &str, message: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn validate_email(email: &str) -> Result<&str, ValidationError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(invalid("email", "must be an email address")),
    }
}
