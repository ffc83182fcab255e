//! Session state machine for the registry: login, logout, refresh, publish.
//!
//! A `Session` is either Anonymous (no credentials) or Authenticated
//! (credentials plus the identity derived from them). It is the sole mutator
//! of the credential store, and every network exchange goes through the
//! registry client it was constructed with.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::RegistryClient;

use super::claims::{self, User};
use super::{CredentialStore, Credentials};

/// Message used when a gated operation is attempted while Anonymous.
const NOT_LOGGED_IN_MESSAGE: &str = "Not logged in.";

/// Time source for expiry checks; injectable so tests can pin the clock.
pub type Clock = fn() -> DateTime<Utc>;

/// Failure kinds for the session operations. Each carries only the
/// caller-facing message; transport, status, and parse failures for an
/// operation all collapse into that operation's kind.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("login failed: {0}")]
    LoginFailed(String),

    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("publish failed: {0}")]
    PublishFailed(String),
}

impl AuthError {
    /// The underlying message, without the operation prefix.
    pub fn message(&self) -> &str {
        match self {
            AuthError::LoginFailed(m) | AuthError::RefreshFailed(m) | AuthError::PublishFailed(m) => m,
        }
    }
}

/// The registry session. Owns the in-memory credentials and identity.
pub struct Session {
    client: RegistryClient,
    store: CredentialStore,
    clock: Clock,
    credentials: Option<Credentials>,
    user: Option<User>,
}

impl Session {
    /// Create a session, restoring any persisted identity.
    ///
    /// A missing, unreadable, or malformed credentials file - or one whose
    /// token no longer decodes - starts the session Anonymous; construction
    /// itself never fails.
    pub fn new(client: RegistryClient, store: CredentialStore) -> Self {
        Self::with_clock(client, store, Utc::now)
    }

    /// Like [`Session::new`] with an explicit time source.
    pub fn with_clock(client: RegistryClient, store: CredentialStore, clock: Clock) -> Self {
        let mut session = Self {
            client,
            store,
            clock,
            credentials: None,
            user: None,
        };
        session.restore();
        session
    }

    fn restore(&mut self) {
        let Some(credentials) = self.store.load() else {
            return;
        };
        match claims::derive_user(&credentials) {
            Ok(user) => {
                debug!(email = %user.email, "Restored persisted session");
                self.credentials = Some(credentials);
                self.user = Some(user);
            }
            Err(e) => {
                debug!(error = %e, "Ignoring persisted credentials with undecodable token");
            }
        }
    }

    /// Authenticate with a password grant and transition to Authenticated.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        let response = self
            .client
            .password_grant(email, password)
            .await
            .map_err(|e| AuthError::LoginFailed(e.message()))?;

        let credentials = Credentials::from_token_response(response, (self.clock)());
        let user =
            claims::derive_user(&credentials).map_err(|e| AuthError::LoginFailed(e.to_string()))?;

        self.commit(credentials, user.clone());
        Ok(user)
    }

    /// Drop the current identity and remove the persisted record.
    /// Idempotent; logging out while Anonymous is a no-op.
    pub fn logout(&mut self) {
        self.credentials = None;
        self.user = None;
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Could not remove persisted credentials");
        }
    }

    /// The current identity, if Authenticated. Pure in-memory read.
    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Upload a brick bundle, refreshing expired credentials first.
    ///
    /// Fails with [`AuthError::PublishFailed`] in every case: while
    /// Anonymous, when the transparent refresh fails (the refresh message is
    /// preserved), and when the upload itself is rejected.
    pub async fn publish(&mut self, bundle: &[u8]) -> Result<(), AuthError> {
        let Some(mut credentials) = self.credentials.clone() else {
            return Err(AuthError::PublishFailed(NOT_LOGGED_IN_MESSAGE.to_string()));
        };

        if credentials.is_expired((self.clock)()) {
            debug!("Credentials expired, refreshing before publish");
            credentials = self.refresh().await.map_err(|e| match e {
                AuthError::RefreshFailed(message) => AuthError::PublishFailed(message),
                other => other,
            })?;
        }

        self.client
            .publish(&credentials.token_type, &credentials.access_token, bundle.to_vec())
            .await
            .map_err(|e| AuthError::PublishFailed(e.message()))
    }

    /// Exchange the current refresh token for fresh credentials.
    ///
    /// Normally invoked transparently by [`Session::publish`]. On failure the
    /// session stays Authenticated with the stale credentials - it never
    /// downgrades to Anonymous on its own; the caller decides whether to
    /// retry or log out.
    pub async fn refresh(&mut self) -> Result<Credentials, AuthError> {
        let refresh_token = self
            .credentials
            .as_ref()
            .map(|c| c.refresh_token.clone())
            .ok_or_else(|| AuthError::RefreshFailed(NOT_LOGGED_IN_MESSAGE.to_string()))?;

        let response = self
            .client
            .refresh_grant(&refresh_token)
            .await
            .map_err(|e| AuthError::RefreshFailed(e.message()))?;

        let credentials = Credentials::from_token_response(response, (self.clock)());
        let user = claims::derive_user(&credentials)
            .map_err(|e| AuthError::RefreshFailed(e.to_string()))?;

        self.commit(credentials.clone(), user);
        Ok(credentials)
    }

    /// Replace the in-memory state and persist the new record.
    ///
    /// Called only after the user derived successfully, so memory and storage
    /// can never disagree about whether an identity exists. A persistence
    /// failure downgrades durability, not the login: the session keeps
    /// working in memory and the failure is logged.
    fn commit(&mut self, credentials: Credentials, user: User) {
        if let Err(e) = self.store.save(&credentials) {
            warn!(error = %e, "Could not persist credentials; session is in-memory only");
        }
        self.credentials = Some(credentials);
        self.user = Some(user);
    }
}
