//! Durable authorization record and its on-disk store.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::TokenResponse;

/// Directory under the platform config dir holding brickhub state.
const APP_DIR: &str = "brickhub";

/// Credentials file name in the config directory.
const CREDENTIALS_FILE: &str = "credentials.json";

/// Safety margin before expiry, in seconds.
/// A token valid at check time could still expire mid-flight during the
/// following network call; treating anything within a minute of expiry as
/// expired closes that window.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// The durable authorization record issued by a grant exchange.
///
/// Created whole from a token response, replaced whole on refresh, and
/// deleted on logout; individual fields are never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

impl Credentials {
    /// Build credentials from a grant response, anchoring `expires_at` to the
    /// receipt instant. The expiry is never recomputed after this point.
    /// A lifetime outside chrono's representable range saturates toward the
    /// matching extreme rather than failing; the server controls `expires_in`
    /// and must not be able to crash the client with it.
    pub fn from_token_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        let expires_at = Duration::try_seconds(response.expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or(if response.expires_in.is_negative() {
                DateTime::<Utc>::MIN_UTC
            } else {
                DateTime::<Utc>::MAX_UTC
            });

        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            token_type: response.token_type,
            expires_at,
        }
    }

    /// Whether the credentials are expired (or close enough to expiry that a
    /// dependent network call could outlive them).
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

/// File-backed store for the single persisted credentials record.
///
/// When the platform cannot resolve a config directory the store holds no
/// path and every operation degrades to "nothing persisted" - the session
/// still works in memory for the process lifetime.
pub struct CredentialStore {
    path: Option<PathBuf>,
}

impl CredentialStore {
    /// Store rooted at the platform config directory.
    pub fn new() -> Self {
        Self {
            path: dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CREDENTIALS_FILE)),
        }
    }

    /// Store rooted at an explicit directory (tests, custom layouts).
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(dir.into().join(CREDENTIALS_FILE)),
        }
    }

    /// Store that never persists anything.
    pub fn ephemeral() -> Self {
        Self { path: None }
    }

    /// Load the persisted record. Absent, unreadable, or malformed files all
    /// yield `None` - a stale record is treated the same as no record.
    pub fn load(&self) -> Option<Credentials> {
        let path = self.path.as_ref()?;
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(credentials) => Some(credentials),
            Err(e) => {
                debug!(error = %e, "Ignoring malformed credentials file");
                None
            }
        }
    }

    /// Persist the record, creating the parent directory if needed.
    /// Always a whole-file overwrite.
    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create credentials directory")?;
        }
        let contents = serde_json::to_string_pretty(credentials)?;
        std::fs::write(path, contents).context("Failed to write credentials file")?;
        Ok(())
    }

    /// Remove the persisted record if one exists.
    pub fn clear(&self) -> Result<()> {
        if let Some(path) = self.path.as_ref() {
            if path.exists() {
                std::fs::remove_file(path).context("Failed to remove credentials file")?;
            }
        }
        Ok(())
    }

    /// Whether a persisted record currently exists on disk.
    pub fn exists(&self) -> bool {
        self.path.as_ref().map(|p| p.exists()).unwrap_or(false)
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}
