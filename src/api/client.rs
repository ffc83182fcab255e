//! HTTP client for the brickhub registry API.
//!
//! This module provides the `RegistryClient` struct for the three remote
//! exchanges the session manager needs: password-grant and refresh-grant
//! token requests, and authenticated brick bundle uploads.

use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL for the hosted brickhub registry.
const REGISTRY_BASE_URL: &str = "https://registry.brickhub.dev";

/// Path for both password-grant and refresh-grant token requests.
const OAUTH_TOKEN_PATH: &str = "/api/v1/oauth/token";

/// Path for brick bundle uploads.
const BRICKS_PATH: &str = "/api/v1/bricks";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Token payload returned by a successful grant exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Token lifetime in seconds from the moment of issue.
    pub expires_in: i64,
}

/// Registry API client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct RegistryClient {
    client: Client,
    base_url: String,
}

impl RegistryClient {
    /// Create a client pointed at the hosted registry.
    pub fn new() -> Result<Self, ApiError> {
        Self::with_host(REGISTRY_BASE_URL)
    }

    /// Create a client pointed at an arbitrary host (ephemeral test servers).
    pub fn with_host(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Exchange a username and password for a token payload.
    pub async fn password_grant(
        &self,
        username: &str,
        password: &str,
    ) -> Result<TokenResponse, ApiError> {
        let body = serde_json::json!({
            "grant_type": "password",
            "username": username,
            "password": password,
        });
        self.token_request(&body).await
    }

    /// Exchange a refresh token for a fresh token payload.
    pub async fn refresh_grant(&self, refresh_token: &str) -> Result<TokenResponse, ApiError> {
        let body = serde_json::json!({
            "grant_type": "refresh_token",
            "refresh_token": refresh_token,
        });
        self.token_request(&body).await
    }

    async fn token_request(&self, body: &serde_json::Value) -> Result<TokenResponse, ApiError> {
        let url = format!("{}{}", self.base_url, OAUTH_TOKEN_PATH);
        debug!(url = %url, "Sending token request");

        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        let text = response.text().await?;
        if status != StatusCode::OK {
            debug!(status = %status, "Token request rejected");
            return Err(ApiError::from_response(&text));
        }

        serde_json::from_str(&text).map_err(|_| ApiError::MalformedBody)
    }

    /// Upload a brick bundle with the given bearer credentials.
    /// Success is strictly 201 Created.
    pub async fn publish(
        &self,
        token_type: &str,
        access_token: &str,
        bundle: Vec<u8>,
    ) -> Result<(), ApiError> {
        let url = format!("{}{}", self.base_url, BRICKS_PATH);
        debug!(url = %url, bytes = bundle.len(), "Uploading brick bundle");

        let response = self
            .client
            .post(&url)
            .header(
                header::AUTHORIZATION,
                format!("{} {}", token_type, access_token),
            )
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(bundle)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let text = response.text().await.unwrap_or_default();
            debug!(status = %status, "Publish rejected");
            return Err(ApiError::from_response(&text));
        }

        Ok(())
    }
}
