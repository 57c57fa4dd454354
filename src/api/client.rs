//! HTTP client for the POS auth service.
//!
//! `AuthClient` implements the `AuthService` capability over the backend's
//! REST endpoints using JWT bearer token authentication.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::User;

use super::ApiError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Login credentials submitted to the auth service.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Successful login: the bearer token plus the authenticated user.
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub token: String,
    pub user: User,
}

/// Result of a token verification call.
#[derive(Debug, Clone)]
pub struct Verification {
    pub valid: bool,
    /// Server-refreshed user record, when the response carries one.
    pub user: Option<User>,
}

/// Remote authentication capability consumed by the session store.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchange credentials for a bearer token and user record.
    async fn login(&self, credentials: &Credentials) -> Result<SessionGrant, ApiError>;

    /// Invalidate the token server-side. Best-effort: the session store
    /// clears local state regardless of the outcome.
    async fn logout(&self, token: &str) -> Result<(), ApiError>;

    /// Check whether the token is still accepted by the server.
    async fn verify(&self, token: &str) -> Result<Verification, ApiError>;
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
    user: Option<User>,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    valid: bool,
    #[serde(default)]
    user: Option<User>,
}

/// Auth client for the POS backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    /// Create a client for the service at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Check if the response is successful, mapping failures into the
    /// error taxonomy with the response body attached.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}

#[async_trait]
impl AuthService for AuthClient {
    async fn login(&self, credentials: &Credentials) -> Result<SessionGrant, ApiError> {
        let url = format!("{}/auth/login", self.base_url);
        debug!(username = %credentials.username, "Sending login request");

        let response = self.client.post(&url).json(credentials).send().await?;
        let response = Self::check_response(response).await?;

        let body: LoginResponse = response.json().await?;
        match (body.token, body.user) {
            (Some(token), Some(user)) => Ok(SessionGrant { token, user }),
            _ => Err(ApiError::InvalidResponse(
                "Login response missing token or user".to_string(),
            )),
        }
    }

    async fn logout(&self, token: &str) -> Result<(), ApiError> {
        let url = format!("{}/auth/logout", self.base_url);
        let response = self.client.post(&url).bearer_auth(token).send().await?;
        Self::check_response(response).await?;
        Ok(())
    }

    async fn verify(&self, token: &str) -> Result<Verification, ApiError> {
        let url = format!("{}/auth/verify", self.base_url);
        let response = self.client.get(&url).bearer_auth(token).send().await?;
        let response = Self::check_response(response).await?;

        let body: VerifyResponse = response.json().await?;
        Ok(Verification {
            valid: body.valid,
            user: body.user,
        })
    }
}
