//! Credentials
//!
//! Obtains a bearer token for the Box API. The credentials file selects one of two
//! flows by shape:
//!
//! ```json
//! { "box": { "client": { "client-id": "...", "secret": "...", ... } } }
//! { "box": { "jwt": { "boxAppSettings": { ... }, "enterpriseID": "..." } } }
//! ```
//!
//! Each flow also yields an account fingerprint used to bind checkpoints to the
//! account that produced them. The fingerprint never contains secrets.

pub mod client;
pub mod jwt;

pub use client::ClientCredentials;
pub use jwt::JwtCredentials;

use crate::config::ApiConfig;
use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Tokens are renewed this long before they expire.
const RENEWAL_WINDOW_MINUTES: i64 = 10;

/// Bearer token with its expiry
#[derive(Clone)]
pub struct AccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    pub fn expiring_in(token: impl Into<String>, seconds: i64) -> Self {
        Self::new(token, Utc::now() + Duration::seconds(seconds))
    }

    /// Valid until within the renewal window of expiry.
    pub fn is_valid(&self) -> bool {
        let renew = Utc::now() + Duration::minutes(RENEWAL_WINDOW_MINUTES);
        !self.token.is_empty() && self.expires_at > renew
    }

    pub fn secret(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// An authentication flow
#[async_trait]
pub trait Credentials: Send + Sync {
    async fn authenticate(&self, endpoint: &TokenEndpoint) -> Result<AccessToken, ApiError>;

    /// Stable, secret-free identifier of the account these credentials act as.
    fn fingerprint(&self) -> String;
}

/// OAuth2 token endpoint shared by both flows
pub struct TokenEndpoint {
    http: reqwest::Client,
    url: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: i64,
}

impl TokenEndpoint {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            url: config.token_url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST a form-encoded grant and decode the token reply.
    pub async fn request(&self, form: &[(&str, &str)]) -> Result<AccessToken, ApiError> {
        let response = self
            .http
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(form)
            .send()
            .await
            .map_err(|e| ApiError::AuthError(format!("Token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::AuthError(format!(
                "Authorization request failed ({})",
                status
            )));
        }

        let reply: TokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::AuthError(format!("Malformed token response: {}", e)))?;

        debug!(expires_in = reply.expires_in, "Obtained access token");
        Ok(AccessToken::expiring_in(reply.access_token, reply.expires_in))
    }
}

/// Credentials selected by the shape of the credentials file
#[derive(Debug, Clone)]
pub enum BoxCredentials {
    Client(ClientCredentials),
    Jwt(JwtCredentials),
}

#[derive(Deserialize)]
struct CredentialsFile {
    #[serde(rename = "box")]
    section: BoxSection,
}

#[derive(Deserialize)]
struct BoxSection {
    #[serde(default)]
    client: Option<ClientCredentials>,
    #[serde(default)]
    jwt: Option<JwtCredentials>,
}

impl BoxCredentials {
    pub fn load(path: &Path) -> Result<Self, ApiError> {
        let bytes = std::fs::read(path).map_err(|e| {
            ApiError::ConfigError(format!(
                "Failed to read credentials {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&bytes).map_err(|e| match e {
            ApiError::ConfigError(msg) => {
                ApiError::ConfigError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, ApiError> {
        let file: CredentialsFile = serde_json::from_slice(bytes)
            .map_err(|e| ApiError::ConfigError(format!("Invalid credentials: {}", e)))?;

        match (file.section.client, file.section.jwt) {
            (Some(client), _) => {
                client.validate()?;
                Ok(BoxCredentials::Client(client))
            }
            (None, Some(jwt)) => {
                jwt.validate()?;
                Ok(BoxCredentials::Jwt(jwt))
            }
            (None, None) => Err(ApiError::ConfigError(
                "No valid credentials (expected box.client or box.jwt)".to_string(),
            )),
        }
    }
}

#[async_trait]
impl Credentials for BoxCredentials {
    async fn authenticate(&self, endpoint: &TokenEndpoint) -> Result<AccessToken, ApiError> {
        match self {
            BoxCredentials::Client(c) => c.authenticate(endpoint).await,
            BoxCredentials::Jwt(j) => j.authenticate(endpoint).await,
        }
    }

    fn fingerprint(&self) -> String {
        match self {
            BoxCredentials::Client(c) => c.fingerprint(),
            BoxCredentials::Jwt(j) => j.fingerprint(),
        }
    }
}

pub(crate) fn fingerprint_of(parts: &[&str]) -> String {
    hex::encode(blake3::hash(parts.join(":").as_bytes()).as_bytes())
}
