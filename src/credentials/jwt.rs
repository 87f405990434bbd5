//! JWT assertion grant.
//!
//! Signs a short-lived RS512 assertion with the app's encrypted PKCS#8 key and
//! exchanges it at the token endpoint.

use super::{fingerprint_of, AccessToken, Credentials, TokenEndpoint};
use crate::error::ApiError;
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use pkcs8::{DecodePrivateKey, EncodePrivateKey, LineEnding};
use serde::{Deserialize, Serialize};

const ASSERTION_LIFETIME_SECS: i64 = 60;
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppAuth {
    #[serde(rename = "publicKeyID")]
    public_key_id: String,
    private_key: String,
    passphrase: String,
}

#[derive(Clone, Deserialize)]
struct AppSettings {
    #[serde(rename = "clientID")]
    client_id: String,
    #[serde(rename = "clientSecret")]
    client_secret: String,
    #[serde(rename = "appAuth")]
    app_auth: AppAuth,
}

/// Box app settings as exported by the developer console
#[derive(Clone, Deserialize)]
pub struct JwtCredentials {
    #[serde(rename = "boxAppSettings")]
    settings: AppSettings,
    #[serde(rename = "enterpriseID")]
    enterprise_id: String,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    box_sub_type: &'a str,
    aud: &'a str,
    jti: String,
    exp: i64,
}

impl std::fmt::Debug for JwtCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtCredentials")
            .field("client_id", &self.settings.client_id)
            .field("public_key_id", &self.settings.app_auth.public_key_id)
            .field("enterprise_id", &self.enterprise_id)
            .finish_non_exhaustive()
    }
}

impl JwtCredentials {
    pub fn validate(&self) -> Result<(), ApiError> {
        for (field, value) in [
            ("clientID", &self.settings.client_id),
            ("clientSecret", &self.settings.client_secret),
            ("publicKeyID", &self.settings.app_auth.public_key_id),
            ("privateKey", &self.settings.app_auth.private_key),
            ("enterpriseID", &self.enterprise_id),
        ] {
            if value.trim().is_empty() {
                return Err(ApiError::ConfigError(format!(
                    "Invalid JWT credentials: {} is empty",
                    field
                )));
            }
        }
        Ok(())
    }

    fn signing_key(&self) -> Result<EncodingKey, ApiError> {
        let auth = &self.settings.app_auth;
        let key = rsa::RsaPrivateKey::from_pkcs8_encrypted_pem(
            &auth.private_key,
            auth.passphrase.as_bytes(),
        )
        .map_err(|e| ApiError::AuthError(format!("Invalid private key: {}", e)))?;

        let pem = key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| ApiError::AuthError(format!("Invalid private key: {}", e)))?;

        EncodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| ApiError::AuthError(format!("Invalid private key: {}", e)))
    }

    /// Build the signed assertion for `audience` (the token endpoint URL).
    pub fn assertion(&self, audience: &str) -> Result<String, ApiError> {
        let key = self.signing_key()?;

        let mut header = Header::new(Algorithm::RS512);
        header.kid = Some(self.settings.app_auth.public_key_id.clone());

        let claims = AssertionClaims {
            iss: &self.settings.client_id,
            sub: &self.enterprise_id,
            box_sub_type: "enterprise",
            aud: audience,
            jti: uuid::Uuid::new_v4().to_string(),
            exp: Utc::now().timestamp() + ASSERTION_LIFETIME_SECS,
        };

        jsonwebtoken::encode(&header, &claims, &key)
            .map_err(|e| ApiError::AuthError(format!("Failed to sign assertion: {}", e)))
    }
}

#[async_trait]
impl Credentials for JwtCredentials {
    async fn authenticate(&self, endpoint: &TokenEndpoint) -> Result<AccessToken, ApiError> {
        let assertion = self.assertion(endpoint.url())?;
        endpoint
            .request(&[
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])
            .await
    }

    fn fingerprint(&self) -> String {
        fingerprint_of(&[
            &self.settings.client_id,
            &self.settings.app_auth.public_key_id,
            &self.enterprise_id,
        ])
    }
}
