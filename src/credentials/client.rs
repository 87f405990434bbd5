//! Client-credentials grant.

use super::{fingerprint_of, AccessToken, Credentials, TokenEndpoint};
use crate::error::ApiError;
use async_trait::async_trait;
use serde::Deserialize;

/// Box app client credentials
#[derive(Clone, Deserialize)]
pub struct ClientCredentials {
    #[serde(rename = "client-id")]
    pub client_id: String,
    pub secret: String,
    /// Subject type sent as `box_subject_type`, e.g. `enterprise` or `user`.
    pub user: String,
    #[serde(rename = "user-id")]
    pub user_id: String,
    #[serde(rename = "enterprise-id")]
    pub enterprise_id: String,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("user", &self.user)
            .field("user_id", &self.user_id)
            .field("enterprise_id", &self.enterprise_id)
            .finish_non_exhaustive()
    }
}

impl ClientCredentials {
    pub fn validate(&self) -> Result<(), ApiError> {
        for (field, value) in [
            ("client-id", &self.client_id),
            ("secret", &self.secret),
            ("user", &self.user),
            ("user-id", &self.user_id),
            ("enterprise-id", &self.enterprise_id),
        ] {
            if value.trim().is_empty() {
                return Err(ApiError::ConfigError(format!(
                    "Invalid client credentials: {} is empty",
                    field
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Credentials for ClientCredentials {
    async fn authenticate(&self, endpoint: &TokenEndpoint) -> Result<AccessToken, ApiError> {
        endpoint
            .request(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.secret.as_str()),
                ("grant_type", "client_credentials"),
                ("box_subject_type", self.user.as_str()),
                ("box_subject_id", self.enterprise_id.as_str()),
            ])
            .await
    }

    fn fingerprint(&self) -> String {
        fingerprint_of(&[&self.client_id, &self.user_id, &self.enterprise_id])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ClientCredentials {
        ClientCredentials {
            client_id: "cid".to_string(),
            secret: "hunter2".to_string(),
            user: "enterprise".to_string(),
            user_id: "u1".to_string(),
            enterprise_id: "e1".to_string(),
        }
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        assert!(sample().validate().is_ok());

        let mut creds = sample();
        creds.enterprise_id = " ".to_string();
        let err = creds.validate().unwrap_err();
        assert!(err.to_string().contains("enterprise-id"));
    }

    #[test]
    fn test_fingerprint_ignores_secret() {
        let mut other = sample();
        other.secret = "rotated".to_string();
        assert_eq!(sample().fingerprint(), other.fingerprint());
        assert!(!format!("{:?}", sample()).contains("hunter2"));
    }
}
