//! Service-account authentication for the spreadsheet API.
//!
//! The key's RSA private key signs a short-lived JWT assertion which is exchanged
//! at `token_uri` for an OAuth access token (the "JWT bearer" grant). Tokens are
//! cached until shortly before they expire.

use std::fmt;

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::error::{SheetsError, SheetsResult};
use crate::config::ConfigError;
use crate::constants::{DEFAULT_TOKEN_URI, SHEETS_SCOPE};

const ASSERTION_LIFETIME_SECS: i64 = 3600;
const EXPIRY_MARGIN_SECS: i64 = 60;
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The subset of a downloaded service-account key file that authentication needs.
#[derive(Clone, Default, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(default)]
    pub client_email: String,
    #[serde(default)]
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let key: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::InvalidCredentials {
                reason: format!("credentials are not valid JSON: {e}"),
            })?;
        key.validate()?;
        Ok(key)
    }

    /// Checks the fields needed to sign an assertion are present and the key parses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_email.trim().is_empty() {
            return Err(ConfigError::InvalidCredentials {
                reason: "missing client_email".to_string(),
            });
        }
        if self.private_key.trim().is_empty() {
            return Err(ConfigError::InvalidCredentials {
                reason: "missing private_key".to_string(),
            });
        }
        self.encoding_key()
            .map_err(|e| ConfigError::InvalidCredentials {
                reason: e.to_string(),
            })?;
        Ok(())
    }

    fn encoding_key(&self) -> SheetsResult<EncodingKey> {
        EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| SheetsError::Auth(format!("unusable private key: {e}")))
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: i64,
}

/// Access-token source backed by a service-account key.
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    http: HttpClient,
    cached: Mutex<Option<CachedToken>>,
}

impl fmt::Debug for ServiceAccountAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountAuth")
            .field("key", &self.key)
            .finish()
    }
}

impl ServiceAccountAuth {
    pub fn new(key: ServiceAccountKey, http: HttpClient) -> Self {
        Self {
            key,
            http,
            cached: Mutex::new(None),
        }
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Returns a valid access token, exchanging a fresh assertion when needed.
    pub async fn access_token(&self) -> SheetsResult<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now().timestamp();

        if let Some(token) = cached.as_ref() {
            if token.expires_at - EXPIRY_MARGIN_SECS > now {
                return Ok(token.value.clone());
            }
            debug!("Cached access token expired");
        }

        let token = self.exchange(now).await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Signs the JWT assertion for `now`.
    pub fn signed_assertion(&self, now: i64) -> SheetsResult<String> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        jsonwebtoken::encode(&header, &claims, &self.key.encoding_key()?)
            .map_err(|e| SheetsError::Auth(format!("failed to sign assertion: {e}")))
    }

    async fn exchange(&self, now: i64) -> SheetsResult<CachedToken> {
        let assertion = self.signed_assertion(now)?;

        let resp = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| SheetsError::Auth(format!("token request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SheetsError::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| SheetsError::Auth(format!("invalid token response: {e}")))?;

        let expires_in = token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);
        info!(
            client_email = %self.key.client_email,
            expires_in,
            "Obtained spreadsheet access token"
        );

        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + expires_in,
        })
    }
}
