//! Caller identity verification.
//!
//! Routes that require identity pull a `Bearer <token>` credential from the
//! Authorization header and hand it to the verifier. The real verifier calls
//! the identity provider's tokeninfo endpoint and checks the audience; tests
//! substitute a fake through the trait.

use crate::config::AuthConfig;
use async_trait::async_trait;
use serde_json::Value;
use subtrim_shared::ApiError;
use tracing::debug;

/// Verified claims for one request. Never persisted.
#[derive(Debug, Clone)]
pub struct IdentityClaims {
    pub email: Option<String>,
    pub subject: Option<String>,
}

/// Pull the token out of an Authorization header value. The scheme match is
/// case-insensitive; a missing or malformed header is a caller error,
/// distinct from a token the provider rejects.
pub fn bearer_token(header: Option<&str>) -> Result<&str, ApiError> {
    let value = header
        .ok_or_else(|| ApiError::Unauthenticated("missing Authorization header".to_string()))?;
    let mut parts = value.trim().splitn(2, char::is_whitespace);
    let scheme = parts.next().unwrap_or("");
    let token = parts.next().map(str::trim).unwrap_or("");
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(ApiError::Unauthenticated(
            "malformed Authorization header".to_string(),
        ));
    }
    Ok(token)
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<IdentityClaims, ApiError>;
}

/// Verifier backed by the identity provider's tokeninfo endpoint.
pub struct TokeninfoVerifier {
    client_id: Option<String>,
    endpoint: String,
    client: reqwest::Client,
}

impl TokeninfoVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            client_id: config.idp_client_id.clone(),
            endpoint: config.tokeninfo_endpoint.clone(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for TokeninfoVerifier {
    async fn verify(&self, token: &str) -> Result<IdentityClaims, ApiError> {
        let client_id = self
            .client_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ApiError::Misconfigured("identity audience is not configured".to_string())
            })?;

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("id_token", token)])
            .send()
            .await
            .map_err(|e| ApiError::Upstream(format!("identity verification failed: {e}")))?;

        if !response.status().is_success() {
            debug!("tokeninfo rejected token: {}", response.status());
            return Err(ApiError::Unauthenticated("identity token rejected".to_string()));
        }

        let claims: Value = response
            .json()
            .await
            .map_err(|e| ApiError::Upstream(format!("tokeninfo response unreadable: {e}")))?;

        let audience = claims.get("aud").and_then(|a| a.as_str()).unwrap_or("");
        if audience != client_id {
            return Err(ApiError::Unauthenticated("token audience mismatch".to_string()));
        }

        Ok(IdentityClaims {
            email: claims
                .get("email")
                .and_then(|e| e.as_str())
                .map(str::to_string),
            subject: claims
                .get("sub")
                .and_then(|s| s.as_str())
                .map(str::to_string),
        })
    }
}
