use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::auth::AuthError;
use crate::config::AuthConfig;

/// Session returned by the auth service after a successful code exchange
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    pub user: AuthSessionUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSessionUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// The hosted auth service, as far as this backend needs it
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Trade a one-time auth code (PKCE flow) for a session
    async fn exchange_code(&self, code: &str, code_verifier: Option<&str>) -> Result<AuthSession, AuthError>;
}

/// HTTP client for the hosted auth service's token endpoint
pub struct HostedAuthGateway {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl HostedAuthGateway {
    pub fn new(config: &AuthConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        }
    }
}

#[async_trait]
impl AuthGateway for HostedAuthGateway {
    async fn exchange_code(&self, code: &str, code_verifier: Option<&str>) -> Result<AuthSession, AuthError> {
        if self.anon_key.is_empty() {
            return Err(AuthError::NotConfigured("AUTH_ANON_KEY"));
        }

        let url = format!("{}/token?grant_type=pkce", self.base_url);
        debug!("Exchanging auth code at {}", url);

        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&json!({
                "auth_code": code,
                "code_verifier": code_verifier,
            }))
            .send()
            .await
            .map_err(|e| AuthError::Exchange(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Exchange(format!("{}: {}", status, body)));
        }

        response
            .json::<AuthSession>()
            .await
            .map_err(|e| AuthError::Exchange(format!("unreadable session: {}", e)))
    }
}
