#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use serde_json::Value;
use tower::util::ServiceExt;
use uuid::Uuid;

use artist_os_api::auth::gateway::AuthSessionUser;
use artist_os_api::auth::{issue_token, AuthError, AuthGateway, AuthSession, Claims};
use artist_os_api::config::{AppConfig, DatabaseBackend};
use artist_os_api::database::models::Profile;
use artist_os_api::database::MemoryStore;
use artist_os_api::services::viberate::{ChannelSnapshot, ProviderArtist, ProviderError};
use artist_os_api::services::ArtistDataProvider;
use artist_os_api::{build_router, AppState};

pub const GOOD_CODE: &str = "good-code";
pub const MULTIPART_BOUNDARY: &str = "artist-os-test-boundary";

/// Accepts only [`GOOD_CODE`] and signs everyone in as `user_id`
pub struct FakeGateway {
    pub user_id: Uuid,
}

#[async_trait]
impl AuthGateway for FakeGateway {
    async fn exchange_code(&self, code: &str, _code_verifier: Option<&str>) -> Result<AuthSession, AuthError> {
        if code != GOOD_CODE {
            return Err(AuthError::Exchange("invalid grant".to_string()));
        }
        Ok(AuthSession {
            access_token: format!("access-{}", self.user_id),
            refresh_token: None,
            expires_in: 3600,
            user: AuthSessionUser {
                id: self.user_id,
                email: Some("fan@artist.os".to_string()),
            },
        })
    }
}

/// Knows one artist, "nova", with a short follower history
pub struct FakeProvider;

#[async_trait]
impl ArtistDataProvider for FakeProvider {
    async fn artist_by_slug(&self, slug: &str) -> Result<ProviderArtist, ProviderError> {
        if slug != "nova" {
            return Err(ProviderError::NotFound(format!("artist '{}'", slug)));
        }
        Ok(ProviderArtist {
            uuid: "vb-nova".to_string(),
            name: "Nova".to_string(),
            slug: "nova".to_string(),
            image: None,
            genre: Some("synthpop".to_string()),
        })
    }

    async fn fan_history(&self, _artist_id: &str) -> Result<Vec<ChannelSnapshot>, ProviderError> {
        let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
        Ok(vec![
            ChannelSnapshot { date: day(1), channel: "spotify".into(), followers: 1000 },
            ChannelSnapshot { date: day(2), channel: "spotify".into(), followers: 1050 },
            ChannelSnapshot { date: day(2), channel: "instagram".into(), followers: 300 },
        ])
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub config: AppConfig,
    /// The user the fake auth gateway signs in
    pub gateway_user: Uuid,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.database.backend = DatabaseBackend::Memory;
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.auth.service_role_key = Some("test-service-role".to_string());
    config
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(test_config())
}

pub fn spawn_app_with(config: AppConfig) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let gateway_user = Uuid::new_v4();
    let state = AppState::new(
        config.clone(),
        store.clone(),
        Arc::new(FakeGateway { user_id: gateway_user }),
        Arc::new(FakeProvider),
    );

    TestApp {
        router: build_router(state),
        store,
        config,
        gateway_user,
    }
}

impl TestApp {
    pub fn token_for(&self, user_id: Uuid) -> String {
        let claims = Claims::new(user_id, None, &self.config.auth.jwt_audience, 1);
        issue_token(&claims, &self.config.auth.jwt_secret).expect("token")
    }

    /// A signed-in user with a profile row, and their token
    pub async fn user(&self, role: Option<&str>) -> (Uuid, String) {
        let id = Uuid::new_v4();
        let mut profile = Profile::new(id, Some(format!("{}@artist.os", id.simple())));
        profile.global_role = role.map(str::to_string);
        self.store.insert_profile(profile).await;
        (id, self.token_for(id))
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.expect("router is infallible")
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        let response = self.send(get(path, token)).await;
        let status = response.status();
        Ok((status, body_json(response).await?))
    }

    pub async fn post_json(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        let mut builder = Request::post(path).header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let response = self.send(builder.body(Body::from(body.to_string()))?).await;
        let status = response.status();
        Ok((status, body_json(response).await?))
    }

    /// Poll the status endpoint until the analysis reports completion
    pub async fn wait_for_analysis(&self, id: &str) -> Result<Value> {
        for _ in 0..200 {
            let (_, body) = self.get(&format!("/api/artist-ai/status/{}", id), None).await?;
            if body["complete"] == Value::Bool(true) {
                return Ok(body);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        anyhow::bail!("analysis {} did not complete", id)
    }
}

pub fn get(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("request")
}

pub async fn body_bytes(response: Response<Body>) -> Result<Vec<u8>> {
    Ok(axum::body::to_bytes(response.into_body(), usize::MAX).await?.to_vec())
}

pub async fn body_json(response: Response<Body>) -> Result<Value> {
    let bytes = body_bytes(response).await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// multipart/form-data body from `(name, filename, content)` parts
pub fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
        body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/csv\r\n\r\n",
                    name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}

pub fn upload(token: Option<&str>, kind: Option<&str>, file: Option<&[u8]>) -> Request<Body> {
    let mut parts: Vec<(&str, Option<&str>, &[u8])> = Vec::new();
    if let Some(kind) = kind {
        parts.push(("type", None, kind.as_bytes()));
    }
    if let Some(file) = file {
        parts.push(("file", Some("metrics.csv"), file));
    }

    let mut builder = Request::post("/api/import/csv").header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
    );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(multipart_body(&parts))).expect("request")
}
