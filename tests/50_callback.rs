mod common;

use anyhow::Result;
use axum::http::{header, StatusCode};
use serde_json::json;

#[tokio::test]
async fn without_code_redirects_straight_to_target() -> Result<()> {
    let app = common::spawn_app();

    let response = app
        .send(common::get("/auth/callback?redirect_to=/dashboard", None))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response).as_deref(), Some("/dashboard"));
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let response = app.send(common::get("/auth/callback", None)).await;
    assert_eq!(common::location(&response).as_deref(), Some("/"));
    Ok(())
}

#[tokio::test]
async fn foreign_redirect_targets_are_ignored() -> Result<()> {
    let app = common::spawn_app();

    let response = app
        .send(common::get(
            "/auth/callback?code=good-code&redirect_to=https://evil.example/",
            None,
        ))
        .await;
    assert_eq!(common::location(&response).as_deref(), Some("/"));
    Ok(())
}

#[tokio::test]
async fn failed_exchange_goes_back_to_login() -> Result<()> {
    let app = common::spawn_app();

    let response = app
        .send(common::get("/auth/callback?code=expired&redirect_to=/dashboard", None))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        common::location(&response).as_deref(),
        Some("/login?error=auth_callback_failed")
    );

    let login = common::location(&response).unwrap();
    let page = app.send(common::get(&login, None)).await;
    let body = String::from_utf8(common::body_bytes(page).await?)?;
    assert!(body.contains("Sign-in could not be completed"));
    Ok(())
}

#[tokio::test]
async fn successful_exchange_sets_the_session_cookie() -> Result<()> {
    let app = common::spawn_app();

    let response = app
        .send(common::get("/auth/callback?code=good-code&redirect_to=/dashboard", None))
        .await;
    assert_eq!(common::location(&response).as_deref(), Some("/dashboard"));

    let cookies: Vec<String> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect();
    let session = cookies
        .iter()
        .find(|c| c.starts_with("sb-access-token="))
        .expect("session cookie");
    assert!(session.contains(&format!("access-{}", app.gateway_user)));
    assert!(session.contains("HttpOnly"));
    assert!(session.contains("Path=/"));
    Ok(())
}

#[tokio::test]
async fn token_claims_an_anonymous_analysis() -> Result<()> {
    let app = common::spawn_app();

    let (_, body) = app
        .post_json("/api/artist-ai/analyze", None, json!({"artistSlug": "nova"}))
        .await?;
    let id = body["analysisId"].as_str().unwrap().to_string();
    app.wait_for_analysis(&id).await?;
    assert!(app.store.analysis(&id).await.unwrap().user_id.is_none());

    let response = app
        .send(common::get(
            &format!("/auth/callback?code=good-code&token={}&redirect_to=/dashboard", id),
            None,
        ))
        .await;
    assert_eq!(common::location(&response).as_deref(), Some("/dashboard"));
    assert_eq!(app.store.analysis(&id).await.unwrap().user_id, Some(app.gateway_user));
    Ok(())
}

#[tokio::test]
async fn claim_failures_do_not_block_sign_in() -> Result<()> {
    let app = common::spawn_app();

    let response = app
        .send(common::get(
            "/auth/callback?code=good-code&token=no-such-analysis&redirect_to=/dashboard",
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response).as_deref(), Some("/dashboard"));
    assert!(response.headers().get(header::SET_COOKIE).is_some());
    Ok(())
}
