mod common;

use anyhow::Result;
use axum::http::StatusCode;

#[tokio::test]
async fn root_describes_the_service() -> Result<()> {
    let app = common::spawn_app();
    let (status, body) = app.get("/", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Artist OS API");
    Ok(())
}

#[tokio::test]
async fn health_pings_the_database() -> Result<()> {
    let app = common::spawn_app();
    let (status, body) = app.get("/health", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn invalid_session_tokens_are_treated_as_anonymous() -> Result<()> {
    let app = common::spawn_app();
    let (status, body) = app.get("/api/debug/test-db", Some("garbage")).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Not authenticated");
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn test_db_reports_each_table() -> Result<()> {
    let app = common::spawn_app();
    let (_, token) = app.user(None).await;

    let (status, body) = app.get("/api/debug/test-db", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["connection"]["ok"], true);
    assert_eq!(body["data"]["profile"]["found"], true);
    assert_eq!(body["data"]["tables"]["fan_engagement"]["rows"], 0);
    assert_eq!(body["data"]["serviceRole"], true);
    Ok(())
}
