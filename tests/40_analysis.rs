mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn unknown_analysis_ids_get_the_default_payload() -> Result<()> {
    let app = common::spawn_app();

    let (status, first) = app.get("/api/artist-ai/status/does-not-exist", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        first,
        json!({
            "progress": 0,
            "message": "Initializing analysis...",
            "estimatedTime": 120000,
            "complete": false
        })
    );

    let (_, second) = app.get("/api/artist-ai/status/does-not-exist", None).await?;
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn analyze_requires_a_slug() -> Result<()> {
    let app = common::spawn_app();

    let (status, body) = app.post_json("/api/artist-ai/analyze", None, json!({})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "artistSlug is required");

    let (status, _) = app
        .post_json("/api/artist-ai/analyze", None, json!({"artistSlug": "../../etc"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn analyze_needs_service_credentials() -> Result<()> {
    let mut config = common::test_config();
    config.auth.service_role_key = None;
    let app = common::spawn_app_with(config);

    let (status, body) = app
        .post_json("/api/artist-ai/analyze", None, json!({"artistSlug": "nova"}))
        .await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    Ok(())
}

#[tokio::test]
async fn signed_in_analyses_are_owned_by_the_caller() -> Result<()> {
    let app = common::spawn_app();
    let (me, token) = app.user(None).await;

    let (status, body) = app
        .post_json("/api/artist-ai/analyze", Some(&token), json!({"artistSlug": "Nova"}))
        .await?;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["success"], true);
    let id = body["analysisId"].as_str().unwrap().to_string();

    let done = app.wait_for_analysis(&id).await?;
    assert_eq!(done["success"], true);
    assert_eq!(done["progress"], 100);

    let analysis = app.store.analysis(&id).await.unwrap();
    assert_eq!(analysis.user_id, Some(me));
    assert_eq!(analysis.artist_slug, "nova");
    assert_eq!(analysis.result["channels"]["spotify"]["growth"], 50);
    assert_eq!(analysis.result["totalFollowers"], 1350);
    Ok(())
}

#[tokio::test]
async fn failed_analyses_report_the_error() -> Result<()> {
    let app = common::spawn_app();

    let (_, body) = app
        .post_json("/api/artist-ai/analyze", None, json!({"artistSlug": "ghost"}))
        .await?;
    let id = body["analysisId"].as_str().unwrap().to_string();

    let done = app.wait_for_analysis(&id).await?;
    assert_eq!(done["success"], false);
    assert!(done["error"].as_str().unwrap().contains("ghost"));
    assert!(app.store.analysis(&id).await.is_none());
    Ok(())
}
