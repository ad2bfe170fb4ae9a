mod common;

use anyhow::Result;
use axum::http::{header, StatusCode};
use serde_json::json;
use uuid::Uuid;

use artist_os_api::database::Store;
use artist_os_api::types::MetricKind;

const MARKETING_CSV: &[u8] = b"date,platform,followers,impressions,engagement_rate
2024-02-01,instagram,1000,5000,2.5
2024-02-02,instagram,lots,5000,2.5
2024-02-03,tiktok,300,1200,4.75
2024-02-04,,10,10,1
";

#[tokio::test]
async fn import_requires_a_session() -> Result<()> {
    let app = common::spawn_app();
    let response = app.send(common::upload(None, Some("marketing"), Some(MARKETING_CSV))).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.metric_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn invalid_type_writes_nothing() -> Result<()> {
    let app = common::spawn_app();
    let (_, token) = app.user(None).await;

    let response = app.send(common::upload(Some(&token), Some("revenue"), Some(MARKETING_CSV))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await?;
    assert!(body["error"].as_str().unwrap().contains("Must be one of"));

    let response = app.send(common::upload(Some(&token), None, Some(MARKETING_CSV))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(app.store.metric_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn missing_or_empty_files_are_rejected() -> Result<()> {
    let app = common::spawn_app();
    let (_, token) = app.user(None).await;

    let response = app.send(common::upload(Some(&token), Some("marketing"), None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.send(common::upload(Some(&token), Some("marketing"), Some(b""))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::body_json(response).await?["error"], "File is empty");

    assert_eq!(app.store.metric_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn missing_header_columns_are_rejected() -> Result<()> {
    let app = common::spawn_app();
    let (_, token) = app.user(None).await;

    let csv = b"date,platform\n2024-02-01,instagram\n";
    let response = app.send(common::upload(Some(&token), Some("marketing"), Some(csv))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await?;
    assert!(body["error"].as_str().unwrap().contains("followers, impressions, engagement_rate"));
    assert_eq!(app.store.metric_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn partial_imports_keep_valid_rows() -> Result<()> {
    let app = common::spawn_app();
    let (me, token) = app.user(None).await;

    let response = app.send(common::upload(Some(&token), Some("marketing"), Some(MARKETING_CSV))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["imported"], 2);
    let rows: Vec<u64> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["row"].as_u64().unwrap())
        .collect();
    assert_eq!(rows, vec![3, 5]);
    assert_eq!(body["errors"][1]["message"], "platform is required");

    let stored = app.store.metrics(me, MetricKind::Marketing).await?;
    assert_eq!(stored.len(), 2);
    Ok(())
}

#[tokio::test]
async fn oversized_files_get_413() -> Result<()> {
    let mut config = common::test_config();
    config.import.max_file_bytes = 64;
    let app = common::spawn_app_with(config);
    let (_, token) = app.user(None).await;

    let response = app.send(common::upload(Some(&token), Some("marketing"), Some(MARKETING_CSV))).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(app.store.metric_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn templates_download_as_attachments() -> Result<()> {
    let app = common::spawn_app();
    let response = app.send(common::get("/api/import/template?type=fan_engagement", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"fan_engagement_template.csv\""
    );

    let body = String::from_utf8(common::body_bytes(response).await?)?;
    let mut lines = body.lines();
    assert_eq!(lines.next(), Some("date,fan_name,email,platform,engagement_level"));
    assert!(lines.next().is_some());
    assert_eq!(lines.next(), None);
    Ok(())
}

#[tokio::test]
async fn template_type_is_validated() -> Result<()> {
    let app = common::spawn_app();

    let (status, body) = app.get("/api/import/template?type=bogus", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = app.get("/api/import/template", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn imported_rows_belong_to_the_uploader() -> Result<()> {
    let app = common::spawn_app();
    let (me, token) = app.user(None).await;

    let csv = b"date,agent_name,bookings,gross_revenue,commission\n2024-03-01,Sam,1,1000,100\n";
    let response = app.send(common::upload(Some(&token), Some("agent"), Some(csv))).await;
    assert_eq!(common::body_json(response).await?, json!({"success": true, "imported": 1, "errors": []}));

    assert_eq!(app.store.metrics(me, MetricKind::Agent).await?.len(), 1);
    assert!(app.store.metrics(Uuid::new_v4(), MetricKind::Agent).await?.is_empty());
    Ok(())
}
