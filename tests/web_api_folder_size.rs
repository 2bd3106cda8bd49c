//! Web API Folder Size Job Tests
//!
//! Job launch, REST polling and cancel, and the WebSocket progress stream.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::{TestServer, TestWebSocket};
use common::{spawn_app, token};
use serde_json::{json, Value};

async fn launch(server: &TestServer, access_token: &str, bucket: &str, prefix: &str) -> Value {
    let response = server
        .post(&format!("/api/buckets/{bucket}/folders/size"))
        .add_header(AUTHORIZATION, format!("Bearer {}", access_token))
        .json(&json!({ "prefix": prefix }))
        .await;
    response.assert_status_ok();
    response.json()
}

async fn connect(server: &TestServer, access_token: &str, path: &str) -> TestWebSocket {
    server
        .get_websocket(path)
        .add_header(AUTHORIZATION, format!("Bearer {}", access_token))
        .await
        .into_websocket()
        .await
}

/// Read events until one carries a terminal job status.
async fn receive_until_terminal(socket: &mut TestWebSocket) -> Value {
    loop {
        let event: Value = socket.receive_json().await;
        let status = event["job"]["status"].as_str().unwrap_or_default().to_string();
        if matches!(status.as_str(), "COMPLETED" | "FAILED" | "CANCELED") {
            return event;
        }
    }
}

#[tokio::test]
async fn test_launch_returns_queued_job() {
    let app = spawn_app().await;
    let access_token = token(&app.server, "writer").await;

    let body = launch(&app.server, &access_token, "main", "docs").await;
    let job_id = body["job"]["id"].as_str().unwrap();
    assert_eq!(body["job"]["bucketId"], "main");
    assert_eq!(body["job"]["prefix"], "docs/");
    assert_eq!(
        body["websocketPath"],
        format!("/api/ws/folder-size/{job_id}")
    );
}

#[tokio::test]
async fn test_launch_unknown_bucket() {
    let app = spawn_app().await;
    let access_token = token(&app.server, "writer").await;

    app.server
        .post("/api/buckets/nope/folders/size")
        .add_header(AUTHORIZATION, format!("Bearer {}", access_token))
        .json(&json!({ "prefix": "" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stream_reports_completion() {
    let app = spawn_app().await;
    let access_token = token(&app.server, "writer").await;

    let body = launch(&app.server, &access_token, "main", "").await;
    let path = body["websocketPath"].as_str().unwrap();

    let mut socket = connect(&app.server, &access_token, path).await;
    let snapshot: Value = socket.receive_json().await;
    assert_eq!(snapshot["event"], "SNAPSHOT");

    let last = if snapshot["job"]["status"] == "COMPLETED" {
        snapshot
    } else {
        receive_until_terminal(&mut socket).await
    };
    assert_eq!(last["job"]["status"], "COMPLETED");
    assert_eq!(last["job"]["objectsScanned"], 5);
    assert_eq!(last["job"]["totalSizeBytes"], 5 + 2048 + 100 + 300 + 7);
    assert_eq!(last["job"]["partial"], false);
}

#[tokio::test]
async fn test_read_only_user_cannot_launch_or_cancel() {
    let app = spawn_app().await;
    let writer_token = token(&app.server, "writer").await;
    let reader_token = token(&app.server, "reader").await;

    app.server
        .post("/api/buckets/main/folders/size")
        .add_header(AUTHORIZATION, format!("Bearer {}", reader_token))
        .json(&json!({ "prefix": "docs" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    assert_eq!(app.jobs.job_count().await, 0);

    let body = launch(&app.server, &writer_token, "stalled", "").await;
    let job_id = body["job"]["id"].as_str().unwrap();
    let path = format!("/api/buckets/stalled/folders/size/{job_id}");

    let response = app
        .server
        .delete(&path)
        .add_header(AUTHORIZATION, format!("Bearer {}", reader_token))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    // Reading the job stays open to read-only sessions
    let view: Value = app
        .server
        .get(&path)
        .add_header(AUTHORIZATION, format!("Bearer {}", reader_token))
        .await
        .json();
    assert_ne!(view["status"], "CANCELED");
}

#[tokio::test]
async fn test_stream_cancel_command() {
    let app = spawn_app().await;
    let access_token = token(&app.server, "writer").await;

    let body = launch(&app.server, &access_token, "stalled", "").await;
    let job_id = body["job"]["id"].as_str().unwrap().to_string();
    let path = body["websocketPath"].as_str().unwrap();

    let mut socket = connect(&app.server, &access_token, path).await;
    let snapshot: Value = socket.receive_json().await;
    assert_eq!(snapshot["event"], "SNAPSHOT");

    socket.send_text("cancel").await;
    let last = receive_until_terminal(&mut socket).await;
    assert_eq!(last["event"], "CANCELED");
    assert_eq!(last["job"]["status"], "CANCELED");

    let view: Value = app
        .server
        .get(&format!("/api/buckets/stalled/folders/size/{job_id}"))
        .add_header(AUTHORIZATION, format!("Bearer {}", access_token))
        .await
        .json();
    assert_eq!(view["status"], "CANCELED");
}

#[tokio::test]
async fn test_rest_get_and_cancel() {
    let app = spawn_app().await;
    let access_token = token(&app.server, "writer").await;

    let body = launch(&app.server, &access_token, "stalled", "data").await;
    let job_id = body["job"]["id"].as_str().unwrap();
    let path = format!("/api/buckets/stalled/folders/size/{job_id}");

    let response = app
        .server
        .get(&path)
        .add_header(AUTHORIZATION, format!("Bearer {}", access_token))
        .await;
    response.assert_status_ok();
    let view: Value = response.json();
    assert_eq!(view["id"], job_id);
    assert!(matches!(
        view["status"].as_str(),
        Some("QUEUED") | Some("RUNNING")
    ));

    let response = app
        .server
        .delete(&path)
        .add_header(AUTHORIZATION, format!("Bearer {}", access_token))
        .await;
    response.assert_status_ok();
    let view: Value = response.json();
    assert_eq!(view["status"], "CANCELED");
    assert!(view["finishedAt"].is_string());

    // Canceling again leaves the job as it is
    let view: Value = app
        .server
        .delete(&path)
        .add_header(AUTHORIZATION, format!("Bearer {}", access_token))
        .await
        .json();
    assert_eq!(view["status"], "CANCELED");
}

#[tokio::test]
async fn test_job_belongs_to_its_bucket() {
    let app = spawn_app().await;
    let access_token = token(&app.server, "writer").await;

    let body = launch(&app.server, &access_token, "stalled", "").await;
    let job_id = body["job"]["id"].as_str().unwrap();

    app.server
        .get(&format!("/api/buckets/main/folders/size/{job_id}"))
        .add_header(AUTHORIZATION, format!("Bearer {}", access_token))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    app.server
        .delete(&format!("/api/buckets/main/folders/size/{job_id}"))
        .add_header(AUTHORIZATION, format!("Bearer {}", access_token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stream_unknown_job() {
    let app = spawn_app().await;
    let access_token = token(&app.server, "writer").await;

    app.server
        .get_websocket("/api/ws/folder-size/does-not-exist")
        .add_header(AUTHORIZATION, format!("Bearer {}", access_token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stream_requires_authentication() {
    let app = spawn_app().await;
    let access_token = token(&app.server, "writer").await;
    let body = launch(&app.server, &access_token, "main", "").await;
    let path = body["websocketPath"].as_str().unwrap();

    app.server
        .get_websocket(path)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_stream_with_query_token() {
    let app = spawn_app().await;
    let access_token = token(&app.server, "writer").await;
    let reader_token = token(&app.server, "reader").await;
    let body = launch(&app.server, &access_token, "main", "images").await;
    let path = body["websocketPath"].as_str().unwrap();

    let mut socket = app
        .server
        .get_websocket(path)
        .add_query_param("token", &reader_token)
        .await
        .into_websocket()
        .await;
    let snapshot: Value = socket.receive_json().await;
    assert_eq!(snapshot["event"], "SNAPSHOT");
    assert_eq!(snapshot["job"]["prefix"], "images/");
}
