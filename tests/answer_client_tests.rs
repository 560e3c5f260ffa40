// Integration tests for the HTTP answer client
//
// Each test binds a throwaway axum server on an ephemeral port that plays
// the answer endpoint.

use anyhow::Result;
use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::json;
use std::time::Duration;
use voice_qa::{AnswerError, AnswerRequest, AnswerService, HttpAnswerClient};

async fn spawn_endpoint(router: Router) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{}/api/voice", addr))
}

fn client(endpoint: String) -> HttpAnswerClient {
    HttpAnswerClient::new(endpoint, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_posts_transcript_and_returns_answer() -> Result<()> {
    let router = Router::new().route(
        "/api/voice",
        post(|Json(req): Json<AnswerRequest>| async move {
            let answer = if req.text == "what time is it" { "3 PM" } else { "?" };
            Json(json!({ "transcript": req.text, "answer": answer }))
        }),
    );
    let endpoint = spawn_endpoint(router).await?;
    let client = client(endpoint.clone());
    assert_eq!(client.endpoint(), endpoint);

    let answer = client.ask("what time is it").await?;

    assert_eq!(answer, "3 PM");
    Ok(())
}

#[tokio::test]
async fn test_sends_request_id_header() -> Result<()> {
    let router = Router::new().route(
        "/api/voice",
        post(|headers: axum::http::HeaderMap| async move {
            let id = headers
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            Json(json!({ "answer": id }))
        }),
    );
    let endpoint = spawn_endpoint(router).await?;

    let echoed = client(endpoint).ask("hello").await?;

    assert!(uuid::Uuid::parse_str(&echoed).is_ok(), "got {:?}", echoed);
    Ok(())
}

#[tokio::test]
async fn test_service_error_message_is_kept() -> Result<()> {
    let router = Router::new().route(
        "/api/voice",
        post(|| async { Json(json!({ "error": "timeout" })) }),
    );
    let endpoint = spawn_endpoint(router).await?;

    let err = client(endpoint).ask("hello").await.unwrap_err();

    assert_eq!(err, AnswerError::Service("timeout".into()));
    assert_eq!(err.to_string(), "timeout");
    Ok(())
}

#[tokio::test]
async fn test_missing_answer_and_error_is_malformed() -> Result<()> {
    let router = Router::new().route(
        "/api/voice",
        post(|| async { Json(json!({ "transcript": "hello" })) }),
    );
    let endpoint = spawn_endpoint(router).await?;

    let err = client(endpoint).ask("hello").await.unwrap_err();

    assert!(matches!(err, AnswerError::MalformedResponse(_)), "{:?}", err);
    Ok(())
}

#[tokio::test]
async fn test_non_json_body_is_malformed() -> Result<()> {
    let router = Router::new().route("/api/voice", post(|| async { "not json" }));
    let endpoint = spawn_endpoint(router).await?;

    let err = client(endpoint).ask("hello").await.unwrap_err();

    assert!(matches!(err, AnswerError::MalformedResponse(_)), "{:?}", err);
    Ok(())
}

#[tokio::test]
async fn test_error_status_is_request_failure() -> Result<()> {
    let router = Router::new().route(
        "/api/voice",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
    );
    let endpoint = spawn_endpoint(router).await?;

    let err = client(endpoint).ask("hello").await.unwrap_err();

    assert_eq!(err, AnswerError::Request("HTTP 502 Bad Gateway".into()));
    Ok(())
}

#[tokio::test]
async fn test_error_status_with_error_body_uses_message() -> Result<()> {
    let router = Router::new().route(
        "/api/voice",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "model overloaded" })),
            )
        }),
    );
    let endpoint = spawn_endpoint(router).await?;

    let err = client(endpoint).ask("hello").await.unwrap_err();

    assert_eq!(err, AnswerError::Service("model overloaded".into()));
    Ok(())
}

#[tokio::test]
async fn test_slow_endpoint_times_out() -> Result<()> {
    let router = Router::new().route(
        "/api/voice",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "answer": "too slow" }))
        }),
    );
    let endpoint = spawn_endpoint(router).await?;

    let client = HttpAnswerClient::new(endpoint, Duration::from_millis(200))?;
    let err = client.ask("hello").await.unwrap_err();

    assert_eq!(err, AnswerError::Timeout(Duration::from_millis(200)));
    Ok(())
}

#[tokio::test]
async fn test_unreachable_endpoint_is_request_failure() -> Result<()> {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let err = client(format!("http://{}/api/voice", addr))
        .ask("hello")
        .await
        .unwrap_err();

    assert!(matches!(err, AnswerError::Request(_)), "{:?}", err);
    Ok(())
}

#[test]
fn test_request_body_shape() {
    let body = serde_json::to_value(AnswerRequest {
        text: "สวัสดี".to_string(),
    })
    .unwrap();
    assert_eq!(body, json!({ "text": "สวัสดี" }));
}
