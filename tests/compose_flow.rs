//! Integration tests for quote creation: upload first, then create.
//!
//! The mock media endpoint and quotes API live on the same `MockServer`;
//! `expect(..)` counts prove which requests were (not) made.

use quotedeck::api::ApiClient;
use quotedeck::compose::{self, ComposeError, QuoteDraft, CREATE_FAILED_MESSAGE};
use secrecy::SecretString;
use std::path::PathBuf;
use std::time::Duration;
use wiremock::matchers::{body_json, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ApiClient {
    let media = format!("{}/media/upload", server.uri());
    ApiClient::new(&server.uri(), &media, Duration::from_secs(5)).unwrap()
}

fn token() -> SecretString {
    SecretString::from("tok".to_string())
}

/// A small file with an image extension in its own temp directory.
fn image(name: &str) -> (PathBuf, PathBuf) {
    let dir = std::env::temp_dir().join(format!("quotedeck_it_compose_{name}"));
    std::fs::create_dir_all(&dir).unwrap();
    let file = dir.join(format!("{name}.png"));
    std::fs::write(&file, [0x89, b'P', b'N', b'G']).unwrap();
    (dir, file)
}

fn draft(text: &str, image: Option<PathBuf>) -> QuoteDraft {
    QuoteDraft {
        text: text.to_string(),
        image,
    }
}

#[tokio::test]
async fn test_upload_then_create() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/media/upload"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"url": "https://cdn.example.com/x.png"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/postQuote"))
        .and(header("authorization", "tok"))
        .and(body_json(serde_json::json!({
            "text": "Simplicity is prerequisite for reliability.",
            "mediaUrl": "https://cdn.example.com/x.png"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 99,
            "text": "Simplicity is prerequisite for reliability.",
            "mediaUrl": "https://cdn.example.com/x.png",
            "username": "edsger",
            "createdAt": "2024-06-01T08:30:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (dir, file) = image("success");
    let created = compose::submit(
        &api_for(&server),
        Some(&token()),
        &draft("Simplicity is prerequisite for reliability.", Some(file)),
    )
    .await
    .unwrap()
    .expect("service echoed the quote");

    assert_eq!(created.id, "99");
    assert_eq!(created.author(), "edsger");
    assert_eq!(created.created_date(), "2024-06-01");

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_upload_failure_skips_create() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/media/upload"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/postQuote"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (dir, file) = image("upload_fails");
    let err = compose::submit(&api_for(&server), Some(&token()), &draft("hello", Some(file)))
        .await
        .unwrap_err();

    assert!(matches!(err, ComposeError::Upload(_)));
    assert_eq!(err.user_message(), CREATE_FAILED_MESSAGE);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_create_failure_after_upload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/media/upload"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"url": "https://cdn.example.com/y.png"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/postQuote"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let (dir, file) = image("create_fails");
    let err = compose::submit(&api_for(&server), Some(&token()), &draft("hello", Some(file)))
        .await
        .unwrap_err();

    assert!(matches!(err, ComposeError::Create(_)));
    assert!(!err.is_validation());

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_invalid_draft_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let api = api_for(&server);

    let (dir, file) = image("invalid");
    let err = compose::submit(&api, Some(&token()), &draft("   ", Some(file)))
        .await
        .unwrap_err();
    assert!(matches!(err, ComposeError::EmptyText));

    let err = compose::submit(&api, Some(&token()), &draft("hello", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ComposeError::NoImage));

    let err = compose::submit(&api, Some(&token()), &draft("hello", Some(dir.clone())))
        .await
        .unwrap_err();
    assert!(matches!(err, ComposeError::UnsupportedImage(_)));

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_missing_session_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (dir, file) = image("no_session");
    let err = compose::submit(&api_for(&server), None, &draft("hello", Some(file)))
        .await
        .unwrap_err();
    assert!(matches!(err, ComposeError::NotAuthenticated));
    assert!(err.is_auth_failure());

    std::fs::remove_dir_all(&dir).ok();
}
