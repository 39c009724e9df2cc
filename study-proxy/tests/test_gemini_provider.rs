//! GeminiProvider against a mock `generateContent` endpoint.

use std::time::Duration;

use mockito::Matcher;
use serde_json::json;
use study_proxy::{GeminiProvider, GenerationRequest, GenerativeProvider, InlineImage, ProviderError, ProxyConfig};

fn config_for(server: &mockito::ServerGuard) -> ProxyConfig {
    ProxyConfig {
        api_base: server.url(),
        model: "test-model".to_string(),
        timeout: Duration::from_secs(5),
        ..ProxyConfig::default()
    }
}

fn request(image: Option<InlineImage>) -> GenerationRequest {
    GenerationRequest {
        instruction: "solve".to_string(),
        image,
        temperature: 0.1,
        response_mime_type: "application/json".to_string(),
    }
}

#[tokio::test]
async fn sends_key_image_and_json_mode() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1beta/models/test-model:generateContent")
        .match_header("x-goog-api-key", "secret")
        .match_body(Matcher::PartialJson(json!({
            "contents": [{"parts": [
                {"text": "solve"},
                {"inlineData": {"mimeType": "image/png", "data": "AAAA"}}
            ]}],
            "generationConfig": {"responseMimeType": "application/json"}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"{\"ok\":true}"}]}}]}"#)
        .create_async()
        .await;

    let provider = GeminiProvider::new(&config_for(&server)).unwrap();
    let image = InlineImage {
        mime_type: "image/png".to_string(),
        data: "AAAA".to_string(),
    };
    let text = provider.generate("secret", &request(Some(image))).await.unwrap();

    assert_eq!(text, "{\"ok\":true}");
    mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1beta/models/test-model:generateContent")
        .with_status(403)
        .with_body(r#"{"error":{"message":"API key not valid"}}"#)
        .create_async()
        .await;

    let provider = GeminiProvider::new(&config_for(&server)).unwrap();
    let err = provider.generate("bad", &request(None)).await.unwrap_err();
    match err {
        ProviderError::Status { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("API key not valid"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn garbage_body_is_a_parse_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1beta/models/test-model:generateContent")
        .with_status(200)
        .with_body("<html>oops</html>")
        .create_async()
        .await;

    let provider = GeminiProvider::new(&config_for(&server)).unwrap();
    let err = provider.generate("k", &request(None)).await.unwrap_err();
    assert!(matches!(err, ProviderError::Parse(_)));
}

#[tokio::test]
async fn unreachable_provider_is_a_transport_error() {
    let config = ProxyConfig {
        // Port 9 (discard) is closed on test machines; connection is refused.
        api_base: "http://127.0.0.1:9".to_string(),
        timeout: Duration::from_secs(5),
        ..ProxyConfig::default()
    };
    let provider = GeminiProvider::new(&config).unwrap();
    let err = provider.generate("k", &request(None)).await.unwrap_err();
    assert!(matches!(err, ProviderError::Transport(_) | ProviderError::Timeout));
}
