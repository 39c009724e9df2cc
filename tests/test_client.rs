//! AnalysisClient against a mock proxy.

mod common;

use mockito::Matcher;
use serde_json::json;
use symbiotic_study::client::{DEFAULT_PROMPT, FALLBACK_SERVER_MESSAGE};
use symbiotic_study::error::classify;
use symbiotic_study::{AnalysisClient, AnalysisRequest, AppConfig, StudyError, Subject};

fn client_for(server: &mockito::ServerGuard) -> AnalysisClient {
    let config = AppConfig {
        proxy_url: format!("{}/api/gemini", server.url()),
        ..AppConfig::default()
    };
    AnalysisClient::new(&config).unwrap()
}

fn typed(prompt: &str) -> AnalysisRequest {
    AnalysisRequest::manual(Subject::Physics, prompt, None).unwrap()
}

#[tokio::test]
async fn success_parses_the_three_professors() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/gemini")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "subject": "Vật lí",
            "prompt": "A ball falls from 20 m."
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(common::sample_answer().to_string())
        .expect(1)
        .create_async()
        .await;

    let response = client_for(&server).analyze(&typed("A ball falls from 20 m.")).await.unwrap();

    assert_eq!(response.prof1.answer, "$t = 2$ s");
    assert_eq!(response.prof2.method, "Solve for $t$.");
    assert_eq!(response.prof3.quizzes.len(), 1);
    assert_eq!(response.prof3.quizzes[0].correct_option(), Some(0));
    assert!(response.tts_summary.contains("two seconds"));
    mock.assert_async().await;
}

#[tokio::test]
async fn image_only_request_carries_the_default_prompt() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/gemini")
        .match_body(Matcher::Json(json!({
            "subject": "Toán học",
            "prompt": DEFAULT_PROMPT,
            "image": "data:image/jpeg;base64,/9j/"
        })))
        .with_status(200)
        .with_body(common::sample_answer().to_string())
        .create_async()
        .await;

    let request = AnalysisRequest::from_image(Subject::Math, "", "data:image/jpeg;base64,/9j/".to_string());
    client_for(&server).analyze(&request).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn error_body_message_is_surfaced() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/gemini")
        .with_status(502)
        .with_body(r#"{"error":"The AI is busy or the image is too large, please try again.","kind":"provider"}"#)
        .create_async()
        .await;

    let err = client_for(&server).analyze(&typed("2+2")).await.unwrap_err();
    match &err {
        StudyError::Server { status, message, .. } => {
            assert_eq!(*status, 502);
            assert!(message.starts_with("The AI is busy"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(classify::is_transient(&err));
}

#[tokio::test]
async fn unreadable_error_body_uses_the_fallback_message() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/gemini")
        .with_status(500)
        .with_body("<html>Internal Server Error</html>")
        .create_async()
        .await;

    let err = client_for(&server).analyze(&typed("2+2")).await.unwrap_err();
    assert!(
        matches!(&err, StudyError::Server { status: 500, message, .. } if message == FALLBACK_SERVER_MESSAGE),
        "{err:?}"
    );
}

#[tokio::test]
async fn partial_answer_is_passed_through_unvalidated() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/gemini")
        .with_status(200)
        .with_body(r#"{"prof1":{"answer":"4"},"extra":true}"#)
        .create_async()
        .await;

    let response = client_for(&server).analyze(&typed("2+2")).await.unwrap();
    assert_eq!(response.prof1.answer, "4");
    assert!(response.prof2.explanation.is_empty());
    assert!(response.prof3.quizzes.is_empty());
}

#[tokio::test]
async fn non_json_success_is_a_decode_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/gemini")
        .with_status(200)
        .with_body("Sure! The answer is 4.")
        .create_async()
        .await;

    let err = client_for(&server).analyze(&typed("2+2")).await.unwrap_err();
    assert!(matches!(err, StudyError::Decode { .. }), "{err:?}");
}

#[tokio::test]
async fn oversized_payload_never_reaches_the_proxy() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/gemini")
        .with_status(200)
        .with_body(common::sample_answer().to_string())
        .expect(0)
        .create_async()
        .await;

    let config = AppConfig {
        proxy_url: format!("{}/api/gemini", server.url()),
        payload_ceiling: 1_000,
        ..AppConfig::default()
    };
    let client = AnalysisClient::new(&config).unwrap();
    let request = AnalysisRequest::from_image(Subject::Math, "", "A".repeat(2_000));

    let err = client.analyze(&request).await.unwrap_err();
    assert!(matches!(err, StudyError::Validation { .. }), "{err:?}");
    mock.assert_async().await;
}

#[tokio::test]
async fn unreachable_proxy_is_a_network_error() {
    let config = AppConfig {
        proxy_url: "http://127.0.0.1:9/api/gemini".to_string(),
        ..AppConfig::default()
    };
    let err = AnalysisClient::new(&config)
        .unwrap()
        .analyze(&typed("2+2"))
        .await
        .unwrap_err();
    assert!(matches!(err, StudyError::Network { .. }), "{err:?}");
}
