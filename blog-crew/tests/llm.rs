//! Chat completions client against a local mock endpoint.

use blog_crew::llm::{CompletionModel, LlmClient, Message};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> LlmClient {
    LlmClient::new("sk-test".into())
        .with_model("gpt-4o-mini")
        .with_api_base(&server.uri())
}

#[tokio::test]
async fn complete_returns_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [
                {"message": {"role": "assistant", "content": "# Post\nBody."}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 12, "completion_tokens": 4}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = client(&server).complete("be an editor", "edit this").await.unwrap();
    assert_eq!(text, "# Post\nBody.");
}

#[tokio::test]
async fn request_carries_model_and_both_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"content": "ok"}, "finish_reason": "length"}]
        })))
        .mount(&server)
        .await;

    let resp = client(&server)
        .chat(&[Message::system("sys"), Message::user("hi")])
        .await
        .unwrap();
    assert_eq!(resp.text(), "ok");

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "hi");
}

#[tokio::test]
async fn error_status_carries_status_and_body() {
    for (status, text) in [(429, "rate limited"), (500, "upstream exploded")] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_string(text))
            .mount(&server)
            .await;

        let err = client(&server).complete("sys", "prompt").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains(&status.to_string()), "{message}");
        assert!(message.contains(text), "{message}");
    }
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = client(&server).complete("sys", "prompt").await.unwrap_err();
    assert!(err.to_string().contains("Failed to parse chat completions response"));
}
