use ft_calc_core::tokens::{TokenCountRequest, TokenCounter};
use ft_calc_core::CalcError;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn upstream(server: &MockServer) -> TokenCounter {
    TokenCounter::from_credential(Some("sk-test".into()), &server.uri()).unwrap()
}

fn usage_body(prompt_tokens: u64) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "Hi" },
            "finish_reason": "length"
        }],
        "usage": { "prompt_tokens": prompt_tokens, "completion_tokens": 1, "total_tokens": prompt_tokens + 1 }
    })
}

#[tokio::test]
async fn upstream_prompt_tokens_returned() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_json(json!({
            "model": "gpt-4.1",
            "messages": [{ "role": "user", "content": "Hello there, world" }],
            "max_tokens": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(usage_body(11)))
        .expect(1)
        .mount(&server)
        .await;

    let req = TokenCountRequest::new("Hello there, world").with_model("gpt-4.1");
    let res = upstream(&server).count(&req).await.unwrap();
    assert_eq!(res.token_count, 11);
    assert!(res.note.is_none());
}

#[tokio::test]
async fn upstream_uses_default_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_json(json!({
            "model": "gpt-4o",
            "messages": [{ "role": "user", "content": "hi" }],
            "max_tokens": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(usage_body(8)))
        .expect(1)
        .mount(&server)
        .await;

    let res = upstream(&server).count(&TokenCountRequest::new("hi")).await.unwrap();
    assert_eq!(res.token_count, 8);
}

#[tokio::test]
async fn upstream_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided: sk-test.", "type": "invalid_request_error" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = upstream(&server)
        .count(&TokenCountRequest::new("hello"))
        .await
        .unwrap_err();
    match err {
        CalcError::Upstream(msg) => assert_eq!(msg, "Incorrect API key provided: sk-test."),
        other => panic!("expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn upstream_error_without_message_is_generic() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let err = upstream(&server)
        .count(&TokenCountRequest::new("hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, CalcError::Upstream(ref m) if m == "Failed to count tokens"), "{err:?}");
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn upstream_missing_usage_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = upstream(&server)
        .count(&TokenCountRequest::new("hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, CalcError::Upstream(_)), "{err:?}");
}

#[tokio::test]
async fn upstream_failure_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let _ = upstream(&server).count(&TokenCountRequest::new("hello")).await;
    // MockServer verifies the single-call expectation on drop.
}

#[tokio::test]
async fn empty_text_never_reaches_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(usage_body(1)))
        .expect(0)
        .mount(&server)
        .await;

    let err = upstream(&server)
        .count(&TokenCountRequest::new("  \n "))
        .await
        .unwrap_err();
    assert!(matches!(err, CalcError::EmptyInput));
}

#[tokio::test]
async fn unreachable_upstream_is_failure() {
    // Port 9 (discard) on localhost is not serving HTTP.
    let counter = TokenCounter::from_credential(Some("sk-test".into()), "http://127.0.0.1:9").unwrap();
    let err = counter.count(&TokenCountRequest::new("hello")).await.unwrap_err();
    assert!(matches!(err, CalcError::Upstream(_)), "{err:?}");
}

#[tokio::test]
async fn heuristic_mode_has_note() {
    let counter = TokenCounter::from_credential(None, "http://unused").unwrap();
    let res = counter
        .count(&TokenCountRequest::new("one two three four five six seven eight nine ten"))
        .await
        .unwrap();
    assert_eq!(res.token_count, 13);
    assert!(res.note.is_some());
}
