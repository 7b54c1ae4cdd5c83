//! End-to-end routing tests: real provider clients, mocked upstream services

mod common;

use common::gateway_config;
use pitchreel::core::providers::ProviderId;
use pitchreel::core::router::ProviderRouter;
use pitchreel::core::types::TextRequest;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn primary_failure_falls_through_to_local_provider() {
    let server = MockServer::start().await;

    // minimax (primary) is down
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    // vllm (fallback) answers
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "from vllm"}}],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = gateway_config(&server.uri());
    config.validate().unwrap();
    let router = ProviderRouter::from_config(&config);

    let routed = router
        .generate_text(&TextRequest::new("hello"))
        .await
        .unwrap();

    assert_eq!(routed.provider, ProviderId::Vllm);
    assert_eq!(routed.value.content, "from vllm");
    assert!(routed.used_fallback());
    assert_eq!(routed.failed_attempts, 1);
}

#[tokio::test]
async fn healthy_primary_is_never_bypassed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "base_resp": {"status_code": 0, "status_msg": "success"},
            "choices": [{"message": {"role": "assistant", "content": "from minimax"}}],
        })))
        .expect(1)
        .mount(&server)
        .await;

    // the fallback must not be called at all
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "from vllm"}}],
        })))
        .expect(0)
        .mount(&server)
        .await;

    let router = ProviderRouter::from_config(&gateway_config(&server.uri()));

    let routed = router
        .generate_text(&TextRequest::new("hello"))
        .await
        .unwrap();

    assert_eq!(routed.provider, ProviderId::Minimax);
    assert!(!routed.used_fallback());
}

#[tokio::test]
async fn exhausted_chain_names_both_providers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("minimax down"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("vllm down"))
        .mount(&server)
        .await;

    let router = ProviderRouter::from_config(&gateway_config(&server.uri()));

    let err = router
        .generate_text(&TextRequest::new("hello"))
        .await
        .unwrap_err();

    assert_eq!(
        err.attempted_providers(),
        vec![ProviderId::Minimax, ProviderId::Vllm]
    );
    let text = err.to_string();
    assert!(text.contains("minimax"));
    assert!(text.contains("vllm"));
}
