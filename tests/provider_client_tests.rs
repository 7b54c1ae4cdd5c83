//! Provider client tests against mocked HTTP services

mod common;

use common::{minimax_config, vllm_config, xtts_config};
use pitchreel::core::providers::{
    ProviderError, SpeechSynthesizer, TextGenerator, minimax::MinimaxSpeech,
    minimax::MinimaxText, vllm::VllmText, xtts::XttsSpeech,
};
use pitchreel::core::types::{SpeechRequest, TextRequest};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn vllm_generates_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "test-model"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "generated text"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = VllmText::new(&vllm_config(&server.uri())).unwrap();
    let result = provider.generate(&TextRequest::new("hello")).await.unwrap();

    assert_eq!(result.content, "generated text");
    assert_eq!(result.model, "test-model");
    assert_eq!(result.usage.unwrap().total_tokens, 15);
}

#[tokio::test]
async fn vllm_maps_http_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let provider = VllmText::new(&vllm_config(&server.uri())).unwrap();
    let err = provider
        .generate(&TextRequest::new("hello"))
        .await
        .unwrap_err();

    match err {
        ProviderError::ApiError { status, .. } => assert_eq!(status, 500),
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn minimax_text_sends_system_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "model": "MiniMax-M2",
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "hello"},
            ],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "base_resp": {"status_code": 0, "status_msg": "success"},
            "choices": [{"message": {"role": "assistant", "content": "hi"}}],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = MinimaxText::new(&minimax_config(&server.uri())).unwrap();
    let result = provider
        .generate(&TextRequest::new("hello").with_system("be brief"))
        .await
        .unwrap();

    assert_eq!(result.content, "hi");
}

#[tokio::test]
async fn minimax_speech_decodes_hex_audio() {
    let audio = b"fake mp3 payload".to_vec();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/t2a_v2"))
        .and(query_param("GroupId", "test-group"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "base_resp": {"status_code": 0, "status_msg": "success"},
            "data": {"audio": hex::encode(&audio)},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = MinimaxSpeech::new(&minimax_config(&server.uri())).unwrap();
    let result = provider
        .synthesize(&SpeechRequest::new("hello world", "female-shaonv"))
        .await
        .unwrap();

    assert_eq!(result.audio.as_ref(), audio.as_slice());
    assert_eq!(result.format, "mp3");
    assert_eq!(result.sample_rate, 32000);
}

#[tokio::test]
async fn minimax_speech_surfaces_api_level_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/t2a_v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "base_resp": {"status_code": 1004, "status_msg": "invalid group id"},
        })))
        .mount(&server)
        .await;

    let provider = MinimaxSpeech::new(&minimax_config(&server.uri())).unwrap();
    let err = provider
        .synthesize(&SpeechRequest::new("hello", "female-shaonv"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("invalid group id"));
}

#[tokio::test]
async fn xtts_returns_raw_audio_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/synthesize"))
        .and(body_partial_json(json!({"voice_id": "en-US-JennyNeural"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"mp3 bytes".to_vec())
                .insert_header("content-type", "audio/mpeg"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = XttsSpeech::new(&xtts_config(&server.uri())).unwrap();
    // the cloud voice id gets aliased to a local neural voice
    let result = provider
        .synthesize(&SpeechRequest::new("hello", "female-shaonv"))
        .await
        .unwrap();

    assert_eq!(result.audio.as_ref(), b"mp3 bytes");
}

#[tokio::test]
async fn xtts_rejects_empty_audio() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/synthesize"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(Vec::new()))
        .mount(&server)
        .await;

    let provider = XttsSpeech::new(&xtts_config(&server.uri())).unwrap();
    let err = provider
        .synthesize(&SpeechRequest::new("hello", "default"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::InvalidResponse { .. }));
}
