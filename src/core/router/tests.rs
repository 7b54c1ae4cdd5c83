//! Router fallback tests
//!
//! Stub providers record every invocation into a shared log so ordering and
//! short-circuit behavior can be asserted exactly.

use super::*;
use crate::config::RoutingConfig;
use crate::core::Capability;
use crate::core::providers::{
    ProviderError, ProviderId, ProviderRegistry, SpeechSynthesizer, TextGenerator, VideoGenerator,
};
use crate::core::types::{
    SpeechRequest, SpeechResult, TalkingHeadRequest, TextRequest, TextResult, VideoRequest,
    VideoResult, VoiceCatalog, VoiceCloneResult, VoiceSample,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

type CallLog = Arc<Mutex<Vec<ProviderId>>>;

struct StubText {
    id: ProviderId,
    fail_with: Option<String>,
    log: CallLog,
}

#[async_trait]
impl TextGenerator for StubText {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn generate(&self, _request: &TextRequest) -> Result<TextResult, ProviderError> {
        self.log.lock().unwrap().push(self.id);
        match &self.fail_with {
            Some(message) => Err(ProviderError::timeout(self.id, message.clone())),
            None => Ok(TextResult {
                content: "ok".to_string(),
                model: "stub".to_string(),
                usage: None,
            }),
        }
    }
}

struct StubSpeech {
    id: ProviderId,
    fail: bool,
    log: CallLog,
}

#[async_trait]
impl SpeechSynthesizer for StubSpeech {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn synthesize(&self, _request: &SpeechRequest) -> Result<SpeechResult, ProviderError> {
        self.log.lock().unwrap().push(self.id);
        if self.fail {
            Err(ProviderError::unavailable(self.id, "down"))
        } else {
            Ok(SpeechResult {
                audio: bytes::Bytes::from_static(b"mp3"),
                format: "mp3".to_string(),
                sample_rate: 32000,
                duration_estimate: None,
            })
        }
    }

    async fn clone_voice(&self, sample: &VoiceSample) -> Result<VoiceCloneResult, ProviderError> {
        self.log.lock().unwrap().push(self.id);
        if self.fail {
            Err(ProviderError::unavailable(self.id, "down"))
        } else {
            Ok(VoiceCloneResult {
                voice_id: sample.voice_name.clone(),
                name: sample.voice_name.clone(),
                provider: self.id.to_string(),
            })
        }
    }

    fn voices(&self) -> VoiceCatalog {
        [("stub-voice".to_string(), "Stub voice".to_string())]
            .into_iter()
            .collect()
    }
}

struct StubVideo {
    id: ProviderId,
    error: Option<ProviderError>,
    log: CallLog,
}

#[async_trait]
impl VideoGenerator for StubVideo {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn generate(&self, _request: &VideoRequest) -> Result<VideoResult, ProviderError> {
        self.log.lock().unwrap().push(self.id);
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(VideoResult {
                video: Some(bytes::Bytes::from_static(b"mp4")),
                video_path: None,
                task_id: None,
                duration: Some(6),
            }),
        }
    }

    async fn talking_head(
        &self,
        _request: &TalkingHeadRequest,
    ) -> Result<VideoResult, ProviderError> {
        self.log.lock().unwrap().push(self.id);
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(VideoResult {
                video: Some(bytes::Bytes::from_static(b"mp4")),
                video_path: None,
                task_id: None,
                duration: Some(6),
            }),
        }
    }
}

fn routing(text: Vec<ProviderId>) -> RoutingConfig {
    RoutingConfig {
        text,
        speech: vec![],
        video: vec![],
    }
}

fn text_router(
    specs: &[(ProviderId, Option<&str>)],
    log: &CallLog,
) -> ProviderRouter {
    let mut registry = ProviderRegistry::new();
    for (id, fail_with) in specs {
        registry.register_text(Arc::new(StubText {
            id: *id,
            fail_with: fail_with.map(str::to_string),
            log: log.clone(),
        }));
    }
    let chain = specs.iter().map(|(id, _)| *id).collect();
    ProviderRouter::new(registry, routing(chain))
}

#[tokio::test]
async fn first_success_wins_and_later_providers_are_not_invoked() {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let router = text_router(
        &[
            (ProviderId::Minimax, None),
            (ProviderId::Vllm, Some("should not run")),
        ],
        &log,
    );

    let routed = router
        .generate_text(&TextRequest::new("hello"))
        .await
        .unwrap();

    assert_eq!(routed.value.content, "ok");
    assert_eq!(routed.provider, ProviderId::Minimax);
    assert!(!routed.used_fallback());
    assert_eq!(*log.lock().unwrap(), vec![ProviderId::Minimax]);
}

#[tokio::test]
async fn failures_fall_through_in_configured_order() {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let router = text_router(
        &[
            (ProviderId::Minimax, Some("a down")),
            (ProviderId::Vllm, Some("b down")),
            (ProviderId::Xtts, None),
        ],
        &log,
    );

    let routed = router
        .generate_text(&TextRequest::new("hello"))
        .await
        .unwrap();

    assert_eq!(routed.value.content, "ok");
    assert_eq!(routed.provider, ProviderId::Xtts);
    assert_eq!(routed.failed_attempts, 2);
    assert!(routed.used_fallback());
    // each called exactly once, in configured order
    assert_eq!(
        *log.lock().unwrap(),
        vec![ProviderId::Minimax, ProviderId::Vllm, ProviderId::Xtts]
    );
}

#[tokio::test]
async fn exhausted_chain_reports_every_attempt() {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let router = text_router(
        &[
            (ProviderId::Minimax, Some("a down")),
            (ProviderId::Vllm, Some("b down")),
        ],
        &log,
    );

    let err = router
        .generate_text(&TextRequest::new("hello"))
        .await
        .unwrap_err();

    match &err {
        RouterError::Exhausted {
            capability,
            attempts,
        } => {
            assert_eq!(*capability, Capability::Text);
            assert_eq!(attempts.len(), 2);
        }
        other => panic!("expected Exhausted, got {:?}", other),
    }
    assert_eq!(
        err.attempted_providers(),
        vec![ProviderId::Minimax, ProviderId::Vllm]
    );
    let text = err.to_string();
    assert!(text.contains("minimax"));
    assert!(text.contains("vllm"));
}

#[tokio::test]
async fn empty_chain_fails_fast_without_any_invocation() {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ProviderRegistry::new();
    registry.register_text(Arc::new(StubText {
        id: ProviderId::Minimax,
        fail_with: None,
        log: log.clone(),
    }));
    let router = ProviderRouter::new(registry, routing(vec![]));

    let err = router
        .generate_text(&TextRequest::new("hello"))
        .await
        .unwrap_err();

    assert!(matches!(err, RouterError::Unconfigured(Capability::Text)));
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn invocation_order_is_identical_across_calls() {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let router = text_router(
        &[
            (ProviderId::Minimax, Some("down")),
            (ProviderId::Vllm, Some("down")),
            (ProviderId::Xtts, None),
        ],
        &log,
    );

    let request = TextRequest::new("hello");
    router.generate_text(&request).await.unwrap();
    router.generate_text(&request).await.unwrap();

    let expected = vec![
        ProviderId::Minimax,
        ProviderId::Vllm,
        ProviderId::Xtts,
        ProviderId::Minimax,
        ProviderId::Vllm,
        ProviderId::Xtts,
    ];
    assert_eq!(*log.lock().unwrap(), expected);
}

#[tokio::test]
async fn single_provider_failure_carries_name_and_reason() {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let router = text_router(&[(ProviderId::Vllm, Some("timeout"))], &log);

    let err = router
        .generate_text(&TextRequest::new("hello"))
        .await
        .unwrap_err();

    let text = err.to_string();
    assert!(text.contains("vllm"));
    assert!(text.contains("timeout"));
}

#[tokio::test]
async fn unregistered_provider_counts_as_failed_attempt() {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ProviderRegistry::new();
    // only the fallback is actually registered
    registry.register_text(Arc::new(StubText {
        id: ProviderId::Minimax,
        fail_with: None,
        log: log.clone(),
    }));
    let router = ProviderRouter::new(
        registry,
        routing(vec![ProviderId::Vllm, ProviderId::Minimax]),
    );

    let routed = router
        .generate_text(&TextRequest::new("hello"))
        .await
        .unwrap();

    assert_eq!(routed.provider, ProviderId::Minimax);
    assert_eq!(routed.failed_attempts, 1);
    assert_eq!(*log.lock().unwrap(), vec![ProviderId::Minimax]);
}

#[tokio::test]
async fn speech_chain_falls_back_for_cloning() {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ProviderRegistry::new();
    registry.register_speech(Arc::new(StubSpeech {
        id: ProviderId::Minimax,
        fail: true,
        log: log.clone(),
    }));
    registry.register_speech(Arc::new(StubSpeech {
        id: ProviderId::Xtts,
        fail: false,
        log: log.clone(),
    }));
    let router = ProviderRouter::new(
        registry,
        RoutingConfig {
            text: vec![],
            speech: vec![ProviderId::Minimax, ProviderId::Xtts],
            video: vec![],
        },
    );

    let sample = VoiceSample {
        data: bytes::Bytes::from_static(b"audio"),
        file_name: "sample.mp3".to_string(),
        voice_name: "ceo".to_string(),
    };
    let routed = router.clone_voice(&sample).await.unwrap();

    assert_eq!(routed.provider, ProviderId::Xtts);
    assert_eq!(routed.value.voice_id, "ceo");
    assert_eq!(
        *log.lock().unwrap(),
        vec![ProviderId::Minimax, ProviderId::Xtts]
    );
}

#[tokio::test]
async fn unsupported_video_operation_falls_through_to_next_provider() {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ProviderRegistry::new();
    registry.register_video(Arc::new(StubVideo {
        id: ProviderId::Sadtalker,
        error: Some(ProviderError::not_supported(
            ProviderId::Sadtalker,
            "text-to-video",
        )),
        log: log.clone(),
    }));
    registry.register_video(Arc::new(StubVideo {
        id: ProviderId::Minimax,
        error: None,
        log: log.clone(),
    }));
    let router = ProviderRouter::new(
        registry,
        RoutingConfig {
            text: vec![],
            speech: vec![],
            video: vec![ProviderId::Sadtalker, ProviderId::Minimax],
        },
    );

    let routed = router
        .generate_video(&VideoRequest::new("office scene"))
        .await
        .unwrap();

    assert_eq!(routed.provider, ProviderId::Minimax);
    assert!(routed.value.video.is_some());
    assert_eq!(
        *log.lock().unwrap(),
        vec![ProviderId::Sadtalker, ProviderId::Minimax]
    );
}

#[test]
fn voices_come_from_first_reachable_speech_provider() {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ProviderRegistry::new();
    registry.register_speech(Arc::new(StubSpeech {
        id: ProviderId::Xtts,
        fail: false,
        log,
    }));
    let router = ProviderRouter::new(
        registry,
        RoutingConfig {
            text: vec![],
            // primary is not registered; catalog should come from xtts
            speech: vec![ProviderId::Minimax, ProviderId::Xtts],
            video: vec![],
        },
    );

    let voices = router.voices().unwrap();
    assert!(voices.contains_key("stub-voice"));
}
