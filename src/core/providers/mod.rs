//! Provider implementations
//!
//! One module per backing service, a trait per capability, and the registry the
//! router resolves against. The set of providers is closed: configuration refers
//! to them through [`ProviderId`], so an unknown name is rejected while the
//! configuration is parsed rather than at call time.

mod error;
mod registry;

pub mod minimax;
pub mod sadtalker;
pub mod vllm;
pub mod xtts;

pub use error::ProviderError;
pub use registry::ProviderRegistry;

use crate::core::types::{
    SpeechRequest, SpeechResult, TalkingHeadRequest, TextRequest, TextResult, VideoRequest,
    VideoResult, VoiceCatalog, VoiceCloneResult, VoiceSample,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a concrete provider implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// MiniMax cloud APIs (text, speech, video)
    Minimax,
    /// Local vLLM inference server (text)
    Vllm,
    /// Local TTS microservice (speech)
    Xtts,
    /// Local SadTalker talking-head model (video)
    Sadtalker,
}

impl ProviderId {
    /// Whether this provider implements the given capability
    pub fn supports(&self, capability: crate::core::Capability) -> bool {
        use crate::core::Capability;
        match self {
            ProviderId::Minimax => true,
            ProviderId::Vllm => capability == Capability::Text,
            ProviderId::Xtts => capability == Capability::Speech,
            ProviderId::Sadtalker => capability == Capability::Video,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Minimax => "minimax",
            ProviderId::Vllm => "vllm",
            ProviderId::Xtts => "xtts",
            ProviderId::Sadtalker => "sadtalker",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimax" => Ok(ProviderId::Minimax),
            "vllm" => Ok(ProviderId::Vllm),
            "xtts" => Ok(ProviderId::Xtts),
            "sadtalker" => Ok(ProviderId::Sadtalker),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

/// Text generation provider
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Which provider this is
    fn id(&self) -> ProviderId;

    /// Generate text from a prompt
    async fn generate(&self, request: &TextRequest) -> Result<TextResult, ProviderError>;
}

/// Speech synthesis provider
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Synthesize narration audio from text
    async fn synthesize(&self, request: &SpeechRequest) -> Result<SpeechResult, ProviderError>;

    /// Register a cloned voice from an audio sample
    async fn clone_voice(&self, sample: &VoiceSample) -> Result<VoiceCloneResult, ProviderError>;

    /// Built-in voices this provider offers
    fn voices(&self) -> VoiceCatalog;
}

/// Video generation provider
#[async_trait]
pub trait VideoGenerator: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Generate video from a scene prompt
    async fn generate(&self, request: &VideoRequest) -> Result<VideoResult, ProviderError>;

    /// Generate a talking-head video from narration audio and a face image
    async fn talking_head(
        &self,
        request: &TalkingHeadRequest,
    ) -> Result<VideoResult, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_id_parses_case_insensitively() {
        assert_eq!("MiniMax".parse::<ProviderId>().unwrap(), ProviderId::Minimax);
        assert_eq!("vllm".parse::<ProviderId>().unwrap(), ProviderId::Vllm);
    }

    #[test]
    fn provider_id_rejects_unknown() {
        let err = "openvoice".parse::<ProviderId>().unwrap_err();
        assert!(err.contains("openvoice"));
    }

    #[test]
    fn provider_id_serde_uses_lowercase() {
        let json = serde_json::to_string(&ProviderId::Sadtalker).unwrap();
        assert_eq!(json, "\"sadtalker\"");
        let back: ProviderId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ProviderId::Sadtalker);
    }
}
