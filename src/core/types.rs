//! Request and result types shared by all providers
//!
//! One request/result pair per capability operation. Providers translate these
//! to and from their own wire formats; nothing vendor-specific leaks out.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Text generation request
#[derive(Debug, Clone)]
pub struct TextRequest {
    /// User prompt
    pub prompt: String,
    /// Optional system prompt
    pub system: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl TextRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            max_tokens: 2000,
            temperature: 0.7,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Token usage reported by a text provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Result of text generation
#[derive(Debug, Clone)]
pub struct TextResult {
    /// Generated content
    pub content: String,
    /// Model that produced it
    pub model: String,
    /// Token usage, when the provider reports it
    pub usage: Option<Usage>,
}

/// Speech synthesis request
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    /// Text to narrate
    pub text: String,
    /// Voice identifier (built-in or cloned)
    pub voice_id: String,
    /// Speed multiplier, 1.0 is natural
    pub speed: f32,
    /// Optional emotion hint
    pub emotion: Option<String>,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>, voice_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice_id: voice_id.into(),
            speed: 1.0,
            emotion: None,
        }
    }
}

/// Result of speech synthesis
#[derive(Debug, Clone)]
pub struct SpeechResult {
    /// Encoded audio
    pub audio: Bytes,
    /// Container format, e.g. "mp3"
    pub format: String,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Rough duration in seconds, for UI display
    pub duration_estimate: Option<f32>,
}

/// Audio sample submitted for voice cloning
#[derive(Debug, Clone)]
pub struct VoiceSample {
    /// Raw audio bytes (mp3/wav/m4a)
    pub data: Bytes,
    /// Original file name, used for format detection
    pub file_name: String,
    /// Name to register the cloned voice under
    pub voice_name: String,
}

/// Result of voice cloning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceCloneResult {
    /// Identifier usable in subsequent speech requests
    pub voice_id: String,
    /// Human-readable name
    pub name: String,
    /// Provider that holds the clone
    pub provider: String,
}

/// Built-in voices a speech provider offers: voice id to description
pub type VoiceCatalog = HashMap<String, String>;

/// Video generation request (text-to-video)
#[derive(Debug, Clone)]
pub struct VideoRequest {
    /// Scene description
    pub prompt: String,
    /// Provider-side model identifier, when the provider has several
    pub model: Option<String>,
    /// Requested duration in seconds
    pub duration: u32,
}

impl VideoRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            duration: 6,
        }
    }
}

/// Talking-head video request
#[derive(Debug, Clone)]
pub struct TalkingHeadRequest {
    /// Path to the narration audio on local disk
    pub audio_path: PathBuf,
    /// Path to the face image on local disk
    pub face_image_path: PathBuf,
    /// Public URL of the face image, required by cloud providers
    pub image_url: Option<String>,
    /// Optional scene prompt override
    pub prompt: Option<String>,
    /// Requested duration in seconds
    pub duration: u32,
}

/// Result of video generation
#[derive(Debug, Clone)]
pub struct VideoResult {
    /// Video bytes, when the provider returns them inline
    pub video: Option<Bytes>,
    /// Path to a locally produced file, for local providers
    pub video_path: Option<PathBuf>,
    /// Provider-side task identifier, when the provider is task-based
    pub task_id: Option<String>,
    /// Duration in seconds
    pub duration: Option<u32>,
}

/// Estimate narration length at ~150 words per minute, adjusted by speed.
pub fn estimate_speech_seconds(text: &str, speed: f32) -> f32 {
    let words = text.split_whitespace().count() as f32;
    (words / 150.0) * 60.0 / speed.max(0.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speech_estimate_scales_with_speed() {
        let text = "word ".repeat(150);
        let normal = estimate_speech_seconds(&text, 1.0);
        let fast = estimate_speech_seconds(&text, 2.0);
        assert!((normal - 60.0).abs() < 0.5);
        assert!((fast - 30.0).abs() < 0.5);
    }

    #[test]
    fn text_request_builder_defaults() {
        let req = TextRequest::new("hello").with_max_tokens(100);
        assert_eq!(req.max_tokens, 100);
        assert!(req.system.is_none());
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
    }
}
