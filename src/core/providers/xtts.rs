//! Local TTS microservice client
//!
//! Speaks the small REST protocol of the self-hosted TTS service:
//! `POST /synthesize` returns raw mp3 bytes, `POST /clone` stores a reference
//! sample, `GET /voices` lists what the service offers. Voice ids used with the
//! cloud provider are aliased onto the service's neural voices so a configured
//! voice keeps working across a fallback.

use crate::config::XttsConfig;
use crate::core::providers::{ProviderError, ProviderId, SpeechSynthesizer};
use crate::core::types::{
    SpeechRequest, SpeechResult, VoiceCatalog, VoiceCloneResult, VoiceSample,
    estimate_speech_seconds,
};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;

const PROVIDER: ProviderId = ProviderId::Xtts;
const DEFAULT_VOICE: &str = "en-US-JennyNeural";

const VOICE_ALIASES: &[(&str, &str)] = &[
    ("female-shaonv", "en-US-JennyNeural"),
    ("female-yujie", "en-US-AriaNeural"),
    ("male-qn-qingse", "en-US-GuyNeural"),
    ("male-qn-jingying", "en-US-DavisNeural"),
    ("default", DEFAULT_VOICE),
];

const KNOWN_VOICES: &[(&str, &str)] = &[
    ("en-US-JennyNeural", "US English, Female, conversational"),
    ("en-US-GuyNeural", "US English, Male, conversational"),
    ("en-US-AriaNeural", "US English, Female, professional"),
    ("en-US-DavisNeural", "US English, Male, professional"),
    ("en-GB-SoniaNeural", "UK English, Female"),
    ("en-GB-RyanNeural", "UK English, Male"),
    ("zh-CN-XiaoxiaoNeural", "Chinese, Female"),
    ("ja-JP-NanamiNeural", "Japanese, Female"),
    ("fr-FR-DeniseNeural", "French, Female"),
    ("es-ES-ElviraNeural", "Spanish, Female"),
];

/// Speech synthesis through the local TTS microservice
#[derive(Debug, Clone)]
pub struct XttsSpeech {
    http: reqwest::Client,
    base_url: String,
}

impl XttsSpeech {
    pub fn new(config: &XttsConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ProviderError::configuration(PROVIDER, e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn resolve_voice(voice_id: &str) -> String {
        VOICE_ALIASES
            .iter()
            .find(|(alias, _)| *alias == voice_id)
            .map(|(_, voice)| voice.to_string())
            .unwrap_or_else(|| voice_id.to_string())
    }
}

#[async_trait]
impl SpeechSynthesizer for XttsSpeech {
    fn id(&self) -> ProviderId {
        PROVIDER
    }

    async fn synthesize(&self, request: &SpeechRequest) -> Result<SpeechResult, ProviderError> {
        let payload = json!({
            "text": request.text,
            "voice_id": Self::resolve_voice(&request.voice_id),
            "speed": request.speed,
        });

        let response = self
            .http
            .post(format!("{}/synthesize", self.base_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::api_error(PROVIDER, status.as_u16(), text));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        if audio.is_empty() {
            return Err(ProviderError::invalid_response(PROVIDER, "empty audio body"));
        }

        Ok(SpeechResult {
            audio,
            format: "mp3".to_string(),
            sample_rate: 24000,
            duration_estimate: Some(estimate_speech_seconds(&request.text, request.speed)),
        })
    }

    async fn clone_voice(&self, sample: &VoiceSample) -> Result<VoiceCloneResult, ProviderError> {
        let part = reqwest::multipart::Part::bytes(sample.data.to_vec())
            .file_name(sample.file_name.clone())
            .mime_str("audio/mpeg")
            .map_err(|e| ProviderError::invalid_response(PROVIDER, e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("name", sample.voice_name.clone())
            .part("audio", part);

        let response = self
            .http
            .post(format!("{}/clone", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::api_error(PROVIDER, status.as_u16(), text));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::invalid_response(PROVIDER, e.to_string()))?;

        let voice_id = body
            .get("voice_id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ProviderError::invalid_response(PROVIDER, format!("no voice_id in {}", body))
            })?
            .to_string();

        Ok(VoiceCloneResult {
            voice_id,
            name: sample.voice_name.clone(),
            provider: PROVIDER.to_string(),
        })
    }

    fn voices(&self) -> VoiceCatalog {
        KNOWN_VOICES
            .iter()
            .map(|(id, desc)| (id.to_string(), desc.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloud_voice_ids_alias_onto_neural_voices() {
        assert_eq!(XttsSpeech::resolve_voice("female-shaonv"), "en-US-JennyNeural");
        assert_eq!(XttsSpeech::resolve_voice("male-qn-qingse"), "en-US-GuyNeural");
    }

    #[test]
    fn unknown_voice_ids_pass_through() {
        assert_eq!(XttsSpeech::resolve_voice("my_cloned_voice"), "my_cloned_voice");
    }
}
