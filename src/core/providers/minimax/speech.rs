//! MiniMax speech synthesis and voice cloning

use super::MinimaxClient;
use crate::config::MinimaxConfig;
use crate::core::providers::{ProviderError, ProviderId, SpeechSynthesizer};
use crate::core::types::{
    SpeechRequest, SpeechResult, VoiceCatalog, VoiceCloneResult, VoiceSample,
    estimate_speech_seconds,
};
use async_trait::async_trait;
use serde_json::{Value, json};

const PROVIDER: ProviderId = ProviderId::Minimax;
const MODEL: &str = "speech-02-hd";

const BUILTIN_VOICES: &[(&str, &str)] = &[
    ("female-shaonv", "Young female, energetic"),
    ("female-yujie", "Mature female, professional"),
    ("male-qn-qingse", "Young male, fresh"),
    ("male-qn-jingying", "Male, business professional"),
    ("presenter_male", "Male presenter voice"),
    ("presenter_female", "Female presenter voice"),
];

/// Speech synthesis through the MiniMax t2a API
#[derive(Debug, Clone)]
pub struct MinimaxSpeech {
    client: MinimaxClient,
}

impl MinimaxSpeech {
    pub fn new(config: &MinimaxConfig) -> Result<Self, ProviderError> {
        let client = MinimaxClient::new(config)?;
        // Speech endpoints all carry GroupId; fail construction if it is missing.
        client.group_id()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SpeechSynthesizer for MinimaxSpeech {
    fn id(&self) -> ProviderId {
        PROVIDER
    }

    async fn synthesize(&self, request: &SpeechRequest) -> Result<SpeechResult, ProviderError> {
        let payload = json!({
            "model": MODEL,
            "text": request.text,
            "stream": false,
            "voice_setting": {
                "voice_id": request.voice_id,
                "speed": request.speed,
                "vol": 1.0,
                "pitch": 0,
            },
            "audio_setting": {
                "format": "mp3",
                "sample_rate": 32000,
            },
        });

        let path = format!("/t2a_v2?GroupId={}", self.client.group_id()?);
        let body = self.client.post_json(&path, &payload).await?;

        // Audio arrives hex-encoded, either under data.audio or audio_file.
        let audio_hex = body
            .pointer("/data/audio")
            .and_then(Value::as_str)
            .or_else(|| body.get("audio_file").and_then(Value::as_str))
            .ok_or_else(|| {
                ProviderError::invalid_response(PROVIDER, format!("no audio in response: {}", body))
            })?;

        let audio = hex::decode(audio_hex)
            .map_err(|e| ProviderError::invalid_response(PROVIDER, format!("bad audio hex: {}", e)))?;

        Ok(SpeechResult {
            audio: audio.into(),
            format: "mp3".to_string(),
            sample_rate: 32000,
            duration_estimate: Some(estimate_speech_seconds(&request.text, request.speed)),
        })
    }

    async fn clone_voice(&self, sample: &VoiceSample) -> Result<VoiceCloneResult, ProviderError> {
        let content_type = match sample.file_name.rsplit('.').next() {
            Some("wav") => "audio/wav",
            Some("m4a") => "audio/mp4",
            _ => "audio/mpeg",
        };

        let file_id = self
            .client
            .upload_file(
                "voice_clone",
                &sample.file_name,
                content_type,
                sample.data.to_vec(),
            )
            .await?;

        let payload = json!({
            "file_id": file_id,
            "voice_id": sample.voice_name,
        });
        let path = format!("/voice_clone?GroupId={}", self.client.group_id()?);
        self.client.post_json(&path, &payload).await?;

        Ok(VoiceCloneResult {
            voice_id: sample.voice_name.clone(),
            name: sample.voice_name.clone(),
            provider: PROVIDER.to_string(),
        })
    }

    fn voices(&self) -> VoiceCatalog {
        BUILTIN_VOICES
            .iter()
            .map(|(id, desc)| (id.to_string(), desc.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MinimaxConfig;

    fn speech_config() -> MinimaxConfig {
        MinimaxConfig {
            api_key: Some("key".to_string()),
            group_id: Some("group".to_string()),
            ..MinimaxConfig::default()
        }
    }

    #[test]
    fn construction_requires_group_id() {
        let mut config = speech_config();
        config.group_id = None;
        assert!(MinimaxSpeech::new(&config).is_err());
    }

    #[test]
    fn voice_catalog_is_nonempty() {
        let speech = MinimaxSpeech::new(&speech_config()).unwrap();
        let voices = speech.voices();
        assert!(voices.contains_key("female-shaonv"));
        assert!(voices.len() >= 6);
    }
}
