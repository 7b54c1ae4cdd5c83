//! vLLM text generation
//!
//! Talks to a locally hosted vLLM server through its OpenAI-compatible API.
//! Start one with:
//!     python -m vllm.entrypoints.openai.api_server \
//!         --model meta-llama/Llama-3.1-70B-Instruct

use crate::config::VllmConfig;
use crate::core::providers::{ProviderError, ProviderId, TextGenerator};
use crate::core::types::{TextRequest, TextResult, Usage};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;

const PROVIDER: ProviderId = ProviderId::Vllm;

const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Respond clearly and concisely.";

/// Text generation against a local OpenAI-compatible inference server
#[derive(Debug, Clone)]
pub struct VllmText {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl VllmText {
    pub fn new(config: &VllmConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            // Local inference can be far slower than cloud APIs.
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| ProviderError::configuration(PROVIDER, e.to_string()))?;

        let mut base_url = config.base_url.trim_end_matches('/').to_string();
        if !base_url.ends_with("/v1") {
            base_url.push_str("/v1");
        }

        Ok(Self {
            http,
            base_url,
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for VllmText {
    fn id(&self) -> ProviderId {
        PROVIDER
    }

    async fn generate(&self, request: &TextRequest) -> Result<TextResult, ProviderError> {
        // Llama Instruct models behave best with an explicit system prompt.
        let system = request.system.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT);
        let payload = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": request.prompt},
            ],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        let mut builder = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .json(&payload);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                ProviderError::unavailable(
                    PROVIDER,
                    format!(
                        "cannot connect to vLLM at {}; start it with: python -m \
                         vllm.entrypoints.openai.api_server --model {}",
                        self.base_url, self.model
                    ),
                )
            } else {
                ProviderError::from_reqwest(PROVIDER, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::api_error(PROVIDER, status.as_u16(), text));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::invalid_response(PROVIDER, e.to_string()))?;

        if let Some(error) = body.get("error") {
            return Err(ProviderError::rejected(PROVIDER, error.to_string()));
        }

        let content = body
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ProviderError::invalid_response(
                    PROVIDER,
                    format!("no completion content in {}", body),
                )
            })?
            .to_string();

        let usage = body.get("usage").map(|u| Usage {
            prompt_tokens: u.get("prompt_tokens").and_then(Value::as_u64).unwrap_or(0) as u32,
            completion_tokens: u
                .get("completion_tokens")
                .and_then(Value::as_u64)
                .unwrap_or(0) as u32,
            total_tokens: u.get("total_tokens").and_then(Value::as_u64).unwrap_or(0) as u32,
        });

        Ok(TextResult {
            content,
            model: self.model.clone(),
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v1_suffix_is_appended_once() {
        let provider = VllmText::new(&VllmConfig {
            base_url: "http://localhost:8000".to_string(),
            ..VllmConfig::default()
        })
        .unwrap();
        assert_eq!(provider.base_url, "http://localhost:8000/v1");

        let provider = VllmText::new(&VllmConfig {
            base_url: "http://localhost:8000/v1/".to_string(),
            ..VllmConfig::default()
        })
        .unwrap();
        assert_eq!(provider.base_url, "http://localhost:8000/v1");
    }
}
