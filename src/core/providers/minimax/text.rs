//! MiniMax text generation

use super::MinimaxClient;
use crate::config::MinimaxConfig;
use crate::core::providers::{ProviderError, ProviderId, TextGenerator};
use crate::core::types::{TextRequest, TextResult, Usage};
use async_trait::async_trait;
use serde_json::{Value, json};

const MODEL: &str = "MiniMax-M2";

/// Text generation through the MiniMax chat completions API
#[derive(Debug, Clone)]
pub struct MinimaxText {
    client: MinimaxClient,
}

impl MinimaxText {
    pub fn new(config: &MinimaxConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: MinimaxClient::new(config)?,
        })
    }
}

#[async_trait]
impl TextGenerator for MinimaxText {
    fn id(&self) -> ProviderId {
        ProviderId::Minimax
    }

    async fn generate(&self, request: &TextRequest) -> Result<TextResult, ProviderError> {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": request.prompt}));

        let payload = json!({
            "model": MODEL,
            "messages": messages,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        let body = self.client.post_json("/chat/completions", &payload).await?;

        let content = body
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ProviderError::invalid_response(
                    ProviderId::Minimax,
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
            model: MODEL.to_string(),
            usage,
        })
    }
}
