//! MiniMax video generation
//!
//! Video is task-based: submit, poll until `Success`/`Fail`, then fetch the
//! produced file from the CDN through a file-retrieve hop.

use super::MinimaxClient;
use crate::config::MinimaxConfig;
use crate::core::providers::{ProviderError, ProviderId, VideoGenerator};
use crate::core::types::{TalkingHeadRequest, VideoRequest, VideoResult};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;

const PROVIDER: ProviderId = ProviderId::Minimax;
const TEXT_TO_VIDEO_MODEL: &str = "T2V-01";
const TALKING_HEAD_MODEL: &str = "S2V-01";
const POLL_INTERVAL: Duration = Duration::from_secs(10);
const POLL_TIMEOUT: Duration = Duration::from_secs(600);

const DEFAULT_TALKING_HEAD_PROMPT: &str = "Professional person talking to camera in modern \
     office setting. Natural head movements and expressions. Confident and friendly demeanor. \
     High quality, well-lit, corporate environment.";

/// Video generation through the MiniMax Hailuo/T2V task API
#[derive(Debug, Clone)]
pub struct MinimaxVideo {
    client: MinimaxClient,
}

impl MinimaxVideo {
    pub fn new(config: &MinimaxConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: MinimaxClient::new(config)?,
        })
    }

    async fn submit_and_collect(
        &self,
        payload: Value,
        duration: u32,
    ) -> Result<VideoResult, ProviderError> {
        let body = self.client.post_json("/video_generation", &payload).await?;

        let task_id = body
            .get("task_id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ProviderError::invalid_response(PROVIDER, format!("no task_id in {}", body))
            })?
            .to_string();

        let file_id = self.wait_for_task(&task_id).await?;

        let video = match file_id {
            Some(file_id) => Some(self.download(&file_id).await?),
            None => None,
        };

        Ok(VideoResult {
            video,
            video_path: None,
            task_id: Some(task_id),
            duration: Some(duration),
        })
    }

    /// Poll the task until it finishes; returns the produced file id
    async fn wait_for_task(&self, task_id: &str) -> Result<Option<String>, ProviderError> {
        let mut elapsed = Duration::ZERO;
        loop {
            if elapsed >= POLL_TIMEOUT {
                return Err(ProviderError::timeout(
                    PROVIDER,
                    format!(
                        "video task {} not finished after {}s",
                        task_id,
                        POLL_TIMEOUT.as_secs()
                    ),
                ));
            }

            let body = self
                .client
                .get_json("/query/video_generation", &[("task_id", task_id)])
                .await?;

            match body.get("status").and_then(Value::as_str).unwrap_or("") {
                "Success" => {
                    return Ok(body
                        .get("file_id")
                        .and_then(Value::as_str)
                        .map(str::to_string));
                }
                "Fail" => {
                    let msg = body
                        .pointer("/base_resp/status_msg")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown error");
                    return Err(ProviderError::rejected(
                        PROVIDER,
                        format!("video generation failed: {}", msg),
                    ));
                }
                _ => {}
            }

            tokio::time::sleep(POLL_INTERVAL).await;
            elapsed += POLL_INTERVAL;
        }
    }

    /// Resolve the CDN url for a produced file and fetch the bytes
    async fn download(&self, file_id: &str) -> Result<bytes::Bytes, ProviderError> {
        let body = self
            .client
            .get_json("/files/retrieve", &[("file_id", file_id)])
            .await?;

        let download_url = body
            .pointer("/file/download_url")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ProviderError::invalid_response(PROVIDER, format!("no download URL in {}", body))
            })?;

        // The CDN is a separate host and takes no auth headers.
        let cdn = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| ProviderError::configuration(PROVIDER, e.to_string()))?;

        let response = cdn
            .get(download_url)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(ProviderError::api_error(
                PROVIDER,
                response.status().as_u16(),
                "video download failed",
            ));
        }

        response
            .bytes()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))
    }
}

#[async_trait]
impl VideoGenerator for MinimaxVideo {
    fn id(&self) -> ProviderId {
        PROVIDER
    }

    async fn generate(&self, request: &VideoRequest) -> Result<VideoResult, ProviderError> {
        let model = request.model.as_deref().unwrap_or(TEXT_TO_VIDEO_MODEL);
        let payload = json!({
            "model": model,
            "prompt": request.prompt,
            "prompt_optimizer": true,
            "duration": request.duration,
        });

        self.submit_and_collect(payload, request.duration).await
    }

    async fn talking_head(
        &self,
        request: &TalkingHeadRequest,
    ) -> Result<VideoResult, ProviderError> {
        // S2V-01 consumes the face by public URL; local paths cannot be sent.
        let image_url = request.image_url.as_deref().ok_or_else(|| {
            ProviderError::rejected(
                PROVIDER,
                "talking head requires a public image URL; upload the face image first",
            )
        })?;

        let prompt = request
            .prompt
            .as_deref()
            .unwrap_or(DEFAULT_TALKING_HEAD_PROMPT);

        let payload = json!({
            "model": TALKING_HEAD_MODEL,
            "prompt": prompt,
            "prompt_optimizer": true,
            "duration": request.duration,
            "subject_reference": [
                {
                    "type": "character",
                    "image": [image_url],
                }
            ],
        });

        self.submit_and_collect(payload, request.duration).await
    }
}
