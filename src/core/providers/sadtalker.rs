//! SadTalker talking-head generation
//!
//! Drives a local SadTalker checkout as a subprocess. The checkpoint directory
//! sits inside the checkout, so `inference.py` is expected in its parent.
//! Plain text-to-video is out of this model's reach and reports as such, which
//! lets the router fall through to a text-to-video provider.

use crate::config::SadtalkerConfig;
use crate::core::providers::{ProviderError, ProviderId, VideoGenerator};
use crate::core::types::{TalkingHeadRequest, VideoRequest, VideoResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

const PROVIDER: ProviderId = ProviderId::Sadtalker;

/// Talking-head video generation through a local SadTalker install
#[derive(Debug, Clone)]
pub struct SadtalkerVideo {
    config: SadtalkerConfig,
}

impl SadtalkerVideo {
    pub fn new(config: &SadtalkerConfig) -> Result<Self, ProviderError> {
        if !config.checkpoint_dir.exists() {
            return Err(ProviderError::configuration(
                PROVIDER,
                format!(
                    "checkpoint directory not found at {:?}; download the trained models first",
                    config.checkpoint_dir
                ),
            ));
        }
        Ok(Self {
            config: config.clone(),
        })
    }

    fn install_dir(&self) -> PathBuf {
        self.config
            .checkpoint_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    async fn run_inference(
        &self,
        audio_path: &Path,
        face_image_path: &Path,
        result_dir: &Path,
    ) -> Result<PathBuf, ProviderError> {
        let script = self.install_dir().join("inference.py");
        if !script.exists() {
            return Err(ProviderError::configuration(
                PROVIDER,
                format!("inference.py not found, expected at {:?}", script),
            ));
        }

        tokio::fs::create_dir_all(result_dir)
            .await
            .map_err(|e| ProviderError::configuration(PROVIDER, e.to_string()))?;

        let mut cmd = Command::new(&self.config.python_bin);
        cmd.arg(&script)
            .arg("--driven_audio")
            .arg(audio_path)
            .arg("--source_image")
            .arg(face_image_path)
            .arg("--result_dir")
            .arg(result_dir)
            .arg("--checkpoint_dir")
            .arg(&self.config.checkpoint_dir)
            .arg("--preprocess")
            .arg(&self.config.preprocess)
            .current_dir(self.install_dir());

        if self.config.still {
            cmd.arg("--still");
        }
        if let Some(enhancer) = &self.config.enhancer {
            cmd.arg("--enhancer").arg(enhancer);
        }
        if self.config.device == "cpu" {
            cmd.arg("--cpu");
        }

        info!(audio = %audio_path.display(), image = %face_image_path.display(), "running SadTalker inference");
        let output = cmd
            .output()
            .await
            .map_err(|e| ProviderError::unavailable(PROVIDER, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProviderError::rejected(
                PROVIDER,
                format!("inference failed: {}", stderr),
            ));
        }

        find_produced_video(result_dir).await
    }
}

/// The inference script names its output after a timestamp; take the newest mp4.
async fn find_produced_video(result_dir: &Path) -> Result<PathBuf, ProviderError> {
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;

    let mut entries = tokio::fs::read_dir(result_dir)
        .await
        .map_err(|e| ProviderError::invalid_response(PROVIDER, e.to_string()))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ProviderError::invalid_response(PROVIDER, e.to_string()))?
    {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "mp4") {
            let modified = entry
                .metadata()
                .await
                .and_then(|m| m.modified())
                .unwrap_or(std::time::UNIX_EPOCH);
            if newest.as_ref().is_none_or(|(t, _)| modified > *t) {
                newest = Some((modified, path));
            }
        }
    }

    newest.map(|(_, path)| path).ok_or_else(|| {
        ProviderError::invalid_response(
            PROVIDER,
            format!("no output video found in {:?}", result_dir),
        )
    })
}

#[async_trait]
impl VideoGenerator for SadtalkerVideo {
    fn id(&self) -> ProviderId {
        PROVIDER
    }

    async fn generate(&self, _request: &VideoRequest) -> Result<VideoResult, ProviderError> {
        Err(ProviderError::not_supported(
            PROVIDER,
            "text-to-video; this model needs audio and a face image",
        ))
    }

    async fn talking_head(
        &self,
        request: &TalkingHeadRequest,
    ) -> Result<VideoResult, ProviderError> {
        if !request.audio_path.exists() {
            return Err(ProviderError::rejected(
                PROVIDER,
                format!("audio file not found: {:?}", request.audio_path),
            ));
        }
        if !request.face_image_path.exists() {
            return Err(ProviderError::rejected(
                PROVIDER,
                format!("face image not found: {:?}", request.face_image_path),
            ));
        }

        let result_dir = std::env::temp_dir()
            .join("sadtalker_output")
            .join(uuid::Uuid::new_v4().simple().to_string());

        let video_path = self
            .run_inference(&request.audio_path, &request.face_image_path, &result_dir)
            .await?;

        debug!(path = %video_path.display(), "SadTalker produced video");

        Ok(VideoResult {
            video: None,
            video_path: Some(video_path),
            task_id: None,
            duration: Some(request.duration),
        })
    }
}
