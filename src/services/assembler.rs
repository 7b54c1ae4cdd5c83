//! FFmpeg assembly
//!
//! Stitches narration audio onto generated video, builds still-image videos
//! when no video provider is available, and downloads remote media into the
//! outputs directory.

use crate::utils::error::{GatewayError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;
use uuid::Uuid;

/// Media assembler bound to an output directory
#[derive(Debug, Clone)]
pub struct Assembler {
    output_dir: PathBuf,
}

impl Assembler {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Merge audio onto video: copy the video stream, re-encode audio as AAC,
    /// stop at the shorter stream.
    pub async fn merge_audio_video(
        &self,
        audio_path: &Path,
        video_path: &Path,
        output_filename: Option<String>,
    ) -> Result<PathBuf> {
        let filename = output_filename
            .unwrap_or_else(|| format!("final_{}.mp4", short_id()));
        let output_path = self.output_dir.join(filename);

        let args = [
            "-y",
            "-i",
            path_str(video_path)?,
            "-i",
            path_str(audio_path)?,
            "-c:v",
            "copy",
            "-c:a",
            "aac",
            "-shortest",
            path_str(&output_path)?,
        ];
        run_ffmpeg(&args).await?;

        Ok(output_path)
    }

    /// Build a video from a static image and audio, for when no video provider
    /// produced anything.
    pub async fn still_image_video(
        &self,
        audio_path: &Path,
        image_path: &Path,
        output_filename: Option<String>,
    ) -> Result<PathBuf> {
        let filename = output_filename
            .unwrap_or_else(|| format!("slideshow_{}.mp4", short_id()));
        let output_path = self.output_dir.join(filename);

        let args = [
            "-y",
            "-loop",
            "1",
            "-i",
            path_str(image_path)?,
            "-i",
            path_str(audio_path)?,
            "-c:v",
            "libx264",
            "-tune",
            "stillimage",
            "-c:a",
            "aac",
            "-b:a",
            "192k",
            "-pix_fmt",
            "yuv420p",
            "-shortest",
            path_str(&output_path)?,
        ];
        run_ffmpeg(&args).await?;

        Ok(output_path)
    }

    /// Download a media file into the output directory, picking the extension
    /// from the content type.
    pub async fn download_file(&self, url: &str) -> Result<PathBuf> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        let response = client.get(url).send().await?.error_for_status()?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let extension = if content_type.contains("video") {
            "mp4"
        } else if content_type.contains("audio") {
            "mp3"
        } else {
            "bin"
        };

        let output_path = self
            .output_dir
            .join(format!("download_{}.{}", short_id(), extension));
        let bytes = response.bytes().await?;
        tokio::fs::write(&output_path, &bytes).await?;

        debug!(path = %output_path.display(), bytes = bytes.len(), "downloaded media");
        Ok(output_path)
    }
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| GatewayError::Assembly(format!("non-UTF-8 path: {:?}", path)))
}

async fn run_ffmpeg(args: &[&str]) -> Result<()> {
    debug!(?args, "running ffmpeg");
    let output = Command::new("ffmpeg")
        .args(args)
        .output()
        .await
        .map_err(|e| GatewayError::Assembly(format!("failed to launch ffmpeg: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GatewayError::Assembly(format!("ffmpeg failed: {}", stderr)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_ids_are_short_and_unique() {
        let a = short_id();
        let b = short_id();
        assert_eq!(a.len(), 8);
        assert_ne!(a, b);
    }

    #[test]
    fn assembler_remembers_its_output_dir() {
        let assembler = Assembler::new("/tmp/outputs");
        assert_eq!(assembler.output_dir(), Path::new("/tmp/outputs"));
    }
}
