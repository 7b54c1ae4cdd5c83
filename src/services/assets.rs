//! Upload validation and storage
//!
//! Face images feed the talking-head providers, voice samples feed cloning.
//! Both get format and sanity checks before anything touches a provider.

use crate::utils::error::{GatewayError, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
const ALLOWED_AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a"];

/// Below this an image cannot plausibly contain a usable face
const MIN_IMAGE_BYTES: usize = 1000;
/// Voice samples shorter than a few seconds clone badly
const MIN_AUDIO_BYTES: usize = 10_000;

fn extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Validate a face-reference image (JPEG or PNG, sane size, valid header)
pub fn validate_image(data: &[u8], filename: &str) -> Result<()> {
    let ext = extension(filename);
    if !ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(GatewayError::Validation(format!(
            "invalid image format '.{}'; allowed: {}",
            ext,
            ALLOWED_IMAGE_EXTENSIONS.join(", ")
        )));
    }

    if data.len() < MIN_IMAGE_BYTES {
        return Err(GatewayError::Validation(
            "image file is too small or corrupt".to_string(),
        ));
    }

    let header_ok = match ext.as_str() {
        "jpg" | "jpeg" => data.starts_with(&[0xFF, 0xD8]),
        "png" => data.starts_with(&[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n']),
        _ => false,
    };
    if !header_ok {
        return Err(GatewayError::Validation(format!(
            "file does not look like a valid {} image",
            ext
        )));
    }

    Ok(())
}

/// Validate a voice sample (MP3/WAV/M4A, sane size, recognizable header)
pub fn validate_audio(data: &[u8], filename: &str) -> Result<()> {
    let ext = extension(filename);
    if !ALLOWED_AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        return Err(GatewayError::Validation(format!(
            "invalid audio format '.{}'; allowed: {}",
            ext,
            ALLOWED_AUDIO_EXTENSIONS.join(", ")
        )));
    }

    if data.len() < MIN_AUDIO_BYTES {
        return Err(GatewayError::Validation(
            "audio sample is too short; provide at least ~10 seconds of speech".to_string(),
        ));
    }

    let header_ok = match ext.as_str() {
        // ID3 tag or MPEG frame sync
        "mp3" => data.starts_with(b"ID3") || data.first() == Some(&0xFF),
        "wav" => data.starts_with(b"RIFF"),
        // M4A containers start with an ftyp box at offset 4
        "m4a" => data.len() > 8 && &data[4..8] == b"ftyp",
        _ => false,
    };
    if !header_ok {
        return Err(GatewayError::Validation(format!(
            "file does not look like a valid {} audio file",
            ext
        )));
    }

    Ok(())
}

/// Validated uploads persisted under the upload directory
#[derive(Debug, Clone)]
pub struct AssetStore {
    upload_dir: PathBuf,
}

impl AssetStore {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub async fn save_image(&self, data: &[u8], filename: &str) -> Result<PathBuf> {
        validate_image(data, filename)?;
        self.persist(data, filename).await
    }

    pub async fn save_audio(&self, data: &[u8], filename: &str) -> Result<PathBuf> {
        validate_audio(data, filename)?;
        self.persist(data, filename).await
    }

    async fn persist(&self, data: &[u8], filename: &str) -> Result<PathBuf> {
        let ext = extension(filename);
        let path = self
            .upload_dir
            .join(format!("{}.{}", Uuid::new_v4().simple(), ext));
        tokio::fs::write(&path, data).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let mut data = vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];
        data.resize(2048, 0);
        data
    }

    fn mp3_bytes() -> Vec<u8> {
        let mut data = b"ID3".to_vec();
        data.resize(20_000, 0);
        data
    }

    #[test]
    fn valid_png_passes() {
        assert!(validate_image(&png_bytes(), "face.png").is_ok());
    }

    #[test]
    fn wrong_extension_is_rejected() {
        assert!(validate_image(&png_bytes(), "face.gif").is_err());
    }

    #[test]
    fn truncated_image_is_rejected() {
        let err = validate_image(&[0x89, b'P'], "face.png").unwrap_err();
        assert!(err.to_string().contains("too small"));
    }

    #[test]
    fn jpeg_header_is_checked() {
        let mut data = vec![0x00, 0x00];
        data.resize(2048, 0);
        assert!(validate_image(&data, "face.jpg").is_err());
    }

    #[test]
    fn valid_mp3_passes() {
        assert!(validate_audio(&mp3_bytes(), "voice.mp3").is_ok());
    }

    #[test]
    fn short_audio_is_rejected() {
        let err = validate_audio(b"ID3tiny", "voice.mp3").unwrap_err();
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn wav_needs_riff_header() {
        let mut data = b"FFIR".to_vec();
        data.resize(20_000, 0);
        assert!(validate_audio(&data, "voice.wav").is_err());
    }

    #[tokio::test]
    async fn store_persists_with_uuid_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::new(dir.path());
        let path = store.save_image(&png_bytes(), "face.png").await.unwrap();
        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "png");
        assert_ne!(path.file_stem().unwrap(), "face");
    }
}
