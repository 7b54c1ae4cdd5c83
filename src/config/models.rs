//! Configuration sections

use crate::core::Capability;
use crate::core::providers::ProviderId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS settings
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: CorsConfig::default(),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Whether CORS headers are emitted at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Allowed origins; empty means any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: Vec::new(),
        }
    }
}

impl CorsConfig {
    pub fn allows_all_origins(&self) -> bool {
        self.allowed_origins.is_empty()
    }
}

/// Ordered provider chains, one per capability
///
/// The first entry is the primary provider; the rest are fallbacks tried
/// strictly in order. Names are parsed into [`ProviderId`] during
/// deserialization, so a typo fails configuration loading, not a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default = "default_text_chain")]
    pub text: Vec<ProviderId>,
    #[serde(default = "default_speech_chain")]
    pub speech: Vec<ProviderId>,
    #[serde(default = "default_video_chain")]
    pub video: Vec<ProviderId>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            text: default_text_chain(),
            speech: default_speech_chain(),
            video: default_video_chain(),
        }
    }
}

impl RoutingConfig {
    /// The configured chain for a capability
    pub fn chain(&self, capability: Capability) -> &[ProviderId] {
        match capability {
            Capability::Text => &self.text,
            Capability::Speech => &self.speech,
            Capability::Video => &self.video,
        }
    }

    /// Every provider referenced by any chain, deduplicated
    pub fn referenced_providers(&self) -> Vec<(Capability, ProviderId)> {
        let mut seen = Vec::new();
        for capability in Capability::ALL {
            for &id in self.chain(capability) {
                if !seen.contains(&(capability, id)) {
                    seen.push((capability, id));
                }
            }
        }
        seen
    }
}

fn default_text_chain() -> Vec<ProviderId> {
    vec![ProviderId::Minimax, ProviderId::Vllm]
}

fn default_speech_chain() -> Vec<ProviderId> {
    vec![ProviderId::Minimax, ProviderId::Xtts]
}

fn default_video_chain() -> Vec<ProviderId> {
    vec![ProviderId::Minimax, ProviderId::Sadtalker]
}

/// Per-provider connection settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub minimax: MinimaxConfig,
    #[serde(default)]
    pub vllm: VllmConfig,
    #[serde(default)]
    pub xtts: XttsConfig,
    #[serde(default)]
    pub sadtalker: SadtalkerConfig,
}

/// MiniMax cloud API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinimaxConfig {
    /// API key; required whenever minimax appears in a chain
    #[serde(default)]
    pub api_key: Option<String>,
    /// Group id; required for speech synthesis and voice cloning
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default = "default_minimax_base_url")]
    pub base_url: String,
}

impl Default for MinimaxConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            group_id: None,
            base_url: default_minimax_base_url(),
        }
    }
}

/// Local vLLM inference server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VllmConfig {
    #[serde(default = "default_vllm_base_url")]
    pub base_url: String,
    #[serde(default = "default_vllm_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for VllmConfig {
    fn default() -> Self {
        Self {
            base_url: default_vllm_base_url(),
            model: default_vllm_model(),
            api_key: None,
        }
    }
}

/// Local TTS microservice settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XttsConfig {
    #[serde(default = "default_xtts_base_url")]
    pub base_url: String,
}

impl Default for XttsConfig {
    fn default() -> Self {
        Self {
            base_url: default_xtts_base_url(),
        }
    }
}

/// Local SadTalker settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SadtalkerConfig {
    /// Checkpoint directory; `inference.py` is expected in its parent
    #[serde(default = "default_sadtalker_checkpoint")]
    pub checkpoint_dir: PathBuf,
    #[serde(default = "default_python_bin")]
    pub python_bin: String,
    #[serde(default = "default_device")]
    pub device: String,
    /// Face preprocessing mode: crop, resize or full
    #[serde(default = "default_preprocess")]
    pub preprocess: String,
    /// Reduce head motion
    #[serde(default)]
    pub still: bool,
    /// Optional face enhancer (gfpgan, RestoreFormer)
    #[serde(default)]
    pub enhancer: Option<String>,
}

impl Default for SadtalkerConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: default_sadtalker_checkpoint(),
            python_bin: default_python_bin(),
            device: default_device(),
            preprocess: default_preprocess(),
            still: false,
            enhancer: None,
        }
    }
}

/// Artifact directories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Generated media (audio, video, merged clips)
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Uploaded assets (face images, voice samples)
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Persistent state (voice profiles)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            upload_dir: default_upload_dir(),
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    /// Create all directories if missing
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        std::fs::create_dir_all(&self.upload_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_minimax_base_url() -> String {
    "https://api.minimax.io/v1".to_string()
}

fn default_vllm_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_vllm_model() -> String {
    "meta-llama/Llama-3.1-70B-Instruct".to_string()
}

fn default_xtts_base_url() -> String {
    "http://localhost:8020".to_string()
}

fn default_sadtalker_checkpoint() -> PathBuf {
    PathBuf::from("./models/sadtalker")
}

fn default_python_bin() -> String {
    "python3".to_string()
}

fn default_device() -> String {
    "cuda".to_string()
}

fn default_preprocess() -> String {
    "crop".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./outputs")
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
