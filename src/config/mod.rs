//! Configuration management
//!
//! Configuration is loaded exactly once at startup, from a YAML file or from
//! environment variables, validated, and then handed to the router and server
//! by value. Nothing reads configuration from ambient global state afterwards.

pub mod models;

pub use models::*;

use crate::core::Capability;
use crate::core::providers::ProviderId;
use crate::utils::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GatewayError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| GatewayError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let mut config = Config::default();

        if let Ok(host) = std::env::var("SERVER_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("SERVER_PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| GatewayError::Config(format!("Invalid SERVER_PORT '{}'", port)))?;
        }

        if let Some(chain) = chain_from_env("PROVIDER_TEXT", "PROVIDER_TEXT_FALLBACK")? {
            config.routing.text = chain;
        }
        if let Some(chain) = chain_from_env("PROVIDER_TTS", "PROVIDER_TTS_FALLBACK")? {
            config.routing.speech = chain;
        }
        if let Some(chain) = chain_from_env("PROVIDER_VIDEO", "PROVIDER_VIDEO_FALLBACK")? {
            config.routing.video = chain;
        }

        let minimax = &mut config.providers.minimax;
        minimax.api_key = std::env::var("MINIMAX_API_KEY").ok().or(minimax.api_key.take());
        minimax.group_id = std::env::var("MINIMAX_GROUP_ID").ok().or(minimax.group_id.take());
        if let Ok(base_url) = std::env::var("MINIMAX_BASE_URL") {
            minimax.base_url = base_url;
        }

        let vllm = &mut config.providers.vllm;
        if let Ok(base_url) = std::env::var("PROVIDER_VLLM_BASE_URL") {
            vllm.base_url = base_url;
        }
        if let Ok(model) = std::env::var("PROVIDER_VLLM_MODEL") {
            vllm.model = model;
        }
        vllm.api_key = std::env::var("PROVIDER_VLLM_API_KEY").ok().or(vllm.api_key.take());

        if let Ok(base_url) = std::env::var("PROVIDER_XTTS_BASE_URL") {
            config.providers.xtts.base_url = base_url;
        }

        let sadtalker = &mut config.providers.sadtalker;
        if let Ok(checkpoint) = std::env::var("PROVIDER_SADTALKER_CHECKPOINT") {
            sadtalker.checkpoint_dir = checkpoint.into();
        }
        if let Ok(device) = std::env::var("PROVIDER_SADTALKER_DEVICE") {
            sadtalker.device = device;
        }
        if let Ok(preprocess) = std::env::var("PROVIDER_SADTALKER_PREPROCESS") {
            sadtalker.preprocess = preprocess;
        }
        if let Ok(still) = std::env::var("PROVIDER_SADTALKER_STILL") {
            sadtalker.still = still.eq_ignore_ascii_case("true");
        }
        sadtalker.enhancer = std::env::var("PROVIDER_SADTALKER_ENHANCER")
            .ok()
            .or(sadtalker.enhancer.take());

        if let Ok(dir) = std::env::var("OUTPUT_DIR") {
            config.storage.output_dir = dir.into();
        }
        if let Ok(dir) = std::env::var("UPLOAD_DIR") {
            config.storage.upload_dir = dir.into();
        }
        if let Ok(dir) = std::env::var("DATA_DIR") {
            config.storage.data_dir = dir.into();
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from the given file, or fall back to the environment
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path).await,
            None => {
                let default_path = Path::new("config/pitchreel.yaml");
                if default_path.exists() {
                    Self::from_file(default_path).await
                } else {
                    Self::from_env()
                }
            }
        }
    }

    /// Validate the entire configuration
    ///
    /// Routing chains must be non-empty, every routed provider must implement
    /// its capability, and cloud providers must carry their credentials. All
    /// of this fails here, before a single request is accepted.
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        for capability in Capability::ALL {
            let chain = self.routing.chain(capability);
            if chain.is_empty() {
                return Err(GatewayError::Config(format!(
                    "routing.{} has no providers configured",
                    capability
                )));
            }
            for &id in chain {
                if !id.supports(capability) {
                    return Err(GatewayError::Config(format!(
                        "provider '{}' does not implement {} generation",
                        id, capability
                    )));
                }
            }
        }

        let minimax_routed = self
            .routing
            .referenced_providers()
            .iter()
            .any(|(_, id)| *id == ProviderId::Minimax);
        if minimax_routed && self.providers.minimax.api_key.is_none() {
            return Err(GatewayError::Config(
                "minimax is routed but MINIMAX_API_KEY is not set".to_string(),
            ));
        }
        if self.routing.speech.contains(&ProviderId::Minimax)
            && self.providers.minimax.group_id.is_none()
        {
            return Err(GatewayError::Config(
                "minimax speech requires MINIMAX_GROUP_ID".to_string(),
            ));
        }

        debug!("Configuration validation completed");
        Ok(())
    }
}

/// Assemble an ordered chain from a primary-provider variable and a
/// comma-separated fallback variable. Returns `None` when neither is set.
fn chain_from_env(primary_var: &str, fallback_var: &str) -> Result<Option<Vec<ProviderId>>> {
    let primary = std::env::var(primary_var).ok();
    let fallback = std::env::var(fallback_var).ok();

    if primary.is_none() && fallback.is_none() {
        return Ok(None);
    }

    let mut chain = Vec::new();
    if let Some(name) = primary {
        chain.push(parse_provider(primary_var, &name)?);
    }
    if let Some(list) = fallback {
        for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let id = parse_provider(fallback_var, name)?;
            if !chain.contains(&id) {
                chain.push(id);
            }
        }
    }

    Ok(Some(chain))
}

fn parse_provider(var: &str, name: &str) -> Result<ProviderId> {
    ProviderId::from_str(name)
        .map_err(|e| GatewayError::Config(format!("{}: {}", var, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_minimax_key(mut config: Config) -> Config {
        config.providers.minimax.api_key = Some("test-key".to_string());
        config.providers.minimax.group_id = Some("group".to_string());
        config
    }

    #[test]
    fn default_config_validates_with_credentials() {
        let config = with_minimax_key(Config::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_config_without_key_is_rejected() {
        let config = Config::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("MINIMAX_API_KEY"));
    }

    #[test]
    fn empty_chain_is_a_config_error() {
        let mut config = with_minimax_key(Config::default());
        config.routing.text = vec![];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("routing.text"));
    }

    #[test]
    fn capability_mismatch_is_a_config_error() {
        let mut config = with_minimax_key(Config::default());
        config.routing.text = vec![ProviderId::Sadtalker];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sadtalker"));
    }

    #[tokio::test]
    async fn config_from_yaml_file() {
        use std::io::Write;

        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 9000

routing:
  text: [vllm]
  speech: [xtts]
  video: [sadtalker]

providers:
  vllm:
    base_url: "http://localhost:8000"
    model: "meta-llama/Llama-3.1-8B-Instruct"
"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).await.unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.routing.text, vec![ProviderId::Vllm]);
        assert_eq!(config.routing.speech, vec![ProviderId::Xtts]);
        assert_eq!(
            config.providers.vllm.model,
            "meta-llama/Llama-3.1-8B-Instruct"
        );
    }

    #[tokio::test]
    async fn unknown_provider_name_fails_parsing() {
        use std::io::Write;

        let yaml = "routing:\n  text: [grok]\n";
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        assert!(Config::from_file(file.path()).await.is_err());
    }

    #[tokio::test]
    async fn loading_twice_yields_identical_chains() {
        use std::io::Write;

        let yaml = r#"
routing:
  text: [vllm]
  speech: [xtts]
  video: [sadtalker]
"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let first = Config::from_file(file.path()).await.unwrap();
        let second = Config::from_file(file.path()).await.unwrap();
        for capability in Capability::ALL {
            assert_eq!(
                first.routing.chain(capability),
                second.routing.chain(capability)
            );
        }
    }
}
