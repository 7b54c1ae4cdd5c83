//! Provider registry
//!
//! Holds the constructed provider instances, one map per capability, keyed by
//! [`ProviderId`]. Instances are built once at startup from configuration; a
//! provider that fails to construct (missing checkpoint, unreachable service)
//! is recorded rather than registered, and resolving it later yields a
//! provider error the router treats like any other failed attempt.

use super::{
    ProviderError, ProviderId, SpeechSynthesizer, TextGenerator, VideoGenerator,
    minimax::{MinimaxSpeech, MinimaxText, MinimaxVideo},
    sadtalker::SadtalkerVideo,
    vllm::VllmText,
    xtts::XttsSpeech,
};
use crate::config::Config;
use crate::core::Capability;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Registry of constructed providers
#[derive(Default)]
pub struct ProviderRegistry {
    text: HashMap<ProviderId, Arc<dyn TextGenerator>>,
    speech: HashMap<ProviderId, Arc<dyn SpeechSynthesizer>>,
    video: HashMap<ProviderId, Arc<dyn VideoGenerator>>,
    init_errors: HashMap<(Capability, ProviderId), String>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every provider referenced by the routing configuration
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();

        for (capability, id) in config.routing.referenced_providers() {
            let result = registry.construct(config, capability, id);
            match result {
                Ok(()) => info!("Registered {} provider: {}", capability, id),
                Err(e) => {
                    warn!("Failed to initialize {} provider '{}': {}", capability, id, e);
                    registry
                        .init_errors
                        .insert((capability, id), e.to_string());
                }
            }
        }

        registry
    }

    fn construct(
        &mut self,
        config: &Config,
        capability: Capability,
        id: ProviderId,
    ) -> Result<(), ProviderError> {
        match (capability, id) {
            (Capability::Text, ProviderId::Minimax) => {
                self.register_text(Arc::new(MinimaxText::new(&config.providers.minimax)?));
            }
            (Capability::Text, ProviderId::Vllm) => {
                self.register_text(Arc::new(VllmText::new(&config.providers.vllm)?));
            }
            (Capability::Speech, ProviderId::Minimax) => {
                self.register_speech(Arc::new(MinimaxSpeech::new(&config.providers.minimax)?));
            }
            (Capability::Speech, ProviderId::Xtts) => {
                self.register_speech(Arc::new(XttsSpeech::new(&config.providers.xtts)?));
            }
            (Capability::Video, ProviderId::Minimax) => {
                self.register_video(Arc::new(MinimaxVideo::new(&config.providers.minimax)?));
            }
            (Capability::Video, ProviderId::Sadtalker) => {
                self.register_video(Arc::new(SadtalkerVideo::new(&config.providers.sadtalker)?));
            }
            // config validation rejects these pairings before we get here
            (capability, id) => {
                return Err(ProviderError::configuration(
                    id,
                    format!("does not implement {} generation", capability),
                ));
            }
        }
        Ok(())
    }

    pub fn register_text(&mut self, provider: Arc<dyn TextGenerator>) {
        self.text.insert(provider.id(), provider);
    }

    pub fn register_speech(&mut self, provider: Arc<dyn SpeechSynthesizer>) {
        self.speech.insert(provider.id(), provider);
    }

    pub fn register_video(&mut self, provider: Arc<dyn VideoGenerator>) {
        self.video.insert(provider.id(), provider);
    }

    pub fn text(&self, id: ProviderId) -> Result<Arc<dyn TextGenerator>, ProviderError> {
        self.text
            .get(&id)
            .cloned()
            .ok_or_else(|| self.missing(Capability::Text, id))
    }

    pub fn speech(&self, id: ProviderId) -> Result<Arc<dyn SpeechSynthesizer>, ProviderError> {
        self.speech
            .get(&id)
            .cloned()
            .ok_or_else(|| self.missing(Capability::Speech, id))
    }

    pub fn video(&self, id: ProviderId) -> Result<Arc<dyn VideoGenerator>, ProviderError> {
        self.video
            .get(&id)
            .cloned()
            .ok_or_else(|| self.missing(Capability::Video, id))
    }

    fn missing(&self, capability: Capability, id: ProviderId) -> ProviderError {
        match self.init_errors.get(&(capability, id)) {
            Some(reason) => {
                ProviderError::configuration(id, format!("not initialized: {}", reason))
            }
            None => ProviderError::configuration(id, "provider not registered"),
        }
    }

    /// Registered providers for a capability, in stable order
    pub fn available(&self, capability: Capability) -> Vec<ProviderId> {
        let mut ids: Vec<ProviderId> = match capability {
            Capability::Text => self.text.keys().copied().collect(),
            Capability::Speech => self.speech.keys().copied().collect(),
            Capability::Video => self.video.keys().copied().collect(),
        };
        ids.sort_by_key(|id| id.as_str());
        ids
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("text", &self.available(Capability::Text))
            .field("speech", &self.available(Capability::Speech))
            .field("video", &self.available(Capability::Video))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_registry_reports_unregistered_provider() {
        let registry = ProviderRegistry::new();
        let err = match registry.text(ProviderId::Vllm) {
            Err(e) => e,
            Ok(_) => panic!("expected an error"),
        };
        assert!(err.to_string().contains("not registered"));
    }

    #[test]
    fn vllm_registers_without_credentials() {
        let config = Config {
            routing: crate::config::RoutingConfig {
                text: vec![ProviderId::Vllm],
                speech: vec![ProviderId::Xtts],
                video: vec![ProviderId::Minimax],
            },
            ..Config::default()
        };
        // minimax video has no API key, so it lands in init_errors instead
        let registry = ProviderRegistry::from_config(&config);
        assert!(registry.text(ProviderId::Vllm).is_ok());
        assert!(registry.speech(ProviderId::Xtts).is_ok());
        let err = match registry.video(ProviderId::Minimax) {
            Err(e) => e,
            Ok(_) => panic!("expected an error"),
        };
        assert!(err.to_string().contains("not initialized"));
    }
}
