//! The provider router

use super::error::{ProviderAttempt, RouterError};
use crate::config::RoutingConfig;
use crate::core::Capability;
use crate::core::providers::{ProviderError, ProviderId, ProviderRegistry};
use crate::core::types::{
    SpeechRequest, SpeechResult, TalkingHeadRequest, TextRequest, TextResult, VideoRequest,
    VideoResult, VoiceCatalog, VoiceCloneResult, VoiceSample,
};
use std::future::Future;
use tracing::{error, info, warn};

/// A successful result plus routing metadata
#[derive(Debug, Clone)]
pub struct Routed<T> {
    /// The provider's result
    pub value: T,
    /// The provider that served it
    pub provider: ProviderId,
    /// How many providers failed before this one
    pub failed_attempts: u32,
}

impl<T> Routed<T> {
    /// Whether a fallback provider served the request
    pub fn used_fallback(&self) -> bool {
        self.failed_attempts > 0
    }
}

/// Dispatches capability requests across the configured fallback chains.
///
/// Stateless per call: the only held state is the immutable routing table and
/// the registry of constructed providers, both injected at startup.
pub struct ProviderRouter {
    registry: ProviderRegistry,
    routing: RoutingConfig,
}

impl ProviderRouter {
    pub fn new(registry: ProviderRegistry, routing: RoutingConfig) -> Self {
        Self { registry, routing }
    }

    /// Build registry and router from validated configuration
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(
            ProviderRegistry::from_config(config),
            config.routing.clone(),
        )
    }

    /// The primary provider for a capability, as configured
    pub fn primary(&self, capability: Capability) -> Option<ProviderId> {
        self.routing.chain(capability).first().copied()
    }

    /// Registered providers for a capability
    pub fn available(&self, capability: Capability) -> Vec<ProviderId> {
        self.registry.available(capability)
    }

    /// The configured chain for a capability
    pub fn chain(&self, capability: Capability) -> &[ProviderId] {
        self.routing.chain(capability)
    }

    pub async fn generate_text(
        &self,
        request: &TextRequest,
    ) -> Result<Routed<TextResult>, RouterError> {
        self.run_chain(Capability::Text, |id| async move {
            self.registry.text(id)?.generate(request).await
        })
        .await
    }

    pub async fn synthesize_speech(
        &self,
        request: &SpeechRequest,
    ) -> Result<Routed<SpeechResult>, RouterError> {
        self.run_chain(Capability::Speech, |id| async move {
            self.registry.speech(id)?.synthesize(request).await
        })
        .await
    }

    pub async fn clone_voice(
        &self,
        sample: &VoiceSample,
    ) -> Result<Routed<VoiceCloneResult>, RouterError> {
        self.run_chain(Capability::Speech, |id| async move {
            self.registry.speech(id)?.clone_voice(sample).await
        })
        .await
    }

    pub async fn generate_video(
        &self,
        request: &VideoRequest,
    ) -> Result<Routed<VideoResult>, RouterError> {
        self.run_chain(Capability::Video, |id| async move {
            self.registry.video(id)?.generate(request).await
        })
        .await
    }

    pub async fn generate_talking_head(
        &self,
        request: &TalkingHeadRequest,
    ) -> Result<Routed<VideoResult>, RouterError> {
        self.run_chain(Capability::Video, |id| async move {
            self.registry.video(id)?.talking_head(request).await
        })
        .await
    }

    /// Voice catalog of the first reachable speech provider in the chain
    pub fn voices(&self) -> Result<VoiceCatalog, RouterError> {
        let chain = self.routing.chain(Capability::Speech);
        if chain.is_empty() {
            return Err(RouterError::Unconfigured(Capability::Speech));
        }
        for &id in chain {
            if let Ok(provider) = self.registry.speech(id) {
                return Ok(provider.voices());
            }
        }
        Err(RouterError::Exhausted {
            capability: Capability::Speech,
            attempts: chain
                .iter()
                .map(|&id| ProviderAttempt {
                    provider: id,
                    error: ProviderError::configuration(id, "provider not registered"),
                })
                .collect(),
        })
    }

    /// Walk the configured chain for a capability, one provider at a time.
    ///
    /// The first success returns immediately; every failure is logged and
    /// recorded. There is no retry, no backoff and no memory of past walks:
    /// the next call starts again from the top of the chain.
    async fn run_chain<'a, T, F, Fut>(
        &'a self,
        capability: Capability,
        mut attempt: F,
    ) -> Result<Routed<T>, RouterError>
    where
        F: FnMut(ProviderId) -> Fut,
        Fut: Future<Output = Result<T, ProviderError>> + 'a,
    {
        let chain = self.routing.chain(capability);
        if chain.is_empty() {
            return Err(RouterError::Unconfigured(capability));
        }

        let mut attempts = Vec::new();
        for &id in chain {
            match attempt(id).await {
                Ok(value) => {
                    let failed_attempts = attempts.len() as u32;
                    if failed_attempts > 0 {
                        info!(
                            capability = %capability,
                            provider = %id,
                            failed = failed_attempts,
                            "fallback provider served the request"
                        );
                    }
                    return Ok(Routed {
                        value,
                        provider: id,
                        failed_attempts,
                    });
                }
                Err(err) => {
                    if err.is_config_related() {
                        error!(
                            capability = %capability,
                            provider = %id,
                            "provider misconfigured, trying next: {}", err
                        );
                    } else {
                        warn!(
                            capability = %capability,
                            provider = %id,
                            "provider failed, trying next: {}", err
                        );
                    }
                    attempts.push(ProviderAttempt {
                        provider: id,
                        error: err,
                    });
                }
            }
        }

        Err(RouterError::Exhausted {
            capability,
            attempts,
        })
    }
}

impl std::fmt::Debug for ProviderRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRouter")
            .field("text", &self.routing.text)
            .field("speech", &self.routing.speech)
            .field("video", &self.routing.video)
            .finish()
    }
}
