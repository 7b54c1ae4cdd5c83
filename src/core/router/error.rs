//! Routing error types

use crate::core::Capability;
use crate::core::providers::{ProviderError, ProviderId};

/// One failed provider call inside a chain walk
#[derive(Debug, Clone)]
pub struct ProviderAttempt {
    pub provider: ProviderId,
    pub error: ProviderError,
}

/// Error returned by the router
#[derive(Debug, Clone, thiserror::Error)]
pub enum RouterError {
    /// The capability has no providers configured
    #[error("no providers configured for {0} generation")]
    Unconfigured(Capability),

    /// Every configured provider failed
    #[error("all {capability} providers failed: {}", format_attempts(attempts))]
    Exhausted {
        capability: Capability,
        attempts: Vec<ProviderAttempt>,
    },
}

impl RouterError {
    /// Providers that were tried, in order, when the chain was exhausted
    pub fn attempted_providers(&self) -> Vec<ProviderId> {
        match self {
            RouterError::Unconfigured(_) => Vec::new(),
            RouterError::Exhausted { attempts, .. } => {
                attempts.iter().map(|a| a.provider).collect()
            }
        }
    }
}

fn format_attempts(attempts: &[ProviderAttempt]) -> String {
    attempts
        .iter()
        .map(|a| format!("{}: {}", a.provider, a.error))
        .collect::<Vec<_>>()
        .join("; ")
}
