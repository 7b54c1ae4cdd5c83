//! Unified provider error type
//!
//! Single error enum for every provider. The router only needs to know that a
//! call failed and why, so one type with the provider name baked in keeps the
//! fallback loop free of per-vendor conversions.

use super::ProviderId;

/// Error returned by any provider operation
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("authentication failed for {provider}: {message}")]
    Authentication {
        provider: ProviderId,
        message: String,
    },

    #[error("network error for {provider}: {message}")]
    Network {
        provider: ProviderId,
        message: String,
    },

    #[error("timeout for {provider}: {message}")]
    Timeout {
        provider: ProviderId,
        message: String,
    },

    /// Non-success HTTP status from the provider API
    #[error("API error for {provider} (status {status}): {message}")]
    ApiError {
        provider: ProviderId,
        status: u16,
        message: String,
    },

    /// The provider answered 200 but the payload reported or implied failure
    #[error("{provider} rejected the request: {message}")]
    Rejected {
        provider: ProviderId,
        message: String,
    },

    /// Response body could not be decoded into the expected shape
    #[error("invalid response from {provider}: {message}")]
    InvalidResponse {
        provider: ProviderId,
        message: String,
    },

    /// The provider's endpoint could not be reached at all
    #[error("{provider} is unavailable: {message}")]
    Unavailable {
        provider: ProviderId,
        message: String,
    },

    #[error("'{feature}' is not supported by {provider}")]
    NotSupported {
        provider: ProviderId,
        feature: String,
    },

    /// Provider-side prerequisites are missing (keys, checkpoints, ...)
    #[error("configuration error for {provider}: {message}")]
    Configuration {
        provider: ProviderId,
        message: String,
    },
}

impl ProviderError {
    pub fn authentication(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::Authentication {
            provider,
            message: message.into(),
        }
    }

    pub fn network(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::Network {
            provider,
            message: message.into(),
        }
    }

    pub fn timeout(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::Timeout {
            provider,
            message: message.into(),
        }
    }

    pub fn api_error(provider: ProviderId, status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider,
            status,
            message: message.into(),
        }
    }

    pub fn rejected(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::Rejected {
            provider,
            message: message.into(),
        }
    }

    pub fn invalid_response(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider,
            message: message.into(),
        }
    }

    pub fn unavailable(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::Unavailable {
            provider,
            message: message.into(),
        }
    }

    pub fn not_supported(provider: ProviderId, feature: impl Into<String>) -> Self {
        Self::NotSupported {
            provider,
            feature: feature.into(),
        }
    }

    pub fn configuration(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::Configuration {
            provider,
            message: message.into(),
        }
    }

    /// Classify a reqwest transport error
    pub fn from_reqwest(provider: ProviderId, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(provider, err.to_string())
        } else if err.is_connect() {
            Self::unavailable(provider, err.to_string())
        } else {
            Self::network(provider, err.to_string())
        }
    }

    /// Which provider produced this error
    pub fn provider(&self) -> ProviderId {
        match self {
            Self::Authentication { provider, .. }
            | Self::Network { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::ApiError { provider, .. }
            | Self::Rejected { provider, .. }
            | Self::InvalidResponse { provider, .. }
            | Self::Unavailable { provider, .. }
            | Self::NotSupported { provider, .. }
            | Self::Configuration { provider, .. } => *provider,
        }
    }

    /// True when the failure points at a standing misconfiguration of this
    /// provider rather than a transient fault. The router still falls through
    /// to the next provider either way, but logs these louder.
    pub fn is_config_related(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::Configuration { .. } | Self::NotSupported { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_provider() {
        let err = ProviderError::timeout(ProviderId::Vllm, "no response after 300s");
        let text = err.to_string();
        assert!(text.contains("vllm"));
        assert!(text.contains("no response after 300s"));
    }

    #[test]
    fn config_related_classification() {
        assert!(ProviderError::authentication(ProviderId::Minimax, "bad key").is_config_related());
        assert!(!ProviderError::network(ProviderId::Minimax, "reset").is_config_related());
    }

    #[test]
    fn provider_accessor_matches_variant() {
        let err = ProviderError::api_error(ProviderId::Xtts, 500, "boom");
        assert_eq!(err.provider(), ProviderId::Xtts);
    }
}
