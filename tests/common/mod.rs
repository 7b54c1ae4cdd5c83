//! Shared test fixtures

use pitchreel::config::{
    Config, MinimaxConfig, ProvidersConfig, RoutingConfig, VllmConfig, XttsConfig,
};
use pitchreel::core::providers::ProviderId;

/// MiniMax settings pointed at a mock server
pub fn minimax_config(base_url: &str) -> MinimaxConfig {
    MinimaxConfig {
        api_key: Some("test-key".to_string()),
        group_id: Some("test-group".to_string()),
        base_url: base_url.to_string(),
    }
}

/// vLLM settings pointed at a mock server
pub fn vllm_config(base_url: &str) -> VllmConfig {
    VllmConfig {
        base_url: base_url.to_string(),
        model: "test-model".to_string(),
        api_key: None,
    }
}

/// xtts settings pointed at a mock server
pub fn xtts_config(base_url: &str) -> XttsConfig {
    XttsConfig {
        base_url: base_url.to_string(),
    }
}

/// Full config with text routed minimax-then-vllm, everything against `base_url`
pub fn gateway_config(base_url: &str) -> Config {
    Config {
        routing: RoutingConfig {
            text: vec![ProviderId::Minimax, ProviderId::Vllm],
            speech: vec![ProviderId::Xtts],
            video: vec![ProviderId::Minimax],
        },
        providers: ProvidersConfig {
            minimax: minimax_config(base_url),
            vllm: vllm_config(base_url),
            xtts: xtts_config(base_url),
            ..ProvidersConfig::default()
        },
        ..Config::default()
    }
}
