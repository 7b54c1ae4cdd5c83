//! Error types for the gateway

use crate::core::providers::ProviderError;
use crate::core::router::RouterError;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Result type alias for the gateway
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Main error type for the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors (bad uploads, bad request payloads)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request errors
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A single provider call failed outside the router
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Routing failures (unconfigured capability, exhausted chain)
    #[error(transparent)]
    Router(#[from] RouterError),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Media assembly errors (ffmpeg and friends)
    #[error("Assembly error: {0}")]
    Assembly(String),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ResponseError for GatewayError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            GatewayError::Config(_) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                self.to_string(),
            ),
            GatewayError::Validation(_) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                self.to_string(),
            ),
            GatewayError::NotFound(_) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                self.to_string(),
            ),
            GatewayError::BadRequest(_) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                self.to_string(),
            ),
            GatewayError::Provider(provider_error) => match provider_error {
                ProviderError::Authentication { .. } => (
                    actix_web::http::StatusCode::UNAUTHORIZED,
                    "PROVIDER_AUTH_ERROR",
                    provider_error.to_string(),
                ),
                ProviderError::Timeout { .. } => (
                    actix_web::http::StatusCode::GATEWAY_TIMEOUT,
                    "PROVIDER_TIMEOUT",
                    provider_error.to_string(),
                ),
                ProviderError::Unavailable { .. } => (
                    actix_web::http::StatusCode::SERVICE_UNAVAILABLE,
                    "PROVIDER_UNAVAILABLE",
                    provider_error.to_string(),
                ),
                ProviderError::NotSupported { .. } => (
                    actix_web::http::StatusCode::NOT_IMPLEMENTED,
                    "NOT_SUPPORTED",
                    provider_error.to_string(),
                ),
                _ => (
                    actix_web::http::StatusCode::BAD_GATEWAY,
                    "PROVIDER_ERROR",
                    provider_error.to_string(),
                ),
            },
            GatewayError::Router(router_error) => match router_error {
                RouterError::Exhausted { .. } => (
                    actix_web::http::StatusCode::BAD_GATEWAY,
                    "PROVIDERS_EXHAUSTED",
                    router_error.to_string(),
                ),
                _ => (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIG_ERROR",
                    router_error.to_string(),
                ),
            },
            GatewayError::HttpClient(_) => (
                actix_web::http::StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                self.to_string(),
            ),
            GatewayError::Serialization(_) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "SERIALIZATION_ERROR",
                self.to_string(),
            ),
            GatewayError::Assembly(_) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "ASSEMBLY_ERROR",
                self.to_string(),
            ),
            _ => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                self.to_string(),
            ),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: error_code.to_string(),
                message,
                timestamp: chrono::Utc::now().timestamp(),
            },
        };

        HttpResponse::build(status_code).json(error_response)
    }
}

/// Standard error response format
#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail structure
#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Capability;

    #[test]
    fn config_errors_map_to_500() {
        let err = GatewayError::Config("routing.text is empty".to_string());
        let response = err.error_response();
        assert_eq!(response.status(), 500);
    }

    #[test]
    fn exhausted_chain_maps_to_502() {
        let err = GatewayError::Router(RouterError::Exhausted {
            capability: Capability::Text,
            attempts: vec![],
        });
        let response = err.error_response();
        assert_eq!(response.status(), 502);
    }

    #[test]
    fn validation_errors_map_to_400() {
        let err = GatewayError::Validation("image too small".to_string());
        assert_eq!(err.error_response().status(), 400);
    }
}
