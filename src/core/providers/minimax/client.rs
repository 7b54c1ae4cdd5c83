//! Shared HTTP client for the MiniMax API
//!
//! All MiniMax endpoints share bearer auth, a JSON envelope with a `base_resp`
//! status block, and (for speech and uploads) a GroupId query parameter.

use crate::config::MinimaxConfig;
use crate::core::providers::{ProviderError, ProviderId};
use serde_json::Value;
use std::time::Duration;

const PROVIDER: ProviderId = ProviderId::Minimax;

/// HTTP client shared by the MiniMax capability providers
#[derive(Debug, Clone)]
pub struct MinimaxClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    group_id: Option<String>,
}

impl MinimaxClient {
    pub fn new(config: &MinimaxConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ProviderError::configuration(PROVIDER, "MINIMAX_API_KEY not set"))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ProviderError::configuration(PROVIDER, e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            group_id: config.group_id.clone(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GroupId is only issued for speech-capable accounts; demand it lazily
    pub fn group_id(&self) -> Result<&str, ProviderError> {
        self.group_id.as_deref().ok_or_else(|| {
            ProviderError::configuration(PROVIDER, "MINIMAX_GROUP_ID not set")
        })
    }

    pub async fn post_json(&self, path: &str, payload: &Value) -> Result<Value, ProviderError> {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        Self::decode(response).await
    }

    pub async fn get_json(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, ProviderError> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        Self::decode(response).await
    }

    /// Upload a file through the multipart endpoint, returning the file id
    pub async fn upload_file(
        &self,
        purpose: &str,
        file_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<i64, ProviderError> {
        let part = reqwest::multipart::Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| ProviderError::invalid_response(PROVIDER, e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("purpose", purpose.to_string())
            .part("file", part);

        let url = format!("{}?GroupId={}", self.url("/files/upload"), self.group_id()?);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        let body = Self::decode(response).await?;
        body.pointer("/file/file_id")
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                ProviderError::invalid_response(PROVIDER, format!("no file_id in {}", body))
            })
    }

    /// Check HTTP status, parse the body, and reject `base_resp` failures
    async fn decode(response: reqwest::Response) -> Result<Value, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if status.as_u16() == 401 {
                return Err(ProviderError::authentication(PROVIDER, text));
            }
            return Err(ProviderError::api_error(PROVIDER, status.as_u16(), text));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::invalid_response(PROVIDER, e.to_string()))?;

        check_base_resp(&body)?;
        Ok(body)
    }
}

/// MiniMax reports API-level failures inside a 200 response
pub fn check_base_resp(body: &Value) -> Result<(), ProviderError> {
    if let Some(code) = body.pointer("/base_resp/status_code").and_then(Value::as_i64) {
        if code != 0 {
            let msg = body
                .pointer("/base_resp/status_msg")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(ProviderError::rejected(
                PROVIDER,
                format!("{} (status_code {})", msg, code),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn base_resp_zero_is_ok() {
        let body = json!({"base_resp": {"status_code": 0, "status_msg": "success"}});
        assert!(check_base_resp(&body).is_ok());
    }

    #[test]
    fn base_resp_nonzero_is_rejected() {
        let body = json!({"base_resp": {"status_code": 1004, "status_msg": "invalid group"}});
        let err = check_base_resp(&body).unwrap_err();
        assert!(err.to_string().contains("invalid group"));
    }

    #[test]
    fn missing_base_resp_is_ok() {
        assert!(check_base_resp(&json!({"choices": []})).is_ok());
    }

    #[test]
    fn client_requires_api_key() {
        let config = MinimaxConfig::default();
        assert!(MinimaxClient::new(&config).is_err());
    }
}
