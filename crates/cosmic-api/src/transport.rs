//! Transport layer
//!
//! A [`Transport`] issues exactly one request per call and hands back the raw
//! response bytes. It never retries; retry policy belongs to callers.

use crate::client::ClientConfig;
use crate::command::Command;
use crate::error::{CosmicError, Result};
use crate::signing;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

/// One request/response round trip to the API
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `command` and return the raw response body
    async fn send(&self, command: &Command) -> Result<Vec<u8>>;
}

/// HTTP transport with request signing
pub struct HttpTransport {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    secret_key: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        if config.api_key.is_empty() || config.secret_key.is_empty() {
            return Err(CosmicError::InvalidConfig(
                "api key and secret key are required".to_string(),
            ));
        }
        reqwest::Url::parse(&config.api_url).map_err(|e| {
            CosmicError::InvalidConfig(format!("invalid api url '{}': {}", config.api_url, e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('?').to_string(),
            api_key: config.api_key.clone(),
            secret_key: config.secret_key.clone(),
        })
    }

    /// Endpoint without the trailing `?`
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn request_url(&self, command: &Command) -> Result<String> {
        let query = signing::signed_query(command, &self.api_key, &self.secret_key)?;
        Ok(format!("{}?{}", self.api_url(), query))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, command: &Command) -> Result<Vec<u8>> {
        let url = self.request_url(command)?;

        tracing::debug!(
            command = command.name(),
            endpoint = self.api_url(),
            "Sending API request"
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let err = error_from_body(status.as_u16(), &body);
            tracing::debug!(
                command = command.name(),
                status = status.as_u16(),
                "API request failed"
            );
            return Err(err);
        }

        tracing::trace!(command = command.name(), bytes = body.len(), "API response");
        Ok(body.to_vec())
    }
}

/// Structured error body: `{"<command>response": {"errorcode": .., "errortext": ..}}`
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    errorcode: Option<i64>,
    #[serde(default)]
    #[allow(dead_code)]
    cserrorcode: Option<i64>,
    #[serde(default)]
    errortext: Option<String>,
}

/// Turn a non-2xx response into a transport error, keeping the server's code
pub(crate) fn error_from_body(status: u16, body: &[u8]) -> CosmicError {
    let parsed = serde_json::from_slice::<HashMap<String, ApiErrorBody>>(body)
        .ok()
        .and_then(|wrapped| wrapped.into_values().next());

    match parsed {
        Some(api) => CosmicError::Transport {
            status: Some(status),
            error_code: api.errorcode,
            message: api
                .errortext
                .unwrap_or_else(|| "Unknown error".to_string()),
        },
        None => CosmicError::Transport {
            status: Some(status),
            error_code: None,
            message: String::from_utf8_lossy(body).trim().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> ClientConfig {
        ClientConfig {
            api_url: "https://cosmic.example.com/client/api".to_string(),
            api_key: "key".to_string(),
            secret_key: "secret".to_string(),
            poll: Default::default(),
            http_timeout: Duration::from_secs(5),
            verify_ssl: true,
            async_mode: true,
        }
    }

    #[test]
    fn test_error_from_structured_body() {
        let body = br#"{"listfirewallrulesresponse":{"uuidList":[],"errorcode":431,"cserrorcode":9999,"errortext":"Unable to execute API command listfirewallrules due to invalid value. Invalid parameter id value=x due to incorrect long value format, or entity does not exist or due to incorrect parameter annotation for the field in api cmd class."}}"#;
        match error_from_body(431, body) {
            CosmicError::Transport {
                status,
                error_code,
                message,
            } => {
                assert_eq!(status, Some(431));
                assert_eq!(error_code, Some(431));
                assert!(message.starts_with("Unable to execute API command"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_error_from_unstructured_body() {
        match error_from_body(502, b"Bad Gateway\n") {
            CosmicError::Transport {
                status,
                error_code,
                message,
            } => {
                assert_eq!(status, Some(502));
                assert_eq!(error_code, None);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_request_url_is_signed() {
        let transport = HttpTransport::new(&config()).unwrap();
        let command = Command::builder("listZones").build().unwrap();
        let url = transport.request_url(&command).unwrap();

        assert!(url.starts_with("https://cosmic.example.com/client/api?apiKey=key&command=listZones&response=json&signature="));
    }

    #[test]
    fn test_api_url_trailing_question_mark() {
        let mut cfg = config();
        cfg.api_url = "https://cosmic.example.com/client/api?".to_string();
        let transport = HttpTransport::new(&cfg).unwrap();
        assert_eq!(transport.api_url(), "https://cosmic.example.com/client/api");

        let command = Command::builder("listZones").build().unwrap();
        let url = transport.request_url(&command).unwrap();
        assert!(url.starts_with("https://cosmic.example.com/client/api?apiKey="));
        assert!(!url.contains("??"));
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let mut cfg = config();
        cfg.api_url = "not a url".to_string();
        assert!(matches!(
            HttpTransport::new(&cfg),
            Err(CosmicError::InvalidConfig(_))
        ));

        let mut cfg = config();
        cfg.secret_key.clear();
        assert!(HttpTransport::new(&cfg).is_err());
    }
}
