use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::constants::USER_AGENT;

/// A decoded JSON response together with its HTTP status.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    pub status: u16,
    pub body: Value,
}

impl JsonResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The backend's `error` field, when it carries a non-empty string.
    pub fn error_message(&self) -> Option<String> {
        match self.body.get("error") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}

/// Request/response seam between the panels and the network.
///
/// Errors mean no JSON body could be obtained at all; a non-success status
/// with a JSON body is returned as a regular [`JsonResponse`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// POSTs `body` as JSON to `path` on the backend.
    async fn post_json(&self, path: &str, body: &Value) -> Result<JsonResponse>;

    /// GETs an absolute URL and decodes the JSON body.
    async fn get_json(&self, url: &str) -> Result<JsonResponse>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    async fn decode(response: reqwest::Response) -> Result<JsonResponse> {
        let status = response.status().as_u16();
        let body = response.json::<Value>().await?;
        Ok(JsonResponse { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, path: &str, body: &Value) -> Result<JsonResponse> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("POST {}", url);

        let response = self.client.post(&url).json(body).send().await?;
        Self::decode(response).await
    }

    async fn get_json(&self, url: &str) -> Result<JsonResponse> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_range() {
        assert!(JsonResponse::new(200, Value::Null).is_success());
        assert!(JsonResponse::new(204, Value::Null).is_success());
        assert!(!JsonResponse::new(400, Value::Null).is_success());
        assert!(!JsonResponse::new(502, Value::Null).is_success());
    }

    #[test]
    fn error_field_must_be_non_empty_text() {
        assert_eq!(
            JsonResponse::new(500, json!({"error": "boom"})).error_message(),
            Some("boom".to_string())
        );
        assert_eq!(JsonResponse::new(500, json!({"error": ""})).error_message(), None);
        assert_eq!(JsonResponse::new(500, json!({"error": 7})).error_message(), None);
        assert_eq!(JsonResponse::new(500, json!([1, 2])).error_message(), None);
    }
}
