use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use crate::error::EmbeddingError;
use crate::services::embedding::EmbeddingProvider;

/// Client for an OpenAI-compatible embeddings endpoint
///
/// Sends `POST {endpoint}/embeddings` with `{"model", "input"}` and reads the
/// vector from `data[0].embedding`.
pub struct HttpEmbeddingClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    client: Client,
}

impl HttpEmbeddingClient {
    /// Create a new embedding client
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        model: String,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            model,
            client,
        })
    }

    fn url(&self) -> String {
        format!("{}/embeddings", self.base_url.trim_end_matches('/'))
    }

    async fn request(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = self.url();
        tracing::debug!("Requesting embedding from: {}", url);

        let mut request = self
            .client
            .post(&url)
            .json(&json!({ "model": self.model, "input": text }));

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(EmbeddingError::ApiError(format!(
                "Failed to embed text: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        parse_embedding(&json)
    }
}

/// Extract `data[0].embedding` from a provider response
fn parse_embedding(json: &Value) -> Result<Vec<f32>, EmbeddingError> {
    let values = json
        .get("data")
        .and_then(|d| d.as_array())
        .and_then(|d| d.first())
        .and_then(|d| d.get("embedding"))
        .and_then(|e| e.as_array())
        .ok_or_else(|| EmbeddingError::InvalidResponse("Missing data[0].embedding".into()))?;

    values
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| EmbeddingError::InvalidResponse(format!("Non-numeric value: {}", v)))
        })
        .collect()
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn initialize(&self) -> Result<(), EmbeddingError> {
        let probe = self.request("ping").await?;
        if probe.is_empty() {
            return Err(EmbeddingError::InvalidResponse("Empty probe embedding".into()));
        }
        tracing::debug!("Embedding endpoint {} returned {} dimensions", self.url(), probe.len());
        Ok(())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.request(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(server: &mockito::Server, api_key: Option<&str>) -> HttpEmbeddingClient {
        HttpEmbeddingClient::new(
            server.url(),
            api_key.map(str::to_string),
            "test-model".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_embedding() {
        let json = json!({ "data": [{ "embedding": [0.5, -0.25] }] });
        assert_eq!(parse_embedding(&json).unwrap(), vec![0.5, -0.25]);

        assert!(parse_embedding(&json!({ "data": [] })).is_err());
        assert!(parse_embedding(&json!({ "data": [{ "embedding": ["x"] }] })).is_err());
    }

    #[tokio::test]
    async fn test_embed_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/embeddings")
            .match_header("authorization", "Bearer secret")
            .match_body(mockito::Matcher::PartialJson(json!({
                "model": "test-model",
                "input": "python"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": [{"embedding": [0.1, 0.2, 0.3]}]}"#)
            .create_async()
            .await;

        let vector = client(&server, Some("secret")).embed("python").await.unwrap();

        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/embeddings")
            .with_status(503)
            .create_async()
            .await;

        let result = client(&server, None).initialize().await;
        assert!(matches!(result, Err(EmbeddingError::ApiError(_))));
    }
}
