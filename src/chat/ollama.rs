//! Ollama inference backend.

use super::backend::{GenerateOptions, InferenceBackend};
use crate::cancel::bounded;
use crate::config::OllamaSettings;
use crate::error::{Result, TubescribeError};
use crate::http::join_url;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

const SERVICE_NAME: &str = "Ollama";
const START_HINT: &str =
    "Start the local inference backend (e.g. run 'ollama serve') and make sure the model is pulled";

/// Client for a local Ollama server.
pub struct OllamaBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    probe_timeout: Duration,
    request_timeout: Duration,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a GenerateOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

impl OllamaBackend {
    pub fn new(client: reqwest::Client, settings: &OllamaSettings) -> Self {
        Self {
            client,
            base_url: settings.base_url.clone(),
            model: settings.model.clone(),
            probe_timeout: Duration::from_secs(settings.probe_timeout_secs),
            request_timeout: Duration::from_secs(settings.request_timeout_secs),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn unavailable(detail: impl Into<String>) -> TubescribeError {
        TubescribeError::ServiceUnavailable {
            service: SERVICE_NAME.to_string(),
            detail: detail.into(),
            hint: START_HINT.to_string(),
        }
    }

    /// Names of the models the server has pulled.
    pub async fn list_models(&self, cancel: &CancellationToken) -> Result<Vec<String>> {
        match bounded(cancel, self.probe_timeout, "Ollama model list", self.send_probe()).await {
            Err(TubescribeError::Timeout(detail)) => Err(Self::unavailable(detail)),
            other => other,
        }
    }

    async fn send_probe(&self) -> Result<Vec<String>> {
        let url = join_url(&self.base_url, "/api/tags");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::unavailable(format!("cannot reach {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Self::unavailable(format!(
                "health check returned {}",
                response.status()
            )));
        }

        // A reachable server with an unexpected body still counts as up.
        let tags: TagsResponse = response
            .json()
            .await
            .unwrap_or(TagsResponse { models: Vec::new() });
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn send_generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        let url = join_url(&self.base_url, "/api/generate");
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TubescribeError::GenerationFailure(format!("request failed: {}", e)))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            TubescribeError::GenerationFailure(format!("failed to read response: {}", e))
        })?;

        parse_generate_response(status, &text)
    }
}

/// Turn the raw generate reply into the generated text.
fn parse_generate_response(status: reqwest::StatusCode, body: &str) -> Result<String> {
    if !status.is_success() {
        return Err(TubescribeError::GenerationFailure(format!(
            "{} returned {}: {}",
            SERVICE_NAME,
            status,
            body.trim()
        )));
    }

    let parsed: GenerateResponse = serde_json::from_str(body).map_err(|e| {
        TubescribeError::GenerationFailure(format!("malformed response ({}): {}", e, body.trim()))
    })?;
    Ok(parsed.response)
}

#[async_trait]
impl InferenceBackend for OllamaBackend {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    #[instrument(skip(self, cancel))]
    async fn probe(&self, cancel: &CancellationToken) -> Result<()> {
        self.list_models(cancel).await.map(|models| {
            debug!("{} models available", models.len());
        })
    }

    #[instrument(skip(self, prompt, options, cancel), fields(model = %self.model, prompt_chars = prompt.len()))]
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
        cancel: &CancellationToken,
    ) -> Result<String> {
        debug!("Dispatching generation");
        bounded(
            cancel,
            self.request_timeout,
            "Ollama generation",
            self.send_generate(prompt, options),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_parse_success() {
        let body = r#"{"model":"deepseek-r1:7b","response":"<think>x</think>Hi","done":true}"#;
        assert_eq!(
            parse_generate_response(StatusCode::OK, body).unwrap(),
            "<think>x</think>Hi"
        );
    }

    #[test]
    fn test_parse_error_status_keeps_raw_detail() {
        let body = r#"{"error":"model 'nope' not found"}"#;
        let err = parse_generate_response(StatusCode::NOT_FOUND, body).unwrap_err();
        match err {
            TubescribeError::GenerationFailure(detail) => {
                assert!(detail.contains("404"));
                assert!(detail.contains("model 'nope' not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_malformed_payload() {
        let err = parse_generate_response(StatusCode::OK, r#"{"done":true}"#).unwrap_err();
        assert!(matches!(err, TubescribeError::GenerationFailure(_)));
    }

    #[test]
    fn test_tags_response_shape() {
        let body = r#"{"models":[{"name":"deepseek-r1:7b","size":1},{"name":"llama3.2:latest"}]}"#;
        let tags: TagsResponse = serde_json::from_str(body).unwrap();
        let names: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["deepseek-r1:7b", "llama3.2:latest"]);

        let empty: TagsResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.models.is_empty());
    }

    #[test]
    fn test_request_body_shape() {
        let options = GenerateOptions {
            temperature: 0.5,
            top_p: 0.9,
            top_k: 40,
            num_ctx: 4096,
        };
        let body = serde_json::to_value(GenerateRequest {
            model: "m",
            prompt: "p",
            stream: false,
            options: &options,
        })
        .unwrap();

        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["top_k"], 40);
        assert_eq!(body["options"]["num_ctx"], 4096);
        assert_eq!(body["options"]["temperature"], 0.5);
    }

    #[tokio::test]
    async fn test_probe_unreachable_is_service_unavailable() {
        let settings = OllamaSettings {
            // Port 9 (discard) is not expected to run an HTTP server.
            base_url: "http://127.0.0.1:9".to_string(),
            probe_timeout_secs: 2,
            ..OllamaSettings::default()
        };
        let backend = OllamaBackend::new(crate::http::create_client().unwrap(), &settings);

        let err = backend.probe(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, TubescribeError::ServiceUnavailable { .. }));
        assert!(err.hint().unwrap().contains("ollama serve"));
    }
}
