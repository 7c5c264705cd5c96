//! Inference backend abstraction.

use crate::config::OllamaSettings;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// Decoding parameters fixed by the operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub num_ctx: u32,
}

impl From<&OllamaSettings> for GenerateOptions {
    fn from(settings: &OllamaSettings) -> Self {
        Self {
            temperature: settings.temperature,
            top_p: settings.top_p,
            top_k: settings.top_k,
            num_ctx: settings.num_ctx,
        }
    }
}

/// Trait for text-generation backends.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Human-readable backend name, used in errors and logs.
    fn name(&self) -> &str;

    /// Lightweight health check.
    ///
    /// Fails with `ServiceUnavailable` when the backend cannot be reached or
    /// reports a non-success status.
    async fn probe(&self, cancel: &CancellationToken) -> Result<()>;

    /// Generate a completion for `prompt`.
    ///
    /// Fails with `GenerationFailure` when the backend answers with an error or
    /// a malformed payload.
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
        cancel: &CancellationToken,
    ) -> Result<String>;
}
