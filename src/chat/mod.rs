//! Chat orchestration.
//!
//! Probes the inference backend, builds a prompt (grounded in a transcript when
//! one is supplied), dispatches a single generation and strips reasoning blocks
//! from the reply.

mod backend;
mod engine;
mod ollama;
mod prompt;
mod sanitize;

pub use backend::{GenerateOptions, InferenceBackend};
pub use engine::{ChatEngine, ChatStage};
pub use ollama::OllamaBackend;
pub use prompt::{BuiltPrompt, PromptBuilder, PromptKind};
pub use sanitize::ReasoningSanitizer;

use serde::{Deserialize, Serialize};

/// A chat message, optionally grounded in a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub transcript_context: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, transcript_context: Option<String>) -> Self {
        Self {
            message: message.into(),
            transcript_context,
        }
    }

    /// The transcript, if present and not blank.
    pub fn transcript(&self) -> Option<&str> {
        self.transcript_context
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }
}

/// A sanitized reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub text: String,
}
