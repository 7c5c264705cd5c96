//! Prompt selection and rendering.

use super::ChatRequest;
use crate::config::Prompts;
use std::collections::HashMap;

/// Which template a prompt was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// No transcript: minimal instruction around the message.
    Plain,
    /// Transcript embedded verbatim with the analysis directives.
    Grounded,
}

/// A rendered prompt.
#[derive(Debug, Clone)]
pub struct BuiltPrompt {
    pub kind: PromptKind,
    pub text: String,
}

/// Renders chat prompts from the configured templates.
pub struct PromptBuilder {
    prompts: Prompts,
}

impl PromptBuilder {
    pub fn new(prompts: Prompts) -> Self {
        Self { prompts }
    }

    /// Build the prompt for a request.
    ///
    /// A blank transcript counts as no transcript.
    pub fn build(&self, request: &ChatRequest) -> BuiltPrompt {
        let mut vars = HashMap::new();
        vars.insert("message".to_string(), request.message.clone());

        match request.transcript() {
            Some(transcript) => {
                vars.insert("transcript".to_string(), transcript.to_string());
                BuiltPrompt {
                    kind: PromptKind::Grounded,
                    text: self
                        .prompts
                        .render_with_custom(&self.prompts.chat.grounded, &vars),
                }
            }
            None => BuiltPrompt {
                kind: PromptKind::Plain,
                text: self.prompts.render_with_custom(&self.prompts.chat.plain, &vars),
            },
        }
    }
}
