//! Chat engine: probe, prompt, dispatch, sanitize.

use super::backend::{GenerateOptions, InferenceBackend};
use super::prompt::PromptBuilder;
use super::sanitize::ReasoningSanitizer;
use super::{ChatRequest, ChatResponse};
use crate::error::{Result, TubescribeError};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Stages a chat request moves through.
///
/// `Idle → ProbeBackend → {ProbeFailed | BuildPrompt → Dispatch → AwaitResponse → Sanitize → Done}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatStage {
    Idle,
    ProbeBackend,
    ProbeFailed,
    BuildPrompt,
    Dispatch,
    AwaitResponse,
    Sanitize,
    Done,
}

impl fmt::Display for ChatStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChatStage::Idle => "idle",
            ChatStage::ProbeBackend => "probe_backend",
            ChatStage::ProbeFailed => "probe_failed",
            ChatStage::BuildPrompt => "build_prompt",
            ChatStage::Dispatch => "dispatch",
            ChatStage::AwaitResponse => "await_response",
            ChatStage::Sanitize => "sanitize",
            ChatStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Chat orchestrator over an [`InferenceBackend`].
pub struct ChatEngine {
    backend: Arc<dyn InferenceBackend>,
    prompts: PromptBuilder,
    options: GenerateOptions,
    sanitizer: ReasoningSanitizer,
}

impl ChatEngine {
    pub fn new(
        backend: Arc<dyn InferenceBackend>,
        prompts: PromptBuilder,
        options: GenerateOptions,
        sanitizer: ReasoningSanitizer,
    ) -> Self {
        Self {
            backend,
            prompts,
            options,
            sanitizer,
        }
    }

    /// Answer a chat request.
    ///
    /// The backend is probed first; if the probe fails no generation is
    /// attempted and `ServiceUnavailable` is returned.
    #[instrument(skip(self, request, cancel), fields(grounded = request.transcript().is_some()))]
    pub async fn chat(
        &self,
        request: &ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<ChatResponse> {
        let mut stage = ChatStage::Idle;

        if request.message.trim().is_empty() {
            return Err(TubescribeError::Validation("message must not be empty".to_string()));
        }

        advance(&mut stage, ChatStage::ProbeBackend);
        if let Err(e) = self.backend.probe(cancel).await {
            advance(&mut stage, ChatStage::ProbeFailed);
            warn!("{} probe failed: {}", self.backend.name(), e);
            return Err(e);
        }

        advance(&mut stage, ChatStage::BuildPrompt);
        let prompt = self.prompts.build(request);
        debug!(kind = ?prompt.kind, chars = prompt.text.len(), "Built prompt");

        advance(&mut stage, ChatStage::Dispatch);
        let pending = self.backend.generate(&prompt.text, &self.options, cancel);

        advance(&mut stage, ChatStage::AwaitResponse);
        let raw = pending.await?;

        advance(&mut stage, ChatStage::Sanitize);
        let text = self.sanitizer.sanitize(&raw);

        advance(&mut stage, ChatStage::Done);
        info!(
            raw_chars = raw.len(),
            chars = text.len(),
            "Chat response ready"
        );

        Ok(ChatResponse { text })
    }
}

fn advance(stage: &mut ChatStage, next: ChatStage) {
    debug!(from = %stage, to = %next, "Chat stage");
    *stage = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Prompts;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeBackend {
        reachable: bool,
        reply: Result<String>,
        generate_calls: AtomicUsize,
        last_prompt: Mutex<Option<String>>,
    }

    impl FakeBackend {
        fn new(reachable: bool, reply: Result<String>) -> Arc<Self> {
            Arc::new(Self {
                reachable,
                reply,
                generate_calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl InferenceBackend for FakeBackend {
        fn name(&self) -> &str {
            "fake"
        }

        async fn probe(&self, _cancel: &CancellationToken) -> Result<()> {
            if self.reachable {
                Ok(())
            } else {
                Err(TubescribeError::ServiceUnavailable {
                    service: "fake".to_string(),
                    detail: "connection refused".to_string(),
                    hint: "start the local inference backend".to_string(),
                })
            }
        }

        async fn generate(
            &self,
            prompt: &str,
            _options: &GenerateOptions,
            _cancel: &CancellationToken,
        ) -> Result<String> {
            self.generate_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(TubescribeError::GenerationFailure(e.to_string())),
            }
        }
    }

    fn engine(backend: Arc<FakeBackend>) -> ChatEngine {
        ChatEngine::new(
            backend,
            PromptBuilder::new(Prompts::default()),
            GenerateOptions {
                temperature: 0.7,
                top_p: 0.9,
                top_k: 40,
                num_ctx: 4096,
            },
            ReasoningSanitizer::new(&["think", "reasoning"]).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_probe_failure_short_circuits() {
        let backend = FakeBackend::new(false, Ok("unused".to_string()));
        let result = engine(backend.clone())
            .chat(&ChatRequest::new("hello", None), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(TubescribeError::ServiceUnavailable { .. })));
        assert_eq!(backend.generate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reply_is_sanitized() {
        let backend = FakeBackend::new(
            true,
            Ok("<reasoning>internal notes</reasoning>Final answer".to_string()),
        );
        let response = engine(backend.clone())
            .chat(&ChatRequest::new("hello", None), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.text, "Final answer");
        assert_eq!(backend.generate_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_grounded_prompt_reaches_backend() {
        let backend = FakeBackend::new(true, Ok("ok".to_string()));
        engine(backend.clone())
            .chat(
                &ChatRequest::new("Summarize", Some("we talk about ownership".to_string())),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let prompt = backend.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("we talk about ownership"));
        assert!(prompt.contains("Summarize"));
    }

    #[tokio::test]
    async fn test_generation_failure_propagates() {
        let backend = FakeBackend::new(
            true,
            Err(TubescribeError::GenerationFailure("model not found".to_string())),
        );
        let result = engine(backend)
            .chat(&ChatRequest::new("hello", None), &CancellationToken::new())
            .await;

        match result {
            Err(TubescribeError::GenerationFailure(detail)) => {
                assert!(detail.contains("model not found"))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_message_rejected_before_probe() {
        let backend = FakeBackend::new(false, Ok("unused".to_string()));
        let result = engine(backend)
            .chat(&ChatRequest::new("  ", None), &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(TubescribeError::Validation(_))));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(ChatStage::ProbeFailed.to_string(), "probe_failed");
        assert_eq!(ChatStage::AwaitResponse.to_string(), "await_response");
    }
}
