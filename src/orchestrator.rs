//! Pipeline orchestrator for Tubescribe.
//!
//! Wires the resolver, caption fetcher, chat engine and transcription delegate
//! from a single [`Settings`] value.

use crate::captions::{CaptionFetcher, CaptionSource, YtDlpCaptionSource};
use crate::chat::{
    ChatEngine, ChatRequest, ChatResponse, GenerateOptions, InferenceBackend, OllamaBackend,
    PromptBuilder, ReasoningSanitizer,
};
use crate::config::{Prompts, Settings};
use crate::delegate::TranscriptionDelegate;
use crate::error::{Result, TubescribeError};
use crate::source::{VideoReference, YoutubeResolver};
use crate::transcript::{assemble, Transcript};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// The main orchestrator for the Tubescribe pipeline.
///
/// Immutable after construction; share it behind an `Arc`.
pub struct Orchestrator {
    settings: Settings,
    resolver: YoutubeResolver,
    captions: CaptionFetcher,
    chat: ChatEngine,
    delegate: TranscriptionDelegate,
}

impl Orchestrator {
    /// Create an orchestrator backed by yt-dlp and Ollama.
    pub fn new(settings: Settings) -> Result<Self> {
        let client = crate::http::create_client()?;

        let temp_dir = settings.temp_dir();
        std::fs::create_dir_all(&temp_dir)?;

        let captions: Arc<dyn CaptionSource> = Arc::new(YtDlpCaptionSource::new(
            settings.captions.ytdlp_path.clone(),
            temp_dir,
        ));
        let backend: Arc<dyn InferenceBackend> =
            Arc::new(OllamaBackend::new(client.clone(), &settings.ollama));

        info!(
            "Using {} ({}) for chat",
            backend.name(),
            settings.ollama.model
        );

        Self::build(settings, client, captions, backend)
    }

    /// Create an orchestrator with custom caption source and inference backend.
    pub fn with_components(
        settings: Settings,
        captions: Arc<dyn CaptionSource>,
        backend: Arc<dyn InferenceBackend>,
    ) -> Result<Self> {
        let client = crate::http::create_client()?;
        Self::build(settings, client, captions, backend)
    }

    fn build(
        settings: Settings,
        client: reqwest::Client,
        captions: Arc<dyn CaptionSource>,
        backend: Arc<dyn InferenceBackend>,
    ) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let sanitizer = ReasoningSanitizer::new(settings.ollama.reasoning_tags.as_slice())?;

        let chat = ChatEngine::new(
            backend,
            PromptBuilder::new(prompts),
            GenerateOptions::from(&settings.ollama),
            sanitizer,
        );

        Ok(Self {
            resolver: YoutubeResolver::new(),
            captions: CaptionFetcher::new(captions, settings.caption_timeout()),
            chat,
            delegate: TranscriptionDelegate::new(client, &settings.whisper),
            settings,
        })
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Resolve a URL without fetching anything.
    pub fn resolve(&self, url: &str) -> Result<VideoReference> {
        self.resolver.resolve(require(url, "url")?)
    }

    /// Resolve, fetch captions (with one language fallback) and assemble.
    #[instrument(skip(self, cancel), fields(url = %url))]
    pub async fn transcribe(
        &self,
        url: &str,
        language: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Transcript> {
        let reference = self.resolve(url)?;
        let language = self.preferred_language(language)?;

        info!("Fetching captions for {} ({})", reference.video_id, language);
        let (attempt, raw) = self
            .captions
            .fetch(&reference.video_id, language, cancel)
            .await?
            .into_result()?;

        let transcript = assemble(&raw)
            .into_transcript(&reference.video_id, attempt.language().map(str::to_string));

        info!(
            "Assembled {} segments ({} chars) for {}",
            transcript.segments.len(),
            transcript.full_text.len(),
            reference.video_id
        );
        Ok(transcript)
    }

    /// Answer a chat message, grounded in a transcript when one is supplied.
    pub async fn chat(
        &self,
        request: &ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<ChatResponse> {
        self.chat.chat(request, cancel).await
    }

    /// Fetch a video's transcript and use it as chat context.
    #[instrument(skip(self, message, cancel), fields(url = %url))]
    pub async fn chat_about_video(
        &self,
        message: &str,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<ChatResponse> {
        require(message, "message")?;
        let transcript = self.transcribe(url, None, cancel).await?;
        let request = ChatRequest::new(message, Some(transcript.full_text));
        self.chat.chat(&request, cancel).await
    }

    /// Forward a URL to the audio transcription service.
    #[instrument(skip(self, cancel), fields(url = %url))]
    pub async fn delegate_transcription(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value> {
        let url = require(url, "url")?;
        let parsed = url::Url::parse(url)
            .map_err(|e| TubescribeError::Validation(format!("invalid url '{}': {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TubescribeError::Validation(format!(
                "url must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        self.delegate.transcribe(url, cancel).await
    }

    fn preferred_language<'a>(&'a self, requested: Option<&'a str>) -> Result<&'a str> {
        let language = requested
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(self.settings.captions.default_language.as_str());

        let well_formed = language.len() <= 16
            && language
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !well_formed {
            return Err(TubescribeError::Validation(format!(
                "invalid language code '{}'",
                language
            )));
        }
        Ok(language)
    }
}

/// Reject blank required fields.
fn require<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TubescribeError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed)
}
