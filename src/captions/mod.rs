//! Caption acquisition.
//!
//! A [`CaptionSource`] returns raw timestamped segments for a video. The
//! [`CaptionFetcher`] wraps a source with the language policy: one attempt in
//! the preferred language, then exactly one attempt with the source's default
//! track.

mod ytdlp;

pub use ytdlp::{parse_json3, YtDlpCaptionSource};

use crate::cancel::bounded;
use crate::error::{Result, TubescribeError};
use crate::transcript::TranscriptSegment;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Trait for caption providers.
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Fetch segments for a video. `language: None` asks for the source's
    /// default/automatic track.
    async fn fetch_segments(
        &self,
        video_id: &str,
        language: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<TranscriptSegment>>;
}

/// Which attempt produced the captions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchAttempt {
    /// The caller's preferred language.
    Preferred(String),
    /// Whatever the source picks by default.
    SourceDefault,
}

impl FetchAttempt {
    /// Language code, when one was requested.
    pub fn language(&self) -> Option<&str> {
        match self {
            FetchAttempt::Preferred(lang) => Some(lang),
            FetchAttempt::SourceDefault => None,
        }
    }
}

/// Result of the two-step fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    Fetched {
        attempt: FetchAttempt,
        segments: Vec<TranscriptSegment>,
    },
    Unavailable {
        preferred_error: String,
        fallback_error: String,
    },
}

impl FetchOutcome {
    /// Collapse the outcome into segments or `CaptionUnavailable`.
    pub fn into_result(self) -> Result<(FetchAttempt, Vec<TranscriptSegment>)> {
        match self {
            FetchOutcome::Fetched { attempt, segments } => Ok((attempt, segments)),
            FetchOutcome::Unavailable {
                preferred_error,
                fallback_error,
            } => Err(TubescribeError::CaptionUnavailable(format!(
                "preferred language: {}; default track: {}",
                preferred_error, fallback_error
            ))),
        }
    }
}

/// Applies the language fallback policy on top of a [`CaptionSource`].
pub struct CaptionFetcher {
    source: Arc<dyn CaptionSource>,
    timeout: Duration,
}

impl CaptionFetcher {
    pub fn new(source: Arc<dyn CaptionSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Fetch captions, preferring `language`.
    ///
    /// Only cancellation and a missing caption tool are returned as `Err`;
    /// every other failure is recorded in the outcome.
    #[instrument(skip(self, cancel))]
    pub async fn fetch(
        &self,
        video_id: &str,
        language: &str,
        cancel: &CancellationToken,
    ) -> Result<FetchOutcome> {
        let preferred_error = match self.attempt(video_id, Some(language), cancel).await {
            Ok(segments) => {
                return Ok(FetchOutcome::Fetched {
                    attempt: FetchAttempt::Preferred(language.to_string()),
                    segments,
                })
            }
            Err(e @ (TubescribeError::Cancelled(_) | TubescribeError::ToolNotFound(_))) => {
                return Err(e)
            }
            Err(e) => e,
        };

        warn!(
            "No '{}' captions for {} ({}), trying the default track",
            language, video_id, preferred_error
        );

        match self.attempt(video_id, None, cancel).await {
            Ok(segments) => {
                info!("Using default caption track for {}", video_id);
                Ok(FetchOutcome::Fetched {
                    attempt: FetchAttempt::SourceDefault,
                    segments,
                })
            }
            Err(e @ (TubescribeError::Cancelled(_) | TubescribeError::ToolNotFound(_))) => Err(e),
            Err(fallback_error) => Ok(FetchOutcome::Unavailable {
                preferred_error: preferred_error.to_string(),
                fallback_error: fallback_error.to_string(),
            }),
        }
    }

    async fn attempt(
        &self,
        video_id: &str,
        language: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<TranscriptSegment>> {
        let segments = bounded(
            cancel,
            self.timeout,
            "caption fetch",
            self.source.fetch_segments(video_id, language, cancel),
        )
        .await?;

        if segments.is_empty() {
            return Err(TubescribeError::CaptionUnavailable(
                "caption track is empty".to_string(),
            ));
        }
        Ok(segments)
    }
}
