//! Tubescribe - YouTube transcripts and transcript-grounded chat
//!
//! A small gateway that turns a YouTube link into a clean transcript and lets
//! you chat with a local model about it.
//!
//! # Overview
//!
//! Tubescribe allows you to:
//! - Resolve YouTube URLs (watch, embed, short links, shorts) to a video id
//! - Fetch captions, falling back to the video's default track once
//! - Normalize and join caption fragments into a readable transcript
//! - Ask a local Ollama model about a transcript, with reasoning blocks stripped
//! - Hand captionless videos to an external audio transcription service
//!
//! # Architecture
//!
//! - `config` - Configuration and prompt templates
//! - `source` - Video reference resolution
//! - `captions` - Caption fetching with language fallback
//! - `transcript` - Normalization, assembly and export formats
//! - `chat` - Inference backend, prompts and reply sanitizing
//! - `delegate` - Audio transcription hand-off
//! - `cancel` - Timeouts and cancellation for outbound calls
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use tubescribe::config::Settings;
//! use tubescribe::orchestrator::Orchestrator;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let transcript = orchestrator
//!         .transcribe("https://youtu.be/dQw4w9WgXcQ", None, &CancellationToken::new())
//!         .await?;
//!     println!("{}", transcript.full_text);
//!
//!     Ok(())
//! }
//! ```

pub mod cancel;
pub mod captions;
pub mod chat;
pub mod cli;
pub mod config;
pub mod delegate;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod source;
pub mod transcript;

pub use error::{Result, TubescribeError};
