//! CLI module for Tubescribe.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Tubescribe - YouTube transcripts and transcript-grounded chat
///
/// Fetches and cleans up YouTube captions, and answers questions about them
/// with a local Ollama model.
#[derive(Parser, Debug)]
#[command(name = "tubescribe")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check system requirements and configuration
    Doctor,

    /// Fetch and clean up the captions of a YouTube video
    Transcribe {
        /// YouTube URL or video ID
        url: String,

        /// Preferred caption language (defaults to captions.default_language)
        #[arg(short, long)]
        language: Option<String>,

        /// Write the transcript to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,

        /// Output format (text, json, srt, vtt)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Ask the local model a question, optionally about a video
    Chat {
        /// The message to send
        message: String,

        /// Ground the answer in this video's transcript
        #[arg(long, conflicts_with = "transcript_file")]
        video: Option<String>,

        /// Ground the answer in a transcript read from a file
        #[arg(short, long)]
        transcript_file: Option<String>,
    },

    /// Send a video to the audio transcription service (for videos without captions)
    Whisper {
        /// Video URL
        url: String,
    },

    /// Start HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long, env = "TUBESCRIBE_HOST")]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long, env = "TUBESCRIBE_PORT")]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
