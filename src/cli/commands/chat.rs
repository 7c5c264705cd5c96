//! Chat command implementation.

use crate::cancel::ctrl_c_token;
use crate::chat::ChatRequest;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::{Context, Result};

/// Run the chat command.
///
/// With `--video` the transcript is fetched first; with `--transcript-file`
/// the file contents are used verbatim.
pub async fn run_chat(
    message: &str,
    video: Option<&str>,
    transcript_file: Option<&str>,
    settings: Settings,
) -> Result<()> {
    let operation = if video.is_some() {
        Operation::Transcribe
    } else {
        Operation::Chat
    };
    if let Err(e) = preflight::check(operation, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'tubescribe doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let transcript = match transcript_file {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read transcript file {}", path))?,
        ),
        None => None,
    };

    let orchestrator = Orchestrator::new(settings)?;
    let cancel = ctrl_c_token();

    let spinner = Output::spinner("Thinking...");
    let result = match video {
        Some(url) => orchestrator.chat_about_video(message, url, &cancel).await,
        None => {
            orchestrator
                .chat(&ChatRequest::new(message, transcript), &cancel)
                .await
        }
    };
    spinner.finish_and_clear();

    match result {
        Ok(response) => {
            println!("{}", response.text);
            Ok(())
        }
        Err(e) => {
            Output::report(&e);
            Err(e.into())
        }
    }
}
