//! Transcribe command implementation.

use crate::cancel::ctrl_c_token;
use crate::cli::output::format_duration;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::transcript::{format_transcript, OutputFormat};
use anyhow::Result;

/// Run the transcribe command.
pub async fn run_transcribe(
    url: &str,
    language: Option<&str>,
    output: Option<String>,
    format: &str,
    settings: Settings,
) -> Result<()> {
    let format: OutputFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    if let Err(e) = preflight::check(Operation::Transcribe, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'tubescribe doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let cancel = ctrl_c_token();

    let spinner = Output::spinner(&format!("Fetching captions for {}...", url));
    let result = orchestrator.transcribe(url, language, &cancel).await;
    spinner.finish_and_clear();

    let transcript = match result {
        Ok(t) => t,
        Err(e) => {
            Output::report(&e);
            return Err(e.into());
        }
    };

    let formatted = format_transcript(&transcript, format);

    match output {
        Some(path) => {
            std::fs::write(&path, &formatted)?;
            Output::success(&format!("Transcript written to {}", path));
            Output::kv("Video", &transcript.video_id);
            Output::kv(
                "Language",
                transcript.language.as_deref().unwrap_or("default track"),
            );
            Output::kv("Segments", &transcript.segments.len().to_string());
            Output::kv("Duration", &format_duration(transcript.duration_seconds()));
        }
        None => println!("{}", formatted),
    }

    Ok(())
}
