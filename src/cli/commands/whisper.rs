//! Whisper command: hand a captionless video to the transcription service.

use crate::cancel::ctrl_c_token;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the whisper command and print the service's reply.
pub async fn run_whisper(url: &str, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let cancel = ctrl_c_token();

    let spinner = Output::spinner("Waiting for the transcription service (this can take a while)...");
    let result = orchestrator.delegate_transcription(url, &cancel).await;
    spinner.finish_and_clear();

    match result {
        Ok(payload) => {
            // The service answers {"status", "transcription"}; print the text when present.
            match payload.get("transcription").and_then(|t| t.as_str()) {
                Some(text) => println!("{}", text),
                None => println!("{}", serde_json::to_string_pretty(&payload)?),
            }
            Ok(())
        }
        Err(e) => {
            Output::report(&e);
            Err(e.into())
        }
    }
}
