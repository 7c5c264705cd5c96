//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools are available before starting operations
//! that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{Result, TubescribeError};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Caption fetching needs yt-dlp.
    Transcribe,
    /// Chat without a video only needs the inference backend, probed per request.
    Chat,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Transcribe => check_tool(&settings.captions.ytdlp_path)?,
        Operation::Chat => {}
    }
    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(TubescribeError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(TubescribeError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(TubescribeError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
