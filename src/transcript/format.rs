//! Transcript output formatting (plain text, JSON, SRT, VTT).

use super::{Transcript, TranscriptSegment};
use serde::Serialize;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
    Srt,
    Vtt,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "srt" => Ok(OutputFormat::Srt),
            "vtt" | "webvtt" => Ok(OutputFormat::Vtt),
            _ => Err(format!("Unknown format: {}. Use text, json, srt, or vtt.", s)),
        }
    }
}

/// JSON shape of a transcript, shared by the CLI export and the HTTP API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptExport<'a> {
    pub transcript: &'a str,
    pub segments: &'a [TranscriptSegment],
    pub video_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<&'a str>,
}

impl<'a> From<&'a Transcript> for TranscriptExport<'a> {
    fn from(transcript: &'a Transcript) -> Self {
        Self {
            transcript: &transcript.full_text,
            segments: &transcript.segments,
            video_id: &transcript.video_id,
            language: transcript.language.as_deref(),
        }
    }
}

/// Format a transcript for output.
pub fn format_transcript(transcript: &Transcript, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => transcript.full_text.clone(),
        OutputFormat::Json => format_json(transcript),
        OutputFormat::Srt => format_srt(transcript),
        OutputFormat::Vtt => format_vtt(transcript),
    }
}

fn format_json(transcript: &Transcript) -> String {
    let export = TranscriptExport::from(transcript);
    serde_json::to_string_pretty(&export).unwrap_or_else(|_| "{}".to_string())
}

/// Format as SRT (SubRip). Empty segments are skipped.
fn format_srt(transcript: &Transcript) -> String {
    let mut output = String::new();

    for (i, segment) in cues(transcript).enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_cue_timestamp(segment.start, ','),
            format_cue_timestamp(segment.end(), ',')
        ));
        output.push_str(&segment.text);
        output.push_str("\n\n");
    }

    output
}

/// Format as WebVTT.
fn format_vtt(transcript: &Transcript) -> String {
    let mut output = String::from("WEBVTT\n\n");

    for (i, segment) in cues(transcript).enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_cue_timestamp(segment.start, '.'),
            format_cue_timestamp(segment.end(), '.')
        ));
        output.push_str(&segment.text);
        output.push_str("\n\n");
    }

    output
}

fn cues(transcript: &Transcript) -> impl Iterator<Item = &TranscriptSegment> {
    transcript.segments.iter().filter(|s| !s.text.is_empty())
}

/// Cue timestamp: `00:00:00,000` for SRT, `00:00:00.000` for VTT.
fn format_cue_timestamp(seconds: f64, ms_separator: char) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let ms = total_ms % 1000;

    format!(
        "{:02}:{:02}:{:02}{}{:03}",
        hours, minutes, secs, ms_separator, ms
    )
}
