//! yt-dlp backed caption source.
//!
//! Asks yt-dlp for subtitles only (no media download) in its `json3` format
//! and parses the timed events.

use super::CaptionSource;
use crate::error::{Result, TubescribeError};
use crate::source::watch_url;
use crate::transcript::TranscriptSegment;
use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// Caption source that shells out to yt-dlp.
pub struct YtDlpCaptionSource {
    binary: String,
    temp_root: PathBuf,
}

impl YtDlpCaptionSource {
    pub fn new(binary: impl Into<String>, temp_root: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            temp_root: temp_root.into(),
        }
    }
}

#[async_trait]
impl CaptionSource for YtDlpCaptionSource {
    /// The child process is killed when this future is dropped, so a cancelled
    /// or timed-out fetch leaves nothing running and the temp dir is removed.
    #[instrument(skip(self, _cancel))]
    async fn fetch_segments(
        &self,
        video_id: &str,
        language: Option<&str>,
        _cancel: &CancellationToken,
    ) -> Result<Vec<TranscriptSegment>> {
        tokio::fs::create_dir_all(&self.temp_root).await?;
        let dir = tempfile::Builder::new()
            .prefix("captions-")
            .tempdir_in(&self.temp_root)?;

        let template = dir.path().join("%(id)s.%(ext)s");

        let mut command = Command::new(&self.binary);
        command
            .args(caption_args(language, &template, &watch_url(video_id)))
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Running {} for captions", self.binary);

        let output = match command.output().await {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TubescribeError::ToolNotFound(self.binary.clone()));
            }
            Err(e) => {
                return Err(TubescribeError::CaptionUnavailable(format!(
                    "yt-dlp execution failed: {e}"
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TubescribeError::CaptionUnavailable(format!(
                "yt-dlp failed: {}",
                stderr.trim()
            )));
        }

        let path = find_caption_file(dir.path(), language)?;
        debug!("Parsing captions from {:?}", path);

        let content = tokio::fs::read_to_string(&path).await?;
        parse_json3(&content)
    }
}

/// Command-line arguments for a subtitle-only yt-dlp run.
///
/// Without `--sub-langs` yt-dlp chooses its own default track.
fn caption_args(language: Option<&str>, template: &Path, url: &str) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "--skip-download",
        "--write-subs",
        "--write-auto-subs",
        "--sub-format",
        "json3",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();

    if let Some(lang) = language {
        args.push("--sub-langs".into());
        args.push(lang.into());
    }

    args.push("--output".into());
    args.push(template.as_os_str().to_owned());
    args.extend(
        ["--no-playlist", "--quiet", "--no-warnings", url]
            .into_iter()
            .map(OsString::from),
    );
    args
}

/// Pick the caption file yt-dlp wrote, preferring the requested language.
fn find_caption_file(dir: &Path, language: Option<&str>) -> Result<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json3"))
        .collect();
    files.sort();

    if let Some(lang) = language {
        let marker = format!(".{}.", lang);
        if let Some(exact) = files.iter().find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.contains(&marker))
        }) {
            return Ok(exact.clone());
        }
    }

    files.into_iter().next().ok_or_else(|| {
        TubescribeError::CaptionUnavailable(match language {
            Some(lang) => format!("no '{}' caption track", lang),
            None => "no caption track".to_string(),
        })
    })
}

#[derive(Debug, Deserialize)]
struct Json3Document {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: f64,
    #[serde(default)]
    d_duration_ms: f64,
    #[serde(default)]
    segs: Vec<Json3Seg>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Parse a yt-dlp `json3` caption document into raw segments.
///
/// Events without text (window setup, bare line breaks) are dropped; the
/// remaining ones keep their document order.
pub fn parse_json3(content: &str) -> Result<Vec<TranscriptSegment>> {
    let document: Json3Document = serde_json::from_str(content).map_err(|e| {
        TubescribeError::CaptionUnavailable(format!("malformed caption file: {}", e))
    })?;

    let segments = document
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
            if text.trim().is_empty() {
                return None;
            }
            Some(TranscriptSegment::new(
                text,
                event.t_start_ms / 1000.0,
                event.d_duration_ms / 1000.0,
            ))
        })
        .collect();

    Ok(segments)
}
