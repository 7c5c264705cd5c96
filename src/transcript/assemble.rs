//! Joins normalized caption segments into one document.

use super::normalize::normalize;
use super::models::{Transcript, TranscriptSegment};
use tracing::debug;

/// Marks that already separate two segments on their own.
const BOUNDARY_PUNCTUATION: [char; 5] = [',', '.', '!', '?', ';'];

/// The output of [`assemble`]: the joined text and the cleaned segments.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
    pub full_text: String,
    pub segments: Vec<TranscriptSegment>,
}

impl Assembled {
    /// Attach the video this text came from.
    pub fn into_transcript(self, video_id: &str, language: Option<String>) -> Transcript {
        Transcript {
            video_id: video_id.to_string(),
            full_text: self.full_text,
            segments: self.segments,
            language,
        }
    }
}

/// Normalize each segment and join them into one readable string.
///
/// A space goes before every non-first segment unless that segment starts
/// with boundary punctuation or the text so far already ends with it. Segments
/// that normalize to nothing are kept in `segments` but contribute no text.
/// The joined string is normalized once more to clean up the seams.
pub fn assemble(raw: &[TranscriptSegment]) -> Assembled {
    let segments: Vec<TranscriptSegment> = raw
        .iter()
        .map(|s| TranscriptSegment {
            text: normalize(&s.text),
            start: s.start,
            duration: s.duration,
        })
        .collect();

    let mut joined = String::new();
    for segment in &segments {
        let text = segment.text.as_str();
        if text.is_empty() {
            continue;
        }

        if !joined.is_empty() && !needs_no_separator(&joined, text) {
            joined.push(' ');
        }
        joined.push_str(text);
    }

    let full_text = normalize(&joined);
    debug!(
        segments = segments.len(),
        chars = full_text.len(),
        "Assembled transcript"
    );

    Assembled {
        full_text,
        segments,
    }
}

fn needs_no_separator(joined: &str, next: &str) -> bool {
    next.starts_with(BOUNDARY_PUNCTUATION) || joined.ends_with(BOUNDARY_PUNCTUATION)
}
