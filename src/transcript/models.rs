//! Data models for transcripts.

use serde::{Deserialize, Serialize};

/// A single timestamped caption segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Caption text.
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
}

impl TranscriptSegment {
    /// Create a new transcript segment.
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }

    /// End time in seconds.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// A cleaned transcript.
///
/// `full_text` is derived from `segments` by [`super::assemble`]; the same
/// segments always give the same text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Video ID this transcript belongs to.
    pub video_id: String,
    /// The whole transcript as one readable document.
    pub full_text: String,
    /// Cleaned segments in delivery order.
    pub segments: Vec<TranscriptSegment>,
    /// Caption language that produced the transcript, if known.
    pub language: Option<String>,
}

impl Transcript {
    /// Total duration in seconds, from the last segment.
    pub fn duration_seconds(&self) -> f64 {
        self.segments.last().map(|s| s.end()).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_end() {
        let segment = TranscriptSegment::new("hi", 1.5, 2.0);
        assert_eq!(segment.end(), 3.5);
    }

    #[test]
    fn test_segment_serializes_with_plain_field_names() {
        let json = serde_json::to_value(TranscriptSegment::new("x", 0.5, 1.0)).unwrap();
        assert_eq!(json["text"], "x");
        assert_eq!(json["start"], 0.5);
        assert_eq!(json["duration"], 1.0);
    }
}
