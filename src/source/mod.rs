//! Video reference resolution.
//!
//! Turns free-form URLs into a canonical video identifier.

mod youtube;

pub use youtube::YoutubeResolver;

use serde::{Deserialize, Serialize};

/// A resolved video reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoReference {
    /// The URL as supplied by the caller.
    pub raw_url: String,
    /// The 11-character video identifier.
    pub video_id: String,
}

/// Canonical watch URL for a video id.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}
