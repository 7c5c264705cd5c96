//! YouTube reference resolution.

use super::VideoReference;
use crate::error::{Result, TubescribeError};
use regex::Regex;

/// Resolves YouTube URLs (and bare ids) to a [`VideoReference`].
pub struct YoutubeResolver {
    url_regex: Regex,
    bare_id_regex: Regex,
}

impl YoutubeResolver {
    pub fn new() -> Self {
        // Scheme and host are case-insensitive; paths are matched literally.
        // Recognized: watch?…v=ID, embed/ID, v/ID, shorts/ID, live/ID on any
        // youtube.com subdomain, and youtu.be/ID, anywhere in the input. The
        // host must not continue a longer hostname, and the id must not be
        // followed by another identifier character.
        let url_regex = Regex::new(concat!(
            r"(?:^|[^A-Za-z0-9.-])",
            r"(?i:https?:)?(?://)?",
            r"(?:",
            r"(?i:(?:[a-z0-9-]+\.)*youtube(?:-nocookie)?\.com)",
            r"/(?:watch\?(?:[^#\s]*&)?v=|embed/|v/|shorts/|live/)",
            r"|",
            r"(?i:youtu\.be)/",
            r")",
            r"([A-Za-z0-9_-]{11})",
            r"(?:[^A-Za-z0-9_-]|$)",
        ))
        .expect("Invalid regex");

        let bare_id_regex = Regex::new(r"^\s*([A-Za-z0-9_-]{11})\s*$").expect("Invalid regex");

        Self {
            url_regex,
            bare_id_regex,
        }
    }

    /// Extract the 11-character video id from a URL or bare id.
    ///
    /// A bare id must contain an uppercase letter or a digit, so lowercase
    /// words such as `hello_world` are not mistaken for ids. URL forms accept
    /// any id.
    pub fn extract_video_id(&self, input: &str) -> Option<String> {
        if let Some(id) = self.url_regex.captures(input).and_then(|caps| caps.get(1)) {
            return Some(id.as_str().to_string());
        }

        self.bare_id_regex
            .captures(input)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|id| looks_like_id(id))
            .map(str::to_string)
    }

    /// Resolve a raw URL into a [`VideoReference`].
    pub fn resolve(&self, raw_url: &str) -> Result<VideoReference> {
        let video_id = self.extract_video_id(raw_url).ok_or_else(|| {
            TubescribeError::InvalidReference(format!(
                "Could not extract a YouTube video id from '{}'",
                raw_url.trim()
            ))
        })?;

        Ok(VideoReference {
            raw_url: raw_url.to_string(),
            video_id,
        })
    }
}

fn looks_like_id(candidate: &str) -> bool {
    candidate
        .chars()
        .any(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
}

impl Default for YoutubeResolver {
    fn default() -> Self {
        Self::new()
    }
}
