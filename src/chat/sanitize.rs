//! Removal of reasoning blocks from generated text.

use crate::error::{Result, TubescribeError};
use regex::Regex;

/// Strips `<tag>…</tag>` reasoning blocks from model output.
pub struct ReasoningSanitizer {
    tags: Option<Regex>,
}

impl ReasoningSanitizer {
    /// Build a sanitizer for the given tag names (e.g. `think`).
    pub fn new<S: AsRef<str>>(tags: &[S]) -> Result<Self> {
        let names: Vec<String> = tags
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty())
            .map(regex::escape)
            .collect();

        if names.is_empty() {
            return Ok(Self { tags: None });
        }

        // Group 1 is set for closing tags.
        let tags = Regex::new(&format!(
            r"(?i)<(/)?\s*(?:{})(?:\s[^>]*)?>",
            names.join("|")
        ))
        .map_err(|e| TubescribeError::Config(format!("Invalid reasoning tag: {}", e)))?;

        Ok(Self { tags: Some(tags) })
    }

    /// Remove every reasoning block and trim.
    ///
    /// Nested blocks are removed as a whole. A block that is never closed runs
    /// to the end of the reply, so `<think>…` with no closing tag sanitizes to
    /// an empty string. Stray closing tags outside a block are kept.
    pub fn sanitize(&self, text: &str) -> String {
        let Some(re) = &self.tags else {
            return text.trim().to_string();
        };

        let mut out = String::with_capacity(text.len());
        let mut depth = 0usize;
        let mut kept_from = 0;

        for caps in re.captures_iter(text) {
            let Some(tag) = caps.get(0) else { continue };
            if caps.get(1).is_some() {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        kept_from = tag.end();
                    }
                }
            } else {
                if depth == 0 {
                    out.push_str(&text[kept_from..tag.start()]);
                }
                depth += 1;
            }
        }

        if depth == 0 {
            out.push_str(&text[kept_from..]);
        }

        out.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitizer() -> ReasoningSanitizer {
        ReasoningSanitizer::new(&["think", "reasoning"]).unwrap()
    }

    #[test]
    fn test_strips_reasoning_block() {
        assert_eq!(
            sanitizer().sanitize("<reasoning>internal notes</reasoning>Final answer"),
            "Final answer"
        );
    }

    #[test]
    fn test_strips_multiline_think_block() {
        let reply = "<think>\nLet me consider.\nOK.\n</think>\n\nThe video is about Rust.";
        assert_eq!(sanitizer().sanitize(reply), "The video is about Rust.");
    }

    #[test]
    fn test_strips_all_blocks() {
        let reply = "<think>a</think>First. <think>b</think>Second.<reasoning>c</reasoning>";
        assert_eq!(sanitizer().sanitize(reply), "First. Second.");
    }

    #[test]
    fn test_tags_are_case_insensitive() {
        assert_eq!(sanitizer().sanitize("<THINK>x</Think> done"), "done");
    }

    #[test]
    fn test_unclosed_block_yields_empty() {
        assert_eq!(sanitizer().sanitize("<think>still going..."), "");
    }

    #[test]
    fn test_nested_blocks_are_removed() {
        assert_eq!(
            sanitizer().sanitize("<think>a<think>b</think>c</think>Final"),
            "Final"
        );
        assert_eq!(
            sanitizer().sanitize("<think>a<reasoning>b</reasoning>c</think> Final"),
            "Final"
        );
    }

    #[test]
    fn test_trailing_unclosed_block_is_dropped() {
        assert_eq!(sanitizer().sanitize("Answer. <think>more thoughts"), "Answer.");
    }

    #[test]
    fn test_stray_closing_tag_is_kept() {
        assert_eq!(sanitizer().sanitize("a</think> b"), "a</think> b");
    }

    #[test]
    fn test_tag_with_attributes() {
        assert_eq!(sanitizer().sanitize(r#"<think type="x">y</think>ok"#), "ok");
    }

    #[test]
    fn test_unlisted_tags_are_kept() {
        assert_eq!(sanitizer().sanitize("<b>bold</b> text "), "<b>bold</b> text");
    }

    #[test]
    fn test_no_tags_only_trims() {
        let sanitizer = ReasoningSanitizer::new::<&str>(&[]).unwrap();
        assert_eq!(sanitizer.sanitize("  <think>x</think> y "), "<think>x</think> y");
    }
}
