//! Text normalization for caption fragments.

use regex::Regex;
use std::sync::LazyLock;

/// Entities decoded from caption text. `&amp;` goes first so that a doubly
/// escaped `&amp;#39;` becomes `&#39;` and then `'` within the same pass.
const ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&#39;", "'"),
    ("&#x27;", "'"),
    ("&apos;", "'"),
    ("&quot;", "\""),
    ("&#34;", "\""),
    ("&#x22;", "\""),
];

static SENTENCE_GLUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([.!?])(\w)").expect("Invalid regex"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

/// Clean up one fragment of caption text.
///
/// Decodes HTML entities (to a fixpoint), separates glued sentences, collapses
/// whitespace and trims. `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    let decoded = decode_entities(text);
    let spaced = SENTENCE_GLUE.replace_all(&decoded, "$1 $2");
    let collapsed = WHITESPACE_RUN.replace_all(&spaced, " ");
    collapsed.trim().to_string()
}

/// Decode the supported entities until nothing changes.
///
/// Every replacement shortens the string, so the loop terminates.
pub fn decode_entities(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        if !current.contains('&') {
            return current;
        }

        let mut next = current.clone();
        for (entity, replacement) in ENTITIES {
            next = next.replace(entity, replacement);
        }

        if next == current {
            return current;
        }
        current = next;
    }
}
