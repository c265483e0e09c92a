//! Best-effort line extraction from textual diagnostics.

use std::sync::LazyLock;

use regex::Regex;

use super::engine::SOURCE_NAME;

/// `<chunk>:<line>:` as printed by the interpreter.
static CHUNK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z_][\w.\-]*):(\d+):").expect("valid regex"));

/// Generic `line <n>` wording.
static LINE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"line (\d+)").expect("valid regex"));

/// Find the user-source line a diagnostic refers to.
///
/// Locations inside user source win over locations in packages; the
/// generic `line <n>` pattern is the fallback.
pub fn extract_line(text: &str) -> Option<u32> {
    CHUNK_LINE
        .captures_iter(text)
        .find(|caps| &caps[1] == SOURCE_NAME)
        .and_then(|caps| caps[2].parse().ok())
        .or_else(|| {
            LINE_WORD
                .captures(text)
                .and_then(|caps| caps[1].parse().ok())
        })
}
