//! Text normalisation and term splitting.
//!
//! Used for both corpus indexing and query embedding, so the two always agree
//! on what a term is.

use std::sync::LazyLock;

use regex::Regex;

/// Whitespace, Unicode punctuation and ASCII punctuation (which includes
/// symbols such as `$`, `+` and `|`). Full-width CJK punctuation like `，`
/// and `？` falls under `\p{P}`.
static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"[\s\p{P}[:punct:]]+").expect("separator pattern is a valid regex")
});

/// Split `text` into index terms.
///
/// Lower-cases the input, treats runs of whitespace and punctuation as a
/// single separator, and drops terms of one character or less. Term order and
/// duplicates are preserved.
pub fn tokenize(text: &str) -> Vec<String> {
  let lowered = text.to_lowercase();
  SEPARATORS
    .split(&lowered)
    .filter(|term| term.chars().count() > 1)
    .map(str::to_owned)
    .collect()
}
