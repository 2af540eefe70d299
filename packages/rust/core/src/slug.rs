//! Output directory names.

use std::sync::LazyLock;

use regex::Regex;

static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));

/// Fallback when nothing usable is left after slugifying.
pub const DEFAULT_SLUG: &str = "profile";

/// Lower-case `text`, collapse every run of characters outside `[a-z0-9]`
/// into a single `-` and trim dashes from both ends.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let slug = NON_ALNUM.replace_all(&lower, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        DEFAULT_SLUG.to_string()
    } else {
        slug.to_string()
    }
}
