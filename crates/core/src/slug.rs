//! Caption-to-filename slug derivation.
//!
//! Output files are named `{slug}-{i}.webp`, so the slug has to be safe
//! on every filesystem: lowercase ASCII letters, digits, and hyphens only.
//! Diacritics are stripped via NFD decomposition (captions are frequently
//! Vietnamese), whitespace runs collapse to a single hyphen, and anything
//! else is dropped.

use unicode_normalization::UnicodeNormalization;

/// Slug used when a caption is empty or whitespace-only.
pub const PLACEHOLDER_SLUG: &str = "no-content";

/// Derive a filesystem-safe slug from a caption line.
///
/// # Examples
///
/// ```
/// use capforge_core::slug::caption_slug;
///
/// assert_eq!(caption_slug("Áo Dài Việt"), "ao-dai-viet");
/// assert_eq!(caption_slug("  "), "no-content");
/// ```
pub fn caption_slug(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return PLACEHOLDER_SLUG.to_string();
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut pending_hyphen = false;
    for ch in trimmed.to_lowercase().nfd() {
        // Combining marks produced by decomposition.
        if ('\u{0300}'..='\u{036f}').contains(&ch) {
            continue;
        }
        if ch.is_whitespace() {
            pending_hyphen = true;
            continue;
        }
        if matches!(ch, 'a'..='z' | '0'..='9' | '-') {
            if pending_hyphen {
                out.push('-');
                pending_hyphen = false;
            }
            out.push(ch);
        }
    }

    if out.is_empty() {
        PLACEHOLDER_SLUG.to_string()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vietnamese_diacritics_are_stripped() {
        assert_eq!(caption_slug("Áo Dài Việt"), "ao-dai-viet");
    }

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(caption_slug("Hello World"), "hello-world");
    }

    #[test]
    fn whitespace_runs_collapse_to_one_hyphen() {
        assert_eq!(caption_slug("a  \t b"), "a-b");
    }

    #[test]
    fn punctuation_is_dropped() {
        assert_eq!(caption_slug("sale! 50% off"), "sale-50-off");
    }

    #[test]
    fn existing_hyphens_survive() {
        assert_eq!(caption_slug("pre-order now"), "pre-order-now");
    }

    #[test]
    fn empty_input_uses_placeholder() {
        assert_eq!(caption_slug(""), PLACEHOLDER_SLUG);
    }

    #[test]
    fn whitespace_only_uses_placeholder() {
        assert_eq!(caption_slug(" \t\n "), PLACEHOLDER_SLUG);
    }

    #[test]
    fn all_symbols_fall_back_to_placeholder() {
        assert_eq!(caption_slug("!!!"), PLACEHOLDER_SLUG);
    }

    #[test]
    fn digits_are_kept() {
        assert_eq!(caption_slug("Sự kiện 2025"), "su-kien-2025");
    }
}
