//! Cleanup passes for values captured out of templates.
//!
//! Root words and derived terms arrive with leftover markup (tags, links,
//! bold quotes, nested templates). Each pass is a small `&str -> String`
//! function; the two entry points chain them.

use std::sync::LazyLock;

use regex::Regex;

use wordroots_shared::Word;

/// Capture that means "same as the headword".
const SAME_AS_HEADWORD: &str = "-";

/// Marker on reconstructed (unattested) forms.
const RECONSTRUCTION_MARKER: char = '*';

// ---------------------------------------------------------------------------
// Root words
// ---------------------------------------------------------------------------

/// Clean a captured root word into its stored spelling.
///
/// Returns `None` for empty captures and the same-as-headword placeholder.
pub(crate) fn clean_root_word(raw: &str) -> Option<String> {
    let word = strip_html_tags(raw.trim());
    let word = collapse_links(&word);
    let word = word.split('|').next().unwrap_or_default().trim();
    let word = word.trim_matches(RECONSTRUCTION_MARKER);

    if word.is_empty() || word == SAME_AS_HEADWORD {
        return None;
    }
    Some(word.to_lowercase())
}

/// Remove `<...>` tags, keeping the text between them.
fn strip_html_tags(s: &str) -> String {
    static TAG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

    TAG_RE.replace_all(s, "").into_owned()
}

/// `[[target|display]]` and `[[target]]` become `target`.
fn collapse_links(s: &str) -> String {
    static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\[\[([^\]|]+)(\|[^\]]+)?\]\]").expect("valid regex")
    });

    LINK_RE.replace_all(s, "${1}").into_owned()
}

// ---------------------------------------------------------------------------
// Derived terms
// ---------------------------------------------------------------------------

/// Clean one pipe-separated token from a column template.
///
/// Parameter tokens (`title=...`) and anything that is not purely alphabetic
/// after cleanup are rejected.
pub(crate) fn clean_list_term(raw: &str) -> Option<Word> {
    let term = raw.trim();
    if term.contains('=') {
        return None;
    }

    let term = collapse_term_links(term);
    let term = strip_bold(&term);
    let term = strip_templates(&term);

    alphabetic_word(&term)
}

/// Accept a plain token only if it is made entirely of letters.
pub(crate) fn alphabetic_word(raw: &str) -> Option<Word> {
    let term = raw.trim();
    if term.is_empty() || !term.chars().all(char::is_alphabetic) {
        return None;
    }
    Some(Word::new(term))
}

/// `[[term...]]` becomes `term`.
fn collapse_term_links(s: &str) -> String {
    static LINK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[\[([^\]|]+).*?\]\]").expect("valid regex"));

    LINK_RE.replace_all(s, "${1}").into_owned()
}

/// `'''term'''` and `''term''` become `term`.
fn strip_bold(s: &str) -> String {
    static BOLD_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"'''?([^']+)'''?").expect("valid regex"));

    BOLD_RE.replace_all(s, "${1}").into_owned()
}

/// Drop any `{{...}}` template left in the token.
fn strip_templates(s: &str) -> String {
    static TEMPLATE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\{\{[^}]+\}\}").expect("valid regex"));

    TEMPLATE_RE.replace_all(s, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_word_is_lower_cased() {
        assert_eq!(clean_root_word(" Colonia "), Some("colonia".into()));
    }

    #[test]
    fn root_word_strips_tags() {
        assert_eq!(clean_root_word("nacion<t:nation>"), Some("nacion".into()));
        assert_eq!(clean_root_word("<b>fixus</b>"), Some("fixus".into()));
    }

    #[test]
    fn root_word_collapses_links() {
        assert_eq!(clean_root_word("[[natio|nātiō]]"), Some("natio".into()));
        assert_eq!(clean_root_word("[[macco]]"), Some("macco".into()));
    }

    #[test]
    fn root_word_strips_reconstruction_marker() {
        assert_eq!(clean_root_word("*rinnaną"), Some("rinnaną".into()));
    }

    #[test]
    fn placeholders_are_rejected() {
        assert_eq!(clean_root_word("-"), None);
        assert_eq!(clean_root_word("  "), None);
        assert_eq!(clean_root_word("<t:gloss>"), None);
        assert_eq!(clean_root_word("**"), None);
    }

    #[test]
    fn list_term_skips_parameters() {
        assert_eq!(clean_list_term("title=derived terms"), None);
        assert_eq!(clean_list_term("sort=nation"), None);
    }

    #[test]
    fn list_term_unwraps_markup() {
        assert_eq!(clean_list_term("[[nationless]]"), Some(Word::new("NATIONLESS")));
        assert_eq!(clean_list_term("'''national'''"), Some(Word::new("NATIONAL")));
        assert_eq!(
            clean_list_term("nationhood{{q|rare}}"),
            Some(Word::new("NATIONHOOD"))
        );
    }

    #[test]
    fn list_term_rejects_non_alphabetic() {
        assert_eq!(clean_list_term("first nation"), None);
        assert_eq!(clean_list_term("nation-state"), None);
        assert_eq!(clean_list_term("run-in"), None);
        assert_eq!(clean_list_term(""), None);
    }
}
