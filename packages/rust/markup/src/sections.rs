//! Heading-delimited spans of wiki markup.

use std::sync::LazyLock;

use regex::Regex;

/// Start of the next top-level (`==X==`) heading.
static TOP_LEVEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n==[^=]").expect("valid regex"));

/// Start of the next heading at level three or deeper.
static SUBSECTION_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n===").expect("valid regex"));

/// Text between `heading` and the next top-level heading (or end of text).
///
/// Returns `None` when the heading does not occur.
pub(crate) fn top_level_section<'t>(text: &'t str, heading: &str) -> Option<&'t str> {
    let start = text.find(heading)? + heading.len();
    let rest = &text[start..];
    let end = TOP_LEVEL_RE.find(rest).map_or(rest.len(), |m| m.start());
    Some(&rest[..end])
}

/// Bodies of every subsection whose heading matches `heading`.
///
/// A body runs from the end of its heading to the next heading of level
/// three or deeper. Matches never overlap: scanning resumes where the previous
/// body ended.
pub(crate) fn subsection_bodies<'t>(section: &'t str, heading: &Regex) -> Vec<&'t str> {
    let mut bodies = Vec::new();
    let mut pos = 0;

    while let Some(m) = heading.find_at(section, pos) {
        let rest = &section[m.end()..];
        let len = SUBSECTION_END_RE.find(rest).map_or(rest.len(), |e| e.start());
        bodies.push(&rest[..len]);
        pos = m.end() + len;
    }

    bodies
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_stops_at_next_language() {
        let text = "==English==\nA\n===Noun===\nB\n==French==\nC";
        assert_eq!(
            top_level_section(text, "==English=="),
            Some("\nA\n===Noun===\nB")
        );
    }

    #[test]
    fn section_runs_to_end_without_next_heading() {
        let text = "intro\n==English==\nonly";
        assert_eq!(top_level_section(text, "==English=="), Some("\nonly"));
    }

    #[test]
    fn missing_section_is_none() {
        assert_eq!(top_level_section("==German==\nx", "==English=="), None);
    }

    #[test]
    fn subsections_are_collected_in_order() {
        let heading = Regex::new(r"===Etymology\s*\d*===").unwrap();
        let section = "\n===Etymology 1===\nfirst\n===Verb===\nv\n===Etymology 2===\nsecond";
        assert_eq!(
            subsection_bodies(section, &heading),
            vec!["\nfirst", "\nsecond"]
        );
    }

    #[test]
    fn deeper_heading_ends_a_body() {
        let heading = Regex::new(r"====?Derived terms====?").unwrap();
        let section = "\n====Derived terms====\n* a\n====Related terms====\n* b";
        assert_eq!(subsection_bodies(section, &heading), vec!["\n* a"]);
    }
}
