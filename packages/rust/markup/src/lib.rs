//! Fact extraction from Wiktionary page markup.
//!
//! An [`Extractor`] looks only at the configured language's top-level section
//! of a page. Inside it, etymology subsections yield root descriptors from
//! `der`/`inh`/`bor` style templates, and derived-terms subsections yield the
//! words listed as built on the headword.

mod cleanup;
mod languages;
mod sections;

use std::collections::{BTreeSet, HashSet};

use regex::Regex;
use tracing::trace;

use wordroots_shared::{EtymologyEntry, ExtractConfig, Result, RootDescriptor, Word, WordrootsError};

pub use languages::{ROOT_LANGUAGES, canonical_language};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Everything one page contributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFacts {
    /// Root descriptors unioned across every etymology subsection.
    pub etymologies: EtymologyEntry,
    /// Upper-cased derived words, headword excluded.
    pub derived_terms: BTreeSet<Word>,
}

impl PageFacts {
    pub fn is_empty(&self) -> bool {
        self.etymologies.is_empty() && self.derived_terms.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// Compiled extraction rules for one target language.
#[derive(Debug, Clone)]
pub struct Extractor {
    /// Literal top-level heading, e.g. `==English==`.
    section_heading: String,
    etymology_heading: Regex,
    derived_heading: Regex,
    /// `{{der|en|la|word}}` and friends; group 1 is the source code, group 2 the word.
    etymology_template: Regex,
    /// `{{col3|en|a|b|c}}`; group 1 is the pipe-separated list.
    column_template: Regex,
    /// `{{der3|en|a|b|c}}`; group 1 is the pipe-separated list.
    numbered_der_template: Regex,
    /// `{{l|en|word}}`; group 1 is the linked word.
    link_template: Regex,
    excluded_codes: HashSet<String>,
}

impl Extractor {
    /// Compile the rules for the configured language.
    pub fn new(config: &ExtractConfig) -> Result<Self> {
        let language = config.language.trim();
        if language.is_empty() {
            return Err(WordrootsError::config("extraction language must not be empty"));
        }
        let code = regex::escape(&config.language_code);

        Ok(Self {
            section_heading: format!("=={language}=="),
            etymology_heading: compile(r"===Etymology(?:\s*\d*)?===")?,
            derived_heading: compile(r"====?Derived terms====?")?,
            etymology_template: compile(&format!(
                r"(?i)\{{\{{(?:der|inh|bor|borrowed|derived|inherited)\+?\|{code}\|([a-z-]+)\|((?:\[\[[^\]]*\]\]|[^|}}])+)"
            ))?,
            column_template: compile(&format!(r"\{{\{{col\d*\|{code}\|([^}}]+)\}}\}}"))?,
            numbered_der_template: compile(&format!(r"\{{\{{der\d\|{code}\|([^}}]+)\}}\}}"))?,
            link_template: compile(&format!(r"\{{\{{l\|{code}\|([^|}}]+)"))?,
            excluded_codes: config
                .excluded_codes
                .iter()
                .map(|c| c.to_ascii_lowercase())
                .collect(),
        })
    }

    /// Extract every fact a page offers.
    pub fn extract(&self, title: &str, text: &str) -> PageFacts {
        let Some(section) = sections::top_level_section(text, &self.section_heading) else {
            return PageFacts::default();
        };

        let headword = Word::new(title);
        let mut derived_terms = self.derived_terms_in(section);
        derived_terms.remove(&headword);

        let facts = PageFacts {
            etymologies: self.etymologies_in(section),
            derived_terms,
        };
        trace!(
            title,
            roots = facts.etymologies.len(),
            derived = facts.derived_terms.len(),
            "extracted page facts"
        );
        facts
    }

    fn etymologies_in(&self, section: &str) -> EtymologyEntry {
        let mut entry = EtymologyEntry::new();

        for body in sections::subsection_bodies(section, &self.etymology_heading) {
            for caps in self.etymology_template.captures_iter(body) {
                let code = caps[1].to_ascii_lowercase();
                if self.excluded_codes.contains(&code) {
                    continue;
                }
                let Some(word) = cleanup::clean_root_word(&caps[2]) else {
                    continue;
                };
                entry.insert(RootDescriptor::new(canonical_language(&code), word));
            }
        }

        entry
    }

    fn derived_terms_in(&self, section: &str) -> BTreeSet<Word> {
        let mut terms = BTreeSet::new();

        for body in sections::subsection_bodies(section, &self.derived_heading) {
            let lists = self
                .column_template
                .captures_iter(body)
                .chain(self.numbered_der_template.captures_iter(body));
            for caps in lists {
                terms.extend(caps[1].split('|').filter_map(cleanup::clean_list_term));
            }

            for caps in self.link_template.captures_iter(body) {
                terms.extend(cleanup::alphabetic_word(&caps[1]));
            }
        }

        terms
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| WordrootsError::config(format!("invalid extraction pattern: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn fixture(name: &str) -> String {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/wikitext")
            .join(name);
        std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
    }

    fn extractor() -> Extractor {
        Extractor::new(&ExtractConfig::default()).unwrap()
    }

    fn descriptors(entry: &EtymologyEntry) -> Vec<String> {
        entry.iter().map(ToString::to_string).collect()
    }

    fn words(terms: &BTreeSet<Word>) -> Vec<&str> {
        terms.iter().map(Word::as_str).collect()
    }

    #[test]
    fn nation_page_yields_roots_and_derived_terms() {
        let facts = extractor().extract("nation", &fixture("nation.wiki"));
        assert_eq!(
            descriptors(&facts.etymologies),
            vec!["enm:nacioun", "latin:natio", "old_french:nacion"]
        );
        assert_eq!(
            words(&facts.derived_terms),
            vec!["NATIONAL", "NATIONHOOD", "NATIONLESS", "NATIONWIDE"]
        );
    }

    #[test]
    fn other_language_sections_are_ignored() {
        let facts = extractor().extract("nation", &fixture("nation.wiki"));
        assert!(!facts.derived_terms.contains("NATIONALISER"));
        assert_eq!(facts.etymologies.len(), 3);
    }

    #[test]
    fn multiple_etymology_sections_are_unioned() {
        let facts = extractor().extract("bank", &fixture("bank.wiki"));
        assert_eq!(
            descriptors(&facts.etymologies),
            vec!["italian:banca", "old_norse:bakki"]
        );
    }

    #[test]
    fn excluded_codes_never_produce_descriptors() {
        let facts = extractor().extract("bank", &fixture("bank.wiki"));
        assert!(facts.etymologies.iter().all(|d| !d.language().contains("pro")));
    }

    #[test]
    fn excluded_codes_follow_config() {
        let config = ExtractConfig {
            excluded_codes: vec!["it".into()],
            ..ExtractConfig::default()
        };
        let entry = Extractor::new(&config)
            .unwrap()
            .extract("bank", &fixture("bank.wiki"))
            .etymologies;
        assert_eq!(
            descriptors(&entry),
            vec!["ine-pro:bʰeg-", "old_norse:bakki", "proto_germanic:bankiz"]
        );
    }

    #[test]
    fn derived_terms_exclude_the_headword() {
        let facts = extractor().extract("bank", &fixture("bank.wiki"));
        assert_eq!(words(&facts.derived_terms), vec!["BANKER", "BANKING"]);
    }

    #[test]
    fn template_names_are_case_insensitive() {
        let text = "==English==\n===Etymology===\n{{Der|en|LA|fixus}} {{inherited|en|ang|fixian}}";
        assert_eq!(
            descriptors(&extractor().extract("fix", text).etymologies),
            vec!["latin:fixus", "old_english:fixian"]
        );
    }

    #[test]
    fn placeholder_roots_are_skipped() {
        let text = "==English==\n===Etymology===\n{{der|en|la|-}} {{bor|en|fr|<t:x>}} {{der|en|grc|}}";
        assert!(extractor().extract("fix", text).etymologies.is_empty());
    }

    #[test]
    fn templates_outside_etymology_sections_are_ignored() {
        let text = "==English==\n===Noun===\n{{der|en|la|stray}}\n===Etymology===\n{{der|en|la|kept}}";
        assert_eq!(descriptors(&extractor().extract("fix", text).etymologies), vec!["latin:kept"]);
    }

    #[test]
    fn page_without_language_section_is_empty() {
        let facts = extractor().extract("Nacht", "==German==\n===Etymology===\n{{inh|de|goh|naht}}");
        assert!(facts.is_empty());
    }

    #[test]
    fn numbered_der_lists_are_read() {
        let text = "==English==\n====Derived terms====\n{{der3|en|runner|rerun|outrun|run-in}}";
        assert_eq!(
            words(&extractor().extract("run", text).derived_terms),
            vec!["OUTRUN", "RERUN", "RUNNER"]
        );
    }

    #[test]
    fn other_target_language_is_configurable() {
        let config = ExtractConfig {
            language: "French".into(),
            language_code: "fr".into(),
            excluded_codes: Vec::new(),
        };
        let facts = Extractor::new(&config)
            .unwrap()
            .extract("nation", &fixture("nation.wiki"));
        assert_eq!(descriptors(&facts.etymologies), vec!["latin:natio"]);
        assert_eq!(words(&facts.derived_terms), vec!["NATIONALISER"]);
    }

    #[test]
    fn empty_language_is_a_config_error() {
        let config = ExtractConfig {
            language: "  ".into(),
            ..ExtractConfig::default()
        };
        let err = Extractor::new(&config).unwrap_err();
        assert!(matches!(err, WordrootsError::Config { .. }));
    }
}
