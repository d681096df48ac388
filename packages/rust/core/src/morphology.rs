//! Morphological base-word resolution.
//!
//! Given a word with no entry, find a related word that has one by undoing
//! inflection and affixation: Latin plurals, then suffixes, then prefixes.
//! The rule tables live in a [`RuleSet`]; [`ENGLISH_RULES`] is the only set
//! used in practice.

use tracing::trace;

use wordroots_shared::{EtymologyEntry, Word};

use crate::knowledge_base::KnowledgeBase;

// ---------------------------------------------------------------------------
// Rule tables
// ---------------------------------------------------------------------------

/// A suffix and the extra endings to try on its stem once the generic
/// candidates have failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuffixRule {
    pub suffix: &'static str,
    pub alternates: &'static [&'static str],
}

impl SuffixRule {
    const fn plain(suffix: &'static str) -> Self {
        Self {
            suffix,
            alternates: &[],
        }
    }

    const fn with(suffix: &'static str, alternates: &'static [&'static str]) -> Self {
        Self { suffix, alternates }
    }
}

/// Ordered resolution rules.
#[derive(Debug, Clone, Copy)]
pub struct RuleSet {
    /// `(plural ending, singular ending)`, tried in order.
    pub latin_plurals: &'static [(&'static str, &'static str)],
    /// Most specific first.
    pub suffixes: &'static [SuffixRule],
    pub prefixes: &'static [&'static str],
}

const TO_Y: &[&str] = &["Y"];

/// English inflection and derivation rules.
pub static ENGLISH_RULES: RuleSet = RuleSet {
    latin_plurals: &[("ICES", "IX"), ("ICES", "EX"), ("AE", "A"), ("I", "US")],
    suffixes: &[
        SuffixRule::with("OLOGICALLY", &["OLOGY"]),
        SuffixRule::plain("ISTICALLY"),
        SuffixRule::with("ICALLY", &["IC", "ICAL"]),
        SuffixRule::plain("ISATION"),
        SuffixRule::plain("IZATION"),
        SuffixRule::plain("URISTS"),
        SuffixRule::plain("OLOGISTS"),
        SuffixRule::with("ISTS", &["Y", "O"]),
        SuffixRule::plain("IVENESS"),
        SuffixRule::plain("FULNESS"),
        SuffixRule::plain("LESSNESS"),
        SuffixRule::with("INESS", TO_Y),
        SuffixRule::plain("NESSES"),
        SuffixRule::plain("MENTS"),
        SuffixRule::plain("ABLES"),
        SuffixRule::plain("IBLES"),
        SuffixRule::plain("NESS"),
        SuffixRule::plain("MENT"),
        SuffixRule::plain("ABLE"),
        SuffixRule::plain("IBLE"),
        SuffixRule::plain("TION"),
        SuffixRule::plain("SION"),
        SuffixRule::plain("URIST"),
        SuffixRule::plain("OLOGIST"),
        SuffixRule::plain("LING"),
        SuffixRule::plain("INGS"),
        SuffixRule::with("IEST", TO_Y),
        SuffixRule::plain("IERS"),
        SuffixRule::plain("ICAL"),
        SuffixRule::plain("IVES"),
        SuffixRule::plain("ING"),
        SuffixRule::with("IES", TO_Y),
        SuffixRule::with("IER", TO_Y),
        SuffixRule::with("IED", TO_Y),
        SuffixRule::plain("EST"),
        SuffixRule::plain("ERS"),
        SuffixRule::plain("ENS"),
        SuffixRule::with("ILY", TO_Y),
        SuffixRule::with("IVE", &["ATE", "E"]),
        SuffixRule::with("IST", &["Y", "O"]),
        SuffixRule::plain("ISH"),
        SuffixRule::plain("ISE"),
        SuffixRule::plain("IZE"),
        SuffixRule::plain("LY"),
        SuffixRule::plain("ED"),
        SuffixRule::plain("ER"),
        SuffixRule::plain("ES"),
        SuffixRule::plain("EN"),
        SuffixRule::plain("EY"),
        SuffixRule::plain("Y"),
        SuffixRule::plain("S"),
        SuffixRule::plain("D"),
    ],
    prefixes: &[
        "UNDER", "SUPER", "OVER", "SEMI", "ANTI", "FORE", "WITH", "OUT", "MIS", "PRE", "NON",
        "DIS", "UN", "RE", "DE", "BI", "TRI", "BE",
    ],
};

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// How a suffix stem was turned into the base word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconstruction {
    /// The bare stem (`FIXED` → `FIX`).
    Direct,
    /// Stem plus `E` (`MAKING` → `MAKE`).
    SilentE,
    /// Stem with a doubled final letter removed (`RUNNING` → `RUN`).
    Dedoubled,
    /// Stem plus one of the suffix's alternates (`PARTIES` → `PARTY`).
    Alternate(&'static str),
}

/// Which rule produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedRule {
    LatinPlural {
        plural: &'static str,
        singular: &'static str,
    },
    Suffix {
        suffix: &'static str,
        reconstruction: Reconstruction,
    },
    Prefix(&'static str),
}

/// A base word that has an entry, and the rule that led to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'kb> {
    pub base: Word,
    pub rule: MatchedRule,
    pub entry: &'kb EtymologyEntry,
}

/// Resolve `word` with [`ENGLISH_RULES`].
pub fn resolve<'kb>(word: &str, kb: &'kb KnowledgeBase) -> Option<Resolution<'kb>> {
    ENGLISH_RULES.resolve(word, kb)
}

impl RuleSet {
    /// Find the first base word with an entry.
    ///
    /// Stages run in order (Latin plurals, suffixes, prefixes) and the first
    /// hit wins. Within the suffix stage a suffix whose candidates all miss
    /// does not stop the scan; the next suffix is tried.
    pub fn resolve<'kb>(&self, word: &str, kb: &'kb KnowledgeBase) -> Option<Resolution<'kb>> {
        let resolution = self
            .resolve_latin_plural(word, kb)
            .or_else(|| self.resolve_suffix(word, kb))
            .or_else(|| self.resolve_prefix(word, kb));

        if let Some(found) = &resolution {
            trace!(word, base = %found.base, rule = ?found.rule, "resolved base word");
        }
        resolution
    }

    fn resolve_latin_plural<'kb>(&self, word: &str, kb: &'kb KnowledgeBase) -> Option<Resolution<'kb>> {
        let candidates = self
            .latin_plurals
            .iter()
            .filter(|(plural, _)| word.ends_with(plural) && char_len(word) >= char_len(plural) + 2)
            .map(|&(plural, singular)| {
                let stem = &word[..word.len() - plural.len()];
                (
                    format!("{stem}{singular}"),
                    MatchedRule::LatinPlural { plural, singular },
                )
            });

        first_known(kb, candidates)
    }

    fn resolve_suffix<'kb>(&self, word: &str, kb: &'kb KnowledgeBase) -> Option<Resolution<'kb>> {
        self.suffixes
            .iter()
            .filter(|rule| word.ends_with(rule.suffix) && char_len(word) > char_len(rule.suffix) + 2)
            .find_map(|rule| {
                let stem = &word[..word.len() - rule.suffix.len()];
                let candidates = suffix_candidates(stem, rule).map(|(candidate, reconstruction)| {
                    (
                        candidate,
                        MatchedRule::Suffix {
                            suffix: rule.suffix,
                            reconstruction,
                        },
                    )
                });
                first_known(kb, candidates)
            })
    }

    fn resolve_prefix<'kb>(&self, word: &str, kb: &'kb KnowledgeBase) -> Option<Resolution<'kb>> {
        let candidates = self
            .prefixes
            .iter()
            .filter(|prefix| word.starts_with(*prefix) && char_len(word) > char_len(prefix) + 2)
            .map(|&prefix| (word[prefix.len()..].to_string(), MatchedRule::Prefix(prefix)));

        first_known(kb, candidates)
    }
}

/// Candidate bases for one suffix stem, in trial order.
fn suffix_candidates(
    stem: &str,
    rule: &SuffixRule,
) -> impl Iterator<Item = (String, Reconstruction)> {
    let direct = (stem.to_string(), Reconstruction::Direct);
    let silent_e = (format!("{stem}E"), Reconstruction::SilentE);
    let dedoubled = dedouble(stem).map(|s| (s.to_string(), Reconstruction::Dedoubled));
    let alternates = rule
        .alternates
        .iter()
        .map(move |&alt| (format!("{stem}{alt}"), Reconstruction::Alternate(alt)));

    [direct, silent_e].into_iter().chain(dedoubled).chain(alternates)
}

/// `RUNN` → `RUN`: drop the last letter when the stem has at least three
/// letters and ends in a doubled one.
fn dedouble(stem: &str) -> Option<&str> {
    let mut chars = stem.char_indices().rev();
    let (last_idx, last) = chars.next()?;
    let (_, before) = chars.next()?;
    (char_len(stem) >= 3 && last == before).then(|| &stem[..last_idx])
}

/// The first candidate with an entry.
///
/// Every stage funnels its ordered candidates through here, so "first hit
/// wins" means the same thing everywhere.
fn first_known<'kb>(
    kb: &'kb KnowledgeBase,
    candidates: impl IntoIterator<Item = (String, MatchedRule)>,
) -> Option<Resolution<'kb>> {
    candidates.into_iter().find_map(|(candidate, rule)| {
        kb.get(&candidate).map(|entry| Resolution {
            base: Word::new(&candidate),
            rule,
            entry,
        })
    })
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
