//! End-to-end steps: corpus → extraction → derivation pass → inflection fixed point.
//!
//! Each step can run on its own (the `extract`, `derive` and `inflect`
//! commands) or together through [`build`], which reads the corpus once for
//! both kinds of facts.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, instrument};

use wordroots_corpus::Corpus;
use wordroots_markup::Extractor;
use wordroots_shared::{DerivationFact, PropagationConfig, Result, Vocabulary, Word};

use crate::knowledge_base::KnowledgeBase;
use crate::morphology::ENGLISH_RULES;
use crate::propagate::{
    DerivationReport, FixedPointReport, SweepStats, propagate_derivations, run_to_fixed_point,
};

/// Pages between progress callbacks during a corpus scan.
const PROGRESS_INTERVAL: usize = 5_000;

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called periodically while the corpus is scanned.
    fn pages_scanned(&self, scanned: usize, in_vocabulary: usize);
    /// Called after every inflection sweep.
    fn sweep_complete(&self, stats: &SweepStats);
    /// Called when a step finishes, with the final entry count.
    fn done(&self, entries: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn pages_scanned(&self, _scanned: usize, _in_vocabulary: usize) {}
    fn sweep_complete(&self, _stats: &SweepStats) {}
    fn done(&self, _entries: usize) {}
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Counts from one corpus scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Main-namespace pages read.
    pub pages_scanned: usize,
    /// Pages whose title is a vocabulary word.
    pub pages_in_vocabulary: usize,
    /// Words that gained an entry from extraction.
    pub words_with_etymology: usize,
    /// Pages that listed at least one in-vocabulary derived term.
    pub words_with_derived_terms: usize,
    /// Distinct (base, derived) relations collected.
    pub derivation_facts: usize,
}

/// Result of [`build`].
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub scan: ScanReport,
    pub derivations: DerivationReport,
    pub inflections: FixedPointReport,
    pub entries: usize,
    pub vocabulary_size: usize,
    #[serde(skip)]
    pub elapsed: Duration,
}

/// What a scan should collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScanTargets {
    etymologies: bool,
    derivations: bool,
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// Step 1: fill the knowledge base with etymologies read from the corpus.
#[instrument(skip_all, fields(corpus = %corpus.path().display()))]
pub fn extract_etymologies(
    corpus: &Corpus,
    extractor: &Extractor,
    kb: &mut KnowledgeBase,
    progress: &dyn ProgressReporter,
) -> Result<ScanReport> {
    progress.phase("Extracting etymologies");
    let targets = ScanTargets {
        etymologies: true,
        derivations: false,
    };
    let (report, _) = scan(corpus, extractor, kb, targets, progress)?;
    progress.done(kb.len());
    Ok(report)
}

/// Step 2: collect derived-term relations and run one derivation pass.
#[instrument(skip_all, fields(corpus = %corpus.path().display()))]
pub fn expand_derivations(
    corpus: &Corpus,
    extractor: &Extractor,
    kb: &mut KnowledgeBase,
    progress: &dyn ProgressReporter,
) -> Result<(ScanReport, DerivationReport)> {
    progress.phase("Collecting derived terms");
    let targets = ScanTargets {
        etymologies: false,
        derivations: true,
    };
    let (scan_report, facts) = scan(corpus, extractor, kb, targets, progress)?;

    progress.phase("Propagating to derived terms");
    let derivations = propagate_derivations(kb, &facts);
    progress.done(kb.len());
    Ok((scan_report, derivations))
}

/// Step 3: resolve inflected forms until nothing new resolves.
pub fn expand_inflections(
    kb: &mut KnowledgeBase,
    config: PropagationConfig,
    progress: &dyn ProgressReporter,
) -> FixedPointReport {
    progress.phase("Propagating to inflected forms");
    let report = run_to_fixed_point(kb, &ENGLISH_RULES, config, progress);
    progress.done(kb.len());
    report
}

/// All three steps, reading the corpus once.
#[instrument(skip_all, fields(corpus = %corpus.path().display()))]
pub fn build(
    corpus: &Corpus,
    extractor: &Extractor,
    kb: &mut KnowledgeBase,
    config: PropagationConfig,
    progress: &dyn ProgressReporter,
) -> Result<BuildReport> {
    let start = Instant::now();
    info!(entries = kb.len(), vocabulary = kb.vocabulary().len(), "starting build");

    progress.phase("Scanning corpus");
    let targets = ScanTargets {
        etymologies: true,
        derivations: true,
    };
    let (scan_report, facts) = scan(corpus, extractor, kb, targets, progress)?;

    progress.phase("Propagating to derived terms");
    let derivations = propagate_derivations(kb, &facts);

    progress.phase("Propagating to inflected forms");
    let inflections = run_to_fixed_point(kb, &ENGLISH_RULES, config, progress);

    let report = BuildReport {
        scan: scan_report,
        derivations,
        inflections,
        entries: kb.len(),
        vocabulary_size: kb.vocabulary().len(),
        elapsed: start.elapsed(),
    };
    progress.done(report.entries);

    info!(
        entries = report.entries,
        elapsed_ms = report.elapsed.as_millis(),
        "build complete"
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// Corpus scan
// ---------------------------------------------------------------------------

fn scan(
    corpus: &Corpus,
    extractor: &Extractor,
    kb: &mut KnowledgeBase,
    targets: ScanTargets,
    progress: &dyn ProgressReporter,
) -> Result<(ScanReport, BTreeSet<DerivationFact>)> {
    let mut report = ScanReport::default();
    let mut facts = BTreeSet::new();
    let entries_before = kb.len();

    for page in corpus.pages()? {
        let page = page?;
        report.pages_scanned += 1;
        if report.pages_scanned % PROGRESS_INTERVAL == 0 {
            progress.pages_scanned(report.pages_scanned, report.pages_in_vocabulary);
        }

        let word = Word::new(&page.title);
        if !kb.vocabulary().contains(word.as_str()) {
            continue;
        }
        report.pages_in_vocabulary += 1;

        let page_facts = extractor.extract(&page.title, &page.text);

        if targets.derivations {
            let before = facts.len();
            facts.extend(derivation_facts(
                &word,
                page_facts.derived_terms,
                kb.vocabulary(),
            ));
            if facts.len() > before {
                report.words_with_derived_terms += 1;
            }
        }

        if targets.etymologies && kb.merge_into(word.clone(), page_facts.etymologies) {
            debug!(word = %word, "recorded etymology");
        }
    }
    kb.seal();

    report.words_with_etymology = kb.len() - entries_before;
    report.derivation_facts = facts.len();
    progress.pages_scanned(report.pages_scanned, report.pages_in_vocabulary);

    info!(
        pages = report.pages_scanned,
        in_vocabulary = report.pages_in_vocabulary,
        with_etymology = report.words_with_etymology,
        derivation_facts = report.derivation_facts,
        "corpus scan complete"
    );
    Ok((report, facts))
}

/// In-vocabulary derived terms of `base` as facts.
fn derivation_facts<'a>(
    base: &'a Word,
    derived_terms: BTreeSet<Word>,
    vocabulary: &'a Vocabulary,
) -> impl Iterator<Item = DerivationFact> + 'a {
    derived_terms
        .into_iter()
        .filter(|term| vocabulary.contains(term.as_str()))
        .filter_map(|term| DerivationFact::new(base.clone(), term))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;

    use wordroots_shared::ExtractConfig;

    fn corpus() -> Corpus {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures/dump/sample-pages.xml");
        Corpus::open(path).unwrap()
    }

    fn extractor() -> Extractor {
        Extractor::new(&ExtractConfig::default()).unwrap()
    }

    fn vocabulary() -> Arc<Vocabulary> {
        Arc::new(Vocabulary::from_words([
            "NATION", "NATIONAL", "NATIONHOOD", "NATIONWIDE", "NATIONS", "RUN", "RUNNING",
            "RUNNER", "OUTRUN", "MAKE", "MAKING", "COLONY", "COLONIST", "FIX", "FIXED",
            "UNFIXED", "NACHT", "PAGINA",
        ]))
    }

    fn descriptors(kb: &KnowledgeBase, word: &str) -> Vec<String> {
        kb.get(word)
            .map(|e| e.iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    #[test]
    fn extraction_fills_vocabulary_words() {
        let mut kb = KnowledgeBase::new(vocabulary());
        let report = extract_etymologies(&corpus(), &extractor(), &mut kb, &SilentProgress).unwrap();

        assert_eq!(report.pages_scanned, 6);
        assert_eq!(report.pages_in_vocabulary, 6);
        assert_eq!(report.words_with_etymology, 5);
        assert_eq!(
            descriptors(&kb, "NATION"),
            vec!["enm:nacioun", "latin:natio", "old_french:nacion"]
        );
        assert_eq!(descriptors(&kb, "MAKE"), vec!["latin:macco"]);
        assert!(!kb.contains("NACHT"));
        assert!(!kb.contains("PAGINA"));
    }

    #[test]
    fn extraction_unions_etymology_sections_and_skips_excluded_codes() {
        let mut kb = KnowledgeBase::new(vocabulary());
        extract_etymologies(&corpus(), &extractor(), &mut kb, &SilentProgress).unwrap();
        assert_eq!(
            descriptors(&kb, "RUN"),
            vec!["enm:rinnen", "old_english:rinnan", "old_norse:rinna"]
        );
    }

    #[test]
    fn extraction_keeps_existing_entries() {
        let mut kb = KnowledgeBase::new(vocabulary());
        let fixed: wordroots_shared::EtymologyEntry =
            std::iter::once("greek:other".parse().unwrap()).collect();
        kb.set_if_absent(Word::new("FIX"), fixed);

        extract_etymologies(&corpus(), &extractor(), &mut kb, &SilentProgress).unwrap();
        assert_eq!(descriptors(&kb, "FIX"), vec!["greek:other"]);
    }

    #[test]
    fn derivations_are_filtered_to_vocabulary() {
        let mut kb = KnowledgeBase::new(vocabulary());
        let targets = ScanTargets {
            etymologies: false,
            derivations: true,
        };
        let (_, facts) = scan(&corpus(), &extractor(), &mut kb, targets, &SilentProgress).unwrap();
        assert!(kb.is_empty());
        let pairs: Vec<(&str, &str)> = facts
            .iter()
            .map(|f| (f.base.as_str(), f.derived.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("NATION", "NATIONAL"),
                ("NATION", "NATIONHOOD"),
                ("NATION", "NATIONWIDE"),
                ("RUN", "OUTRUN"),
                ("RUN", "RUNNER"),
            ]
        );
    }

    #[test]
    fn derive_step_propagates_once() {
        let mut kb = KnowledgeBase::new(vocabulary());
        extract_etymologies(&corpus(), &extractor(), &mut kb, &SilentProgress).unwrap();

        let (scan, derivations) =
            expand_derivations(&corpus(), &extractor(), &mut kb, &SilentProgress).unwrap();
        assert_eq!(scan.derivation_facts, 5);
        assert_eq!(scan.words_with_etymology, 0);
        assert_eq!(derivations.propagated, 5);
        assert_eq!(descriptors(&kb, "NATIONAL"), descriptors(&kb, "NATION"));
        assert_eq!(descriptors(&kb, "RUNNER"), descriptors(&kb, "RUN"));
    }

    #[test]
    fn build_runs_every_step() {
        let mut kb = KnowledgeBase::new(vocabulary());
        let report = build(
            &corpus(),
            &extractor(),
            &mut kb,
            PropagationConfig::default(),
            &SilentProgress,
        )
        .unwrap();

        assert_eq!(report.scan.words_with_etymology, 5);
        assert_eq!(report.derivations.propagated, 5);
        assert!(report.inflections.converged);

        assert_eq!(descriptors(&kb, "MAKING"), vec!["latin:macco"]);
        assert_eq!(
            descriptors(&kb, "RUNNING"),
            vec!["enm:rinnen", "old_english:rinnan", "old_norse:rinna"]
        );
        assert_eq!(descriptors(&kb, "COLONIST"), vec!["latin:colonia"]);
        assert_eq!(descriptors(&kb, "NATIONS"), descriptors(&kb, "NATION"));
        assert_eq!(descriptors(&kb, "UNFIXED"), vec!["latin:fixus"]);
        assert_eq!(report.entries, kb.len());
        assert!(kb.iter().all(|(word, _)| kb.vocabulary().contains(word.as_str())));
    }

    #[test]
    fn build_is_idempotent() {
        let mut kb = KnowledgeBase::new(vocabulary());
        build(&corpus(), &extractor(), &mut kb, PropagationConfig::default(), &SilentProgress)
            .unwrap();
        let first = kb.to_records();

        let again = build(&corpus(), &extractor(), &mut kb, PropagationConfig::default(), &SilentProgress)
            .unwrap();
        assert_eq!(again.scan.words_with_etymology, 0);
        assert_eq!(again.derivations.propagated, 0);
        assert_eq!(again.inflections.added, 0);
        assert_eq!(kb.to_records(), first);
    }
}
