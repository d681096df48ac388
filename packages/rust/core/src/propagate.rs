//! Filling blanks from facts already in the knowledge base.
//!
//! Two propagators, both write-only-into-blanks:
//!
//! - [`propagate_derivations`] copies a base word's roots to the words its
//!   page lists as derived terms. One pass, one hop.
//! - [`run_to_fixed_point`] sweeps entry-less vocabulary words through the
//!   morphological resolver until a sweep adds nothing.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use wordroots_shared::{DerivationFact, EtymologyEntry, PropagationConfig, Word};

use crate::knowledge_base::KnowledgeBase;
use crate::morphology::RuleSet;
use crate::pipeline::ProgressReporter;

// ---------------------------------------------------------------------------
// Derivation propagation
// ---------------------------------------------------------------------------

/// Outcome of one derivation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivationReport {
    /// Facts considered.
    pub facts: usize,
    /// Facts whose base had an entry before the pass.
    pub eligible: usize,
    /// Entries created.
    pub propagated: usize,
}

/// Copy each base word's descriptors to its derived words that lack an entry.
///
/// Eligibility is decided against the base as it stood before the pass, so a
/// word filled here never acts as a base in the same pass.
#[instrument(skip_all, fields(facts = facts.len()))]
pub fn propagate_derivations(
    kb: &mut KnowledgeBase,
    facts: &BTreeSet<DerivationFact>,
) -> DerivationReport {
    let planned: Vec<(Word, EtymologyEntry)> = facts
        .iter()
        .filter_map(|fact| {
            kb.get(fact.base.as_str())
                .map(|entry| (fact.derived.clone(), entry.clone()))
        })
        .collect();

    let mut report = DerivationReport {
        facts: facts.len(),
        eligible: planned.len(),
        propagated: 0,
    };

    for (derived, entry) in planned {
        let word = derived.clone();
        if kb.set_if_absent(derived, entry) {
            report.propagated += 1;
            debug!(word = %word, "propagated roots to derived term");
        }
    }

    info!(
        eligible = report.eligible,
        propagated = report.propagated,
        entries = kb.len(),
        "derivation propagation complete"
    );
    report
}

// ---------------------------------------------------------------------------
// Fixed-point inflection propagation
// ---------------------------------------------------------------------------

/// Counts for one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepStats {
    /// 1-based sweep number.
    pub sweep: u32,
    /// Entry-less words examined.
    pub candidates: usize,
    pub added: usize,
    pub entries_after: usize,
}

/// Outcome of a fixed-point run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FixedPointReport {
    pub sweeps: Vec<SweepStats>,
    /// Total entries added across all sweeps.
    pub added: usize,
    /// `false` when the sweep cap was reached before a sweep added nothing.
    pub converged: bool,
}

/// Sweep until nothing new resolves, or `config.max_sweeps` is reached.
///
/// Within a sweep, entries added earlier are visible to later words.
#[instrument(skip_all, fields(max_sweeps = config.max_sweeps))]
pub fn run_to_fixed_point(
    kb: &mut KnowledgeBase,
    rules: &RuleSet,
    config: PropagationConfig,
    progress: &dyn ProgressReporter,
) -> FixedPointReport {
    let mut report = FixedPointReport::default();

    for sweep in 1..=config.max_sweeps {
        let stats = run_sweep(kb, rules, sweep);
        report.added += stats.added;
        report.sweeps.push(stats);
        progress.sweep_complete(&stats);

        info!(
            sweep,
            candidates = stats.candidates,
            added = stats.added,
            entries = stats.entries_after,
            "inflection sweep complete"
        );

        if stats.added == 0 {
            report.converged = true;
            break;
        }
    }

    if !report.converged {
        warn!(
            max_sweeps = config.max_sweeps,
            added = report.added,
            "sweep cap reached before convergence"
        );
    }
    report
}

fn run_sweep(kb: &mut KnowledgeBase, rules: &RuleSet, sweep: u32) -> SweepStats {
    let missing = kb.missing_words();
    let candidates = missing.len();
    let mut added = 0;

    for word in missing {
        let Some(entry) = rules.resolve(word.as_str(), kb).map(|r| r.entry.clone()) else {
            continue;
        };
        if kb.set_if_absent(word, entry) {
            added += 1;
        }
    }

    SweepStats {
        sweep,
        candidates,
        added,
        entries_after: kb.len(),
    }
}
