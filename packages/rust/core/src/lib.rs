//! Etymology knowledge-base construction and propagation for wordroots.
//!
//! This crate ties the corpus reader and the markup extractor to the
//! knowledge base, and implements the two propagation steps (derived terms
//! and inflected forms) that fill it out.

pub mod knowledge_base;
pub mod morphology;
pub mod pipeline;
pub mod propagate;
pub mod stats;

pub use knowledge_base::KnowledgeBase;
pub use morphology::{ENGLISH_RULES, MatchedRule, Reconstruction, Resolution, RuleSet, resolve};
pub use pipeline::{
    BuildReport, ProgressReporter, ScanReport, SilentProgress, build, expand_derivations,
    expand_inflections, extract_etymologies,
};
pub use propagate::{DerivationReport, FixedPointReport, SweepStats};
pub use stats::{DEFAULT_SAMPLE_WORDS, KbStats, compute_stats};
