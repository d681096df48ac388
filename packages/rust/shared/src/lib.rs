//! Shared types, error model, and configuration for wordroots.
//!
//! This crate is the foundation depended on by all other wordroots crates.
//! It provides:
//! - [`WordrootsError`], the unified error type
//! - Domain types ([`Word`], [`RootDescriptor`], [`EtymologyEntry`], [`Vocabulary`])
//! - Configuration ([`AppConfig`], [`ExtractConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_VOCABULARY_SOURCE, DefaultsConfig, ExtractConfig, ExtractionConfig,
    PropagationConfig, PropagationSettings, VocabularyConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, validate_config,
};
pub use error::{Result, WordrootsError};
pub use types::{
    DerivationFact, EtymologyEntry, EtymologyRecords, RootDescriptor, Vocabulary, Word,
};
