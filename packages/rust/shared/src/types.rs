//! Core domain types for etymology knowledge bases.

use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::WordrootsError;

// ---------------------------------------------------------------------------
// Word
// ---------------------------------------------------------------------------

/// A case-normalized (upper-case) vocabulary token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Word(String);

impl Word {
    /// Normalize a raw token: surrounding whitespace trimmed, upper-cased.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Borrow<str> for Word {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Word {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Word {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl std::fmt::Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// RootDescriptor
// ---------------------------------------------------------------------------

/// One claimed etymological origin: a root language and a root word.
///
/// Serialized as `"language:word"`. Parsing splits on the first `:`, so the
/// root word itself may contain colons.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct RootDescriptor {
    language: String,
    word: String,
}

impl RootDescriptor {
    pub fn new(language: impl Into<String>, word: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            word: word.into(),
        }
    }

    /// Canonical root-language name (e.g. `latin`, `old_english`).
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Cleaned, lower-cased root word.
    pub fn word(&self) -> &str {
        &self.word
    }
}

impl std::fmt::Display for RootDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.language, self.word)
    }
}

impl std::str::FromStr for RootDescriptor {
    type Err = WordrootsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (language, word) = s.split_once(':').ok_or_else(|| {
            WordrootsError::validation(format!("root descriptor '{s}' has no ':' separator"))
        })?;
        if language.is_empty() || word.is_empty() {
            return Err(WordrootsError::validation(format!(
                "root descriptor '{s}' has an empty language or word"
            )));
        }
        Ok(Self::new(language, word))
    }
}

impl From<RootDescriptor> for String {
    fn from(descriptor: RootDescriptor) -> Self {
        descriptor.to_string()
    }
}

impl TryFrom<String> for RootDescriptor {
    type Error = WordrootsError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// All root descriptors recorded for one word (deduplicated, ordered).
pub type EtymologyEntry = BTreeSet<RootDescriptor>;

/// On-disk shape of a knowledge base: word → list of `"language:word"` strings.
///
/// A `BTreeMap` so serialization has stable key order.
pub type EtymologyRecords = BTreeMap<String, Vec<String>>;

// ---------------------------------------------------------------------------
// DerivationFact
// ---------------------------------------------------------------------------

/// A "derived term" relation taken from a corpus page: `base` lists `derived`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DerivationFact {
    pub base: Word,
    pub derived: Word,
}

impl DerivationFact {
    /// Returns `None` for a self-derivation.
    pub fn new(base: Word, derived: Word) -> Option<Self> {
        if base == derived {
            return None;
        }
        Some(Self { base, derived })
    }
}

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

/// The closed set of legal words. Every knowledge-base key must be a member.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    words: BTreeSet<Word>,
}

impl Vocabulary {
    /// Build from raw tokens; blank tokens are ignored.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .filter(|w| !w.as_ref().trim().is_empty())
            .map(|w| Word::new(w.as_ref()))
            .collect();
        Self { words }
    }

    /// Parse a newline-separated word list.
    pub fn parse(text: &str) -> Self {
        Self::from_words(text.lines())
    }

    /// Exact membership test against an already upper-cased word.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Word> {
        self.words.iter()
    }
}
