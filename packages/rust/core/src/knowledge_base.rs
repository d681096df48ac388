//! The etymology knowledge base: vocabulary words mapped to root descriptors.
//!
//! Writes go through two narrow setters so that an existing entry can never
//! be overwritten:
//!
//! - [`KnowledgeBase::set_if_absent`] fills a blank and nothing else. Every
//!   propagation step uses it.
//! - [`KnowledgeBase::merge_into`] is for the extraction pass, where several
//!   pages (`Nation`, `nation`) may feed one word. It only grows entries it
//!   created itself during the current pass; [`KnowledgeBase::seal`] ends the
//!   pass.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use wordroots_shared::{EtymologyEntry, EtymologyRecords, Result, RootDescriptor, Vocabulary, Word};

/// Persisted keys skipped by [`KnowledgeBase::from_records`], by reason.
#[derive(Debug, Default, PartialEq, Eq)]
struct Dropped {
    outside_vocabulary: usize,
    without_descriptors: usize,
}

/// In-memory knowledge base scoped to one vocabulary.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    vocabulary: Arc<Vocabulary>,
    entries: BTreeMap<Word, EtymologyEntry>,
    /// Entries created by `merge_into` since the last `seal`.
    open: HashSet<Word>,
}

impl KnowledgeBase {
    /// An empty base.
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self {
            vocabulary,
            entries: BTreeMap::new(),
            open: HashSet::default(),
        }
    }

    /// Rebuild a base from persisted records.
    ///
    /// Keys outside the vocabulary and keys with no descriptors are dropped
    /// with a warning; a malformed descriptor string is an error.
    pub fn from_records(vocabulary: Arc<Vocabulary>, records: &EtymologyRecords) -> Result<Self> {
        let mut kb = Self::new(vocabulary);
        let dropped = kb.restore(records)?;

        if dropped.outside_vocabulary > 0 {
            warn!(
                dropped = dropped.outside_vocabulary,
                kept = kb.len(),
                "persisted entries outside the vocabulary were dropped"
            );
        }
        if dropped.without_descriptors > 0 {
            warn!(
                dropped = dropped.without_descriptors,
                kept = kb.len(),
                "persisted entries without descriptors were dropped"
            );
        }
        Ok(kb)
    }

    fn restore(&mut self, records: &EtymologyRecords) -> Result<Dropped> {
        let mut dropped = Dropped::default();

        for (key, descriptors) in records {
            let entry = descriptors
                .iter()
                .map(|s| s.parse::<RootDescriptor>())
                .collect::<Result<EtymologyEntry>>()?;

            let word = Word::new(key);
            if !self.vocabulary.contains(word.as_str()) {
                dropped.outside_vocabulary += 1;
                debug!(word = %key, "dropped persisted entry outside the vocabulary");
            } else if entry.is_empty() {
                dropped.without_descriptors += 1;
                debug!(word = %key, "dropped persisted entry without descriptors");
            } else {
                self.set_if_absent(word, entry);
            }
        }
        Ok(dropped)
    }

    /// Snapshot in persistence form (sorted keys, sorted descriptor lists).
    pub fn to_records(&self) -> EtymologyRecords {
        self.entries
            .iter()
            .map(|(word, entry)| {
                (
                    word.as_str().to_string(),
                    entry.iter().map(ToString::to_string).collect(),
                )
            })
            .collect()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(word)
    }

    pub fn get(&self, word: &str) -> Option<&EtymologyEntry> {
        self.entries.get(word)
    }

    /// Store `descriptors` for `word` only if it has no entry yet.
    ///
    /// Returns `false`, leaving the base untouched, when the word already has
    /// an entry, the descriptor set is empty, or the word is outside the
    /// vocabulary.
    pub fn set_if_absent(&mut self, word: Word, descriptors: EtymologyEntry) -> bool {
        if descriptors.is_empty()
            || !self.vocabulary.contains(word.as_str())
            || self.entries.contains_key(&word)
        {
            return false;
        }
        self.entries.insert(word, descriptors);
        true
    }

    /// Union `descriptors` into an entry opened during the current extraction
    /// pass, creating it if absent.
    ///
    /// Returns `true` if the entry was created or grew. Entries that predate
    /// the pass, or were written by [`set_if_absent`](Self::set_if_absent),
    /// are left alone.
    pub fn merge_into(&mut self, word: Word, descriptors: EtymologyEntry) -> bool {
        if descriptors.is_empty() || !self.vocabulary.contains(word.as_str()) {
            return false;
        }

        match self.entries.get_mut(&word) {
            None => {
                self.open.insert(word.clone());
                self.entries.insert(word, descriptors);
                true
            }
            Some(entry) if self.open.contains(&word) => {
                let before = entry.len();
                entry.extend(descriptors);
                entry.len() > before
            }
            Some(_) => false,
        }
    }

    /// Close every entry opened by `merge_into`.
    pub fn seal(&mut self) {
        self.open.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Word, &EtymologyEntry)> {
        self.entries.iter()
    }

    /// Vocabulary words without an entry, in sorted order.
    pub fn missing_words(&self) -> Vec<Word> {
        self.vocabulary
            .iter()
            .filter(|word| !self.entries.contains_key(*word))
            .cloned()
            .collect()
    }
}
