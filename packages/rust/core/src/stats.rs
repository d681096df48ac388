//! Summary figures for a knowledge base.

use std::collections::HashMap;

use serde::Serialize;

use wordroots_shared::Word;

use crate::knowledge_base::KnowledgeBase;

/// Words shown by default in the sample section of a report.
pub const DEFAULT_SAMPLE_WORDS: &[&str] = &[
    "FIX", "AFFIX", "SUFFIX", "PREFIX", "BANG", "BANGLE", "WIND", "WINDY",
];

/// How many root languages the breakdown lists.
pub const TOP_LANGUAGES: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KbStats {
    pub entries: usize,
    pub vocabulary_size: usize,
    /// Share of the vocabulary with an entry, in percent.
    pub coverage_percent: f64,
    /// Entries with more than one descriptor.
    pub multi_etymology: usize,
    /// Descriptor counts per root language, most frequent first.
    pub languages: Vec<LanguageCount>,
    pub samples: Vec<Sample>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageCount {
    pub language: String,
    pub count: usize,
}

/// A looked-up word; `descriptors` is empty when it has no entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sample {
    pub word: String,
    pub descriptors: Vec<String>,
}

/// Compute coverage, the language breakdown and sample lookups.
pub fn compute_stats(kb: &KnowledgeBase, samples: &[Word]) -> KbStats {
    let mut by_language: HashMap<&str, usize> = HashMap::new();
    let mut multi_etymology = 0;

    for (_, entry) in kb.iter() {
        if entry.len() > 1 {
            multi_etymology += 1;
        }
        for descriptor in entry {
            *by_language.entry(descriptor.language()).or_default() += 1;
        }
    }

    let mut languages: Vec<LanguageCount> = by_language
        .into_iter()
        .map(|(language, count)| LanguageCount {
            language: language.to_string(),
            count,
        })
        .collect();
    languages.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.language.cmp(&b.language)));
    languages.truncate(TOP_LANGUAGES);

    let vocabulary_size = kb.vocabulary().len();
    let coverage_percent = if vocabulary_size == 0 {
        0.0
    } else {
        100.0 * kb.len() as f64 / vocabulary_size as f64
    };

    KbStats {
        entries: kb.len(),
        vocabulary_size,
        coverage_percent,
        multi_etymology,
        languages,
        samples: samples
            .iter()
            .map(|word| Sample {
                word: word.to_string(),
                descriptors: kb
                    .get(word.as_str())
                    .map(|e| e.iter().map(ToString::to_string).collect())
                    .unwrap_or_default(),
            })
            .collect(),
    }
}
