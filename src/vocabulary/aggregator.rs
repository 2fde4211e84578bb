/*!
 * Frequency aggregation over tokenized subtitle entries.
 *
 * Candidates are keyed by base form and remember the order in which they
 * were first seen, so ranking is stable: equal frequencies keep encounter
 * order and the output is deterministic for a fixed input.
 */

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::japanese::{get_hiragana_reading, Tokenizer};
use crate::subtitle_parser::SubtitleEntry;

/// Progress is logged every this many entries
const LOG_EVERY_ENTRIES: usize = 50;

/// A base form with its occurrence count and example sentences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyCandidate {
    /// Base form, the aggregation key
    pub word: String,
    /// Hiragana reading from the first occurrence
    pub reading: String,
    /// Entry texts the word occurred in, first ones kept
    pub contexts: Vec<String>,
    pub frequency: u32,
}

pub struct FrequencyAggregator {
    tokenizer: Arc<dyn Tokenizer>,
    max_contexts: usize,
    index: HashMap<String, usize>,
    candidates: Vec<VocabularyCandidate>,
    entries_seen: usize,
    entries_failed: usize,
}

impl FrequencyAggregator {
    pub fn new(tokenizer: Arc<dyn Tokenizer>, max_contexts: usize) -> Self {
        Self {
            tokenizer,
            max_contexts,
            index: HashMap::new(),
            candidates: Vec::new(),
            entries_seen: 0,
            entries_failed: 0,
        }
    }

    /// Tokenize, filter and count one entry.
    ///
    /// A tokenizer failure is logged and the entry skipped; returns the
    /// number of tokens counted.
    pub fn add_entry(&mut self, entry: &SubtitleEntry) -> usize {
        self.entries_seen += 1;

        let tokens = match self.tokenizer.tokenize(&entry.text) {
            Ok(tokens) => self.tokenizer.filter_vocabulary(tokens),
            Err(e) => {
                self.entries_failed += 1;
                warn!("Skipping entry {} ({}): {}", entry.sequence, entry.text, e);
                return 0;
            }
        };

        let counted = tokens.len();
        for token in tokens {
            match self.index.get(&token.base_form) {
                Some(&position) => {
                    let candidate = &mut self.candidates[position];
                    candidate.frequency += 1;
                    if candidate.contexts.len() < self.max_contexts {
                        candidate.contexts.push(entry.text.clone());
                    }
                }
                None => {
                    self.index.insert(token.base_form.clone(), self.candidates.len());
                    self.candidates.push(VocabularyCandidate {
                        reading: get_hiragana_reading(&token.reading),
                        word: token.base_form,
                        contexts: vec![entry.text.clone()],
                        frequency: 1,
                    });
                }
            }
        }

        counted
    }

    /// Add entries in order, logging progress periodically
    pub fn add_entries(&mut self, entries: &[SubtitleEntry]) {
        info!("Processing {} subtitle entries...", entries.len());

        for (i, entry) in entries.iter().enumerate() {
            if i % LOG_EVERY_ENTRIES == 0 {
                debug!("Processed {}/{} entries...", i, entries.len());
            }
            self.add_entry(entry);
        }

        info!(
            "Found {} unique words in {} entries ({} skipped)",
            self.candidates.len(),
            self.entries_seen,
            self.entries_failed
        );
    }

    pub fn unique_words(&self) -> usize {
        self.candidates.len()
    }

    pub fn entries_failed(&self) -> usize {
        self.entries_failed
    }

    pub fn get(&self, base_form: &str) -> Option<&VocabularyCandidate> {
        self.index.get(base_form).map(|&i| &self.candidates[i])
    }

    /// Candidates with `frequency >= min_frequency`, most frequent first, at most `max_words`
    pub fn into_ranked(self, min_frequency: u32, max_words: usize) -> Vec<VocabularyCandidate> {
        let mut ranked: Vec<VocabularyCandidate> = self
            .candidates
            .into_iter()
            .filter(|candidate| candidate.frequency >= min_frequency)
            .collect();

        info!("{} words meet minimum frequency of {}", ranked.len(), min_frequency);

        // Stable: ties keep first-seen order
        ranked.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        ranked.truncate(max_words);
        ranked
    }
}
