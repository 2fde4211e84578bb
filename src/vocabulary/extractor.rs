/*!
 * Extraction pipeline: aggregate candidates, then resolve their meanings.
 */

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::StreamExt;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::aggregator::{FrequencyAggregator, VocabularyCandidate};
use crate::app_config::ExtractionConfig;
use crate::dictionary::{DictionaryCache, LookupEvent, LookupQueue, RateLimit};
use crate::japanese::Tokenizer;
use crate::progress::{ProgressTracker, Stage};
use crate::subtitle_parser::SubtitleEntry;

/// A candidate whose meaning was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedVocabulary {
    pub word: String,
    pub reading: String,
    pub meaning: String,
    pub context_sentence: String,
    pub frequency: u32,
}

impl ResolvedVocabulary {
    fn from_candidate(candidate: VocabularyCandidate, meaning: String) -> Self {
        Self {
            context_sentence: candidate.contexts.into_iter().next().unwrap_or_default(),
            word: candidate.word,
            reading: candidate.reading,
            meaning,
            frequency: candidate.frequency,
        }
    }
}

/// Totals over a resolved vocabulary list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyStatistics {
    /// Sum of all frequencies
    pub total_words: u64,
    pub unique_words: usize,
    /// Rounded to two decimals
    pub average_frequency: f64,
}

impl VocabularyStatistics {
    pub fn from_vocabulary(vocabulary: &[ResolvedVocabulary]) -> Self {
        let total_words: u64 = vocabulary.iter().map(|v| u64::from(v.frequency)).sum();
        let unique_words = vocabulary.len();
        let average = if unique_words > 0 {
            total_words as f64 / unique_words as f64
        } else {
            0.0
        };

        Self {
            total_words,
            unique_words,
            average_frequency: (average * 100.0).round() / 100.0,
        }
    }
}

pub struct VocabularyExtractor {
    tokenizer: Arc<dyn Tokenizer>,
    dictionary: Arc<DictionaryCache>,
    tracker: ProgressTracker,
    rate_limit: RateLimit,
    config: ExtractionConfig,
}

impl VocabularyExtractor {
    pub fn new(
        tokenizer: Arc<dyn Tokenizer>,
        dictionary: Arc<DictionaryCache>,
        tracker: ProgressTracker,
        rate_limit: RateLimit,
        config: ExtractionConfig,
    ) -> Self {
        Self {
            tokenizer,
            dictionary,
            tracker,
            rate_limit,
            config,
        }
    }

    pub fn tokenizer_name(&self) -> &'static str {
        self.tokenizer.name()
    }

    /// Frequency-ranked candidates for the entries.
    ///
    /// Tokenization is CPU bound and runs on the blocking pool.
    pub async fn rank_candidates(&self, entries: Vec<SubtitleEntry>) -> Result<Vec<VocabularyCandidate>> {
        let tokenizer = self.tokenizer.clone();
        let max_contexts = self.config.max_contexts;
        let min_frequency = self.config.min_frequency;
        let max_words = self.config.max_words;

        tokio::task::spawn_blocking(move || {
            let mut aggregator = FrequencyAggregator::new(tokenizer, max_contexts);
            aggregator.add_entries(&entries);
            aggregator.into_ranked(min_frequency, max_words)
        })
        .await
        .context("Vocabulary aggregation task panicked")
    }

    /// Run the whole pipeline for a file, reporting progress under `file_id`.
    ///
    /// Candidates without a meaning are dropped.
    pub async fn extract(&self, file_id: &str, entries: Vec<SubtitleEntry>) -> Result<Vec<ResolvedVocabulary>> {
        let candidates = self.rank_candidates(entries).await?;
        let total = candidates.len();

        self.tracker.set_total(file_id, total);
        info!("Looking up meanings for {} words using {} tokenizer output", total, self.tokenizer.name());

        let words: Vec<String> = candidates.iter().map(|c| c.word.clone()).collect();
        let mut slots: Vec<Option<VocabularyCandidate>> = candidates.into_iter().map(Some).collect();

        let mut queue = LookupQueue::spawn(self.dictionary.clone(), words, self.rate_limit.policy());
        let mut events = Box::pin(queue.events());
        let mut vocabulary = Vec::with_capacity(total);

        while let Some(event) = events.next().await {
            match event {
                LookupEvent::Started { index, word } => {
                    self.tracker.update(
                        file_id,
                        Stage::LookingUp,
                        index + 1,
                        &format!("Looking up: \"{}\" ({}/{})", word, index + 1, total),
                    );
                }
                LookupEvent::Finished(outcome) => {
                    let Some(candidate) = slots.get_mut(outcome.index).and_then(Option::take) else {
                        continue;
                    };

                    match outcome.meaning {
                        Some(meaning) => vocabulary.push(ResolvedVocabulary::from_candidate(candidate, meaning)),
                        None => debug!("Skipping \"{}\" - no meaning found", outcome.word),
                    }
                }
            }
        }

        drop(events);
        queue.finish().await?;

        info!("Vocabulary extraction complete: {} of {} words with meanings", vocabulary.len(), total);
        Ok(vocabulary)
    }
}
