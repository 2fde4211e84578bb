/*!
 * Vocabulary extraction.
 *
 * - `aggregator`: base-form frequency counting with context sentences
 * - `extractor`: ranking plus rate-limited meaning resolution
 */

pub mod aggregator;
pub mod extractor;

pub use aggregator::{FrequencyAggregator, VocabularyCandidate};
pub use extractor::{ResolvedVocabulary, VocabularyExtractor, VocabularyStatistics};
