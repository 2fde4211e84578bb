/*!
 * Database entity models and DTOs.
 *
 * These structures map directly to database tables and provide
 * type-safe access to persisted data.
 */

use serde::{Deserialize, Serialize};

use crate::vocabulary::ResolvedVocabulary;

/// Uploaded subtitle file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleFileRecord {
    pub id: String,
    pub user_id: String,
    pub filename: String,
    pub file_size: i64,
    /// SHA-256 of the raw content, hex encoded
    pub content_hash: String,
    pub upload_date: String,
}

impl SubtitleFileRecord {
    pub fn new(user_id: &str, filename: &str, file_size: usize, content_hash: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            filename: filename.to_string(),
            file_size: file_size as i64,
            content_hash: content_hash.to_string(),
            upload_date: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Vocabulary row belonging to a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyRecord {
    pub id: String,
    pub file_id: String,
    pub word: String,
    pub reading: String,
    pub meaning: String,
    pub context_sentence: String,
    pub frequency: i64,
}

impl VocabularyRecord {
    pub fn new(file_id: &str, word: &str, reading: &str, meaning: &str, context_sentence: &str, frequency: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_id: file_id.to_string(),
            word: word.to_string(),
            reading: reading.to_string(),
            meaning: meaning.to_string(),
            context_sentence: context_sentence.to_string(),
            frequency,
        }
    }

    pub fn from_resolved(file_id: &str, vocabulary: &ResolvedVocabulary) -> Self {
        Self::new(
            file_id,
            &vocabulary.word,
            &vocabulary.reading,
            &vocabulary.meaning,
            &vocabulary.context_sentence,
            i64::from(vocabulary.frequency),
        )
    }
}

/// Persisted dictionary entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntryRecord {
    pub word: String,
    pub meaning: String,
    pub created_at: String,
}

/// Summary of the persistent dictionary cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: i64,
    /// Ten most recently added entries, newest first
    pub recent: Vec<CacheEntryRecord>,
    /// Five oldest entries, oldest first
    pub oldest: Vec<CacheEntryRecord>,
    /// Creation time of the oldest entry
    pub cache_age: Option<String>,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cached words: {}, oldest entry: {}",
            self.total_entries,
            self.cache_age.as_deref().unwrap_or("n/a")
        )
    }
}

/// Completed quiz
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAttemptRecord {
    pub id: String,
    pub user_id: String,
    pub file_id: String,
    pub score: i64,
    pub total_words: i64,
    pub completed_at: String,
}

impl QuizAttemptRecord {
    pub fn new(user_id: &str, file_id: &str, score: usize, total_words: usize) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            file_id: file_id.to_string(),
            score: score as i64,
            total_words: total_words as i64,
            completed_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Review counters of one vocabulary item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItemRecord {
    pub id: String,
    pub vocabulary_id: String,
    pub attempts: i64,
    pub correct: i64,
    pub last_reviewed: String,
}

/// Per-question outcome of a submitted quiz
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub vocabulary_id: String,
    pub is_correct: bool,
}

/// Per-user totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_files: i64,
    pub total_words: i64,
    pub quizzes_taken: i64,
    /// Percentage over all answered questions, rounded
    pub average_accuracy: i64,
    /// Five most recent attempts
    pub recent_quizzes: Vec<QuizAttemptRecord>,
}
