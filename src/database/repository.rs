/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for all database operations,
 * abstracting away the SQL details and providing type-safe access.
 */

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::connection::DatabaseConnection;
use super::models::{
    AnswerRecord, CacheEntryRecord, CacheStats, DashboardStats, QuizAttemptRecord,
    QuizItemRecord, SubtitleFileRecord, VocabularyRecord,
};
use crate::dictionary::MeaningStore;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    // =========================================================================
    // Subtitle File Operations
    // =========================================================================

    fn file_from_row(row: &Row<'_>) -> rusqlite::Result<SubtitleFileRecord> {
        Ok(SubtitleFileRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            filename: row.get(2)?,
            file_size: row.get(3)?,
            content_hash: row.get(4)?,
            upload_date: row.get(5)?,
        })
    }

    /// Store a new subtitle file record
    pub async fn create_file(&self, file: &SubtitleFileRecord) -> Result<()> {
        let file = file.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO subtitle_files (id, user_id, filename, file_size, content_hash, upload_date)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                    params![
                        file.id,
                        file.user_id,
                        file.filename,
                        file.file_size,
                        file.content_hash,
                        file.upload_date,
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Get a file by ID
    pub async fn get_file(&self, file_id: &str) -> Result<Option<SubtitleFileRecord>> {
        let file_id = file_id.to_string();

        self.db
            .execute_async(move |conn| {
                let result = conn
                    .query_row(
                        r#"
                        SELECT id, user_id, filename, file_size, content_hash, upload_date
                        FROM subtitle_files WHERE id = ?1
                        "#,
                        [file_id],
                        Self::file_from_row,
                    )
                    .optional()?;
                Ok(result)
            })
            .await
    }

    /// Most recent upload of the same content by the same user
    pub async fn find_file_by_hash(&self, user_id: &str, content_hash: &str) -> Result<Option<SubtitleFileRecord>> {
        let user_id = user_id.to_string();
        let content_hash = content_hash.to_string();

        self.db
            .execute_async(move |conn| {
                let result = conn
                    .query_row(
                        r#"
                        SELECT id, user_id, filename, file_size, content_hash, upload_date
                        FROM subtitle_files
                        WHERE user_id = ?1 AND content_hash = ?2
                        ORDER BY upload_date DESC
                        LIMIT 1
                        "#,
                        params![user_id, content_hash],
                        Self::file_from_row,
                    )
                    .optional()?;
                Ok(result)
            })
            .await
    }

    /// List a user's files, newest first
    pub async fn list_files(&self, user_id: &str) -> Result<Vec<SubtitleFileRecord>> {
        let user_id = user_id.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, user_id, filename, file_size, content_hash, upload_date
                    FROM subtitle_files
                    WHERE user_id = ?1
                    ORDER BY upload_date DESC
                    "#,
                )?;

                let files = stmt
                    .query_map([user_id], Self::file_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(files)
            })
            .await
    }

    /// Delete a file with its vocabulary and quiz history
    pub async fn delete_file(&self, file_id: &str) -> Result<bool> {
        let file_id = file_id.to_string();

        self.db
            .execute_async(move |conn| {
                let rows = conn.execute("DELETE FROM subtitle_files WHERE id = ?1", [file_id])?;
                Ok(rows > 0)
            })
            .await
    }

    /// Change a file's display name; false when the file does not exist
    pub async fn rename_file(&self, file_id: &str, filename: &str) -> Result<bool> {
        let file_id = file_id.to_string();
        let filename = filename.to_string();

        self.db
            .execute_async(move |conn| {
                let rows = conn.execute(
                    "UPDATE subtitle_files SET filename = ?1 WHERE id = ?2",
                    params![filename, file_id],
                )?;
                Ok(rows > 0)
            })
            .await
    }

    // =========================================================================
    // Vocabulary Operations
    // =========================================================================

    fn vocabulary_from_row(row: &Row<'_>) -> rusqlite::Result<VocabularyRecord> {
        Ok(VocabularyRecord {
            id: row.get(0)?,
            file_id: row.get(1)?,
            word: row.get(2)?,
            reading: row.get(3)?,
            meaning: row.get(4)?,
            context_sentence: row.get(5)?,
            frequency: row.get(6)?,
        })
    }

    /// Insert a batch of vocabulary in a single transaction
    pub async fn insert_vocabulary(&self, records: &[VocabularyRecord]) -> Result<usize> {
        let records = records.to_vec();

        self.db
            .transaction_async(move |tx| {
                let mut stmt = tx.prepare(
                    r#"
                    INSERT INTO vocabulary (id, file_id, word, reading, meaning, context_sentence, frequency)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    "#,
                )?;

                for record in &records {
                    stmt.execute(params![
                        record.id,
                        record.file_id,
                        record.word,
                        record.reading,
                        record.meaning,
                        record.context_sentence,
                        record.frequency,
                    ])?;
                }

                debug!("Inserted {} vocabulary rows", records.len());
                Ok(records.len())
            })
            .await
    }

    /// Vocabulary of a file, most frequent first
    pub async fn get_vocabulary_for_file(&self, file_id: &str) -> Result<Vec<VocabularyRecord>> {
        let file_id = file_id.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, file_id, word, reading, meaning, context_sentence, frequency
                    FROM vocabulary
                    WHERE file_id = ?1
                    ORDER BY frequency DESC, rowid ASC
                    "#,
                )?;

                let vocabulary = stmt
                    .query_map([file_id], Self::vocabulary_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(vocabulary)
            })
            .await
    }

    pub async fn get_vocabulary(&self, vocabulary_id: &str) -> Result<Option<VocabularyRecord>> {
        let vocabulary_id = vocabulary_id.to_string();

        self.db
            .execute_async(move |conn| {
                let record = conn
                    .query_row(
                        r#"
                        SELECT id, file_id, word, reading, meaning, context_sentence, frequency
                        FROM vocabulary WHERE id = ?1
                        "#,
                        [vocabulary_id],
                        Self::vocabulary_from_row,
                    )
                    .optional()?;
                Ok(record)
            })
            .await
    }

    /// Replace word, reading and meaning of one item.
    ///
    /// Returns the updated record, or `None` for an unknown id. Frequency and
    /// context are left as extracted.
    pub async fn update_vocabulary(
        &self,
        vocabulary_id: &str,
        word: &str,
        reading: &str,
        meaning: &str,
    ) -> Result<Option<VocabularyRecord>> {
        let id = vocabulary_id.to_string();
        let (word, reading, meaning) = (word.to_string(), reading.to_string(), meaning.to_string());

        let updated = self
            .db
            .execute_async(move |conn| {
                let rows = conn.execute(
                    "UPDATE vocabulary SET word = ?1, reading = ?2, meaning = ?3 WHERE id = ?4",
                    params![word, reading, meaning, id],
                )?;
                Ok(rows > 0)
            })
            .await?;

        if !updated {
            return Ok(None);
        }
        self.get_vocabulary(vocabulary_id).await
    }

    /// Remove one item together with its review counters
    pub async fn delete_vocabulary(&self, vocabulary_id: &str) -> Result<bool> {
        let vocabulary_id = vocabulary_id.to_string();

        self.db
            .execute_async(move |conn| {
                let rows = conn.execute("DELETE FROM vocabulary WHERE id = ?1", [vocabulary_id])?;
                Ok(rows > 0)
            })
            .await
    }

    pub async fn vocabulary_count(&self, file_id: &str) -> Result<usize> {
        let file_id = file_id.to_string();

        self.db
            .execute_async(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM vocabulary WHERE file_id = ?1",
                    [file_id],
                    |row| row.get(0),
                )?;
                Ok(count as usize)
            })
            .await
    }

    // =========================================================================
    // Dictionary Cache Operations
    // =========================================================================

    fn cache_entry_from_row(row: &Row<'_>) -> rusqlite::Result<CacheEntryRecord> {
        Ok(CacheEntryRecord {
            word: row.get(0)?,
            meaning: row.get(1)?,
            created_at: row.get(2)?,
        })
    }

    /// Look up a cached meaning
    pub async fn get_cached_meaning(&self, word: &str) -> Result<Option<String>> {
        let word = word.to_string();

        self.db
            .execute_async(move |conn| {
                let meaning = conn
                    .query_row(
                        "SELECT meaning FROM dictionary_cache WHERE word = ?1",
                        [word],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(meaning)
            })
            .await
    }

    /// Cache a meaning. Returns false when the word was already cached.
    pub async fn cache_meaning(&self, word: &str, meaning: &str) -> Result<bool> {
        let word = word.to_string();
        let meaning = meaning.to_string();
        let now = chrono::Utc::now().to_rfc3339();

        self.db
            .execute_async(move |conn| {
                let rows = conn.execute(
                    r#"
                    INSERT INTO dictionary_cache (word, meaning, created_at)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(word) DO NOTHING
                    "#,
                    params![word, meaning, now],
                )?;

                if rows == 0 {
                    debug!("Meaning for '{}' already cached", word);
                }
                Ok(rows > 0)
            })
            .await
    }

    /// Size and age of the dictionary cache
    pub async fn cache_stats(&self) -> Result<CacheStats> {
        self.db
            .execute_async(|conn| {
                let total_entries: i64 =
                    conn.query_row("SELECT COUNT(*) FROM dictionary_cache", [], |row| row.get(0))?;

                let recent = Self::cache_entries(
                    conn,
                    "SELECT word, meaning, created_at FROM dictionary_cache ORDER BY created_at DESC, id DESC LIMIT 10",
                )?;
                let oldest = Self::cache_entries(
                    conn,
                    "SELECT word, meaning, created_at FROM dictionary_cache ORDER BY created_at ASC, id ASC LIMIT 5",
                )?;

                let cache_age = oldest.first().map(|entry| entry.created_at.clone());

                Ok(CacheStats {
                    total_entries,
                    recent,
                    oldest,
                    cache_age,
                })
            })
            .await
    }

    fn cache_entries(conn: &Connection, sql: &str) -> Result<Vec<CacheEntryRecord>> {
        let mut stmt = conn.prepare(sql)?;
        let entries = stmt
            .query_map([], Self::cache_entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    // =========================================================================
    // Quiz Operations
    // =========================================================================

    /// Record a quiz attempt and bump the review counters of every answered item
    pub async fn record_quiz_attempt(&self, attempt: &QuizAttemptRecord, answers: &[AnswerRecord]) -> Result<()> {
        let attempt = attempt.clone();
        let answers = answers.to_vec();

        self.db
            .transaction_async(move |tx| {
                tx.execute(
                    r#"
                    INSERT INTO quiz_attempts (id, user_id, file_id, score, total_words, completed_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                    params![
                        attempt.id,
                        attempt.user_id,
                        attempt.file_id,
                        attempt.score,
                        attempt.total_words,
                        attempt.completed_at,
                    ],
                )?;

                let mut stmt = tx.prepare(
                    r#"
                    INSERT INTO quiz_items (id, vocabulary_id, attempts, correct, last_reviewed)
                    VALUES (?1, ?2, 1, ?3, ?4)
                    ON CONFLICT(vocabulary_id) DO UPDATE SET
                        attempts = attempts + 1,
                        correct = correct + excluded.correct,
                        last_reviewed = excluded.last_reviewed
                    "#,
                )?;

                for answer in &answers {
                    stmt.execute(params![
                        uuid::Uuid::new_v4().to_string(),
                        answer.vocabulary_id,
                        i64::from(answer.is_correct),
                        attempt.completed_at,
                    ])?;
                }

                Ok(())
            })
            .await
    }

    pub async fn get_quiz_item(&self, vocabulary_id: &str) -> Result<Option<QuizItemRecord>> {
        let vocabulary_id = vocabulary_id.to_string();

        self.db
            .execute_async(move |conn| {
                let item = conn
                    .query_row(
                        r#"
                        SELECT id, vocabulary_id, attempts, correct, last_reviewed
                        FROM quiz_items WHERE vocabulary_id = ?1
                        "#,
                        [vocabulary_id],
                        |row| {
                            Ok(QuizItemRecord {
                                id: row.get(0)?,
                                vocabulary_id: row.get(1)?,
                                attempts: row.get(2)?,
                                correct: row.get(3)?,
                                last_reviewed: row.get(4)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(item)
            })
            .await
    }

    /// File, vocabulary and quiz totals for a user
    pub async fn dashboard_stats(&self, user_id: &str) -> Result<DashboardStats> {
        let user_id = user_id.to_string();

        self.db
            .execute_async(move |conn| {
                let total_files: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM subtitle_files WHERE user_id = ?1",
                    [&user_id],
                    |row| row.get(0),
                )?;

                let total_words: i64 = conn.query_row(
                    r#"
                    SELECT COUNT(*) FROM vocabulary v
                    JOIN subtitle_files f ON f.id = v.file_id
                    WHERE f.user_id = ?1
                    "#,
                    [&user_id],
                    |row| row.get(0),
                )?;

                let (quizzes_taken, total_score, total_questions): (i64, i64, i64) = conn.query_row(
                    r#"
                    SELECT COUNT(*), COALESCE(SUM(score), 0), COALESCE(SUM(total_words), 0)
                    FROM quiz_attempts WHERE user_id = ?1
                    "#,
                    [&user_id],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )?;

                let average_accuracy = if total_questions > 0 {
                    ((total_score as f64 / total_questions as f64) * 100.0).round() as i64
                } else {
                    0
                };

                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, user_id, file_id, score, total_words, completed_at
                    FROM quiz_attempts
                    WHERE user_id = ?1
                    ORDER BY completed_at DESC
                    LIMIT 5
                    "#,
                )?;
                let recent_quizzes = stmt
                    .query_map([&user_id], |row| {
                        Ok(QuizAttemptRecord {
                            id: row.get(0)?,
                            user_id: row.get(1)?,
                            file_id: row.get(2)?,
                            score: row.get(3)?,
                            total_words: row.get(4)?,
                            completed_at: row.get(5)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(DashboardStats {
                    total_files,
                    total_words,
                    quizzes_taken,
                    average_accuracy,
                    recent_quizzes,
                })
            })
            .await
    }
}

#[async_trait]
impl MeaningStore for Repository {
    async fn get_meaning(&self, word: &str) -> Result<Option<String>> {
        self.get_cached_meaning(word).await
    }

    async fn put_meaning(&self, word: &str, meaning: &str) -> Result<()> {
        self.cache_meaning(word, meaning).await.map(|_| ())
    }
}
