/*!
 * Background extraction jobs.
 *
 * Uploads are validated synchronously so callers see bad input right away.
 * The extraction itself runs on a spawned task that reports through the
 * shared progress tracker and writes the resolved vocabulary at the end.
 */

use std::sync::Arc;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::task::JoinHandle;

use crate::app_config::{ExtractionConfig, UploadConfig};
use crate::database::models::{SubtitleFileRecord, VocabularyRecord};
use crate::database::Repository;
use crate::errors::{JobError, SubtitleError};
use crate::progress::{ProgressTracker, Stage};
use crate::subtitle_parser::{self, SubtitleEntry};
use crate::vocabulary::VocabularyExtractor;

/// Result of an accepted upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub file_id: String,
    pub entry_count: usize,
    /// True when identical content was already uploaded by the same user
    pub duplicate: bool,
    /// False when an existing extraction result was reused
    pub job_started: bool,
}

/// What a poller sees for a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub is_processing: bool,
    pub is_complete: bool,
    pub percentage: u8,
    pub stage: Option<Stage>,
    pub message: Option<String>,
    pub current_word: usize,
    pub total_words: usize,
    pub vocabulary_count: usize,
}

fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn storage_error(e: anyhow::Error) -> JobError {
    JobError::Storage(e.to_string())
}

#[derive(Clone)]
pub struct ExtractionService {
    repository: Repository,
    extractor: Arc<VocabularyExtractor>,
    tracker: ProgressTracker,
    extraction: ExtractionConfig,
    upload: UploadConfig,
}

impl ExtractionService {
    pub fn new(
        repository: Repository,
        extractor: Arc<VocabularyExtractor>,
        tracker: ProgressTracker,
        extraction: ExtractionConfig,
        upload: UploadConfig,
    ) -> Self {
        Self {
            repository,
            extractor,
            tracker,
            extraction,
            upload,
        }
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    /// Synchronous checks on a raw upload
    pub fn check_upload(&self, filename: &str, content: &str) -> Result<(), SubtitleError> {
        if !filename.to_lowercase().ends_with(".srt") {
            return Err(SubtitleError::UnsupportedFormat(filename.to_string()));
        }

        if content.len() > self.upload.max_file_size {
            return Err(SubtitleError::FileTooLarge {
                size: content.len(),
                max: self.upload.max_file_size,
            });
        }

        subtitle_parser::validate(content)
    }

    /// Validate, store and start extracting an uploaded file.
    ///
    /// Re-uploading the same content returns the earlier file id; its job is
    /// only restarted when the earlier one left no vocabulary behind.
    pub async fn upload(&self, filename: &str, content: &str, user_id: &str) -> Result<UploadReceipt, JobError> {
        self.check_upload(filename, content)?;

        let entries = subtitle_parser::parse(content);
        let hash = content_hash(content);

        if let Some(existing) = self
            .repository
            .find_file_by_hash(user_id, &hash)
            .await
            .map_err(storage_error)?
        {
            let vocabulary_count = self
                .repository
                .vocabulary_count(&existing.id)
                .await
                .map_err(storage_error)?;

            if vocabulary_count > 0 || self.tracker.is_processing(&existing.id) {
                info!("{} already uploaded as {}", filename, existing.id);
                return Ok(UploadReceipt {
                    file_id: existing.id,
                    entry_count: entries.len(),
                    duplicate: true,
                    job_started: false,
                });
            }

            warn!("Earlier upload {} has no vocabulary, extracting again", existing.id);
            let entry_count = entries.len();
            self.submit(&existing.id, entries)?;
            return Ok(UploadReceipt {
                file_id: existing.id,
                entry_count,
                duplicate: true,
                job_started: true,
            });
        }

        let record = SubtitleFileRecord::new(user_id, filename, content.len(), &hash);
        self.repository.create_file(&record).await.map_err(storage_error)?;
        info!("Stored {} as {} ({} entries)", filename, record.id, entries.len());

        let entry_count = entries.len();
        self.submit(&record.id, entries)?;

        Ok(UploadReceipt {
            file_id: record.id,
            entry_count,
            duplicate: false,
            job_started: true,
        })
    }

    /// Start a background extraction and return without waiting for it.
    ///
    /// Refused while another extraction for the same file is running.
    pub fn submit(&self, file_id: &str, entries: Vec<SubtitleEntry>) -> Result<JoinHandle<()>, JobError> {
        if !self.tracker.try_start(file_id, self.extraction.estimated_words) {
            return Err(JobError::AlreadyRunning(file_id.to_string()));
        }

        let service = self.clone();
        let file_id = file_id.to_string();

        Ok(tokio::spawn(async move {
            service.run_job(&file_id, entries).await;
        }))
    }

    async fn run_job(&self, file_id: &str, entries: Vec<SubtitleEntry>) {
        self.tracker
            .update(file_id, Stage::Processing, 0, "Analyzing Japanese text...");

        match self.extract_and_save(file_id, entries).await {
            Ok(saved) => self.tracker.complete(file_id, saved),
            Err(e) => {
                error!("Extraction failed for {}: {:#}", file_id, e);
                self.tracker.error(file_id, &e.to_string());
            }
        }
    }

    async fn extract_and_save(&self, file_id: &str, entries: Vec<SubtitleEntry>) -> anyhow::Result<usize> {
        let vocabulary = self.extractor.extract(file_id, entries).await?;

        let total = self
            .tracker
            .get(file_id)
            .map(|state| state.total_words)
            .unwrap_or(vocabulary.len());
        self.tracker.update(
            file_id,
            Stage::Saving,
            total,
            &format!("Saving {} words...", vocabulary.len()),
        );

        let records: Vec<VocabularyRecord> = vocabulary
            .iter()
            .map(|v| VocabularyRecord::from_resolved(file_id, v))
            .collect();

        self.repository.insert_vocabulary(&records).await
    }

    /// Progress as seen by a poller.
    ///
    /// Without a live tracker entry the report is derived from stored
    /// vocabulary: no vocabulary means the job is assumed to be pending.
    pub async fn poll(&self, file_id: &str) -> Result<ProgressReport, JobError> {
        let vocabulary_count = self
            .repository
            .vocabulary_count(file_id)
            .await
            .map_err(storage_error)?;

        match self.tracker.get(file_id) {
            Some(state) => {
                let is_processing = !state.stage.is_terminal();
                Ok(ProgressReport {
                    is_processing,
                    is_complete: state.stage == Stage::Complete || (!is_processing && vocabulary_count > 0),
                    percentage: self.tracker.get_percentage(file_id),
                    stage: Some(state.stage),
                    message: Some(state.message),
                    current_word: state.current_word,
                    total_words: state.total_words,
                    vocabulary_count,
                })
            }
            None => {
                if vocabulary_count == 0 {
                    self.repository
                        .get_file(file_id)
                        .await
                        .map_err(storage_error)?
                        .ok_or_else(|| JobError::NotFound(file_id.to_string()))?;
                }

                Ok(ProgressReport {
                    is_processing: vocabulary_count == 0,
                    is_complete: vocabulary_count > 0,
                    percentage: if vocabulary_count > 0 { 100 } else { 0 },
                    stage: None,
                    message: None,
                    current_word: 0,
                    total_words: 0,
                    vocabulary_count,
                })
            }
        }
    }

    /// Delete a file with its vocabulary and quiz history
    pub async fn delete(&self, file_id: &str) -> Result<(), JobError> {
        if self.tracker.is_processing(file_id) {
            return Err(JobError::AlreadyRunning(file_id.to_string()));
        }

        if self.repository.delete_file(file_id).await.map_err(storage_error)? {
            info!("Deleted file {}", file_id);
            Ok(())
        } else {
            Err(JobError::NotFound(file_id.to_string()))
        }
    }
}
