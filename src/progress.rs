/*!
 * Progress tracking for background extraction jobs.
 *
 * One tracker instance is shared by the job that writes progress and the
 * pollers that read it. Finished and failed entries stay visible for a
 * configurable time and then disappear; expiry is checked on every access,
 * so no timer task is involved.
 */

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use log::{debug, info};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::app_config::ProgressConfig;

/// Extraction stage of a tracked job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Starting,
    Processing,
    LookingUp,
    Saving,
    Complete,
    Error,
}

impl Stage {
    /// Complete and Error are terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Complete | Stage::Error)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Starting => write!(f, "starting"),
            Stage::Processing => write!(f, "processing"),
            Stage::LookingUp => write!(f, "looking-up"),
            Stage::Saving => write!(f, "saving"),
            Stage::Complete => write!(f, "complete"),
            Stage::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Stage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "starting" => Ok(Stage::Starting),
            "processing" => Ok(Stage::Processing),
            "looking-up" => Ok(Stage::LookingUp),
            "saving" => Ok(Stage::Saving),
            "complete" => Ok(Stage::Complete),
            "error" => Ok(Stage::Error),
            _ => Err(anyhow::anyhow!("Invalid stage: {}", s)),
        }
    }
}

/// Snapshot of a job's progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressState {
    pub stage: Stage,
    pub current_word: usize,
    pub total_words: usize,
    pub message: String,
    pub start_time: DateTime<Utc>,
}

struct TrackedJob {
    state: ProgressState,
    // Set once the job reaches a terminal stage
    expires_at: Option<Instant>,
}

impl TrackedJob {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// In-memory progress tracker keyed by file id
#[derive(Clone)]
pub struct ProgressTracker {
    jobs: Arc<RwLock<HashMap<String, TrackedJob>>>,
    complete_ttl: Duration,
    error_ttl: Duration,
}

impl ProgressTracker {
    /// Create a tracker with explicit expiry durations
    pub fn new(complete_ttl: Duration, error_ttl: Duration) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            complete_ttl,
            error_ttl,
        }
    }

    pub fn from_config(config: &ProgressConfig) -> Self {
        Self::new(
            Duration::from_secs(config.complete_ttl_secs),
            Duration::from_secs(config.error_ttl_secs),
        )
    }

    fn purge_expired(jobs: &mut HashMap<String, TrackedJob>) {
        let now = Instant::now();
        jobs.retain(|file_id, job| {
            let expired = job.is_expired(now);
            if expired {
                debug!("Progress entry for {} expired", file_id);
            }
            !expired
        });
    }

    fn fresh_state(total_words: usize) -> ProgressState {
        ProgressState {
            stage: Stage::Starting,
            current_word: 0,
            total_words,
            message: "Starting vocabulary extraction...".to_string(),
            start_time: Utc::now(),
        }
    }

    /// Start tracking, replacing any existing entry for the file
    pub fn start(&self, file_id: &str, total_words: usize) {
        let mut jobs = self.jobs.write();
        Self::purge_expired(&mut jobs);
        jobs.insert(
            file_id.to_string(),
            TrackedJob {
                state: Self::fresh_state(total_words),
                expires_at: None,
            },
        );
        info!("Progress tracking started for {}: {} words", file_id, total_words);
    }

    /// Start tracking unless a job for the file is still running.
    ///
    /// Check and insert happen under one lock. Returns false when refused.
    pub fn try_start(&self, file_id: &str, total_words: usize) -> bool {
        let mut jobs = self.jobs.write();
        Self::purge_expired(&mut jobs);

        if jobs.get(file_id).is_some_and(|job| !job.state.stage.is_terminal()) {
            return false;
        }

        jobs.insert(
            file_id.to_string(),
            TrackedJob {
                state: Self::fresh_state(total_words),
                expires_at: None,
            },
        );
        info!("Progress tracking started for {}: {} words", file_id, total_words);
        true
    }

    /// Update an existing entry. Unknown file ids are ignored.
    pub fn update(&self, file_id: &str, stage: Stage, current_word: usize, message: &str) {
        let mut jobs = self.jobs.write();
        Self::purge_expired(&mut jobs);

        if let Some(job) = jobs.get_mut(file_id) {
            job.state.stage = stage;
            job.state.current_word = current_word.min(job.state.total_words);
            job.state.message = message.to_string();

            if current_word > 0 && current_word % 10 == 0 {
                debug!(
                    "Progress for {}: {}/{}",
                    file_id, job.state.current_word, job.state.total_words
                );
            }
        }
    }

    /// Replace the word total once the real candidate count is known
    pub fn set_total(&self, file_id: &str, total_words: usize) {
        let mut jobs = self.jobs.write();
        Self::purge_expired(&mut jobs);

        if let Some(job) = jobs.get_mut(file_id) {
            job.state.total_words = total_words;
            job.state.current_word = job.state.current_word.min(total_words);
        }
    }

    /// Mark the job complete; the entry expires after the completion TTL
    pub fn complete(&self, file_id: &str, word_count: usize) {
        let mut jobs = self.jobs.write();
        Self::purge_expired(&mut jobs);

        if let Some(job) = jobs.get_mut(file_id) {
            job.state.stage = Stage::Complete;
            job.state.current_word = job.state.total_words;
            job.state.message = format!("Complete! Added {} words to vocabulary.", word_count);
            job.expires_at = Some(Instant::now() + self.complete_ttl);
            info!("Extraction complete for {}: {} words", file_id, word_count);
        }
    }

    /// Mark the job failed; the entry expires after the error TTL
    pub fn error(&self, file_id: &str, message: &str) {
        let mut jobs = self.jobs.write();
        Self::purge_expired(&mut jobs);

        if let Some(job) = jobs.get_mut(file_id) {
            job.state.stage = Stage::Error;
            job.state.message = format!("Error: {}", message);
            job.expires_at = Some(Instant::now() + self.error_ttl);
        }
    }

    /// Consistent snapshot of the entry, if it exists and has not expired
    pub fn get(&self, file_id: &str) -> Option<ProgressState> {
        let jobs = self.jobs.read();
        let now = Instant::now();
        jobs.get(file_id)
            .filter(|job| !job.is_expired(now))
            .map(|job| job.state.clone())
    }

    /// Percentage done; 99 at most until the job is complete
    pub fn get_percentage(&self, file_id: &str) -> u8 {
        match self.get(file_id) {
            None => 0,
            Some(state) if state.stage == Stage::Complete => 100,
            Some(state) if state.total_words == 0 => 0,
            Some(state) => {
                let ratio = state.current_word as f64 / state.total_words as f64;
                ((ratio * 100.0).round() as u8).min(99)
            }
        }
    }

    /// True while an entry exists and has not reached a terminal stage
    pub fn is_processing(&self, file_id: &str) -> bool {
        self.get(file_id)
            .is_some_and(|state| !state.stage.is_terminal())
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let mut jobs = self.jobs.write();
        Self::purge_expired(&mut jobs);
        jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::from_config(&ProgressConfig::default())
    }
}
