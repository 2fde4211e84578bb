use anyhow::{anyhow, Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use walkdir::WalkDir;

use crate::app_config::Config;
use crate::database::models::{CacheStats, DashboardStats, SubtitleFileRecord, VocabularyRecord};
use crate::database::{DatabaseConnection, Repository};
use crate::dictionary::{DictionaryCache, JishoClient, MeaningService, MeaningStore, RateLimit, SessionCache};
use crate::jobs::{ExtractionService, ProgressReport};
use crate::library::LibraryService;
use crate::japanese::{select_tokenizer, Tokenizer};
use crate::progress::{ProgressTracker, Stage};
use crate::quiz::{QuizQuestion, QuizRequestType, QuizService};
use crate::vocabulary::VocabularyExtractor;

// @module: Application controller wiring storage, extraction and quizzes

/// Interval between progress polls while waiting on a job
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Outcome of extracting one file
#[derive(Debug, Clone)]
pub struct ExtractionSummary {
    pub file_id: String,
    pub filename: String,
    pub word_count: usize,
    pub duplicate: bool,
    pub elapsed: Duration,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    repository: Repository,
    dictionary: Arc<DictionaryCache>,
    extraction: ExtractionService,
    quiz: QuizService,
    library: LibraryService,
}

impl Controller {
    // @method: Create a controller backed by the configured database and dictionary service
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;

        let db = match &config.database_path {
            Some(path) => DatabaseConnection::new(path)?,
            None => DatabaseConnection::new_default()?,
        };
        let repository = Repository::new(db);

        let tokenizer = select_tokenizer(&config.tokenizer)
            .context("Failed to initialize Japanese tokenizer")?;
        let remote: Arc<dyn MeaningService> = Arc::new(JishoClient::new(&config.dictionary));

        Ok(Self::with_components(config, repository, tokenizer, remote))
    }

    /// Create a controller from already built collaborators
    pub fn with_components(
        config: Config,
        repository: Repository,
        tokenizer: Arc<dyn Tokenizer>,
        remote: Arc<dyn MeaningService>,
    ) -> Self {
        let tracker = ProgressTracker::from_config(&config.progress);
        let store: Arc<dyn MeaningStore> = Arc::new(repository.clone());
        let dictionary = Arc::new(DictionaryCache::new(SessionCache::new(), Some(store), remote));

        info!("Using {} tokenizer", tokenizer.name());

        let extractor = Arc::new(VocabularyExtractor::new(
            tokenizer,
            dictionary.clone(),
            tracker.clone(),
            RateLimit::from_config(&config.dictionary),
            config.extraction.clone(),
        ));

        let extraction = ExtractionService::new(
            repository.clone(),
            extractor,
            tracker,
            config.extraction.clone(),
            config.upload.clone(),
        );
        let quiz = QuizService::new(repository.clone(), &config.quiz);
        let library = LibraryService::new(repository.clone());

        Self {
            config,
            repository,
            dictionary,
            extraction,
            quiz,
            library,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn extraction(&self) -> &ExtractionService {
        &self.extraction
    }

    pub fn quiz(&self) -> &QuizService {
        &self.quiz
    }

    pub fn library(&self) -> &LibraryService {
        &self.library
    }

    pub fn dictionary(&self) -> &DictionaryCache {
        &self.dictionary
    }

    /// Extract vocabulary from a file, or from every `.srt` file below a directory
    pub async fn run(&self, input: PathBuf, user_id: &str) -> Result<Vec<ExtractionSummary>> {
        if input.is_dir() {
            self.run_folder(&input, user_id).await
        } else {
            let multi_progress = MultiProgress::new();
            let summary = self.extract_file(&input, user_id, &multi_progress).await?;
            Ok(vec![summary])
        }
    }

    /// Upload one file and wait for its extraction job, showing a progress bar
    pub async fn extract_file(&self, path: &Path, user_id: &str, multi_progress: &MultiProgress) -> Result<ExtractionSummary> {
        let start_time = std::time::Instant::now();

        if !path.exists() {
            return Err(anyhow!("Input file does not exist: {:?}", path));
        }

        let filename = path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown.srt".to_string());
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read file: {:?}", path))?;

        let receipt = self.extraction.upload(&filename, &content, user_id).await?;
        info!("{}: {} subtitle entries, file id {}", filename, receipt.entry_count, receipt.file_id);

        let progress_bar = multi_progress.add(ProgressBar::new(self.config.extraction.estimated_words as u64));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} words ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));

        let report = self.wait_for_job(&receipt.file_id, &progress_bar).await?;
        progress_bar.finish_and_clear();

        if report.stage == Some(Stage::Error) {
            return Err(anyhow!(
                "Extraction failed for {}: {}",
                filename,
                report.message.unwrap_or_default()
            ));
        }

        Ok(ExtractionSummary {
            file_id: receipt.file_id,
            filename,
            word_count: report.vocabulary_count,
            duplicate: receipt.duplicate,
            elapsed: start_time.elapsed(),
        })
    }

    /// Poll until the job reaches a terminal stage
    pub async fn wait_for_job(&self, file_id: &str, progress_bar: &ProgressBar) -> Result<ProgressReport> {
        loop {
            let report = self.extraction.poll(file_id).await?;

            if report.total_words > 0 {
                progress_bar.set_length(report.total_words as u64);
            }
            progress_bar.set_position(report.current_word as u64);
            if let Some(message) = &report.message {
                progress_bar.set_message(message.clone());
            }

            // No tracker entry means the job finished and its entry expired
            match report.stage {
                Some(stage) if !stage.is_terminal() => {}
                _ => return Ok(report),
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn run_folder(&self, input_dir: &Path, user_id: &str) -> Result<Vec<ExtractionSummary>> {
        let start_time = std::time::Instant::now();
        let files = find_subtitle_files(input_dir)?;

        if files.is_empty() {
            return Err(anyhow!("No .srt files found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(files.len() as u64));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(style.progress_chars("█▓▒░"));

        let mut summaries = Vec::new();
        let mut error_count = 0;

        for file in &files {
            let file_name = file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            match self.extract_file(file, user_id, &multi_progress).await {
                Ok(summary) => summaries.push(summary),
                Err(e) => {
                    error!("Error processing file {}: {}", file_name, e);
                    error_count += 1;
                }
            }
            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");
        info!(
            "Folder processing completed in {}: {} processed, {} errors",
            format_duration(start_time.elapsed()),
            summaries.len(),
            error_count
        );

        Ok(summaries)
    }

    pub async fn vocabulary(&self, file_id: &str) -> Result<Vec<VocabularyRecord>> {
        if self.repository.get_file(file_id).await?.is_none() {
            return Err(anyhow!("File not found: {}", file_id));
        }
        self.repository.get_vocabulary_for_file(file_id).await
    }

    pub async fn files(&self, user_id: &str) -> Result<Vec<SubtitleFileRecord>> {
        self.repository.list_files(user_id).await
    }

    pub async fn delete_file(&self, file_id: &str) -> Result<()> {
        self.extraction.delete(file_id).await?;
        Ok(())
    }

    pub async fn update_vocabulary(&self, vocabulary_id: &str, word: &str, reading: &str, meaning: &str) -> Result<VocabularyRecord> {
        Ok(self.library.update_vocabulary(vocabulary_id, word, reading, meaning).await?)
    }

    pub async fn delete_vocabulary(&self, vocabulary_id: &str) -> Result<()> {
        Ok(self.library.delete_vocabulary(vocabulary_id).await?)
    }

    pub async fn rename_file(&self, file_id: &str, filename: &str) -> Result<String> {
        Ok(self.library.rename_file(file_id, filename).await?)
    }

    pub async fn generate_quiz(&self, file_id: &str, request: QuizRequestType, count: Option<usize>) -> Result<Vec<QuizQuestion>> {
        Ok(self.quiz.generate(file_id, request, count).await?)
    }

    pub async fn cache_stats(&self) -> Result<CacheStats> {
        let stats = self.repository.cache_stats().await?;
        let session = self.dictionary.session_stats();
        if session.hits + session.misses > 0 {
            info!("Session cache: {}", session);
        }
        Ok(stats)
    }

    pub async fn dashboard(&self, user_id: &str) -> Result<DashboardStats> {
        let stats = self.repository.dashboard_stats(user_id).await?;
        if stats.total_files == 0 {
            warn!("No files uploaded yet for user {}", user_id);
        }
        Ok(stats)
    }
}

/// All `.srt` files below `dir`, sorted by path
pub fn find_subtitle_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut result = Vec::new();

    for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();

        if path.is_file() {
            if let Some(ext) = path.extension() {
                if ext.to_string_lossy().eq_ignore_ascii_case("srt") {
                    result.push(path.to_path_buf());
                }
            }
        }
    }

    result.sort();
    Ok(result)
}

// Format duration in a human-readable format
fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}.{:03}s", seconds, duration.subsec_millis())
    }
}
