/*!
 * Error types for the subvocab application.
 *
 * This module contains custom error types for the different stages of the
 * extraction pipeline and the quiz engine, using the thiserror crate for
 * ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised while validating an uploaded subtitle file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubtitleError {
    /// The content is empty or whitespace only
    #[error("File is empty")]
    EmptyInput,

    /// No block could be parsed as a subtitle entry
    #[error("No valid subtitle entries found")]
    NoEntries,

    /// Entries were parsed but none of them contains Japanese script
    #[error("No Japanese text found in subtitles")]
    NoJapaneseContent,

    /// Upload exceeds the configured size limit
    #[error("File too large: {size} bytes (maximum is {max} bytes)")]
    FileTooLarge {
        /// Size of the rejected upload
        size: usize,
        /// Configured limit
        max: usize,
    },

    /// Anything that is not an `.srt` file
    #[error("Invalid file type: {0}. Only .srt files are supported")]
    UnsupportedFormat(String),
}

/// Errors produced by tokenizer strategies
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizerError {
    /// The analyzer could not be initialized (missing or corrupt dictionary)
    #[error("Tokenizer initialization failed: {0}")]
    InitFailed(String),

    /// A single piece of text could not be analyzed
    #[error("Tokenization failed: {0}")]
    Analysis(String),
}

/// Failures of the remote meaning service
#[derive(Error, Debug)]
pub enum LookupError {
    /// The request could not be sent or the connection dropped
    #[error("Lookup request failed: {0}")]
    RequestFailed(String),

    /// No response within the configured timeout
    #[error("Lookup timed out after {0}s")]
    Timeout(u64),

    /// The service answered with a non-success status
    #[error("Lookup service responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Body or reason phrase
        message: String,
    },

    /// The body did not have the expected shape
    #[error("Failed to parse lookup response: {0}")]
    ParseError(String),
}

/// Errors at the job submission boundary
#[derive(Error, Debug)]
pub enum JobError {
    /// Synchronous validation failed, nothing was started
    #[error("Validation failed: {0}")]
    Validation(#[from] SubtitleError),

    /// An extraction for this file is still in flight
    #[error("Extraction already running for file {0}")]
    AlreadyRunning(String),

    /// The storage collaborator failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Unknown file id
    #[error("File not found: {0}")]
    NotFound(String),
}

/// Errors at the quiz request boundary
#[derive(Error, Debug)]
pub enum QuizError {
    /// Unknown file id
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// The file has no resolved vocabulary yet
    #[error("No vocabulary found for file {0}. Processing may still be in progress.")]
    NoVocabulary(String),

    /// Unrecognized quiz type name
    #[error("Invalid quiz type: {0}")]
    InvalidType(String),

    /// The storage collaborator failed
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Errors when editing stored files and vocabulary
#[derive(Error, Debug)]
pub enum LibraryError {
    /// Empty or otherwise unusable input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unknown file or vocabulary id
    #[error("Not found: {0}")]
    NotFound(String),

    /// The storage collaborator failed
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from subtitle validation
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from the tokenizer
    #[error("Tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),

    /// Error from a dictionary lookup
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// Error from job submission
    #[error("Job error: {0}")]
    Job(#[from] JobError),

    /// Error from quiz generation
    #[error("Quiz error: {0}")]
    Quiz(#[from] QuizError),

    /// Error from editing stored data
    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
