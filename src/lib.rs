/*!
 * # subvocab - Japanese vocabulary from subtitles
 *
 * A Rust library that turns Japanese subtitle files into study material.
 *
 * ## Features
 *
 * - Parse and validate SRT subtitle files
 * - Tokenize Japanese text with a dictionary-backed morphological analyzer,
 *   or with a simple script-run analyzer when no dictionary is available
 * - Rank words by frequency and keep example sentences
 * - Resolve meanings through a tiered cache (session, SQLite, remote service)
 *   with rate-limited remote lookups
 * - Track background extraction progress per file
 * - Generate and grade multiple-choice quizzes
 * - Correct extracted vocabulary and rename files by hand
 *
 * ## Architecture
 *
 * - `app_config`: Configuration management
 * - `subtitle_parser`: SRT parsing, cleaning and validation
 * - `japanese`: Tokenizer strategies and kana utilities
 * - `vocabulary`: Frequency aggregation and the extraction pipeline
 * - `dictionary`: Meaning lookup tiers and the lookup queue
 * - `progress`: In-memory progress tracker with expiry
 * - `jobs`: Upload validation and background extraction jobs
 * - `library`: Manual edits to stored files and vocabulary
 * - `quiz`: Question generation, grading and submission
 * - `database`: SQLite persistence
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod subtitle_parser;
pub mod japanese;
pub mod vocabulary;
pub mod dictionary;
pub mod progress;
pub mod jobs;
pub mod library;
pub mod quiz;
pub mod database;
pub mod app_controller;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use subtitle_parser::SubtitleEntry;
pub use japanese::{Token, Tokenizer};
pub use progress::{ProgressTracker, Stage};
pub use quiz::{QuizQuestion, QuizType};
pub use errors::{AppError, JobError, LibraryError, LookupError, QuizError, SubtitleError, TokenizerError};
