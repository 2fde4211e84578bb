// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use subvocab::app_config::{self, Config, TokenizerStrategy};
use subvocab::quiz::{QuizQuestion, QuizRequestType, QuizType, SubmittedAnswer};
use subvocab::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for TokenizerStrategy to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTokenizer {
    Auto,
    Morphological,
    Simple,
}

impl From<CliTokenizer> for TokenizerStrategy {
    fn from(cli_tokenizer: CliTokenizer) -> Self {
        match cli_tokenizer {
            CliTokenizer::Auto => TokenizerStrategy::Auto,
            CliTokenizer::Morphological => TokenizerStrategy::Morphological,
            CliTokenizer::Simple => TokenizerStrategy::Simple,
        }
    }
}

/// CLI Wrapper for quiz types, including mixed quizzes
#[derive(Debug, Clone, ValueEnum)]
enum CliQuizType {
    Recognition,
    Meaning,
    Context,
    Reverse,
    Mixed,
}

impl From<CliQuizType> for QuizRequestType {
    fn from(cli_type: CliQuizType) -> Self {
        match cli_type {
            CliQuizType::Recognition => QuizRequestType::Single(QuizType::Recognition),
            CliQuizType::Meaning => QuizRequestType::Single(QuizType::Meaning),
            CliQuizType::Context => QuizRequestType::Single(QuizType::Context),
            CliQuizType::Reverse => QuizRequestType::Single(QuizType::Reverse),
            CliQuizType::Mixed => QuizRequestType::Mixed,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract vocabulary from a subtitle file or a directory of .srt files
    Extract {
        /// Subtitle file or directory to process
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Owner of the uploaded files
        #[arg(short, long, default_value = "local")]
        user: String,

        /// Tokenizer strategy to use
        #[arg(short, long, value_enum)]
        tokenizer: Option<CliTokenizer>,

        /// Vibrato system dictionary for the morphological tokenizer
        #[arg(short, long)]
        dictionary_path: Option<String>,
    },

    /// Show the vocabulary extracted from a file
    Vocab {
        /// File id printed by `extract`
        file_id: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List uploaded files
    Files {
        #[arg(short, long, default_value = "local")]
        user: String,
    },

    /// Delete a file together with its vocabulary and quiz history
    Delete {
        file_id: String,
    },

    /// Give a file a new name (".srt" is appended when missing)
    Rename {
        file_id: String,
        filename: String,
    },

    /// Correct one vocabulary item; omitted fields keep their value
    EditWord {
        /// Vocabulary id printed by `vocab`
        vocabulary_id: String,

        #[arg(long)]
        word: Option<String>,

        #[arg(long)]
        reading: Option<String>,

        #[arg(long)]
        meaning: Option<String>,
    },

    /// Remove one vocabulary item
    DeleteWord {
        vocabulary_id: String,
    },

    /// Generate a quiz for a file
    Quiz {
        file_id: String,

        /// Question type
        #[arg(short = 't', long = "type", value_enum, default_value = "mixed")]
        quiz_type: CliQuizType,

        /// Number of questions
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Ask the questions on the terminal and record the result
        #[arg(short, long)]
        interactive: bool,

        #[arg(short, long, default_value = "local")]
        user: String,
    },

    /// Show dictionary cache statistics
    CacheStats,

    /// Show per-user totals
    Stats {
        #[arg(short, long, default_value = "local")]
        user: String,
    },

    /// Generate shell completions for subvocab
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// subvocab - Japanese vocabulary from subtitles
///
/// Extracts frequent Japanese words from SRT subtitles, looks up their
/// meanings and quizzes you on them.
#[derive(Parser, Debug)]
#[command(name = "subvocab")]
#[command(version)]
#[command(about = "Japanese vocabulary extraction and quizzes from subtitle files")]
#[command(long_about = "subvocab extracts frequent Japanese words from SRT subtitles, resolves their meanings and builds quizzes.

EXAMPLES:
    subvocab extract episode01.srt              # Extract vocabulary from one file
    subvocab extract ~/anime/season1/           # Process every .srt file in a directory
    subvocab vocab <FILE_ID>                    # Show extracted words
    subvocab edit-word <ID> --meaning \"cat\"      # Correct a meaning
    subvocab quiz <FILE_ID> -t meaning -n 5 -i  # Take a 5 question meaning quiz
    subvocab completions bash > subvocab.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, color) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Trace lets set_max_level raise verbosity later without reinstalling the logger
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "subvocab", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(cmd_log_level) = &cli.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(LevelFilter::from(&level));
    }

    let mut config = Config::load_or_create(&cli.config_path)?;

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    if let Commands::Extract { tokenizer, dictionary_path, .. } = &cli.command {
        if let Some(tokenizer) = tokenizer {
            config.tokenizer.strategy = tokenizer.clone().into();
        }
        if let Some(path) = dictionary_path {
            config.tokenizer.dictionary_path = Some(path.clone());
        }
    }

    config.validate().context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if cli.log_level.is_none() {
        log::set_max_level(LevelFilter::from(&config.log_level));
    }

    let controller = Controller::with_config(config)?;

    match cli.command {
        Commands::Extract { input_path, user, .. } => run_extract(&controller, input_path, &user).await,
        Commands::Vocab { file_id, json } => run_vocab(&controller, &file_id, json).await,
        Commands::Files { user } => run_files(&controller, &user).await,
        Commands::Delete { file_id } => {
            controller.delete_file(&file_id).await?;
            println!("Deleted {}", file_id);
            Ok(())
        }
        Commands::Rename { file_id, filename } => {
            let stored = controller.rename_file(&file_id, &filename).await?;
            println!("Renamed {} to {}", file_id, stored);
            Ok(())
        }
        Commands::EditWord { vocabulary_id, word, reading, meaning } => {
            run_edit_word(&controller, &vocabulary_id, word, reading, meaning).await
        }
        Commands::DeleteWord { vocabulary_id } => {
            controller.delete_vocabulary(&vocabulary_id).await?;
            println!("Deleted {}", vocabulary_id);
            Ok(())
        }
        Commands::Quiz { file_id, quiz_type, count, interactive, user } => {
            run_quiz(&controller, &file_id, quiz_type.into(), count, interactive, &user).await
        }
        Commands::CacheStats => run_cache_stats(&controller).await,
        Commands::Stats { user } => run_stats(&controller, &user).await,
        Commands::Completions { .. } => Ok(()),
    }
}

async fn run_extract(controller: &Controller, input_path: PathBuf, user: &str) -> Result<()> {
    if !input_path.exists() {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }

    let summaries = controller.run(input_path, user).await?;

    for summary in &summaries {
        let note = if summary.duplicate { " (already uploaded)" } else { "" };
        info!(
            "{}: {} words in {:.1}s{}",
            summary.filename,
            summary.word_count,
            summary.elapsed.as_secs_f64(),
            note
        );
        println!("{}\t{}\t{} words", summary.file_id, summary.filename, summary.word_count);
    }

    Ok(())
}

async fn run_vocab(controller: &Controller, file_id: &str, json: bool) -> Result<()> {
    let vocabulary = controller.vocabulary(file_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&vocabulary)?);
        return Ok(());
    }

    if vocabulary.is_empty() {
        println!("No vocabulary yet for {}", file_id);
        return Ok(());
    }

    for vocab in &vocabulary {
        println!("{:>4}  {}【{}】 {}  [{}]", vocab.frequency, vocab.word, vocab.reading, vocab.meaning, vocab.id);
    }
    Ok(())
}

async fn run_edit_word(
    controller: &Controller,
    vocabulary_id: &str,
    word: Option<String>,
    reading: Option<String>,
    meaning: Option<String>,
) -> Result<()> {
    let current = controller
        .repository()
        .get_vocabulary(vocabulary_id)
        .await?
        .ok_or_else(|| anyhow!("Vocabulary item not found: {}", vocabulary_id))?;

    let updated = controller
        .update_vocabulary(
            vocabulary_id,
            word.as_deref().unwrap_or(&current.word),
            reading.as_deref().unwrap_or(&current.reading),
            meaning.as_deref().unwrap_or(&current.meaning),
        )
        .await?;

    println!("{}【{}】 {}", updated.word, updated.reading, updated.meaning);
    Ok(())
}

async fn run_files(controller: &Controller, user: &str) -> Result<()> {
    let files = controller.files(user).await?;

    if files.is_empty() {
        println!("No files uploaded");
        return Ok(());
    }

    for file in &files {
        let words = controller.repository().vocabulary_count(&file.id).await?;
        println!("{}\t{}\t{} bytes\t{} words\t{}", file.id, file.filename, file.file_size, words, file.upload_date);
    }
    Ok(())
}

async fn run_quiz(
    controller: &Controller,
    file_id: &str,
    request: QuizRequestType,
    count: Option<usize>,
    interactive: bool,
    user: &str,
) -> Result<()> {
    let questions = controller.generate_quiz(file_id, request, count).await?;

    if !interactive {
        println!("{}", serde_json::to_string_pretty(&questions)?);
        return Ok(());
    }

    let answers = ask_questions(&questions)?;
    let result = controller
        .quiz()
        .grade_and_submit(user, file_id, &questions, &answers)
        .await?;

    for (question, graded) in questions.iter().zip(&result.answers) {
        if !graded.is_correct {
            println!("✗ {} -> {}", question.question, graded.correct_answer);
        }
    }
    println!("Score: {}/{} ({}%)", result.score, result.total_questions, result.accuracy);
    Ok(())
}

// Options can be picked by number or typed out
fn ask_questions(questions: &[QuizQuestion]) -> Result<Vec<SubmittedAnswer>> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let mut answers = Vec::with_capacity(questions.len());

    for (i, question) in questions.iter().enumerate() {
        println!("\n[{}/{}] {}", i + 1, questions.len(), question.question);
        for (n, option) in question.options.iter().enumerate() {
            println!("  {}. {}", n + 1, option);
        }
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            error!("Input closed, remaining questions count as unanswered");
            break;
        };
        let line = line?;
        let input = line.trim();

        let answer = input
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|n| question.options.get(n).cloned())
            .unwrap_or_else(|| input.to_string());

        answers.push(SubmittedAnswer {
            question_id: question.id.clone(),
            answer,
        });
    }

    Ok(answers)
}

async fn run_cache_stats(controller: &Controller) -> Result<()> {
    let stats = controller.cache_stats().await?;
    println!("{}", stats);

    for entry in &stats.recent {
        println!("  {}\t{}\t{}", entry.created_at, entry.word, entry.meaning);
    }
    Ok(())
}

async fn run_stats(controller: &Controller, user: &str) -> Result<()> {
    let stats = controller.dashboard(user).await?;
    println!("Files: {}", stats.total_files);
    println!("Words: {}", stats.total_words);
    println!("Quizzes taken: {}", stats.quizzes_taken);
    println!("Average accuracy: {}%", stats.average_accuracy);

    for attempt in &stats.recent_quizzes {
        println!("  {}\t{}\t{}/{}", attempt.completed_at, attempt.file_id, attempt.score, attempt.total_words);
    }

    let db_stats = controller.repository().connection().stats().await?;
    info!("{}", db_stats);
    Ok(())
}
