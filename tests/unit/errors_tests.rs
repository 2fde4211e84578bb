/*!
 * Tests for error types and conversions
 */

use subvocab::errors::{AppError, JobError, LookupError, QuizError, SubtitleError, TokenizerError};

#[test]
fn test_subtitleError_display_shouldDescribeProblem() {
    assert_eq!(SubtitleError::EmptyInput.to_string(), "File is empty");
    assert_eq!(SubtitleError::NoEntries.to_string(), "No valid subtitle entries found");
    assert_eq!(
        SubtitleError::NoJapaneseContent.to_string(),
        "No Japanese text found in subtitles"
    );
    assert_eq!(
        SubtitleError::FileTooLarge { size: 10, max: 5 }.to_string(),
        "File too large: 10 bytes (maximum is 5 bytes)"
    );
}

#[test]
fn test_jobError_fromSubtitleError_shouldWrapAsValidation() {
    let error: JobError = SubtitleError::NoEntries.into();
    assert!(matches!(error, JobError::Validation(SubtitleError::NoEntries)));
    assert_eq!(error.to_string(), "Validation failed: No valid subtitle entries found");
}

#[test]
fn test_appError_conversions_shouldKeepMessages() {
    let from_lookup: AppError = LookupError::Timeout(10).into();
    assert_eq!(from_lookup.to_string(), "Lookup error: Lookup timed out after 10s");

    let from_tokenizer: AppError = TokenizerError::InitFailed("missing dictionary".to_string()).into();
    assert!(from_tokenizer.to_string().contains("missing dictionary"));

    let from_quiz: AppError = QuizError::NoVocabulary("abc".to_string()).into();
    assert!(matches!(from_quiz, AppError::Quiz(_)));

    let from_anyhow: AppError = anyhow::anyhow!("boom").into();
    assert!(matches!(from_anyhow, AppError::Unknown(ref message) if message == "boom"));

    let from_io: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(from_io, AppError::File(_)));
}

#[test]
fn test_lookupError_apiError_shouldIncludeStatus() {
    let error = LookupError::ApiError {
        status_code: 503,
        message: "Service Unavailable".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Lookup service responded with error: 503 - Service Unavailable"
    );
}
