/*!
 * Integration tests for quizzes over extracted vocabulary
 */

use std::collections::HashSet;
use std::sync::Arc;

use subvocab::errors::QuizError;
use subvocab::quiz::{QuizRequestType, QuizType, SubmittedAnswer};

use crate::common;
use crate::common::mocks::MockMeaningService;

async fn extracted_episode() -> (subvocab::Controller, String) {
    let controller = common::test_controller(Arc::new(MockMeaningService::with_sample_meanings())).unwrap();
    let receipt = controller
        .extraction()
        .upload("episode01.srt", common::EPISODE_SRT, "local")
        .await
        .unwrap();
    common::wait_until_finished(&controller, &receipt.file_id).await;
    (controller, receipt.file_id)
}

#[tokio::test]
async fn test_meaningQuiz_overThreeWords_shouldOfferThreeOptions() {
    let (controller, file_id) = extracted_episode().await;

    let questions = controller
        .generate_quiz(&file_id, QuizRequestType::Single(QuizType::Meaning), Some(4))
        .await
        .unwrap();

    assert_eq!(questions.len(), 3);
    for question in &questions {
        assert_eq!(question.options.len(), 3);
        assert!(question.options.contains(&question.correct_answer));
    }
}

#[tokio::test]
async fn test_mixedQuiz_withDefaultCount_shouldCoverAllWords() {
    let (controller, file_id) = extracted_episode().await;

    let questions = controller
        .generate_quiz(&file_id, QuizRequestType::Mixed, None)
        .await
        .unwrap();

    assert_eq!(questions.len(), 3);
    let ids: HashSet<&String> = questions.iter().map(|q| &q.vocabulary_id).collect();
    assert_eq!(ids.len(), 3);
    let types: HashSet<QuizType> = questions.iter().map(|q| q.quiz_type).collect();
    assert_eq!(types.len(), 3, "three items get the first three round-robin types");
}

#[tokio::test]
async fn test_quiz_beforeExtractionFinished_shouldReportNoVocabulary() {
    let controller = common::test_controller(Arc::new(MockMeaningService::with_sample_meanings())).unwrap();
    let file = subvocab::database::models::SubtitleFileRecord::new("local", "pending.srt", 10, "h");
    controller.repository().create_file(&file).await.unwrap();

    let result = controller
        .quiz()
        .generate(&file.id, QuizRequestType::Mixed, None)
        .await;
    assert!(matches!(result, Err(QuizError::NoVocabulary(_))));
}

#[tokio::test]
async fn test_gradeAndSubmit_allCorrect_shouldUpdateDashboard() {
    let (controller, file_id) = extracted_episode().await;

    let questions = controller
        .generate_quiz(&file_id, QuizRequestType::Single(QuizType::Reverse), None)
        .await
        .unwrap();
    let answers: Vec<SubmittedAnswer> = questions
        .iter()
        .map(|q| SubmittedAnswer {
            question_id: q.id.clone(),
            answer: q.correct_answer.clone(),
        })
        .collect();

    let result = controller
        .quiz()
        .grade_and_submit("local", &file_id, &questions, &answers)
        .await
        .unwrap();
    assert_eq!(result.score, 3);
    assert_eq!(result.accuracy, 100);

    let stats = controller.dashboard("local").await.unwrap();
    assert_eq!(stats.total_files, 1);
    assert_eq!(stats.total_words, 3);
    assert_eq!(stats.quizzes_taken, 1);
    assert_eq!(stats.average_accuracy, 100);
    assert_eq!(stats.recent_quizzes[0].file_id, file_id);
}

#[tokio::test]
async fn test_submit_forUnknownFile_shouldReturnFileNotFound() {
    let controller = common::test_controller(Arc::new(MockMeaningService::with_sample_meanings())).unwrap();

    let result = controller.quiz().submit("local", "missing", &[], 0, 0).await;
    assert!(matches!(result, Err(QuizError::FileNotFound(_))));
}
