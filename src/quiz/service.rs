/*!
 * Quiz requests and submissions against stored vocabulary.
 */

use log::{debug, info};

use super::{grade, QuizGenerator, QuizQuestion, QuizRequestType, QuizResult, SubmittedAnswer};
use crate::app_config::QuizConfig;
use crate::database::models::{AnswerRecord, QuizAttemptRecord};
use crate::database::Repository;
use crate::errors::QuizError;

#[derive(Clone)]
pub struct QuizService {
    repository: Repository,
    options_per_question: usize,
    default_question_count: usize,
}

impl QuizService {
    pub fn new(repository: Repository, config: &QuizConfig) -> Self {
        Self {
            repository,
            options_per_question: config.options_per_question,
            default_question_count: config.default_question_count,
        }
    }

    pub fn default_question_count(&self) -> usize {
        self.default_question_count
    }

    /// Questions for a file's vocabulary.
    ///
    /// `count` defaults to the configured question count and is capped by the
    /// vocabulary size.
    pub async fn generate(
        &self,
        file_id: &str,
        request: QuizRequestType,
        count: Option<usize>,
    ) -> Result<Vec<QuizQuestion>, QuizError> {
        self.repository
            .get_file(file_id)
            .await
            .map_err(|e| QuizError::Storage(e.to_string()))?
            .ok_or_else(|| QuizError::FileNotFound(file_id.to_string()))?;

        let vocabulary = self
            .repository
            .get_vocabulary_for_file(file_id)
            .await
            .map_err(|e| QuizError::Storage(e.to_string()))?;

        if vocabulary.is_empty() {
            return Err(QuizError::NoVocabulary(file_id.to_string()));
        }

        let count = count.unwrap_or(self.default_question_count);
        let mut generator = QuizGenerator::new(self.options_per_question);
        let questions = generator.generate(&vocabulary, request, count);

        debug!(
            "Generated {} {} questions from {} words for file {}",
            questions.len(),
            request,
            vocabulary.len(),
            file_id
        );
        Ok(questions)
    }

    /// Record a finished attempt and bump per-item review counters
    pub async fn submit(
        &self,
        user_id: &str,
        file_id: &str,
        answers: &[AnswerRecord],
        score: usize,
        total_questions: usize,
    ) -> Result<QuizAttemptRecord, QuizError> {
        self.repository
            .get_file(file_id)
            .await
            .map_err(|e| QuizError::Storage(e.to_string()))?
            .ok_or_else(|| QuizError::FileNotFound(file_id.to_string()))?;

        let attempt = QuizAttemptRecord::new(user_id, file_id, score, total_questions);
        self.repository
            .record_quiz_attempt(&attempt, answers)
            .await
            .map_err(|e| QuizError::Storage(e.to_string()))?;

        info!("Recorded quiz for file {}: {}/{}", file_id, score, total_questions);
        Ok(attempt)
    }

    /// Grade answers locally, then record the attempt
    pub async fn grade_and_submit(
        &self,
        user_id: &str,
        file_id: &str,
        questions: &[QuizQuestion],
        answers: &[SubmittedAnswer],
    ) -> Result<QuizResult, QuizError> {
        let result = grade(questions, answers);

        let records: Vec<AnswerRecord> = result
            .answers
            .iter()
            .map(|answer| AnswerRecord {
                vocabulary_id: answer.vocabulary_id.clone(),
                is_correct: answer.is_correct,
            })
            .collect();

        self.submit(user_id, file_id, &records, result.score, result.total_questions)
            .await?;
        Ok(result)
    }
}
