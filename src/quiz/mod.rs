/*!
 * Quiz generation and grading.
 *
 * - `generator`: question construction with distractor sampling
 * - `service`: quiz requests and submissions against stored vocabulary
 */

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::QuizError;
use crate::japanese::katakana_to_hiragana;

pub mod generator;
pub mod service;

pub use generator::QuizGenerator;
pub use service::QuizService;

/// Kind of question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizType {
    /// Word shown, reading asked
    Recognition,
    /// Word and reading shown, meaning asked
    Meaning,
    /// Context sentence with a blank, word asked
    Context,
    /// Meaning shown, word asked
    Reverse,
}

impl QuizType {
    /// Round-robin order used by mixed quizzes
    pub const ALL: [QuizType; 4] = [
        QuizType::Recognition,
        QuizType::Meaning,
        QuizType::Context,
        QuizType::Reverse,
    ];
}

impl fmt::Display for QuizType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizType::Recognition => write!(f, "recognition"),
            QuizType::Meaning => write!(f, "meaning"),
            QuizType::Context => write!(f, "context"),
            QuizType::Reverse => write!(f, "reverse"),
        }
    }
}

impl std::str::FromStr for QuizType {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "recognition" => Ok(QuizType::Recognition),
            "meaning" => Ok(QuizType::Meaning),
            "context" => Ok(QuizType::Context),
            "reverse" => Ok(QuizType::Reverse),
            _ => Err(QuizError::InvalidType(s.to_string())),
        }
    }
}

/// Quiz type as requested by a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizRequestType {
    Single(QuizType),
    /// All four types, round-robin
    Mixed,
}

impl std::str::FromStr for QuizRequestType {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("mixed") {
            return Ok(QuizRequestType::Mixed);
        }
        s.parse().map(QuizRequestType::Single)
    }
}

impl fmt::Display for QuizRequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizRequestType::Single(quiz_type) => write!(f, "{}", quiz_type),
            QuizRequestType::Mixed => write!(f, "mixed"),
        }
    }
}

/// One multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub quiz_type: QuizType,
    pub question: String,
    pub correct_answer: String,
    /// At most the configured count, correct answer included exactly once
    pub options: Vec<String>,
    pub vocabulary_id: String,
}

/// Answer given to one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: String,
    pub answer: String,
}

/// Outcome of one answered question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradedAnswer {
    pub question_id: String,
    pub vocabulary_id: String,
    pub given: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// Score of a finished quiz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub score: usize,
    pub total_questions: usize,
    /// Percentage, rounded
    pub accuracy: u32,
    pub answers: Vec<GradedAnswer>,
}

fn answers_match(quiz_type: QuizType, given: &str, expected: &str) -> bool {
    let given = given.trim();
    let expected = expected.trim();

    match quiz_type {
        QuizType::Recognition => katakana_to_hiragana(given) == katakana_to_hiragana(expected),
        _ => given == expected,
    }
}

/// Grade answers against their questions.
///
/// Questions without an answer count as wrong; answers to unknown
/// questions are ignored.
pub fn grade(questions: &[QuizQuestion], answers: &[SubmittedAnswer]) -> QuizResult {
    let graded: Vec<GradedAnswer> = questions
        .iter()
        .map(|question| {
            let given = answers
                .iter()
                .find(|answer| answer.question_id == question.id)
                .map(|answer| answer.answer.clone())
                .unwrap_or_default();

            GradedAnswer {
                question_id: question.id.clone(),
                vocabulary_id: question.vocabulary_id.clone(),
                is_correct: answers_match(question.quiz_type, &given, &question.correct_answer),
                given,
                correct_answer: question.correct_answer.clone(),
            }
        })
        .collect();

    let score = graded.iter().filter(|answer| answer.is_correct).count();
    let total_questions = graded.len();
    let accuracy = if total_questions > 0 {
        ((score as f64 / total_questions as f64) * 100.0).round() as u32
    } else {
        0
    };

    QuizResult {
        score,
        total_questions,
        accuracy,
        answers: graded,
    }
}
