/*!
 * Quiz question generator.
 *
 * Generic over the random source so tests can use a seeded generator.
 */

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::{QuizQuestion, QuizRequestType, QuizType};
use crate::database::models::VocabularyRecord;

/// Placeholder replacing the word in context questions
const BLANK: &str = "___";

pub struct QuizGenerator<R: Rng = StdRng> {
    rng: R,
    options_per_question: usize,
}

impl QuizGenerator<StdRng> {
    /// Generator seeded from the thread-local random source
    pub fn new(options_per_question: usize) -> Self {
        Self::with_rng(StdRng::from_rng(&mut rand::rng()), options_per_question)
    }

    /// Deterministic generator
    pub fn seeded(seed: u64, options_per_question: usize) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), options_per_question)
    }
}

impl<R: Rng> QuizGenerator<R> {
    pub fn with_rng(rng: R, options_per_question: usize) -> Self {
        Self {
            rng,
            options_per_question: options_per_question.max(1),
        }
    }

    /// Pick up to `count` items without replacement
    fn sample<'a>(&mut self, vocabulary: &'a [VocabularyRecord], count: usize) -> Vec<&'a VocabularyRecord> {
        let mut picked: Vec<&VocabularyRecord> = vocabulary.iter().collect();
        picked.shuffle(&mut self.rng);
        picked.truncate(count.min(vocabulary.len()));
        picked
    }

    /// Answer options: the correct answer plus distinct distractors from the pool, shuffled.
    ///
    /// Yields `min(n, 1 + distinct(pool without correct))` options.
    pub fn generate_options(&mut self, correct: &str, pool: &[String], n: usize) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(correct);

        let mut remaining: Vec<&str> = pool
            .iter()
            .map(String::as_str)
            .filter(|candidate| seen.insert(*candidate))
            .collect();

        let mut options = vec![correct.to_string()];
        while options.len() < n && !remaining.is_empty() {
            let pick = self.rng.random_range(0..remaining.len());
            options.push(remaining.swap_remove(pick).to_string());
        }

        options.shuffle(&mut self.rng);
        options
    }

    /// One question of the given type about `vocab`, distractors drawn from `all`
    pub fn build_question(&mut self, vocab: &VocabularyRecord, all: &[VocabularyRecord], quiz_type: QuizType) -> QuizQuestion {
        let n = self.options_per_question;

        let (question, correct_answer, pool): (String, &str, Vec<String>) = match quiz_type {
            QuizType::Recognition => (
                format!("What is the reading of: {}?", vocab.word),
                vocab.reading.as_str(),
                all.iter().map(|v| v.reading.clone()).collect(),
            ),
            QuizType::Meaning => (
                format!("What does {} ({}) mean?", vocab.word, vocab.reading),
                vocab.meaning.as_str(),
                all.iter().map(|v| v.meaning.clone()).collect(),
            ),
            QuizType::Context => (
                format!("Fill in the blank: {}", vocab.context_sentence.replacen(&vocab.word, BLANK, 1)),
                vocab.word.as_str(),
                all.iter().map(|v| v.word.clone()).collect(),
            ),
            QuizType::Reverse => (
                format!("How do you say \"{}\" in Japanese?", vocab.meaning),
                vocab.word.as_str(),
                all.iter().map(|v| v.word.clone()).collect(),
            ),
        };

        let options = self.generate_options(correct_answer, &pool, n);

        QuizQuestion {
            id: vocab.id.clone(),
            quiz_type,
            question,
            correct_answer: correct_answer.to_string(),
            options,
            vocabulary_id: vocab.id.clone(),
        }
    }

    /// `min(count, len)` questions of one type, one per sampled item
    pub fn generate_quiz(&mut self, vocabulary: &[VocabularyRecord], quiz_type: QuizType, count: usize) -> Vec<QuizQuestion> {
        self.sample(vocabulary, count)
            .into_iter()
            .map(|vocab| self.build_question(vocab, vocabulary, quiz_type))
            .collect()
    }

    /// Types assigned round-robin over the sampled items, then the questions are shuffled
    pub fn generate_mixed_quiz(&mut self, vocabulary: &[VocabularyRecord], count: usize) -> Vec<QuizQuestion> {
        let mut questions: Vec<QuizQuestion> = self
            .sample(vocabulary, count)
            .into_iter()
            .enumerate()
            .map(|(i, vocab)| {
                let quiz_type = QuizType::ALL[i % QuizType::ALL.len()];
                self.build_question(vocab, vocabulary, quiz_type)
            })
            .collect();

        questions.shuffle(&mut self.rng);
        questions
    }

    pub fn generate(&mut self, vocabulary: &[VocabularyRecord], request: QuizRequestType, count: usize) -> Vec<QuizQuestion> {
        match request {
            QuizRequestType::Single(quiz_type) => self.generate_quiz(vocabulary, quiz_type, count),
            QuizRequestType::Mixed => self.generate_mixed_quiz(vocabulary, count),
        }
    }
}
