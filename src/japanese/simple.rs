/*!
 * Regex tokenizer.
 *
 * Extracts Kanji runs (with trailing Hiragana okurigana) and Katakana runs.
 * There is no reading or base form information: both are the surface form
 * and every token is labelled a noun.
 */

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Token, Tokenizer};
use crate::errors::TokenizerError;

static KANJI_RUN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[一-龯々]+[ぁ-ん]*").unwrap()
});

static KATAKANA_RUN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[ァ-ヶー]+").unwrap()
});

const MIN_RUN_CHARS: usize = 2;
const NOUN: &str = "名詞";

#[derive(Debug, Default, Clone)]
pub struct SimpleTokenizer;

impl SimpleTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for SimpleTokenizer {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizerError> {
        // Kanji runs first, then Katakana runs
        let tokens = KANJI_RUN_REGEX
            .find_iter(text)
            .chain(KATAKANA_RUN_REGEX.find_iter(text))
            .map(|m| m.as_str())
            .filter(|run| run.chars().count() >= MIN_RUN_CHARS)
            .map(|run| Token::new(run, run, run, NOUN))
            .collect();

        Ok(tokens)
    }

    fn filter_vocabulary(&self, tokens: Vec<Token>) -> Vec<Token> {
        let mut seen = HashSet::new();
        tokens
            .into_iter()
            .filter(|token| seen.insert(token.word.clone()))
            .collect()
    }
}
