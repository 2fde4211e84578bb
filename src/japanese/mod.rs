/*!
 * Japanese text analysis.
 *
 * Two tokenizer strategies sit behind the [`Tokenizer`] trait:
 * - `morphological`: dictionary-backed segmentation with base forms,
 *   readings and parts of speech
 * - `simple`: regex extraction of Kanji and Katakana runs, used when no
 *   analyzer dictionary is available
 *
 * The strategy is chosen once at startup by [`select_tokenizer`].
 */

use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app_config::{TokenizerConfig, TokenizerStrategy};
use crate::errors::TokenizerError;

pub mod morphological;
pub mod simple;

pub use morphological::MorphologicalTokenizer;
pub use simple::SimpleTokenizer;

/// Part-of-speech labels that never become vocabulary
pub const EXCLUDED_POS: [&str; 6] = ["助詞", "助動詞", "記号", "接続詞", "連体詞", "感動詞"];

/// Part-of-speech labels kept as vocabulary (noun, verb, adjective)
pub const CONTENT_POS: [&str; 3] = ["名詞", "動詞", "形容詞"];

/// A token produced by a tokenizer strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Surface form as it appears in the text
    pub word: String,
    /// Reading, Katakana or Hiragana depending on the strategy
    pub reading: String,
    /// Dictionary form used as the aggregation key
    pub base_form: String,
    /// Part-of-speech label
    pub part_of_speech: String,
}

impl Token {
    pub fn new(word: &str, reading: &str, base_form: &str, part_of_speech: &str) -> Self {
        Self {
            word: word.to_string(),
            reading: reading.to_string(),
            base_form: base_form.to_string(),
            part_of_speech: part_of_speech.to_string(),
        }
    }
}

/// Tokenizer strategy
pub trait Tokenizer: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Split text into tokens
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizerError>;

    /// Keep the tokens worth studying, in input order
    fn filter_vocabulary(&self, tokens: Vec<Token>) -> Vec<Token>;
}

pub fn is_hiragana(c: char) -> bool {
    ('\u{3040}'..='\u{309F}').contains(&c)
}

pub fn is_katakana(c: char) -> bool {
    ('\u{30A0}'..='\u{30FF}').contains(&c)
}

pub fn is_kanji(c: char) -> bool {
    ('\u{4E00}'..='\u{9FAF}').contains(&c)
}

/// Convert Katakana (ァ through ヶ) to Hiragana, leaving every other character as is
pub fn katakana_to_hiragana(text: &str) -> String {
    text.chars()
        .map(|c| {
            if ('\u{30A1}'..='\u{30F6}').contains(&c) {
                char::from_u32(c as u32 - 0x60).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Reading normalized to Hiragana
pub fn get_hiragana_reading(reading: &str) -> String {
    katakana_to_hiragana(reading)
}

/// Content-word filter shared by dictionary-backed strategies.
///
/// Drops function words, keeps nouns, verbs and adjectives, drops lone
/// Hiragana characters and requires a Kanji or an all-Katakana surface.
pub fn filter_content_words(tokens: Vec<Token>) -> Vec<Token> {
    tokens
        .into_iter()
        .filter(|token| {
            let pos = token.part_of_speech.as_str();

            if EXCLUDED_POS.iter().any(|excluded| pos.contains(excluded)) {
                return false;
            }

            if !CONTENT_POS.iter().any(|content| pos.contains(content)) {
                return false;
            }

            let mut chars = token.word.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                if is_hiragana(c) {
                    return false;
                }
            }

            let has_kanji = token.word.chars().any(is_kanji);
            let all_katakana = !token.word.is_empty() && token.word.chars().all(is_katakana);

            has_kanji || all_katakana
        })
        .collect()
}

/// Pick the tokenizer strategy for this process.
///
/// `auto` probes the morphological analyzer once and falls back to the
/// simple strategy when it cannot be initialized.
pub fn select_tokenizer(config: &TokenizerConfig) -> Result<Arc<dyn Tokenizer>, TokenizerError> {
    match config.strategy {
        TokenizerStrategy::Simple => Ok(Arc::new(SimpleTokenizer::new())),
        TokenizerStrategy::Morphological => {
            let path = config.dictionary_path.as_deref().ok_or_else(|| {
                TokenizerError::InitFailed("no dictionary path configured".to_string())
            })?;
            let tokenizer = MorphologicalTokenizer::new(Path::new(path));
            tokenizer.probe()?;
            info!("Using morphological tokenizer with dictionary {}", path);
            Ok(Arc::new(tokenizer))
        }
        TokenizerStrategy::Auto => {
            let Some(path) = config.dictionary_path.as_deref() else {
                info!("No analyzer dictionary configured, using simple tokenizer");
                return Ok(Arc::new(SimpleTokenizer::new()));
            };

            let tokenizer = MorphologicalTokenizer::new(Path::new(path));
            match tokenizer.probe() {
                Ok(()) => {
                    info!("Using morphological tokenizer with dictionary {}", path);
                    Ok(Arc::new(tokenizer))
                }
                Err(e) => {
                    warn!("{}. Falling back to simple tokenizer", e);
                    Ok(Arc::new(SimpleTokenizer::new()))
                }
            }
        }
    }
}
