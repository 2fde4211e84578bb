/*!
 * Dictionary-backed morphological analyzer.
 *
 * Wraps a vibrato tokenizer built from a compiled IPADIC-style system
 * dictionary. The dictionary is loaded lazily, once per instance; a load
 * failure is kept and reported on every later call instead of retrying.
 */

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::{debug, error};
use once_cell::sync::OnceCell;
use vibrato::Dictionary;

use super::{filter_content_words, Token, Tokenizer};
use crate::errors::TokenizerError;

// IPADIC feature columns
const POS_FIELD: usize = 0;
const BASE_FORM_FIELD: usize = 6;
const READING_FIELD: usize = 7;

pub struct MorphologicalTokenizer {
    dictionary_path: PathBuf,
    analyzer: OnceCell<Result<vibrato::Tokenizer, TokenizerError>>,
}

impl MorphologicalTokenizer {
    /// Create an analyzer for the dictionary at `dictionary_path`. Nothing is read yet.
    pub fn new<P: AsRef<Path>>(dictionary_path: P) -> Self {
        Self {
            dictionary_path: dictionary_path.as_ref().to_path_buf(),
            analyzer: OnceCell::new(),
        }
    }

    /// Force initialization and report whether it worked
    pub fn probe(&self) -> Result<(), TokenizerError> {
        self.analyzer().map(|_| ())
    }

    fn analyzer(&self) -> Result<&vibrato::Tokenizer, TokenizerError> {
        self.analyzer
            .get_or_init(|| load_analyzer(&self.dictionary_path))
            .as_ref()
            .map_err(|e| e.clone())
    }
}

fn load_analyzer(path: &Path) -> Result<vibrato::Tokenizer, TokenizerError> {
    debug!("Loading analyzer dictionary from {}", path.display());

    let file = File::open(path).map_err(|e| {
        error!("Cannot open analyzer dictionary {}: {}", path.display(), e);
        TokenizerError::InitFailed(format!("{}: {}", path.display(), e))
    })?;

    let dictionary = Dictionary::read(BufReader::new(file)).map_err(|e| {
        error!("Cannot read analyzer dictionary {}: {}", path.display(), e);
        TokenizerError::InitFailed(format!("{}: {}", path.display(), e))
    })?;

    Ok(vibrato::Tokenizer::new(dictionary))
}

/// Build a token from a surface form and its comma-separated feature string.
///
/// Missing or `*` base forms and readings fall back to the surface form.
pub(crate) fn token_from_feature(surface: &str, feature: &str) -> Token {
    let fields: Vec<&str> = feature.split(',').collect();

    let field = |index: usize| {
        fields
            .get(index)
            .map(|f| f.trim())
            .filter(|f| !f.is_empty() && *f != "*")
    };

    Token {
        word: surface.to_string(),
        reading: field(READING_FIELD).unwrap_or(surface).to_string(),
        base_form: field(BASE_FORM_FIELD).unwrap_or(surface).to_string(),
        part_of_speech: field(POS_FIELD).unwrap_or("*").to_string(),
    }
}

impl Tokenizer for MorphologicalTokenizer {
    fn name(&self) -> &'static str {
        "morphological"
    }

    fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizerError> {
        let analyzer = self.analyzer()?;

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut worker = analyzer.new_worker();
        worker.reset_sentence(text);
        worker.tokenize();

        let tokens = worker
            .token_iter()
            .filter(|token| !token.surface().trim().is_empty())
            .map(|token| token_from_feature(token.surface(), token.feature()))
            .collect();

        Ok(tokens)
    }

    fn filter_vocabulary(&self, tokens: Vec<Token>) -> Vec<Token> {
        filter_content_words(tokens)
    }
}
