/*!
 * Test doubles for the tokenizer and dictionary seams
 *
 * The stub tokenizer stands in for a dictionary-backed analyzer: it maps
 * whole sentences to the tokens such an analyzer would produce, so tests do
 * not need an analyzer dictionary on disk.
 */

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use subvocab::dictionary::{MeaningService, MeaningStore};
use subvocab::errors::{LookupError, TokenizerError};
use subvocab::japanese::{filter_content_words, Token, Tokenizer};

/// Sentence-to-tokens tokenizer with the morphological filtering rules
#[derive(Debug, Default)]
pub struct StubTokenizer {
    lexicon: HashMap<String, Vec<Token>>,
}

impl StubTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sentence(mut self, text: &str, tokens: Vec<Token>) -> Self {
        self.lexicon.insert(text.to_string(), tokens);
        self
    }

    /// Sentences used by the shared fixtures
    pub fn with_sample_lexicon() -> Self {
        let study = vec![
            Token::new("勉強", "ベンキョウ", "勉強", "名詞"),
            Token::new("し", "シ", "する", "動詞"),
            Token::new("ます", "マス", "ます", "助動詞"),
            Token::new("。", "。", "。", "記号"),
        ];

        let mut teacher_study = vec![
            Token::new("先生", "センセイ", "先生", "名詞"),
            Token::new("、", "、", "、", "記号"),
        ];
        teacher_study.extend(study.clone());

        Self::new()
            .with_sentence("勉強します。", study)
            .with_sentence("先生、勉強します。", teacher_study)
            .with_sentence(
                "猫が好きです。",
                vec![
                    Token::new("猫", "ネコ", "猫", "名詞"),
                    Token::new("が", "ガ", "が", "助詞"),
                    Token::new("好き", "スキ", "好き", "名詞"),
                    Token::new("です", "デス", "です", "助動詞"),
                    Token::new("。", "。", "。", "記号"),
                ],
            )
            .with_sentence(
                "先生の猫。",
                vec![
                    Token::new("先生", "センセイ", "先生", "名詞"),
                    Token::new("の", "ノ", "の", "助詞"),
                    Token::new("猫", "ネコ", "猫", "名詞"),
                    Token::new("。", "。", "。", "記号"),
                ],
            )
    }
}

impl Tokenizer for StubTokenizer {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizerError> {
        self.lexicon
            .get(text)
            .cloned()
            .ok_or_else(|| TokenizerError::Analysis(format!("unknown sentence: {}", text)))
    }

    fn filter_vocabulary(&self, tokens: Vec<Token>) -> Vec<Token> {
        filter_content_words(tokens)
    }
}

/// Meaning service answering from a fixed table and counting calls
#[derive(Debug, Default)]
pub struct MockMeaningService {
    meanings: HashMap<String, String>,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
    should_fail: bool,
    should_panic: bool,
}

impl MockMeaningService {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        Self {
            meanings: entries
                .iter()
                .map(|(word, meaning)| (word.to_string(), meaning.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    /// Meanings for the words of the shared fixtures
    pub fn with_sample_meanings() -> Self {
        Self::new(&[
            ("勉強", "study"),
            ("先生", "teacher, master, doctor"),
            ("猫", "cat"),
            ("好き", "liked, well-liked, favourite"),
        ])
    }

    /// Every call fails with a transport error
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Every call panics, taking the lookup task down with it
    pub fn panicking() -> Self {
        Self {
            should_panic: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Words in the order they were requested
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl MeaningService for MockMeaningService {
    async fn fetch_meaning(&self, word: &str) -> Result<Option<String>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(word.to_string());

        if self.should_panic {
            panic!("meaning service crashed on '{}'", word);
        }

        if self.should_fail {
            return Err(LookupError::RequestFailed("connection refused".to_string()));
        }

        Ok(self.meanings.get(word).cloned())
    }
}

/// Persistent tier kept in memory
#[derive(Debug, Default)]
pub struct MemoryMeaningStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryMeaningStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(word: &str, meaning: &str) -> Self {
        let store = Self::new();
        store.entries.lock().unwrap().insert(word.to_string(), meaning.to_string());
        store
    }

    pub fn get(&self, word: &str) -> Option<String> {
        self.entries.lock().unwrap().get(word).cloned()
    }
}

#[async_trait]
impl MeaningStore for MemoryMeaningStore {
    async fn get_meaning(&self, word: &str) -> anyhow::Result<Option<String>> {
        Ok(self.get(word))
    }

    async fn put_meaning(&self, word: &str, meaning: &str) -> anyhow::Result<()> {
        self.entries
            .lock()
            .unwrap()
            .entry(word.to_string())
            .or_insert_with(|| meaning.to_string());
        Ok(())
    }
}
