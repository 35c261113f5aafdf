use serde::{Deserialize, Serialize};

use crate::vectorizer::token::ENGLISH_STOP_WORDS;

/// Stop word policy applied while tokenizing profiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StopWords {
    /// Built-in English list
    #[default]
    English,
    /// Keep every term
    None,
    /// Caller supplied list, matched after lowercasing
    Custom(Vec<String>),
}

impl StopWords {
    /// Resolve the policy into the concrete list of words
    pub fn words(&self) -> Vec<String> {
        match self {
            StopWords::English => ENGLISH_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            StopWords::None => Vec::new(),
            StopWords::Custom(words) => words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }
}

/// Fit-time configuration of the vector space index
///
/// Every field has a default, so a partial document deserializes:
/// ```
/// use movie_content_recommender::IndexConfig;
/// let config: IndexConfig = serde_json::from_str(r#"{"min_token_chars": 3}"#).unwrap();
/// assert_eq!(config.min_token_chars, 3);
/// assert!(config.lowercase);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Stop words excluded from the vocabulary
    pub stop_words: StopWords,
    /// Lowercase terms before counting
    pub lowercase: bool,
    /// Shortest token (in chars) that is kept
    pub min_token_chars: usize,
    /// Largest corpus for which the full similarity matrix is materialized.
    /// Bigger corpora compute similarity rows on demand.
    pub dense_threshold: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            stop_words: StopWords::English,
            lowercase: true,
            min_token_chars: 2,
            dense_threshold: 5_000,
        }
    }
}

impl IndexConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stop_words(mut self, stop_words: StopWords) -> Self {
        self.stop_words = stop_words;
        self
    }

    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    /// Values below 1 are raised to 1
    pub fn with_min_token_chars(mut self, min_token_chars: usize) -> Self {
        self.min_token_chars = min_token_chars.max(1);
        self
    }

    pub fn with_dense_threshold(mut self, dense_threshold: usize) -> Self {
        self.dense_threshold = dense_threshold;
        self
    }
}
