use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::IndexConfig;

/// English stop words removed from profiles by default
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "an",
    "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are",
    "around", "as", "at", "back", "be", "became", "because", "become", "becomes", "becoming",
    "been", "before", "beforehand", "behind", "being", "below", "beside", "besides", "between",
    "beyond", "both", "but", "by", "can", "cannot", "could", "did", "do", "does", "done", "down",
    "during", "each", "either", "else", "elsewhere", "enough", "etc", "even", "ever", "every",
    "everyone", "everything", "everywhere", "except", "few", "for", "former", "formerly",
    "from", "further", "had", "has", "have", "he", "hence", "her", "here", "hereafter",
    "hereby", "herein", "hers", "herself", "him", "himself", "his", "how", "however", "i",
    "ie", "if", "in", "indeed", "into", "is", "it", "its", "itself", "just", "last", "latter",
    "least", "less", "many", "may", "me", "meanwhile", "might", "more", "moreover", "most",
    "mostly", "much", "must", "my", "myself", "neither", "never", "nevertheless", "next", "no",
    "nobody", "none", "noone", "nor", "not", "nothing", "now", "nowhere", "of", "off", "often",
    "on", "once", "one", "only", "onto", "or", "other", "others", "otherwise", "our", "ours",
    "ourselves", "out", "over", "own", "per", "perhaps", "please", "rather", "re", "same",
    "seem", "seemed", "seeming", "seems", "several", "she", "should", "since", "so", "some",
    "somehow", "someone", "something", "sometime", "sometimes", "somewhere", "still", "such",
    "than", "that", "the", "their", "them", "themselves", "then", "thence", "there",
    "thereafter", "thereby", "therefore", "therein", "thereupon", "these", "they", "this",
    "those", "though", "through", "throughout", "thru", "thus", "to", "together", "too",
    "toward", "towards", "under", "until", "up", "upon", "us", "very", "via", "was", "we",
    "well", "were", "what", "whatever", "when", "whence", "whenever", "where", "whereafter",
    "whereas", "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while",
    "whither", "who", "whoever", "whole", "whom", "whose", "why", "will", "with", "within",
    "without", "would", "yet", "you", "your", "yours", "yourself", "yourselves",
];

/// Splits profile text into vocabulary terms.
/// A token is a maximal run of alphanumeric or `_` characters.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stop_words: HashSet<String>,
    lowercase: bool,
    min_token_chars: usize,
}

impl Tokenizer {
    pub fn from_config(config: &IndexConfig) -> Self {
        Self {
            stop_words: config.stop_words.words().into_iter().collect(),
            lowercase: config.lowercase,
            min_token_chars: config.min_token_chars.max(1),
        }
    }

    /// Tokenize text in reading order, stop words and short tokens removed
    pub fn tokenize<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(move |raw| raw.chars().count() >= self.min_token_chars)
            .map(move |raw| {
                if self.lowercase {
                    raw.to_lowercase()
                } else {
                    raw.to_string()
                }
            })
            .filter(move |term| !self.stop_words.contains(term.as_str()))
    }

    /// Count the terms of one text
    pub fn term_frequency(&self, text: &str) -> TermFrequency {
        let mut freq = TermFrequency::new();
        for term in self.tokenize(text) {
            freq.add_term(&term);
        }
        freq
    }
}

/// Term occurrence counts of one document
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TermFrequency {
    #[serde(with = "indexmap::map::serde_seq")]
    term_count: IndexMap<String, u32>,
    total_term_count: u64,
}

impl TermFrequency {
    pub fn new() -> Self {
        TermFrequency {
            term_count: IndexMap::new(),
            total_term_count: 0,
        }
    }

    #[inline]
    pub fn add_term(&mut self, term: &str) -> &mut Self {
        if let Some(count) = self.term_count.get_mut(term) {
            *count += 1;
        } else {
            self.term_count.insert(term.to_string(), 1);
        }
        self.total_term_count += 1;
        self
    }

    #[inline]
    pub fn add_terms<T>(&mut self, terms: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        for term in terms {
            self.add_term(term.as_ref());
        }
        self
    }

    #[inline]
    pub fn term_count(&self, term: &str) -> u32 {
        self.term_count.get(term).copied().unwrap_or(0)
    }

    /// (term, count) in first-seen order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.term_count.iter().map(|(t, &c)| (t.as_str(), c))
    }

    /// Distinct terms
    #[inline]
    pub fn term_set_ref_str(&self) -> Vec<&str> {
        self.term_count.keys().map(|t| t.as_str()).collect()
    }

    #[inline]
    pub fn term_sum(&self) -> u64 {
        self.total_term_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.term_count.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StopWords;

    #[test]
    fn tokenizer_drops_stop_words_and_short_tokens() {
        let tokenizer = Tokenizer::from_config(&IndexConfig::default());
        let terms: Vec<String> = tokenizer.tokenize("The Empire strikes back, a 2nd time!").collect();
        assert_eq!(terms, vec!["empire", "strikes", "2nd", "time"]);
    }

    #[test]
    fn tokenizer_respects_config() {
        let config = IndexConfig::default()
            .with_stop_words(StopWords::None)
            .with_lowercase(false)
            .with_min_token_chars(1);
        let tokenizer = Tokenizer::from_config(&config);
        let terms: Vec<String> = tokenizer.tokenize("A Sci-Fi movie").collect();
        assert_eq!(terms, vec!["A", "Sci", "Fi", "movie"]);
    }

    #[test]
    fn term_frequency_counts() {
        let tokenizer = Tokenizer::from_config(&IndexConfig::default());
        let freq = tokenizer.term_frequency("space opera space rebellion");
        assert_eq!(freq.term_count("space"), 2);
        assert_eq!(freq.term_count("opera"), 1);
        assert_eq!(freq.term_count("empire"), 0);
        assert_eq!(freq.term_sum(), 4);
        assert_eq!(freq.term_set_ref_str(), vec!["space", "opera", "rebellion"]);
    }
}
