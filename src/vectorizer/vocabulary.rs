use std::collections::BTreeMap;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::vectorizer::token::TermFrequency;

/// Term to column bijection of one fitted index,
/// together with the document frequency of every term.
///
/// Columns are handed out in lexicographic term order,
/// so the same corpus always yields the same assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// position == column
    terms: IndexSet<Box<str>>,
    /// number of documents containing the term, by column
    doc_freq: Vec<u64>,
    /// number of documents the vocabulary was built from
    doc_num: u64,
}

impl Vocabulary {
    /// Count the documents containing each term and assign columns
    pub fn from_term_frequencies(freqs: &[TermFrequency]) -> Self {
        let mut term_counts: BTreeMap<&str, u64> = BTreeMap::new();
        for freq in freqs {
            for term in freq.term_set_ref_str() {
                *term_counts.entry(term).or_insert(0) += 1;
            }
        }
        let mut terms = IndexSet::with_capacity(term_counts.len());
        let mut doc_freq = Vec::with_capacity(term_counts.len());
        for (term, count) in term_counts {
            terms.insert(Box::<str>::from(term));
            doc_freq.push(count);
        }
        Self {
            terms,
            doc_freq,
            doc_num: freqs.len() as u64,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Column of a term
    #[inline]
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.terms.get_index_of(term)
    }

    /// Term of a column
    #[inline]
    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get_index(index).map(|t| t.as_ref())
    }

    #[inline]
    pub fn contains_term(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    /// Document frequency of a column, zero when out of range
    #[inline]
    pub fn doc_freq(&self, index: usize) -> u64 {
        self.doc_freq.get(index).copied().unwrap_or(0)
    }

    #[inline]
    pub fn doc_num(&self) -> u64 {
        self.doc_num
    }

    /// Every column has exactly one document frequency
    pub(crate) fn is_consistent(&self) -> bool {
        self.doc_freq.len() == self.terms.len()
    }

    /// Terms in column order
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| t.as_ref())
    }
}
