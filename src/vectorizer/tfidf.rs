use serde::{Deserialize, Serialize};

use crate::{utils::math::vector::SparseVec, vectorizer::{token::TermFrequency, vocabulary::Vocabulary}};

/// IDF weight of every vocabulary column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IDFVector {
    /// IDF Vector it is not sparse because every column occurs somewhere
    pub idf_vec: Vec<f64>,
    /// document count
    pub doc_num: u64,
}

impl IDFVector {
    #[inline]
    pub fn get(&self, index: usize) -> f64 {
        self.idf_vec.get(index).copied().unwrap_or(0.0)
    }
}

/// Term weighting strategy used at fit time.
///
/// Implementors choose how raw counts turn into TF values;
/// the IDF side defaults to the smoothed form
/// `ln((1 + N) / (1 + df)) + 1`, which never reaches zero.
pub trait TFIDFEngine {
    /// TF weight for a term that occurs `count` times in one profile
    fn tf(count: u32) -> f64;

    /// IDF weight for a term found in `doc_freq` of `doc_num` documents
    #[inline]
    fn idf(doc_num: u64, doc_freq: u64) -> f64 {
        ((1.0 + doc_num as f64) / (1.0 + doc_freq as f64)).ln() + 1.0
    }

    fn idf_vec(vocabulary: &Vocabulary) -> IDFVector {
        let doc_num = vocabulary.doc_num();
        let idf_vec = (0..vocabulary.len())
            .map(|col| Self::idf(doc_num, vocabulary.doc_freq(col)))
            .collect();
        IDFVector { idf_vec, doc_num }
    }

    /// Un-normalized TF-IDF vector of one profile.
    /// Terms missing from the vocabulary are ignored.
    fn tf_idf_vec(freq: &TermFrequency, vocabulary: &Vocabulary, idf: &IDFVector) -> SparseVec<f64> {
        let mut inds = Vec::new();
        let mut vals = Vec::new();
        for (term, count) in freq.iter() {
            if let Some(col) = vocabulary.index_of(term) {
                inds.push(col as u32);
                vals.push(Self::tf(count) * idf.get(col));
            }
        }
        SparseVec::from_unsorted(vocabulary.len(), inds, vals)
    }
}

/// Raw count TF with smoothed IDF
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTFIDFEngine;

impl TFIDFEngine for DefaultTFIDFEngine {
    #[inline]
    fn tf(count: u32) -> f64 {
        count as f64
    }
}

/// `1 + ln(count)` TF with smoothed IDF.
/// Dampens terms repeated many times in one description.
#[derive(Debug, Clone, Copy, Default)]
pub struct SublinearTFIDFEngine;

impl TFIDFEngine for SublinearTFIDFEngine {
    #[inline]
    fn tf(count: u32) -> f64 {
        if count == 0 {
            return 0.0;
        }
        1.0 + (count as f64).ln()
    }
}
