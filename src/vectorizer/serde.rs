use std::sync::Arc;

use serde::{ser::SerializeStruct, Deserialize, Serialize};

use crate::{
    config::IndexConfig,
    corpus::Corpus,
    error::{IndexError, IndexResult},
    utils::math::vector::SparseVec,
    vectorizer::{similarity::SimilarityStore, tfidf::IDFVector, vocabulary::Vocabulary, FittedIndex},
};

/// Deserialization form of `FittedIndex`.
/// It carries everything except the similarity store, which is rebuilt by
/// `into_fitted_index` according to the stored config once the parts
/// have been checked against each other.
#[derive(Debug, Deserialize)]
pub struct FittedIndexData {
    pub corpus: Corpus,
    pub config: IndexConfig,
    pub vocabulary: Vocabulary,
    pub idf: IDFVector,
    pub documents: Vec<SparseVec<f64>>,
}

impl FittedIndexData {
    /// Convert into a queryable `FittedIndex`.
    /// Fails with `InconsistentSnapshot` when the parts do not describe one fit.
    pub fn into_fitted_index(self) -> IndexResult<FittedIndex> {
        self.check()?;
        let similarity = SimilarityStore::build(&self.documents, self.config.dense_threshold);
        Ok(FittedIndex::from_parts(
            Arc::new(self.corpus),
            self.config,
            self.vocabulary,
            self.idf,
            self.documents,
            similarity,
        ))
    }

    fn check(&self) -> IndexResult<()> {
        let n = self.corpus.len();
        let dim = self.vocabulary.len();
        if self.documents.len() != n {
            return Err(inconsistent(format!("{} document vectors for {n} items", self.documents.len())));
        }
        if !self.vocabulary.is_consistent() {
            return Err(inconsistent("vocabulary document frequencies do not match its terms".to_string()));
        }
        if self.vocabulary.doc_num() != n as u64 || self.idf.doc_num != n as u64 {
            return Err(inconsistent(format!(
                "document counts {} / {} for {n} items",
                self.vocabulary.doc_num(),
                self.idf.doc_num
            )));
        }
        if self.idf.idf_vec.len() != dim {
            return Err(inconsistent(format!("{} idf weights for {dim} terms", self.idf.idf_vec.len())));
        }
        if self.idf.idf_vec.iter().any(|w| !w.is_finite()) {
            return Err(inconsistent("non-finite idf weight".to_string()));
        }
        for (position, doc) in self.documents.iter().enumerate() {
            if doc.len() != dim {
                return Err(inconsistent(format!(
                    "document {position} has dimension {} for {dim} terms",
                    doc.len()
                )));
            }
            if doc.as_val_slice().iter().any(|v| !v.is_finite()) {
                return Err(inconsistent(format!("document {position} holds a non-finite weight")));
            }
        }
        Ok(())
    }
}

impl Serialize for FittedIndex {
    /// The similarity matrix is derived data and is left out.
    /// Use `FittedIndexData` to deserialize.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("FittedIndex", 5)?;
        state.serialize_field("corpus", self.corpus().as_ref())?;
        state.serialize_field("config", self.config())?;
        state.serialize_field("vocabulary", self.vocabulary())?;
        state.serialize_field("idf", self.idf())?;
        state.serialize_field("documents", self.documents())?;
        state.end()
    }
}

impl FittedIndex {
    /// Encode as CBOR bytes. Writing them anywhere is up to the caller.
    pub fn to_bytes(&self) -> IndexResult<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }

    /// Decode CBOR bytes produced by `to_bytes`
    pub fn from_bytes(bytes: &[u8]) -> IndexResult<Self> {
        let data: FittedIndexData = serde_cbor::from_slice(bytes)?;
        data.into_fitted_index()
    }
}

fn inconsistent(reason: String) -> IndexError {
    IndexError::InconsistentSnapshot(reason)
}
