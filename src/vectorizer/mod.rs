pub mod token;
pub mod vocabulary;
pub mod tfidf;
pub mod similarity;
pub mod serde;
pub mod evaluate;

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::{
    config::IndexConfig,
    corpus::{Corpus, Item},
    error::{IndexError, IndexResult},
    utils::math::vector::SparseVec,
    vectorizer::{
        evaluate::scoring::Hits,
        similarity::SimilarityStore,
        tfidf::{DefaultTFIDFEngine, IDFVector, TFIDFEngine},
        token::{TermFrequency, Tokenizer},
        vocabulary::Vocabulary,
    },
};

/// A fitted vector space over one corpus.
///
/// Holds:
/// - The corpus it was fitted on (shared, immutable)
/// - The vocabulary (term ↔ column)
/// - The IDF vector
/// - One unit-length TF-IDF vector per corpus position
/// - The similarity store (dense matrix or on-demand rows)
///
/// The value never changes after `fit`, so it can be shared as
/// `Arc<FittedIndex>` and queried from any number of threads.
#[derive(Debug, Clone)]
pub struct FittedIndex {
    corpus: Arc<Corpus>,
    config: IndexConfig,
    vocabulary: Vocabulary,
    idf: IDFVector,
    /// unit-length document vectors, by corpus position
    documents: Vec<SparseVec<f64>>,
    similarity: SimilarityStore,
}

impl FittedIndex {
    /// Fit with raw-count TF and smoothed IDF
    pub fn fit(corpus: impl Into<Arc<Corpus>>, config: IndexConfig) -> Self {
        Self::fit_with_engine::<DefaultTFIDFEngine>(corpus, config)
    }

    /// Fit with a caller chosen weighting engine
    pub fn fit_with_engine<E: TFIDFEngine>(corpus: impl Into<Arc<Corpus>>, config: IndexConfig) -> Self {
        let corpus = corpus.into();
        let tokenizer = Tokenizer::from_config(&config);
        let items: Vec<&Item> = corpus.iter().collect();
        let freqs: Vec<TermFrequency> = items
            .par_iter()
            .map(|item| tokenizer.term_frequency(item.profile()))
            .collect();

        let vocabulary = Vocabulary::from_term_frequencies(&freqs);
        let idf = E::idf_vec(&vocabulary);
        let documents = Self::vectorize::<E>(&freqs, &vocabulary, &idf);

        for (item, doc) in items.iter().zip(documents.iter()) {
            if doc.nnz() == 0 {
                warn!(title = item.title(), "profile has no vocabulary terms");
            }
        }

        let similarity = SimilarityStore::build(&documents, config.dense_threshold);
        info!(
            items = documents.len(),
            vocabulary = vocabulary.len(),
            dense = similarity.is_dense(),
            "index fitted"
        );
        Self::from_parts(corpus, config, vocabulary, idf, documents, similarity)
    }

    fn vectorize<E: TFIDFEngine>(
        freqs: &[TermFrequency],
        vocabulary: &Vocabulary,
        idf: &IDFVector,
    ) -> Vec<SparseVec<f64>> {
        freqs
            .par_iter()
            .map(|freq| {
                let mut vec = E::tf_idf_vec(freq, vocabulary, idf);
                vec.normalize_l2();
                vec.shrink_to_fit();
                vec
            })
            .collect()
    }

    pub(crate) fn from_parts(
        corpus: Arc<Corpus>,
        config: IndexConfig,
        vocabulary: Vocabulary,
        idf: IDFVector,
        documents: Vec<SparseVec<f64>>,
        similarity: SimilarityStore,
    ) -> Self {
        Self {
            corpus,
            config,
            vocabulary,
            idf,
            documents,
            similarity,
        }
    }
}

impl FittedIndex {
    pub fn corpus(&self) -> &Arc<Corpus> {
        &self.corpus
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn idf(&self) -> &IDFVector {
        &self.idf
    }

    pub(crate) fn documents(&self) -> &[SparseVec<f64>] {
        &self.documents
    }

    /// Number of corpus positions
    #[inline]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Whether the full similarity matrix is materialized
    pub fn is_dense(&self) -> bool {
        self.similarity.is_dense()
    }

    fn check_position(&self, position: usize) -> IndexResult<()> {
        if position >= self.len() {
            return Err(IndexError::OutOfRange(format!(
                "position {} in a corpus of {} items",
                position,
                self.len()
            )));
        }
        Ok(())
    }

    /// Unit-length TF-IDF vector of a corpus position
    pub fn document_vector(&self, position: usize) -> IndexResult<&SparseVec<f64>> {
        self.check_position(position)?;
        Ok(&self.documents[position])
    }

    /// Cosine similarity of two corpus positions, in [0, 1].
    /// Symmetric, and `similarity(i, i)` is always the maximum (1.0).
    pub fn similarity(&self, i: usize, j: usize) -> IndexResult<f64> {
        self.check_position(i)?;
        self.check_position(j)?;
        Ok(self.similarity.get(&self.documents, i, j))
    }

    /// Similarity of position `i` against every position, in corpus order
    pub fn similarity_row(&self, i: usize) -> IndexResult<Vec<f64>> {
        self.check_position(i)?;
        Ok(self.similarity.row(&self.documents, i))
    }

    /// The `k` positions most similar to `i`, self excluded.
    pub fn top_k(&self, i: usize, k: usize) -> IndexResult<Hits> {
        self.top_k_with(i, k, true)
    }

    /// The `k` positions most similar to `i`, descending by score,
    /// ties broken by ascending position.
    pub fn top_k_with(&self, i: usize, k: usize, exclude_self: bool) -> IndexResult<Hits> {
        self.check_position(i)?;
        if k == 0 {
            return Err(IndexError::OutOfRange("k must be at least 1".to_string()));
        }
        let row = self.similarity.row(&self.documents, i);
        let exclude = if exclude_self { Some(i) } else { None };
        let mut hits = Hits::from_row(&row, exclude);
        hits.sort_by_score().truncate(k);
        Ok(hits)
    }

    /// Items most similar to the item titled `title`, with their scores
    pub fn recommend(&self, title: &str, k: usize) -> IndexResult<Vec<(&Item, f64)>> {
        let position = self
            .corpus
            .position_of(title)
            .ok_or_else(|| IndexError::UnknownTitle(title.to_string()))?;
        let hits = self.top_k(position, k)?;
        Ok(hits
            .into_iter()
            .filter_map(|hit| self.corpus.get(hit.position).map(|item| (item, hit.score)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::StopWords,
        corpus::builder::{CorpusBuilder, RawCategories, RawItem},
        vectorizer::tfidf::SublinearTFIDFEngine,
    };

    fn raw(title: &str, description: &str, category: &str, score: f64) -> RawItem {
        RawItem {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            categories: Some(RawCategories::Labels(vec![category.to_string()])),
            score: Some(score),
            year: Some(2000),
        }
    }

    fn example_corpus() -> Corpus {
        let rows = vec![
            raw("A", "space opera rebellion", "Action", 7.0),
            raw("B", "space opera rebellion empire", "Action", 8.5),
            raw("C", "cooking show recipes", "Comedy", 6.0),
        ];
        CorpusBuilder::new().build_all(&rows).0
    }

    fn larger_corpus() -> Corpus {
        let rows = vec![
            raw("Alien", "A crew aboard a space ship meets a deadly creature", "Horror", 8.1),
            raw("Aliens", "Marines return to the planet to fight the deadly creature", "Action", 8.3),
            raw("Up", "An old man ties balloons to his house and flies away", "Animation", 7.7),
            raw("Ratatouille", "A rat dreams of cooking in a Paris restaurant", "Animation", 7.6),
            raw("Chef", "A chef quits a restaurant and starts a food truck", "Comedy", 7.3),
            raw("Gravity", "Two astronauts are stranded in space after debris hits", "Drama", 7.7),
            raw("The the", "the of and", "Drama", 5.0),
        ];
        CorpusBuilder::new().build_all(&rows).0
    }

    #[test]
    fn example_similarity_and_top_k() {
        let index = FittedIndex::fit(example_corpus(), IndexConfig::default());
        let ab = index.similarity(0, 1).unwrap();
        let ac = index.similarity(0, 2).unwrap();
        assert!(ab > 0.5, "ab = {ab}");
        assert!(ac < 1e-6, "ac = {ac}");

        let hits = index.top_k(0, 1).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits.list[0].position, 1);
        assert!((hits.list[0].score - ab).abs() < 1e-12);
    }

    #[test]
    fn similarity_is_symmetric_with_maximal_diagonal() {
        for threshold in [0usize, 100] {
            let config = IndexConfig::default().with_dense_threshold(threshold);
            let index = FittedIndex::fit(larger_corpus(), config);
            let n = index.len();
            let mut global_max = 0.0f64;
            for i in 0..n {
                for j in 0..n {
                    let s = index.similarity(i, j).unwrap();
                    assert!((0.0..=1.0).contains(&s));
                    assert_eq!(s, index.similarity(j, i).unwrap());
                    global_max = global_max.max(s);
                }
            }
            for i in 0..n {
                assert_eq!(index.similarity(i, i).unwrap(), global_max);
            }
        }
    }

    #[test]
    fn top_k_size_order_and_self_exclusion() {
        let index = FittedIndex::fit(larger_corpus(), IndexConfig::default());
        let n = index.len();
        for i in 0..n {
            for k in [1usize, 3, n - 1, n + 5] {
                let hits = index.top_k(i, k).unwrap();
                assert_eq!(hits.len(), k.min(n - 1));
                assert!(!hits.positions().contains(&i));
                for pair in hits.list.windows(2) {
                    assert!(
                        pair[0].score > pair[1].score
                            || (pair[0].score == pair[1].score && pair[0].position < pair[1].position)
                    );
                }
            }
        }
    }

    #[test]
    fn top_k_can_include_self() {
        let index = FittedIndex::fit(example_corpus(), IndexConfig::default());
        let hits = index.top_k_with(2, 3, false).unwrap();
        assert_eq!(hits.list[0], evaluate::scoring::HitEntry { position: 2, score: 1.0 });
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn zero_score_ties_follow_position() {
        let index = FittedIndex::fit(example_corpus(), IndexConfig::default());
        // C shares nothing with A or B
        let hits = index.top_k(2, 2).unwrap();
        assert_eq!(hits.positions(), vec![0, 1]);
    }

    #[test]
    fn refit_is_deterministic() {
        let a = FittedIndex::fit(larger_corpus(), IndexConfig::default());
        let b = FittedIndex::fit(larger_corpus(), IndexConfig::default());
        assert_eq!(a.vocabulary(), b.vocabulary());
        assert_eq!(a.idf(), b.idf());
        for i in 0..a.len() {
            assert_eq!(a.similarity_row(i).unwrap(), b.similarity_row(i).unwrap());
        }
    }

    #[test]
    fn dense_and_on_demand_rank_alike() {
        let dense = FittedIndex::fit(larger_corpus(), IndexConfig::default());
        let lazy = FittedIndex::fit(larger_corpus(), IndexConfig::default().with_dense_threshold(1));
        assert!(dense.is_dense());
        assert!(!lazy.is_dense());
        let a = dense.top_k(0, 3).unwrap();
        let b = lazy.top_k(0, 3).unwrap();
        assert_eq!(a.positions(), b.positions());
    }

    #[test]
    fn stop_words_and_categories_shape_vocabulary() {
        let index = FittedIndex::fit(example_corpus(), IndexConfig::default());
        let vocab = index.vocabulary();
        assert!(vocab.contains_term("action"));
        assert!(vocab.contains_term("empire"));
        assert!(!vocab.contains_term("the"));

        let keep_all = FittedIndex::fit(
            larger_corpus(),
            IndexConfig::default().with_stop_words(StopWords::None),
        );
        assert!(keep_all.vocabulary().contains_term("the"));
    }

    #[test]
    fn document_vectors_are_unit_length() {
        let index = FittedIndex::fit(larger_corpus(), IndexConfig::default());
        for i in 0..index.len() {
            let v = index.document_vector(i).unwrap();
            if v.nnz() > 0 {
                assert!((v.norm() - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn out_of_range_queries_fail() {
        let index = FittedIndex::fit(example_corpus(), IndexConfig::default());
        assert!(matches!(index.similarity(0, 3), Err(IndexError::OutOfRange(_))));
        assert!(matches!(index.top_k(3, 1), Err(IndexError::OutOfRange(_))));
        assert!(matches!(index.top_k(0, 0), Err(IndexError::OutOfRange(_))));
    }

    #[test]
    fn empty_corpus_fits_and_rejects_queries() {
        let index = FittedIndex::fit(Corpus::new(), IndexConfig::default());
        assert!(index.is_empty());
        assert!(index.vocabulary().is_empty());
        assert!(matches!(index.top_k(0, 1), Err(IndexError::OutOfRange(_))));
        assert!(matches!(index.similarity(0, 0), Err(IndexError::OutOfRange(_))));
    }

    #[test]
    fn recommend_by_title() {
        let index = FittedIndex::fit(larger_corpus(), IndexConfig::default());
        let recs = index.recommend("Alien", 1).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].0.title(), "Aliens");
        assert!(matches!(index.recommend("Nope", 1), Err(IndexError::UnknownTitle(_))));
    }

    #[test]
    fn sublinear_engine_keeps_invariants() {
        let index = FittedIndex::fit_with_engine::<SublinearTFIDFEngine>(larger_corpus(), IndexConfig::default());
        let hits = index.top_k(0, 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(index.similarity(1, 4).unwrap(), index.similarity(4, 1).unwrap());
    }
}
