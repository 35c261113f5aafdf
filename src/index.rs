use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::{
    config::IndexConfig,
    corpus::{Corpus, Item},
    error::{IndexError, IndexResult},
    vectorizer::{evaluate::scoring::Hits, FittedIndex},
};

/// Process-wide holder of the current `FittedIndex`.
///
/// Starts Unfitted; every query then fails with `NotReady`.
/// `fit` builds the new index without holding any lock readers need,
/// then publishes it with a single swap, so a reader sees either the
/// old index or the new one and never a partial build.
#[derive(Debug, Default)]
pub struct SharedIndex {
    current: RwLock<Option<Arc<FittedIndex>>>,
    /// serializes concurrent `fit` calls
    fit_guard: Mutex<()>,
}

impl SharedIndex {
    /// Create an unfitted holder
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
            fit_guard: Mutex::new(()),
        }
    }

    /// Fit `corpus` and publish the result, replacing any previous index
    pub fn fit(&self, corpus: impl Into<Arc<Corpus>>, config: IndexConfig) -> Arc<FittedIndex> {
        let _fitting = self.fit_guard.lock().unwrap_or_else(PoisonError::into_inner);
        let fitted = Arc::new(FittedIndex::fit(corpus, config));
        self.publish(Arc::clone(&fitted));
        fitted
    }

    /// Publish an index built elsewhere (e.g. decoded from a snapshot)
    pub fn publish(&self, fitted: Arc<FittedIndex>) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Some(fitted);
    }

    pub fn is_fitted(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The current index, or `NotReady`.
    /// Hold on to the returned `Arc` to run several queries against one fit.
    pub fn snapshot(&self) -> IndexResult<Arc<FittedIndex>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(IndexError::NotReady)
    }

    pub fn similarity(&self, i: usize, j: usize) -> IndexResult<f64> {
        self.snapshot()?.similarity(i, j)
    }

    pub fn top_k(&self, i: usize, k: usize) -> IndexResult<Hits> {
        self.snapshot()?.top_k(i, k)
    }

    pub fn top_k_with(&self, i: usize, k: usize, exclude_self: bool) -> IndexResult<Hits> {
        self.snapshot()?.top_k_with(i, k, exclude_self)
    }

    /// Owned `(Item, score)` pairs for the item titled `title`
    pub fn recommend(&self, title: &str, k: usize) -> IndexResult<Vec<(Item, f64)>> {
        let fitted = self.snapshot()?;
        let recs = fitted
            .recommend(title, k)?
            .into_iter()
            .map(|(item, score)| (item.clone(), score))
            .collect();
        Ok(recs)
    }
}
