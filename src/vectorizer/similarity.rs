use rayon::prelude::*;

use crate::utils::math::vector::SparseVec;

/// Where pairwise similarity comes from.
/// Small corpora get the full matrix once, large ones compute rows per query.
#[derive(Debug, Clone, PartialEq)]
pub enum SimilarityStore {
    Dense(DenseMatrix),
    OnDemand,
}

/// Row-major N×N matrix of cosine similarity values
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    n: usize,
    data: Vec<f32>,
}

impl DenseMatrix {
    /// Compute every unordered pair once and mirror it, rows in parallel
    pub fn build(documents: &[SparseVec<f64>]) -> Self {
        let n = documents.len();
        let upper: Vec<Vec<f32>> = (0..n)
            .into_par_iter()
            .map(|i| {
                ((i + 1)..n)
                    .map(|j| pair_similarity(documents, i, j) as f32)
                    .collect()
            })
            .collect();

        let mut data = vec![0.0f32; n * n];
        for (i, row) in upper.into_iter().enumerate() {
            data[i * n + i] = 1.0;
            for (offset, value) in row.into_iter().enumerate() {
                let j = i + 1 + offset;
                data[i * n + j] = value;
                data[j * n + i] = value;
            }
        }
        Self { n, data }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j] as f64
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.n..(i + 1) * self.n]
    }
}

impl SimilarityStore {
    /// Materialize when the corpus is at most `dense_threshold` items
    pub fn build(documents: &[SparseVec<f64>], dense_threshold: usize) -> Self {
        if documents.len() <= dense_threshold {
            SimilarityStore::Dense(DenseMatrix::build(documents))
        } else {
            SimilarityStore::OnDemand
        }
    }

    pub fn is_dense(&self) -> bool {
        matches!(self, SimilarityStore::Dense(_))
    }

    /// Similarity of two valid positions
    #[inline]
    pub fn get(&self, documents: &[SparseVec<f64>], i: usize, j: usize) -> f64 {
        match self {
            SimilarityStore::Dense(matrix) => matrix.get(i, j),
            SimilarityStore::OnDemand => pair_similarity(documents, i, j),
        }
    }

    /// Similarity of position `i` against every position
    pub fn row(&self, documents: &[SparseVec<f64>], i: usize) -> Vec<f64> {
        match self {
            SimilarityStore::Dense(matrix) => matrix.row(i).iter().map(|&v| v as f64).collect(),
            SimilarityStore::OnDemand => (0..documents.len())
                .into_par_iter()
                .map(|j| pair_similarity(documents, i, j))
                .collect(),
        }
    }
}

/// Dot product of two unit vectors, clamped to [0, 1].
/// The diagonal is pinned to 1 so it stays maximal even for zero vectors.
#[inline]
pub(crate) fn pair_similarity(documents: &[SparseVec<f64>], i: usize, j: usize) -> f64 {
    if i == j {
        return 1.0;
    }
    documents[i].dot(&documents[j]).clamp(0.0, 1.0)
}
