pub mod math;
pub mod serde;

use num::Num;
use ::serde::Serialize;

use crate::utils::sort::sort_soa_by_index;

/// Storage invariant broken by parts handed to `SparseVec::from_sorted_parts`
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SparseVecError {
    #[error("{indices} indices but {values} values")]
    LengthMismatch { indices: usize, values: usize },

    #[error("index {index} does not follow the previous index")]
    Unsorted { index: u32 },

    #[error("index {index} out of dimension {len}")]
    OutOfDimension { index: u32, len: usize },

    #[error("zero stored at index {index}")]
    StoredZero { index: u32 },
}

/// SparseVec stores only the non-zero elements of a vector.
/// It keeps `indices` and `values` side by side;
/// `indices` holds the position of each element and
/// `values` holds its value.
///
/// Elements are guaranteed to be sorted by ascending index,
/// and no index appears twice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SparseVec<N>
where
    N: Num + Copy,
{
    indices: Vec<u32>,
    values: Vec<N>,
    /// logical dimension
    len: usize,
}

impl<N> SparseVec<N>
where
    N: Num + Copy,
{
    #[inline]
    pub fn new(len: usize) -> Self {
        SparseVec {
            indices: Vec::new(),
            values: Vec::new(),
            len,
        }
    }

    /// Build from (index, value) pairs in any order.
    /// Zero values are dropped; repeated indices are summed.
    pub fn from_unsorted(len: usize, mut indices: Vec<u32>, mut values: Vec<N>) -> Self {
        debug_assert_eq!(indices.len(), values.len());
        sort_soa_by_index(&mut indices, &mut values);

        let mut vec = SparseVec {
            indices: Vec::with_capacity(indices.len()),
            values: Vec::with_capacity(values.len()),
            len,
        };
        for (ind, val) in indices.into_iter().zip(values) {
            debug_assert!((ind as usize) < len, "index {ind} out of dimension {len}");
            match vec.indices.last() {
                Some(&last) if last == ind => {
                    if let Some(acc) = vec.values.last_mut() {
                        *acc = *acc + val;
                    }
                }
                _ => {
                    vec.indices.push(ind);
                    vec.values.push(val);
                }
            }
        }
        vec.drop_zeros();
        vec
    }

    /// Take parts that already hold the storage invariant, checking it
    pub fn from_sorted_parts(len: usize, indices: Vec<u32>, values: Vec<N>) -> Result<Self, SparseVecError> {
        if indices.len() != values.len() {
            return Err(SparseVecError::LengthMismatch {
                indices: indices.len(),
                values: values.len(),
            });
        }
        let mut prev: Option<u32> = None;
        for (&index, &value) in indices.iter().zip(values.iter()) {
            if prev.map_or(false, |p| index <= p) {
                return Err(SparseVecError::Unsorted { index });
            }
            if index as usize >= len {
                return Err(SparseVecError::OutOfDimension { index, len });
            }
            if value == N::zero() {
                return Err(SparseVecError::StoredZero { index });
            }
            prev = Some(index);
        }
        Ok(SparseVec { indices, values, len })
    }

    fn drop_zeros(&mut self) {
        if self.values.iter().all(|v| *v != N::zero()) {
            return;
        }
        let mut keep_inds = Vec::with_capacity(self.indices.len());
        let mut keep_vals = Vec::with_capacity(self.values.len());
        for (&ind, &val) in self.indices.iter().zip(self.values.iter()) {
            if val != N::zero() {
                keep_inds.push(ind);
                keep_vals.push(val);
            }
        }
        self.indices = keep_inds;
        self.values = keep_vals;
    }

    /// logical dimension
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// number of stored (non-zero) elements
    #[inline]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Value at index, zero when not stored
    #[inline]
    pub fn get(&self, index: usize) -> N {
        if index >= self.len {
            return N::zero();
        }
        match self.indices.binary_search(&(index as u32)) {
            Ok(pos) => self.values[pos],
            Err(_) => N::zero(),
        }
    }

    /// (index, value) of the stored elements in ascending index order
    #[inline]
    pub fn raw_iter(&self) -> impl Iterator<Item = (usize, N)> + '_ {
        self.indices
            .iter()
            .zip(self.values.iter())
            .map(|(&i, &v)| (i as usize, v))
    }

    #[inline]
    pub fn as_ind_slice(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn as_val_slice(&self) -> &[N] {
        &self.values
    }

    #[inline]
    pub fn shrink_to_fit(&mut self) {
        self.indices.shrink_to_fit();
        self.values.shrink_to_fit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_unsorted_sorts_merges_and_drops_zeros() {
        let v = SparseVec::from_unsorted(10, vec![7, 2, 7, 4, 9], vec![1.0, 2.0, 0.5, 0.0, -1.0]);
        assert_eq!(v.as_ind_slice(), &[2, 7, 9]);
        assert_eq!(v.as_val_slice(), &[2.0, 1.5, -1.0]);
        assert_eq!(v.nnz(), 3);
        assert_eq!(v.len(), 10);
    }

    #[test]
    fn get_returns_zero_for_missing() {
        let v = SparseVec::from_unsorted(5, vec![1, 3], vec![4.0f64, 5.0]);
        assert_eq!(v.get(1), 4.0);
        assert_eq!(v.get(2), 0.0);
        assert_eq!(v.get(99), 0.0);
    }

    #[test]
    fn sorted_parts_are_checked() {
        let v = SparseVec::from_sorted_parts(5, vec![0, 3], vec![1.0, 2.0]).unwrap();
        assert_eq!(v.get(3), 2.0);
        assert_eq!(
            SparseVec::from_sorted_parts(5, vec![0, 3], vec![1.0]),
            Err(SparseVecError::LengthMismatch { indices: 2, values: 1 })
        );
        assert_eq!(
            SparseVec::from_sorted_parts(5, vec![3, 3], vec![1.0, 2.0]),
            Err(SparseVecError::Unsorted { index: 3 })
        );
        assert_eq!(
            SparseVec::from_sorted_parts(3, vec![1, 4], vec![1.0, 2.0]),
            Err(SparseVecError::OutOfDimension { index: 4, len: 3 })
        );
        assert_eq!(
            SparseVec::from_sorted_parts(3, vec![1], vec![0.0]),
            Err(SparseVecError::StoredZero { index: 1 })
        );
    }

    #[test]
    fn summed_duplicates_that_cancel_are_dropped() {
        let v = SparseVec::from_unsorted(4, vec![1, 1, 2], vec![1.0, -1.0, 3.0]);
        assert_eq!(v.raw_iter().collect::<Vec<_>>(), vec![(2, 3.0)]);
    }
}
