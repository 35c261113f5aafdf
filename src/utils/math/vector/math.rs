use std::cmp::Ordering;

use num::{Float, Num};

use super::SparseVec;

impl<N> SparseVec<N>
where
    N: Num + Copy,
{
    /// Dot product over the shared indices.
    /// Both sides are walked in ascending index order, so the sum is
    /// accumulated in the same order no matter which side is `self`.
    #[inline]
    pub fn dot(&self, other: &Self) -> N {
        debug_assert_eq!(
            self.len(),
            other.len(),
            "Vectors must be of the same length to compute dot product."
        );

        let self_inds = self.as_ind_slice();
        let self_vals = self.as_val_slice();
        let other_inds = other.as_ind_slice();
        let other_vals = other.as_val_slice();

        let mut result = N::zero();
        let mut i = 0;
        let mut j = 0;
        while i < self_inds.len() && j < other_inds.len() {
            match self_inds[i].cmp(&other_inds[j]) {
                Ordering::Equal => {
                    result = result + self_vals[i] * other_vals[j];
                    i += 1;
                    j += 1;
                }
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
            }
        }
        result
    }

    #[inline]
    pub fn norm_sq(&self) -> N {
        self.as_val_slice()
            .iter()
            .fold(N::zero(), |acc, &v| acc + v * v)
    }
}

impl<N> SparseVec<N>
where
    N: Float,
{
    /// Euclidean (L2) norm
    #[inline]
    pub fn norm(&self) -> N {
        self.norm_sq().sqrt()
    }

    /// Scale to unit L2 length.
    /// A zero vector stays zero.
    pub fn normalize_l2(&mut self) {
        let norm = self.norm();
        if norm == N::zero() || !norm.is_finite() {
            return;
        }
        let inv = norm.recip();
        for v in self.values.iter_mut() {
            *v = *v * inv;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_over_shared_indices() {
        let a = SparseVec::from_unsorted(6, vec![0, 2, 5], vec![1.0, 2.0, 3.0]);
        let b = SparseVec::from_unsorted(6, vec![2, 3, 5], vec![4.0, 9.0, 0.5]);
        assert_eq!(a.dot(&b), 2.0 * 4.0 + 3.0 * 0.5);
        assert_eq!(a.dot(&b), b.dot(&a));
    }

    #[test]
    fn normalize_gives_unit_length() {
        let mut a = SparseVec::from_unsorted(4, vec![1, 3], vec![3.0f64, 4.0]);
        a.normalize_l2();
        assert!((a.norm() - 1.0).abs() < 1e-12);
        assert!((a.get(1) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn zero_vector_stays_zero() {
        let mut z: SparseVec<f64> = SparseVec::new(3);
        z.normalize_l2();
        assert_eq!(z.nnz(), 0);
        let a = SparseVec::from_unsorted(3, vec![0], vec![1.0]);
        assert_eq!(a.dot(&z), 0.0);
    }
}
