use num::Num;
use serde::{de, Deserialize, Deserializer};

use super::SparseVec;

impl<'de, N> Deserialize<'de> for SparseVec<N>
where
    N: Num + Deserialize<'de> + Copy,
{
    /// Decoded parts must already hold the storage invariant.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct SparseVecData<N> {
            indices: Vec<u32>,
            values: Vec<N>,
            len: usize,
        }

        let data = SparseVecData::deserialize(deserializer)?;
        SparseVec::from_sorted_parts(data.len, data.indices, data.values).map_err(de::Error::custom)
    }
}
