use std::fmt::{self, Debug, Display};

/// One ranked result: corpus position and its similarity to the query item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitEntry {
    pub position: usize,
    pub score: f64,
}

/// Structure to store ranked similarity results
#[derive(Clone, PartialEq, Default)]
pub struct Hits {
    pub list: Vec<HitEntry>,
}

impl Hits {
    /// Create a new Hits instance
    pub fn new(list: Vec<HitEntry>) -> Self {
        Hits { list }
    }

    /// Turn a similarity row into hits, optionally leaving one position out
    pub fn from_row(row: &[f64], exclude: Option<usize>) -> Self {
        let list = row
            .iter()
            .enumerate()
            .filter(|(position, _)| Some(*position) != exclude)
            .map(|(position, &score)| HitEntry { position, score })
            .collect();
        Hits { list }
    }

    /// Sort results by descending score.
    /// Equal scores keep ascending position order.
    pub fn sort_by_score(&mut self) -> &mut Self {
        // Remove NaN scores
        self.list.retain(|hit| !hit.score.is_nan());
        self.list.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.position.cmp(&b.position))
        });
        self
    }

    /// Keep the first `k` hits
    pub fn truncate(&mut self, k: usize) -> &mut Self {
        self.list.truncate(k);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn positions(&self) -> Vec<usize> {
        self.list.iter().map(|hit| hit.position).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HitEntry> {
        self.list.iter()
    }
}

impl IntoIterator for Hits {
    type Item = HitEntry;
    type IntoIter = std::vec::IntoIter<HitEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.into_iter()
    }
}

impl Debug for Hits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            // Pretty print with alternate formatting: each hit on a new line
            writeln!(f, "Hits [")?;
            for hit in &self.list {
                writeln!(f, "    #{}: {:.6}", hit.position, hit.score)?;
            }
            write!(f, "]")
        } else {
            f.debug_list().entries(&self.list).finish()
        }
    }
}

impl Display for Hits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (rank, hit) in self.list.iter().enumerate() {
            writeln!(f, "{:>3}. #{} ({:.4})", rank + 1, hit.position, hit.score)?;
        }
        Ok(())
    }
}
