use crate::corpus::{Corpus, Item};

/// Items carrying `category` (case-normalized), best quality score first.
///
/// Equal scores keep corpus order. Returns at most `n` items and an empty
/// vector when nothing matches. The vector space is never consulted.
pub fn rank_by_category<'a>(corpus: &'a Corpus, category: &str, n: usize) -> Vec<&'a Item> {
    if n == 0 {
        return Vec::new();
    }
    let mut matches: Vec<&Item> = corpus.iter().filter(|item| item.has_category(category)).collect();
    // stable: ties stay in corpus order
    matches.sort_by(|a, b| b.score().total_cmp(&a.score()));
    matches.truncate(n);
    matches
}
