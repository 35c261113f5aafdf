pub mod builder;

use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize, Serializer};

use crate::{
    corpus::builder::{CorpusBuilder, RawItem},
    error::ValidationError,
};

/// A cleaned catalog entry.
/// Built only through `CorpusBuilder`, which guarantees a non-empty
/// description and at least one category label.
/// Deserializing goes through the same checks and recomputes the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawItem")]
pub struct Item {
    title: Box<str>,
    description: Box<str>,
    /// first-seen display form, deduplicated case-insensitively
    categories: IndexSet<Box<str>>,
    score: f64,
    year: i32,
    /// description + " " + categories joined by " "
    #[serde(skip_serializing)]
    profile: Box<str>,
}

impl Item {
    pub(crate) fn new(
        title: Box<str>,
        description: Box<str>,
        categories: IndexSet<Box<str>>,
        score: f64,
        year: i32,
    ) -> Self {
        let mut profile = String::with_capacity(
            description.len() + categories.iter().map(|c| c.len() + 1).sum::<usize>(),
        );
        profile.push_str(&description);
        for category in &categories {
            profile.push(' ');
            profile.push_str(category);
        }
        Self {
            title,
            description,
            categories,
            score,
            year,
            profile: profile.into_boxed_str(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.as_ref())
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Combined text profile that the vectorizer consumes
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Case-normalized category membership
    pub fn has_category(&self, category: &str) -> bool {
        let wanted = normalize_label(category).to_lowercase();
        self.categories.iter().any(|c| c.to_lowercase() == wanted)
    }
}

impl TryFrom<RawItem> for Item {
    type Error = ValidationError;

    fn try_from(raw: RawItem) -> Result<Self, Self::Error> {
        CorpusBuilder::new().build(&raw)
    }
}

/// Ordered, title-keyed collection of items.
/// The position of an item is its stable identifier in the similarity matrix.
///
/// Serialized as the sequence of its items; decoding re-keys them by title
/// and fails on a repeated title.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Vec<Item>")]
pub struct Corpus {
    items: IndexMap<Box<str>, Item>,
}

impl Serialize for Corpus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

impl TryFrom<Vec<Item>> for Corpus {
    type Error = ValidationError;

    fn try_from(items: Vec<Item>) -> Result<Self, Self::Error> {
        let mut corpus = Corpus::new();
        for item in items {
            corpus
                .push(item)
                .map_err(|dup| ValidationError::DuplicateTitle(dup.title().to_string()))?;
        }
        Ok(corpus)
    }
}

impl Corpus {
    /// Create an empty corpus
    pub fn new() -> Self {
        Self {
            items: IndexMap::new(),
        }
    }

    /// Append an item. Returns the item back when its title is already taken.
    pub(crate) fn push(&mut self, item: Item) -> Result<usize, Item> {
        if self.items.contains_key(item.title()) {
            return Err(item);
        }
        let (position, _) = self.items.insert_full(item.title.clone(), item);
        Ok(position)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at corpus position
    pub fn get(&self, position: usize) -> Option<&Item> {
        self.items.get_index(position).map(|(_, item)| item)
    }

    /// Item by title
    pub fn get_by_title(&self, title: &str) -> Option<&Item> {
        self.items.get(title)
    }

    /// Corpus position of a title
    pub fn position_of(&self, title: &str) -> Option<usize> {
        self.items.get_index_of(title)
    }

    /// Items in corpus order
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Sorted, distinct category labels across the corpus.
    /// Labels differing only by case are reported once, in their first-seen form.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: BTreeMap<String, &str> = BTreeMap::new();
        for item in self.iter() {
            for category in item.categories() {
                seen.entry(category.to_lowercase()).or_insert(category);
            }
        }
        let mut labels: Vec<&str> = seen.into_values().collect();
        labels.sort_unstable();
        labels
    }
}

/// Trim and collapse inner whitespace runs to a single space
pub(crate) fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ")
}
