/// This crate is a content-based movie recommender built on TF-IDF vectors.
pub mod config;
pub mod corpus;
pub mod error;
pub mod index;
pub mod ranking;
pub mod utils;
pub mod vectorizer;

/// Fitted Vector Space Index
/// The central struct of this crate. It turns every item's combined
/// text/category profile into a unit-length TF-IDF vector and answers
/// similarity queries between corpus positions.
///
/// Internally, it holds:
/// - The corpus it was fitted on
/// - The vocabulary (term ↔ column)
/// - The IDF vector
/// - One sparse TF-IDF vector per item
/// - The similarity store (dense N×N matrix, or rows computed on demand)
///
/// A `FittedIndex` is immutable. Share it as `Arc<FittedIndex>` and query it
/// from as many threads as needed.
///
/// # Serialization
/// Supported through `to_bytes` / `from_bytes` (CBOR).
/// The similarity matrix is rebuilt on decode.
pub use vectorizer::FittedIndex;

/// Snapshot data structure for deserialization
/// Holds everything a `FittedIndex` needs except the similarity store.
pub use vectorizer::serde::FittedIndexData;

/// Shared Index Holder
/// Holds the current `FittedIndex` for a process. Queries fail with
/// `NotReady` until the first `fit`; later fits are published atomically.
pub use index::SharedIndex;

/// Corpus and Items
/// - `Item`: one cleaned catalog entry (title, description, categories, score, year)
/// - `Corpus`: ordered, title-keyed collection; a position is the item's stable id
pub use corpus::{Corpus, Item};

/// Corpus Builder
/// Validates raw records into `Item`s and drops the ones that break the
/// description/category invariant, reporting why.
pub use corpus::builder::{BuildReport, CorpusBuilder, RawCategories, RawItem, Rejected};

/// Category-filtered ranking
/// Cheap retrieval by category label and quality score that bypasses the vector space.
pub use ranking::rank_by_category;

/// Configuration for fitting
pub use config::{IndexConfig, StopWords};

/// Error types
/// - `ValidationError`: a raw record was rejected by the corpus builder
/// - `IndexError`: `NotReady`, `OutOfRange`, `UnknownTitle`, or a snapshot that fails to decode or disagrees with itself
pub use error::{IndexError, IndexResult, ValidationError};

/// TF IDF Calculation Engine Trait
/// Defines how raw term counts become TF weights (IDF is smoothed by default).
///
/// Provided engines:
/// - `DefaultTFIDFEngine`: raw counts
/// - `SublinearTFIDFEngine`: `1 + ln(count)`
pub use vectorizer::tfidf::{DefaultTFIDFEngine, SublinearTFIDFEngine, TFIDFEngine};

/// Search Hits and Hit Entry structures
/// - `Hits`: ranked list of results, sorted by descending score with position tie-break
/// - `HitEntry`: a single result (corpus position and score)
pub use vectorizer::evaluate::scoring::{HitEntry, Hits};

/// Vocabulary and term frequency
pub use vectorizer::{token::TermFrequency, vocabulary::Vocabulary};
