/// Reasons a raw record is rejected by the corpus builder.
/// Rejected records are dropped from the batch, they never abort it.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("record has no title")]
    MissingTitle,

    #[error("record has no description")]
    MissingDescription,

    #[error("record has no quality score")]
    MissingScore,

    #[error("quality score is not a finite number: {0}")]
    InvalidScore(f64),

    #[error("record has no release year")]
    MissingYear,

    #[error("record has no category field")]
    MissingCategories,

    #[error("category list could not be parsed: {0}")]
    UnparsableCategories(String),

    #[error("category list is empty")]
    NoCategories,

    #[error("title already present in corpus: {0}")]
    DuplicateTitle(String),
}

/// Query and fit errors of the vector space index
#[derive(thiserror::Error, Debug)]
pub enum IndexError {
    #[error("index is not fitted yet")]
    NotReady,

    #[error("out of range: {0}")]
    OutOfRange(String),

    #[error("unknown title: {0}")]
    UnknownTitle(String),

    #[error("snapshot codec error: {0}")]
    Snapshot(#[from] serde_cbor::Error),

    #[error("snapshot parts disagree: {0}")]
    InconsistentSnapshot(String),
}

pub type IndexResult<T> = Result<T, IndexError>;
