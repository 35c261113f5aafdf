use indexmap::IndexSet;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{corpus::{normalize_label, Corpus, Item}, error::ValidationError};

/// A cleaned-but-unvalidated record as handed over by the dataset loader.
/// Field aliases accept the TMDB column names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawItem {
    pub title: Option<String>,
    #[serde(alias = "overview")]
    pub description: Option<String>,
    #[serde(alias = "genres")]
    pub categories: Option<RawCategories>,
    #[serde(alias = "vote_average")]
    pub score: Option<f64>,
    #[serde(alias = "release_year")]
    pub year: Option<i32>,
}

/// Category labels either already split or still serialized
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawCategories {
    Labels(Vec<String>),
    /// JSON text such as `[{"id": 28, "name": "Action"}]` or `["Action"]`
    Literal(String),
}

/// One entry of a serialized category literal
#[derive(Deserialize)]
#[serde(untagged)]
enum CategoryEntry {
    Named { name: String },
    Bare(String),
}

impl CategoryEntry {
    fn into_label(self) -> String {
        match self {
            CategoryEntry::Named { name } => name,
            CategoryEntry::Bare(name) => name,
        }
    }
}

/// A raw record that did not make it into the corpus
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    /// position of the record in the input batch
    pub row: usize,
    pub title: Option<String>,
    pub reason: ValidationError,
}

/// Outcome of a batch build
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    pub kept: usize,
    pub rejected: Vec<Rejected>,
}

/// Turns raw records into validated `Item`s
#[derive(Debug, Clone, Copy, Default)]
pub struct CorpusBuilder;

impl CorpusBuilder {
    pub fn new() -> Self {
        CorpusBuilder
    }

    /// Validate one raw record. Pure, no side effects.
    pub fn build(&self, raw: &RawItem) -> Result<Item, ValidationError> {
        let title = raw
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ValidationError::MissingTitle)?;
        let description = raw
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or(ValidationError::MissingDescription)?;
        let labels = match &raw.categories {
            Some(RawCategories::Labels(labels)) => labels.clone(),
            Some(RawCategories::Literal(text)) => parse_category_literal(text)?,
            None => return Err(ValidationError::MissingCategories),
        };
        let categories = dedup_labels(labels);
        if categories.is_empty() {
            return Err(ValidationError::NoCategories);
        }
        let score = raw.score.ok_or(ValidationError::MissingScore)?;
        if !score.is_finite() {
            return Err(ValidationError::InvalidScore(score));
        }
        let year = raw.year.ok_or(ValidationError::MissingYear)?;

        Ok(Item::new(title.into(), description.into(), categories, score, year))
    }

    /// Build a whole batch.
    /// Invalid rows and repeated titles are dropped and listed in the report,
    /// the first occurrence of a title wins.
    pub fn build_all<'a, I>(&self, raws: I) -> (Corpus, BuildReport)
    where
        I: IntoIterator<Item = &'a RawItem>,
    {
        let mut corpus = Corpus::new();
        let mut report = BuildReport::default();
        for (row, raw) in raws.into_iter().enumerate() {
            let outcome = self.build(raw).and_then(|item| {
                corpus
                    .push(item)
                    .map_err(|dup| ValidationError::DuplicateTitle(dup.title().to_string()))
            });
            match outcome {
                Ok(_) => report.kept += 1,
                Err(reason) => {
                    debug!(row, title = ?raw.title, %reason, "dropping raw record");
                    report.rejected.push(Rejected {
                        row,
                        title: raw.title.clone(),
                        reason,
                    });
                }
            }
        }
        info!(kept = report.kept, dropped = report.rejected.len(), "corpus built");
        (corpus, report)
    }
}

/// Parse a serialized category list into labels.
/// JSON is tried first, then Python-style single-quoted literals such as
/// `[{'id': 28, 'name': 'Action'}]`. The text is only ever read as data.
pub fn parse_category_literal(text: &str) -> Result<Vec<String>, ValidationError> {
    let text = text.trim();
    let entries: Vec<CategoryEntry> = match serde_json::from_str(text) {
        Ok(entries) => entries,
        Err(json_err) => {
            let requoted = requote_literal(text)
                .ok_or_else(|| ValidationError::UnparsableCategories(json_err.to_string()))?;
            serde_json::from_str(&requoted)
                .map_err(|e| ValidationError::UnparsableCategories(e.to_string()))?
        }
    };
    Ok(entries.into_iter().map(CategoryEntry::into_label).collect())
}

/// Rewrite every quoted string (single or double quotes) as a JSON string.
/// Text outside quotes is copied unchanged. `None` when a quote is left open.
fn requote_literal(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len() + 8);
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\'' && c != '"' {
            out.push(c);
            continue;
        }
        let mut literal = String::new();
        let mut closed = false;
        while let Some(inner) = chars.next() {
            match inner {
                '\\' => match chars.next()? {
                    'n' => literal.push('\n'),
                    't' => literal.push('\t'),
                    escaped => literal.push(escaped),
                },
                quote if quote == c => {
                    closed = true;
                    break;
                }
                other => literal.push(other),
            }
        }
        if !closed {
            return None;
        }
        out.push_str(&serde_json::to_string(&literal).ok()?);
    }
    Some(out)
}

/// Whitespace-normalize labels and collapse case-insensitive duplicates
fn dedup_labels(labels: Vec<String>) -> IndexSet<Box<str>> {
    let mut seen: IndexSet<String> = IndexSet::with_capacity(labels.len());
    let mut out = IndexSet::with_capacity(labels.len());
    for label in labels {
        let label = normalize_label(&label);
        if label.is_empty() {
            continue;
        }
        if seen.insert(label.to_lowercase()) {
            out.insert(label.into_boxed_str());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: &str, description: &str, genres: &str) -> RawItem {
        RawItem {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            categories: Some(RawCategories::Literal(genres.to_string())),
            score: Some(7.5),
            year: Some(2009),
        }
    }

    #[test]
    fn builds_from_tmdb_literal() {
        let r = raw(
            "Avatar",
            "In the 22nd century, a paraplegic Marine...",
            r#"[{"id": 28, "name": "Action"}, {"id": 12, "name": "Adventure"}]"#,
        );
        let item = CorpusBuilder::new().build(&r).unwrap();
        assert_eq!(item.title(), "Avatar");
        assert_eq!(item.categories().collect::<Vec<_>>(), vec!["Action", "Adventure"]);
        assert_eq!(item.profile(), "In the 22nd century, a paraplegic Marine... Action Adventure");
        assert_eq!(item.year(), 2009);
    }

    #[test]
    fn accepts_string_array_literal_and_dedups() {
        let r = raw("X", "desc", r#"["Drama", " drama ", "Science   Fiction"]"#);
        let item = CorpusBuilder::new().build(&r).unwrap();
        assert_eq!(item.categories().collect::<Vec<_>>(), vec!["Drama", "Science Fiction"]);
    }

    #[test]
    fn accepts_single_quoted_literal() {
        let r = raw("X", "desc", r#"[{'id': 28, 'name': 'Action'}, {'id': 10751, 'name': "Children's"}]"#);
        let item = CorpusBuilder::new().build(&r).unwrap();
        assert_eq!(item.categories().collect::<Vec<_>>(), vec!["Action", "Children's"]);

        let labels = parse_category_literal(r"['Rock \'n\' Roll', 'Drama']").unwrap();
        assert_eq!(labels, vec!["Rock 'n' Roll", "Drama"]);
    }

    #[test]
    fn rejects_unparsable_literal() {
        let r = raw("X", "desc", "['Action'");
        let err = CorpusBuilder::new().build(&r).unwrap_err();
        assert!(matches!(err, ValidationError::UnparsableCategories(_)));

        assert!(matches!(
            parse_category_literal("['Action"),
            Err(ValidationError::UnparsableCategories(_))
        ));

        let r = raw("X", "desc", "__import__('os')");
        assert!(matches!(
            CorpusBuilder::new().build(&r),
            Err(ValidationError::UnparsableCategories(_))
        ));
    }

    #[test]
    fn rejects_missing_description_and_empty_categories() {
        let mut r = raw("X", "   ", r#"["Drama"]"#);
        assert_eq!(CorpusBuilder::new().build(&r), Err(ValidationError::MissingDescription));
        r.description = Some("desc".to_string());
        r.categories = Some(RawCategories::Literal("[]".to_string()));
        assert_eq!(CorpusBuilder::new().build(&r), Err(ValidationError::NoCategories));
        r.categories = None;
        assert_eq!(CorpusBuilder::new().build(&r), Err(ValidationError::MissingCategories));
    }

    #[test]
    fn rejects_non_finite_score() {
        let mut r = raw("X", "desc", r#"["Drama"]"#);
        r.score = Some(f64::NAN);
        assert!(matches!(CorpusBuilder::new().build(&r), Err(ValidationError::InvalidScore(_))));
    }

    #[test]
    fn build_all_drops_bad_rows_and_duplicates() {
        let rows = vec![
            raw("A", "space opera", r#"["Action"]"#),
            raw("B", "", r#"["Action"]"#),
            raw("A", "another take", r#"["Drama"]"#),
            raw("C", "cooking show", r#"["Comedy"]"#),
        ];
        let (corpus, report) = CorpusBuilder::new().build_all(&rows);
        assert_eq!(corpus.len(), 2);
        assert_eq!(report.kept, 2);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.rejected[0].row, 1);
        assert_eq!(report.rejected[0].reason, ValidationError::MissingDescription);
        assert_eq!(report.rejected[1].reason, ValidationError::DuplicateTitle("A".to_string()));
        assert_eq!(corpus.get_by_title("A").map(|i| i.description()), Some("space opera"));
        assert_eq!(corpus.position_of("C"), Some(1));
    }

    #[test]
    fn deserializes_tmdb_columns() {
        let json = r#"{
            "title": "Up",
            "overview": "An old man ties balloons to his house.",
            "genres": "[{\"id\": 16, \"name\": \"Animation\"}]",
            "vote_average": 7.7,
            "release_year": 2009
        }"#;
        let r: RawItem = serde_json::from_str(json).unwrap();
        let item = CorpusBuilder::new().build(&r).unwrap();
        assert!(item.has_category("animation"));
        assert_eq!(item.score(), 7.7);
    }
}
