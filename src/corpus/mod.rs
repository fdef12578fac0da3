//! The exchange-course corpus.
//!
//! A JSON array of course records, loaded once and shared read-only. Each
//! course is held behind an `Arc` so recommendations can reference it
//! without copying keyword maps around.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::CorpusError;
use crate::types::Course;

/// Immutable, ordered set of candidate courses. Order is the tie-breaker
/// when two courses score the same.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    courses: Vec<Arc<Course>>,
    source: Option<PathBuf>,
}

impl Corpus {
    pub fn new(courses: Vec<Course>) -> Self {
        Self {
            courses: courses.into_iter().map(Arc::new).collect(),
            source: None,
        }
    }

    /// Load a corpus from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        if !path.exists() {
            return Err(CorpusError::Missing(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| CorpusError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut corpus = Self::from_json_str(&content)?;
        corpus.source = Some(path.to_path_buf());
        Ok(corpus)
    }

    /// Like [`Corpus::load`], but a missing or unreadable corpus becomes an
    /// empty one, which yields an empty recommendation list downstream.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(corpus) => {
                info!(courses = corpus.len(), path = %path.display(), "course corpus loaded");
                corpus
            }
            Err(err) => {
                warn!(error = %err, "course corpus unavailable; nothing to recommend");
                Self::default()
            }
        }
    }

    /// Parse a JSON array of course records.
    ///
    /// Only a malformed document or a non-array top level is an error. A
    /// record that cannot be read as a course is skipped with a warning.
    pub fn from_json_str(json: &str) -> Result<Self, CorpusError> {
        let records: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let courses = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value::<Course>(record) {
                Ok(course) => Some(course),
                Err(err) => {
                    warn!(index, error = %err, "skipping unreadable course record");
                    None
                }
            })
            .collect();
        Ok(Self::new(courses))
    }

    /// First course with exactly this name.
    pub fn find_by_name(&self, name: &str) -> Option<&Arc<Course>> {
        self.courses.iter().find(|c| c.name == name)
    }

    pub fn courses(&self) -> &[Arc<Course>] {
        &self.courses
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Course>> {
        self.courses.iter()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Where the corpus was loaded from, if it came from a file.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"[
        {
            "id": 7,
            "course_name": "Brand Strategy",
            "professor": "Kim",
            "description": "How brands are built.",
            "keywords": {"branding": 2.0, "marketing": "1.5", "bogus": null},
            "university": "Yonsei",
            "embedding": [0.1, 0.2],
            "filename": "brand.pdf"
        },
        {
            "name": "Data Mining",
            "keywords": ["statistics", "machine learning"]
        },
        {}
    ]"#;

    #[test]
    fn test_parses_records_and_defaults() {
        let corpus = Corpus::from_json_str(SAMPLE).unwrap();
        assert_eq!(corpus.len(), 3);

        let brand = &corpus.courses()[0];
        assert_eq!(brand.id, "7");
        assert_eq!(brand.name, "Brand Strategy");
        assert_eq!(brand.keywords.get("marketing"), Some(1.5));
        assert!(!brand.keywords.contains("bogus"));

        let mining = &corpus.courses()[1];
        assert_eq!(mining.name, "Data Mining");
        assert_eq!(mining.professor, "Unknown");
        assert_eq!(mining.university, "other university");
        assert_eq!(mining.keywords.get("statistics"), Some(1.0));

        let empty = &corpus.courses()[2];
        assert_eq!(empty.name, "Unknown");
        assert!(empty.keywords.is_empty());
    }

    #[test]
    fn test_odd_fields_do_not_sink_the_corpus() {
        let json = r#"[
            {"course_name": "Good", "professor": "Lee", "keywords": {"finance": 1.0}},
            {"course_name": "Odd", "professor": 42, "university": true, "description": ["x"]},
            "not a course",
            {"course_name": 101, "keywords": {"statistics": 2}}
        ]"#;
        let corpus = Corpus::from_json_str(json).unwrap();
        assert_eq!(corpus.len(), 3);

        let odd = corpus.find_by_name("Odd").unwrap();
        assert_eq!(odd.professor, "42");
        assert_eq!(odd.university, "true");
        assert_eq!(odd.description, "");

        let numbered = &corpus.courses()[2];
        assert_eq!(numbered.name, "101");
        assert_eq!(numbered.keywords.get("statistics"), Some(2.0));
        assert_eq!(corpus.courses()[0].name, "Good");
    }

    #[test]
    fn test_find_by_name() {
        let corpus = Corpus::from_json_str(SAMPLE).unwrap();
        assert!(corpus.find_by_name("Data Mining").is_some());
        assert!(corpus.find_by_name("data mining").is_none());
    }

    #[test]
    fn test_rejects_non_array() {
        assert!(matches!(
            Corpus::from_json_str(r#"{"courses": []}"#),
            Err(CorpusError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let corpus = Corpus::load(file.path()).unwrap();
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.source(), Some(file.path()));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courses.json");
        assert!(matches!(Corpus::load(&path), Err(CorpusError::Missing(_))));
        assert!(Corpus::load_or_empty(&path).is_empty());
    }
}
