//! Scripted collaborator for offline runs and tests.
//!
//! Serves canned expansions and judgments with no subprocess or network I/O,
//! and counts every call so tests can check how often the core asks.
//!
//! Fixture format:
//!
//! ```json
//! {
//!   "expansions": { "marketing": ["branding", "consumer behavior"] },
//!   "evaluations": { "Brand Strategy": { "score": 42, "reason": "Builds on marketing." } }
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use serde::Deserialize;

use super::collaborator::{Relevance, RelevanceCollaborator, StudentSummary};
use crate::error::CollaboratorError;
use crate::types::Course;

#[derive(Debug, Default, Deserialize)]
struct Fixture {
    #[serde(default)]
    expansions: HashMap<String, Vec<String>>,
    #[serde(default)]
    evaluations: HashMap<String, FixtureJudgment>,
}

#[derive(Debug, Deserialize)]
struct FixtureJudgment {
    score: u32,
    #[serde(default)]
    reason: String,
}

/// Collaborator backed by in-memory answers.
///
/// Unknown terms expand to nothing. Unknown courses are `Unavailable`, the
/// same as having no collaborator at all.
#[derive(Debug, Default)]
pub struct MockCollaborator {
    expansions: HashMap<String, Vec<String>>,
    judgments: HashMap<String, Relevance>,
    failing_terms: HashSet<String>,
    failing_courses: HashSet<String>,
    expand_calls: AtomicUsize,
    evaluate_calls: AtomicUsize,
}

impl MockCollaborator {
    /// A collaborator that knows nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load canned answers from a JSON fixture.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read collaborator fixture {}", path.display()))?;
        let fixture: Fixture = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse collaborator fixture {}", path.display()))?;

        Ok(Self {
            expansions: fixture.expansions,
            judgments: fixture
                .evaluations
                .into_iter()
                .map(|(name, j)| (name, Relevance::new(j.score, j.reason)))
                .collect(),
            ..Self::default()
        })
    }

    pub fn with_expansion<I, S>(mut self, term: &str, related: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expansions
            .insert(term.to_string(), related.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_judgment(mut self, course: &str, score: u32, reason: &str) -> Self {
        self.judgments
            .insert(course.to_string(), Relevance::new(score, reason));
        self
    }

    /// Make `expand(term)` fail.
    pub fn with_failing_expansion(mut self, term: &str) -> Self {
        self.failing_terms.insert(term.to_string());
        self
    }

    /// Make `evaluate` fail for the named course.
    pub fn with_failing_evaluation(mut self, course: &str) -> Self {
        self.failing_courses.insert(course.to_string());
        self
    }

    /// Number of `expand` calls received so far.
    pub fn expand_calls(&self) -> usize {
        self.expand_calls.load(Ordering::Relaxed)
    }

    /// Number of `evaluate` calls received so far.
    pub fn evaluate_calls(&self) -> usize {
        self.evaluate_calls.load(Ordering::Relaxed)
    }
}

impl RelevanceCollaborator for MockCollaborator {
    fn expand(&self, term: &str) -> Result<Vec<String>, CollaboratorError> {
        self.expand_calls.fetch_add(1, Ordering::Relaxed);
        if self.failing_terms.contains(term) {
            return Err(CollaboratorError::Malformed(format!("scripted failure for '{term}'")));
        }
        Ok(self.expansions.get(term).cloned().unwrap_or_default())
    }

    fn evaluate(
        &self,
        _student: &StudentSummary,
        course: &Course,
    ) -> Result<Relevance, CollaboratorError> {
        self.evaluate_calls.fetch_add(1, Ordering::Relaxed);
        if self.failing_courses.contains(&course.name) {
            return Err(CollaboratorError::Malformed(format!(
                "scripted failure for '{}'",
                course.name
            )));
        }
        self.judgments
            .get(&course.name)
            .cloned()
            .ok_or_else(|| CollaboratorError::Unavailable(format!("no judgment for '{}'", course.name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KeywordWeights;
    use std::io::Write;

    #[test]
    fn test_counts_calls() {
        let mock = MockCollaborator::empty().with_expansion("marketing", ["branding"]);
        assert_eq!(mock.expand("marketing").unwrap(), vec!["branding".to_string()]);
        assert!(mock.expand("unknown").unwrap().is_empty());
        assert_eq!(mock.expand_calls(), 2);
        assert_eq!(mock.evaluate_calls(), 0);
    }

    #[test]
    fn test_unknown_course_is_unavailable() {
        let mock = MockCollaborator::empty();
        let summary = StudentSummary::new("x", None);
        let err = mock
            .evaluate(&summary, &Course::new("Nowhere", KeywordWeights::new()))
            .unwrap_err();
        assert!(matches!(err, CollaboratorError::Unavailable(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "expansions": {{"marketing": ["branding", "pricing"]}},
                "evaluations": {{"Brand Strategy": {{"score": 42, "reason": "Builds on marketing."}}}}
            }}"#
        )
        .unwrap();

        let mock = MockCollaborator::from_file(file.path()).unwrap();
        assert_eq!(mock.expand("marketing").unwrap().len(), 2);
        let summary = StudentSummary::new("marketing", None);
        let judged = mock
            .evaluate(&summary, &Course::new("Brand Strategy", KeywordWeights::new()))
            .unwrap();
        assert_eq!(judged, Relevance::new(42, "Builds on marketing."));
    }

    #[test]
    fn test_from_file_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(MockCollaborator::from_file(file.path()).is_err());
    }
}
