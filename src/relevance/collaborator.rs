//! The collaborator interface and the degradation rules around it.

use tracing::warn;

use crate::error::CollaboratorError;
use crate::types::{Course, RelevanceStatus, NONE_SENTINEL};

/// External semantic-judgment capability.
///
/// Abstracts over the real agent-backed implementation (`AgentCollaborator`)
/// and the scripted one (`MockCollaborator`). The scoring core is generic over
/// this trait and never lets an error from it escape:
///
/// - `expand` failures become an empty expansion
/// - `evaluate` failures become a zero score with a failure reason
///
/// Implementations must be shareable across the per-course worker threads.
pub trait RelevanceCollaborator: Send + Sync {
    /// Up to ~5 terms related to `term`, most relevant first.
    fn expand(&self, term: &str) -> Result<Vec<String>, CollaboratorError>;

    /// How well `course` suits the student, with a one-sentence reason.
    fn evaluate(
        &self,
        student: &StudentSummary,
        course: &Course,
    ) -> Result<Relevance, CollaboratorError>;
}

/// What the collaborator sees of a student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentSummary {
    /// Leading profile terms joined with ", ".
    pub keywords: String,
    /// The stated interest, or the "none" sentinel.
    pub interest: String,
}

impl StudentSummary {
    pub fn new(keywords: impl Into<String>, interest: Option<&str>) -> Self {
        Self {
            keywords: keywords.into(),
            interest: interest.unwrap_or(NONE_SENTINEL).to_string(),
        }
    }
}

/// A genuine relevance judgment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relevance {
    /// 0 to the configured maximum (50).
    pub score: u32,
    pub reason: String,
}

impl Relevance {
    pub fn new(score: u32, reason: impl Into<String>) -> Self {
        Self {
            score,
            reason: reason.into(),
        }
    }
}

/// Result of asking for a judgment, with failure kept distinct from a real 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelevanceOutcome {
    Judged(Relevance),
    Unavailable { reason: String },
}

impl RelevanceOutcome {
    /// Contribution to the total score; zero when unavailable.
    pub fn score(&self) -> u32 {
        match self {
            RelevanceOutcome::Judged(r) => r.score,
            RelevanceOutcome::Unavailable { .. } => 0,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            RelevanceOutcome::Judged(r) => &r.reason,
            RelevanceOutcome::Unavailable { reason } => reason,
        }
    }

    pub fn status(&self) -> RelevanceStatus {
        match self {
            RelevanceOutcome::Judged(_) => RelevanceStatus::Judged,
            RelevanceOutcome::Unavailable { .. } => RelevanceStatus::Unavailable,
        }
    }
}

/// Ask for a judgment, clamping the score to `max_score` and isolating failure.
pub fn evaluate_or_unavailable(
    collaborator: &dyn RelevanceCollaborator,
    student: &StudentSummary,
    course: &Course,
    max_score: u32,
) -> RelevanceOutcome {
    match collaborator.evaluate(student, course) {
        Ok(relevance) => RelevanceOutcome::Judged(Relevance {
            score: relevance.score.min(max_score),
            reason: relevance.reason,
        }),
        Err(err) => {
            warn!(course = %course.name, error = %err, "relevance evaluation failed");
            RelevanceOutcome::Unavailable {
                reason: err.display_reason().to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relevance::MockCollaborator;
    use crate::types::KeywordWeights;

    fn course(name: &str) -> Course {
        Course::new(name, KeywordWeights::new())
    }

    #[test]
    fn test_summary_uses_sentinel_for_missing_interest() {
        let summary = StudentSummary::new("marketing, statistics", None);
        assert_eq!(summary.interest, "none");
        let summary = StudentSummary::new("marketing", Some("branding"));
        assert_eq!(summary.interest, "branding");
    }

    #[test]
    fn test_judged_score_is_clamped() {
        let mock = MockCollaborator::empty().with_judgment("Brand Strategy", 80, "great fit");
        let summary = StudentSummary::new("marketing", None);
        let outcome = evaluate_or_unavailable(&mock, &summary, &course("Brand Strategy"), 50);
        assert_eq!(outcome.score(), 50);
        assert_eq!(outcome.reason(), "great fit");
        assert_eq!(outcome.status(), RelevanceStatus::Judged);
    }

    #[test]
    fn test_failure_is_unavailable_not_zero_judgment() {
        let mock = MockCollaborator::empty().with_failing_evaluation("Brand Strategy");
        let summary = StudentSummary::new("marketing", None);
        let outcome = evaluate_or_unavailable(&mock, &summary, &course("Brand Strategy"), 50);
        assert_eq!(outcome.score(), 0);
        assert_eq!(outcome.status(), RelevanceStatus::Unavailable);
        assert_eq!(outcome.reason(), "relevance analysis failed");
    }

    #[test]
    fn test_genuine_zero_stays_judged() {
        let mock = MockCollaborator::empty().with_judgment("Physics", 0, "unrelated");
        let summary = StudentSummary::new("marketing", None);
        let outcome = evaluate_or_unavailable(&mock, &summary, &course("Physics"), 50);
        assert_eq!(outcome, RelevanceOutcome::Judged(Relevance::new(0, "unrelated")));
    }
}
