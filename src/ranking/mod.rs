//! Ranking pipeline - from student input to a ranked shortlist.
//!
//! Per course, the total score combines:
//! - the CT/WP lexical score from `ScoringEngine` (profile vs. course keywords)
//! - the collaborator's 0-50 relevance judgment
//!
//! Totals are then normalized against the best course into a 0-95
//! suitability percentage, sorted, and cut to the top N.

mod aggregator;

pub use aggregator::{RankingAggregator, RankingOutcome};
