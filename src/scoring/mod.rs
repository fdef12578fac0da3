//! CT/WP hybrid lexical scoring.
//!
//! Two components, mixed 50/50 and rescaled onto the collaborator's 0-50
//! range:
//!
//! - **CT** (common terms): exact keyword overlap between profile and course,
//!   weighted by both sides and a length-based specificity factor
//! - **WP** (propagated matches): the strongest profile terms are expanded by
//!   the collaborator; expanded terms found in the course count at a 0.8
//!   discount
//!
//! ```text
//! final = (0.5 * CT + 0.5 * WP) * 5.0
//! ```
//!
//! Expansion is the only I/O, so it happens once per request in `prepare`;
//! per-course scoring is then pure and safe to fan out.

mod engine;

pub use engine::{idf, MatchScore, PreparedProfile, ScoringEngine};
