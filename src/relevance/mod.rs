//! Relevance collaborators - external semantic judgment.
//!
//! The scoring core asks two things of a collaborator: related terms for a
//! keyword (`expand`) and a 0-50 suitability judgment for a course
//! (`evaluate`). Both are slow and fallible, so the core wraps every call:
//!
//! ```text
//! expand(term)       ──► Ok(terms)        ──► cached, used for WP matches
//!                    └─► Err(_)           ──► []  (not cached)
//! evaluate(s, c)     ──► Ok(Relevance)    ──► Judged(score ≤ 50, reason)
//!                    └─► Err(_)           ──► Unavailable(0, failure reason)
//! ```
//!
//! Implementations:
//! - `AgentCollaborator`: `gemini` / `claude` CLI subprocess with a timeout
//! - `MockCollaborator`: canned answers from a JSON fixture, call counting

mod agent;
mod collaborator;
mod mock;

pub use agent::{parse_expansion, parse_judgment, Agent, AgentCollaborator, MAX_EXPANSIONS};
pub use collaborator::{
    evaluate_or_unavailable, Relevance, RelevanceCollaborator, RelevanceOutcome,
    StudentSummary,
};
pub use mock::MockCollaborator;
