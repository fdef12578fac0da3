//! persona-bridge - course recommendations for credit-exchange students
//!
//! Matches a student's background (major, double major, courses taken,
//! stated interest) against a corpus of partner-university courses and
//! returns a ranked shortlist with a suitability percentage and a
//! one-sentence reason per course.
//!
//! # Architecture
//!
//! ```text
//! StudentInput → ProfileBuilder → ScoringEngine (CT + WP) ─┐
//!                     ↓                 ↓                  ├→ RankingAggregator → Rendering
//!               ConceptGraph      ExpansionCache           │
//!                (petgraph)         (dashmap)              │
//!                                       ↓                  │
//!                          RelevanceCollaborator ──────────┘
//!                          (agent CLI / mock)     evaluate: 0-50 + reason
//! ```
//!
//! Scoring is a hybrid of exact keyword overlap (CT), overlap through
//! collaborator-suggested related terms (WP), and a direct relevance
//! judgment from the collaborator. Every collaborator failure degrades to a
//! zero contribution; a run never fails because the collaborator did.
//!
//! # Concurrency
//!
//! - Seed expansions resolved once per request, before fan-out
//! - Per-course scoring and judgment in parallel via rayon
//! - Expansion cache shared across requests with dashmap

pub mod cache;
pub mod config;
pub mod corpus;
pub mod error;
pub mod ontology;
pub mod profile;
pub mod ranking;
pub mod relevance;
pub mod rendering;
pub mod scoring;
pub mod stopwords;
pub mod types;

// Re-export core types
pub use types::{
    Course, KeywordWeights, Recommendation, RelevanceStatus, ScoringConfig, StudentInput,
    StudentProfile, TermWeights, NONE_SENTINEL,
};

pub use cache::{CacheStats, ExpansionCache};
pub use config::{CollaboratorKind, Config};
pub use corpus::Corpus;
pub use error::{CollaboratorError, ConfigError, CorpusError, OntologyError};
pub use ontology::{ConceptEdge, ConceptGraph, ConceptNode};
pub use profile::{split_history, ProfileBuilder};
pub use ranking::{RankingAggregator, RankingOutcome};
pub use relevance::{
    Agent, AgentCollaborator, MockCollaborator, Relevance, RelevanceCollaborator, StudentSummary,
};
pub use scoring::{idf, MatchScore, ScoringEngine};
pub use stopwords::StopwordSet;
