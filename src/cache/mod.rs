//! Process-lifetime caching of collaborator term expansions.
//!
//! The cache is an explicit component injected into the scoring engine, so
//! tests can observe it and concurrent requests share one synchronized map.

mod expansion;

pub use expansion::{CacheStats, ExpansionCache};
