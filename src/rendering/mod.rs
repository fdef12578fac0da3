//! Output rendering - from a ranked shortlist to terminal text or JSON.
//!
//! Text mode is for people: ranked entries with badges, matched keywords
//! and the collaborator's reason. JSON mode is for front ends and scripts.

mod colors;
mod report;

pub use colors::{colorize_match, Badge, Colorizer};
pub use report::{ReportEntry, ReportRenderer};
