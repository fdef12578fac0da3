//! Student profile construction.
//!
//! Turns the intake form (major, double major, course history, interest) into
//! a weighted keyword profile. With an ontology loaded, every seed also pulls
//! in the labels of its direct neighbours at half weight; without one the
//! profile is just the seeds.

mod builder;

pub use builder::{split_history, ProfileBuilder, NEIGHBOR_WEIGHT, SEED_WEIGHT};
