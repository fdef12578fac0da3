use tracing::{debug, info};

use crate::ontology::ConceptGraph;
use crate::stopwords::StopwordSet;
use crate::types::{StudentInput, StudentProfile};

/// Weight of every seed term and of the interest.
pub const SEED_WEIGHT: f64 = 1.0;

/// Added to a neighbour label each time a matched concept reaches it.
pub const NEIGHBOR_WEIGHT: f64 = 0.5;

/// Builds a `StudentProfile` from raw input, optionally through the ontology.
#[derive(Debug, Clone, Copy)]
pub struct ProfileBuilder<'a> {
    graph: Option<&'a ConceptGraph>,
    stopwords: &'a StopwordSet,
}

impl<'a> ProfileBuilder<'a> {
    pub fn new(graph: Option<&'a ConceptGraph>, stopwords: &'a StopwordSet) -> Self {
        Self { graph, stopwords }
    }

    /// Build the profile for one student.
    ///
    /// Order of operations matters for the resulting weights:
    /// 1. the interest goes in at 1.0 before anything else
    /// 2. each seed is (re)set to 1.0, then its matched concepts' neighbours
    ///    accumulate +0.5 per visit with no cap
    ///
    /// A seed that is also a neighbour label of an earlier seed is reset to
    /// 1.0, dropping what it had accumulated.
    pub fn build(&self, input: &StudentInput) -> StudentProfile {
        let mut profile = StudentProfile::new();
        if let Some(interest) = input.interest() {
            profile.set(interest, SEED_WEIGHT);
        }

        let seeds = input.seeds();
        let Some(graph) = self.graph else {
            debug!(seeds = seeds.len(), "no ontology, profile is seeds only");
            for seed in seeds {
                profile.set(seed, SEED_WEIGHT);
            }
            return profile;
        };

        for seed in seeds {
            profile.set(seed, SEED_WEIGHT);

            let matched = graph.nodes_matching(seed);
            debug!(seed, concepts = matched.len(), "matched seed to ontology");
            for concept in matched {
                for neighbor in graph.neighbors(concept) {
                    let label = graph.label(neighbor).unwrap_or_default();
                    if label.is_empty() || self.stopwords.contains(label) {
                        continue;
                    }
                    profile.add(label, NEIGHBOR_WEIGHT);
                }
            }
        }

        info!(terms = profile.len(), "built student profile");
        profile
    }
}

/// Split a free-text course history ("Accounting, Statistics , ") into
/// trimmed, non-empty course names.
pub fn split_history(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
