use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::cache::ExpansionCache;
use crate::relevance::RelevanceCollaborator;
use crate::stopwords::StopwordSet;
use crate::types::{KeywordWeights, ScoringConfig, StudentProfile};

/// Length-based specificity weight with the default constants.
pub fn idf(term: &str) -> f64 {
    ScoringConfig::default().idf(term)
}

/// Score of one profile against one course's keywords.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchScore {
    pub ct_score: f64,
    pub wp_score: f64,
    /// Rescaled mix of the two components.
    pub final_score: f64,
    /// CT terms first, then WP matches as `term(←seed)`. No duplicates.
    pub matched: Vec<String>,
}

/// A profile with its seed expansions resolved.
#[derive(Debug, Clone)]
pub struct PreparedProfile {
    profile: StudentProfile,
    /// `(seed, seed weight, expansions)` for the strongest profile terms.
    expansions: Vec<(String, f64, Vec<String>)>,
}

impl PreparedProfile {
    pub fn profile(&self) -> &StudentProfile {
        &self.profile
    }

    /// The seed terms that were expanded, strongest first.
    pub fn seeds(&self) -> impl Iterator<Item = &str> {
        self.expansions.iter().map(|(seed, _, _)| seed.as_str())
    }
}

/// Computes CT/WP scores. Shareable across threads; all state is behind `Arc`.
#[derive(Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
    stopwords: Arc<StopwordSet>,
    collaborator: Arc<dyn RelevanceCollaborator>,
    cache: Arc<ExpansionCache>,
}

impl ScoringEngine {
    pub fn new(
        config: ScoringConfig,
        stopwords: Arc<StopwordSet>,
        collaborator: Arc<dyn RelevanceCollaborator>,
        cache: Arc<ExpansionCache>,
    ) -> Self {
        Self {
            config,
            stopwords,
            collaborator,
            cache,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn cache(&self) -> &ExpansionCache {
        &self.cache
    }

    /// Resolve expansions for the strongest non-stopword profile terms.
    ///
    /// Goes through the cache, so repeated requests with overlapping
    /// profiles only ask the collaborator once per term.
    pub fn prepare(&self, profile: &StudentProfile) -> PreparedProfile {
        let expansions: Vec<_> = profile
            .by_weight()
            .into_iter()
            .filter(|(term, _)| !self.stopwords.contains(term))
            .take(self.config.expansion_seeds)
            .map(|(seed, weight)| {
                let expanded = self
                    .cache
                    .get_or_expand(seed, |term| self.collaborator.expand(term));
                (seed.to_string(), weight, expanded)
            })
            .collect();

        debug!(
            seeds = expansions.len(),
            expanded = expansions.iter().map(|(_, _, e)| e.len()).sum::<usize>(),
            "prepared profile"
        );

        PreparedProfile {
            profile: profile.clone(),
            expansions,
        }
    }

    /// Prepare and score in one step. Prefer `prepare` + `score_prepared`
    /// when scoring many courses.
    pub fn score(&self, profile: &StudentProfile, keywords: &KeywordWeights) -> MatchScore {
        self.score_prepared(&self.prepare(profile), keywords)
    }

    /// Score a prepared profile against one course. No I/O.
    pub fn score_prepared(&self, prepared: &PreparedProfile, keywords: &KeywordWeights) -> MatchScore {
        let profile = &prepared.profile;
        let mut matched = Vec::new();
        let mut seen = HashSet::new();

        // CT: iterate the course side so match order follows the course's
        // keyword order; the sum itself is order-independent.
        let mut ct_score = 0.0;
        let mut ct_terms = HashSet::new();
        for (term, course_weight) in keywords.iter() {
            if self.stopwords.contains(term) {
                continue;
            }
            let Some(profile_weight) = profile.get(term) else {
                continue;
            };
            ct_score += profile_weight * course_weight * self.config.idf(term);
            ct_terms.insert(term);
            if seen.insert(term.to_string()) {
                matched.push(term.to_string());
            }
        }

        // WP
        let mut wp_score = 0.0;
        for (seed, seed_weight, expanded) in &prepared.expansions {
            for term in expanded {
                let Some(course_weight) = keywords.get(term) else {
                    continue;
                };
                if self.stopwords.contains(term) || ct_terms.contains(term.as_str()) {
                    continue;
                }
                wp_score += seed_weight * self.config.wp_decay * course_weight;
                let annotated = format!("{term}(←{seed})");
                if seen.insert(annotated.clone()) {
                    matched.push(annotated);
                }
            }
        }

        let final_score =
            (self.config.ct_mix * ct_score + self.config.wp_mix * wp_score) * self.config.rescale;

        MatchScore {
            ct_score,
            wp_score,
            final_score,
            matched,
        }
    }
}

impl std::fmt::Debug for ScoringEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringEngine")
            .field("config", &self.config)
            .field("stopwords", &self.stopwords.len())
            .field("cache", &self.cache.stats())
            .finish_non_exhaustive()
    }
}
