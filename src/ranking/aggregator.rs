use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::cache::ExpansionCache;
use crate::corpus::Corpus;
use crate::ontology::ConceptGraph;
use crate::profile::ProfileBuilder;
use crate::relevance::{evaluate_or_unavailable, RelevanceCollaborator, StudentSummary};
use crate::scoring::{PreparedProfile, ScoringEngine};
use crate::stopwords::StopwordSet;
use crate::types::{
    Course, Recommendation, ScoringConfig, StudentInput, StudentProfile, NONE_SENTINEL,
};

/// Ranked shortlist plus the profile it was computed from.
#[derive(Debug, Clone)]
pub struct RankingOutcome {
    /// At most `top_n` records, best first.
    pub recommendations: Vec<Recommendation>,
    pub profile: StudentProfile,
    /// Number of courses scored before the cut.
    pub considered: usize,
}

/// Scores every course in a corpus for one student and keeps the best.
///
/// One aggregator serves many requests: the ontology, stopwords,
/// collaborator and expansion cache are shared, read-only or synchronized.
pub struct RankingAggregator {
    config: ScoringConfig,
    graph: Option<Arc<ConceptGraph>>,
    stopwords: Arc<StopwordSet>,
    collaborator: Arc<dyn RelevanceCollaborator>,
    engine: ScoringEngine,
}

impl RankingAggregator {
    pub fn new(
        config: ScoringConfig,
        graph: Option<Arc<ConceptGraph>>,
        stopwords: Arc<StopwordSet>,
        collaborator: Arc<dyn RelevanceCollaborator>,
        cache: Arc<ExpansionCache>,
    ) -> Self {
        let engine = ScoringEngine::new(
            config.clone(),
            Arc::clone(&stopwords),
            Arc::clone(&collaborator),
            cache,
        );
        Self {
            config,
            graph,
            stopwords,
            collaborator,
            engine,
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn has_ontology(&self) -> bool {
        self.graph.is_some()
    }

    /// Weighted keyword profile for `input`.
    pub fn build_profile(&self, input: &StudentInput) -> StudentProfile {
        ProfileBuilder::new(self.graph.as_deref(), &self.stopwords).build(input)
    }

    /// Build the profile and rank the whole corpus in one call.
    pub fn recommend(&self, input: &StudentInput, corpus: &Corpus) -> RankingOutcome {
        let profile = self.build_profile(input);
        self.run(profile, input.interest(), corpus.courses())
    }

    /// What the collaborator is told about the student: the first
    /// `summary_terms` profile keys in encounter order, plus the interest.
    pub fn student_summary(&self, profile: &StudentProfile, interest: Option<&str>) -> StudentSummary {
        let keywords: Vec<&str> = profile.keys().take(self.config.summary_terms).collect();
        StudentSummary::new(keywords.join(", "), interest)
    }

    /// Rank `courses` for an already built profile.
    ///
    /// The algorithm:
    /// 1. Resolve seed expansions once (the only shared I/O)
    /// 2. Per course, in parallel: CT/WP score + collaborator judgment
    /// 3. Normalize totals against the best course into 0-95%
    /// 4. Stable sort by total, descending; keep the top N
    ///
    /// A failing collaborator only zeroes that course's judgment. Courses
    /// with no keyword overlap are still scored and can rank on judgment.
    pub fn run(
        &self,
        profile: StudentProfile,
        interest: Option<&str>,
        courses: &[Arc<Course>],
    ) -> RankingOutcome {
        if courses.is_empty() {
            info!("empty corpus, nothing to rank");
            return RankingOutcome {
                recommendations: Vec::new(),
                profile,
                considered: 0,
            };
        }

        let prepared = self.engine.prepare(&profile);
        let summary = self.student_summary(&profile, interest);

        // Indexed collect keeps corpus order, which the stable sort relies on
        let mut scored: Vec<Recommendation> = courses
            .par_iter()
            .map(|course| self.score_course(&prepared, &summary, course))
            .collect();

        normalize(&mut scored, self.config.suitability_ceiling);
        scored.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));

        let considered = scored.len();
        scored.truncate(self.config.top_n);
        info!(
            considered,
            returned = scored.len(),
            cache = ?self.engine.cache().stats(),
            "ranked courses"
        );

        RankingOutcome {
            recommendations: scored,
            profile,
            considered,
        }
    }

    fn score_course(
        &self,
        prepared: &PreparedProfile,
        summary: &StudentSummary,
        course: &Arc<Course>,
    ) -> Recommendation {
        let lexical = self.engine.score_prepared(prepared, &course.keywords);
        let judgment = evaluate_or_unavailable(
            self.collaborator.as_ref(),
            summary,
            course,
            self.config.max_relevance,
        );
        let ai_score = judgment.score();
        let total_score = lexical.final_score + f64::from(ai_score);

        debug!(
            course = %course.name,
            ctwp = lexical.final_score,
            ai = ai_score,
            total = total_score,
            "scored course"
        );

        let matched_summary = if lexical.matched.is_empty() {
            NONE_SENTINEL.to_string()
        } else {
            lexical
                .matched
                .iter()
                .take(self.config.display_matches)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        };

        Recommendation {
            course: Arc::clone(course),
            ctwp_score: lexical.final_score,
            ai_score,
            total_score,
            matched: lexical.matched,
            matched_summary,
            reason: judgment.reason().to_string(),
            relevance: judgment.status(),
            suitability_percent: 0,
        }
    }
}

/// Express each total as a share of the best one, scaled to `ceiling`.
/// All zero when nothing scored above zero.
fn normalize(records: &mut [Recommendation], ceiling: f64) {
    let max_total = records
        .iter()
        .map(|r| r.total_score)
        .fold(f64::NEG_INFINITY, f64::max);

    for record in records.iter_mut() {
        record.suitability_percent = if max_total > 0.0 {
            (record.total_score / max_total * ceiling)
                .floor()
                .clamp(0.0, ceiling) as u8
        } else {
            0
        };
    }
}

impl std::fmt::Debug for RankingAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingAggregator")
            .field("config", &self.config)
            .field("ontology", &self.graph.as_ref().map(|g| g.node_count()))
            .field("stopwords", &self.stopwords.len())
            .finish_non_exhaustive()
    }
}
