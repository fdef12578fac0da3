//! Ranked-shortlist rendering for the terminal and for JSON consumers.
//!
//! Text mode:
//!
//! ```text
//! # Recommendations: Business Administration + Statistics | interest: branding
//! # 14 courses considered, 5 shown
//!
//!  1. Brand Strategy [best]                                   95%
//!     Kim · Yonsei University
//!     matched: marketing, branding(←marketing)
//!     reason: Builds directly on the student's marketing background.
//!     score: 49.5 = lexical 9.5 + relevance 40
//! ```
//!
//! JSON mode emits one object per course with the field names the intake
//! front end expects (`courseTitle`, `suitabilityPercent`, ...), plus the
//! raw profile.

use serde::Serialize;

use super::colors::{colorize_match, Badge, Colorizer};
use crate::ranking::RankingOutcome;
use crate::types::{Recommendation, RelevanceStatus, StudentInput, StudentProfile, NONE_SENTINEL};

/// Width the title column is padded to before the percentage.
const TITLE_WIDTH: usize = 56;

/// One course in JSON output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry<'a> {
    pub course_title: &'a str,
    pub professor: &'a str,
    pub university: &'a str,
    pub suitability_percent: u8,
    pub reason: &'a str,
    pub matched_keywords_summary: &'a str,
    pub total_score: f64,
    pub ctwp_score: f64,
    pub ai_score: u32,
    pub relevance: RelevanceStatus,
}

impl<'a> From<&'a Recommendation> for ReportEntry<'a> {
    fn from(rec: &'a Recommendation) -> Self {
        Self {
            course_title: &rec.course.name,
            professor: &rec.course.professor,
            university: &rec.course.university,
            suitability_percent: rec.suitability_percent,
            reason: &rec.reason,
            matched_keywords_summary: rec.display_matches(),
            total_score: rec.total_score,
            ctwp_score: rec.ctwp_score,
            ai_score: rec.ai_score,
            relevance: rec.relevance,
        }
    }
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    recommendations: Vec<ReportEntry<'a>>,
    profile: &'a StudentProfile,
}

/// Renders a `RankingOutcome`.
#[derive(Debug, Clone, Copy)]
pub struct ReportRenderer {
    color: bool,
    show_profile: bool,
}

impl ReportRenderer {
    pub fn new(color: bool) -> Self {
        Self {
            color,
            show_profile: false,
        }
    }

    /// Also list the weighted profile terms after the shortlist.
    pub fn with_profile(mut self, show: bool) -> Self {
        self.show_profile = show;
        self
    }

    /// Pretty-printed JSON: `{"recommendations": [...], "profile": {...}}`.
    pub fn render_json(&self, outcome: &RankingOutcome) -> serde_json::Result<String> {
        let report = Report {
            recommendations: outcome.recommendations.iter().map(ReportEntry::from).collect(),
            profile: &outcome.profile,
        };
        serde_json::to_string_pretty(&report)
    }

    /// Human-readable report.
    pub fn render(&self, input: &StudentInput, outcome: &RankingOutcome) -> String {
        let mut out = String::new();

        let seeds = input.seeds().join(" + ");
        let interest = input.interest().unwrap_or(NONE_SENTINEL);
        out.push_str(&self.paint(
            Colorizer::header,
            &format!("# Recommendations: {} | interest: {}", seeds, interest),
        ));
        out.push('\n');
        out.push_str(&self.paint(
            Colorizer::dim,
            &format!(
                "# {} courses considered, {} shown",
                outcome.considered,
                outcome.recommendations.len()
            ),
        ));
        out.push_str("\n\n");

        if outcome.recommendations.is_empty() {
            out.push_str("No courses to recommend.\n");
        }

        for (rank, rec) in outcome.recommendations.iter().enumerate() {
            self.render_entry(&mut out, rank + 1, rec);
        }

        if self.show_profile {
            self.render_profile(&mut out, &outcome.profile);
        }

        out
    }

    fn render_entry(&self, out: &mut String, rank: usize, rec: &Recommendation) {
        let mut badges = Vec::new();
        if rank == 1 && rec.suitability_percent > 0 {
            badges.push(Badge::Best);
        }
        if rec.matched.is_empty() {
            badges.push(Badge::NoOverlap);
        }
        if !rec.is_judged() {
            badges.push(Badge::Unjudged);
        }

        let mut title = rec.course.name.clone();
        let mut visible_len = title.chars().count();
        let title = if self.color {
            let mut painted = Colorizer::course_title(&title);
            if !badges.is_empty() {
                painted.push(' ');
                painted.push_str(&Colorizer::badge_group(&badges));
            }
            painted
        } else {
            for badge in &badges {
                title.push(' ');
                title.push_str(&badge.plain());
            }
            title
        };
        for badge in &badges {
            visible_len += badge.plain().chars().count() + 1;
        }
        let pad = " ".repeat(TITLE_WIDTH.saturating_sub(visible_len) + 1);
        let percent = if self.color {
            Colorizer::suitability(rec.suitability_percent)
        } else {
            format!("{:>3}%", rec.suitability_percent)
        };
        out.push_str(&format!("{:>2}. {}{}{}\n", rank, title, pad, percent));

        out.push_str("    ");
        out.push_str(&self.paint(
            Colorizer::dim,
            &format!("{} · {}", rec.course.professor, rec.course.university),
        ));
        out.push('\n');

        let matched = if rec.matched.is_empty() {
            NONE_SENTINEL.to_string()
        } else {
            rec.display_matches()
                .split(", ")
                .map(|m| self.paint(colorize_match, m))
                .collect::<Vec<_>>()
                .join(", ")
        };
        out.push_str(&format!("    matched: {}\n", matched));
        out.push_str(&format!("    reason: {}\n", self.paint(Colorizer::reason, &rec.reason)));
        out.push_str("    ");
        out.push_str(&self.paint(
            Colorizer::dim,
            &format!(
                "score: {:.1} = lexical {:.1} + relevance {}",
                rec.total_score, rec.ctwp_score, rec.ai_score
            ),
        ));
        out.push_str("\n\n");
    }

    fn render_profile(&self, out: &mut String, profile: &StudentProfile) {
        out.push_str(&self.paint(
            Colorizer::header,
            &format!("# Profile ({} terms)", profile.len()),
        ));
        out.push('\n');
        for (term, weight) in profile.by_weight() {
            out.push_str(&format!("  {:>5.2}  {}\n", weight, term));
        }
    }

    fn paint(&self, style: fn(&str) -> String, text: &str) -> String {
        if self.color {
            style(text)
        } else {
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Course, KeywordWeights};
    use std::sync::Arc;

    fn outcome() -> RankingOutcome {
        let course = Arc::new(
            Course::new("Brand Strategy", KeywordWeights::new())
                .with_professor("Kim")
                .with_university("Yonsei University"),
        );
        let other = Arc::new(Course::new("Physics", KeywordWeights::new()));
        let profile: StudentProfile = [("marketing", 1.0), ("branding", 0.5)].into_iter().collect();
        RankingOutcome {
            recommendations: vec![
                Recommendation {
                    course,
                    ctwp_score: 9.5,
                    ai_score: 40,
                    total_score: 49.5,
                    matched: vec!["marketing".into(), "branding(←marketing)".into()],
                    matched_summary: "marketing, branding(←marketing)".into(),
                    reason: "Direct fit.".into(),
                    relevance: RelevanceStatus::Judged,
                    suitability_percent: 95,
                },
                Recommendation {
                    course: other,
                    ctwp_score: 0.0,
                    ai_score: 0,
                    total_score: 0.0,
                    matched: vec![],
                    matched_summary: "none".into(),
                    reason: "relevance analysis unavailable".into(),
                    relevance: RelevanceStatus::Unavailable,
                    suitability_percent: 0,
                },
            ],
            profile,
            considered: 2,
        }
    }

    #[test]
    fn test_plain_report() {
        let input = StudentInput::new("Business Administration").with_interest("branding");
        let text = ReportRenderer::new(false).render(&input, &outcome());

        assert!(!text.contains('\x1b'));
        assert!(text.contains("# Recommendations: Business Administration | interest: branding"));
        assert!(text.contains("# 2 courses considered, 2 shown"));
        assert!(text.contains(" 1. Brand Strategy [best]"));
        assert!(text.contains("95%"));
        assert!(text.contains("Kim · Yonsei University"));
        assert!(text.contains("matched: marketing, branding(←marketing)"));
        assert!(text.contains(" 2. Physics [no-overlap] [unjudged]"));
        assert!(text.contains("reason: relevance analysis unavailable"));
        assert!(!text.contains("# Profile"));
    }

    #[test]
    fn test_colored_report_has_ansi() {
        let input = StudentInput::new("Business Administration");
        let text = ReportRenderer::new(true).render(&input, &outcome());
        assert!(text.contains('\x1b'));
        assert!(text.contains("Brand Strategy"));
    }

    #[test]
    fn test_profile_section() {
        let input = StudentInput::new("marketing");
        let text = ReportRenderer::new(false)
            .with_profile(true)
            .render(&input, &outcome());
        assert!(text.contains("# Profile (2 terms)"));
        assert!(text.contains(" 1.00  marketing"));
        assert!(text.contains(" 0.50  branding"));
    }

    #[test]
    fn test_empty_outcome() {
        let empty = RankingOutcome {
            recommendations: vec![],
            profile: StudentProfile::new(),
            considered: 0,
        };
        let text = ReportRenderer::new(false).render(&StudentInput::new("x"), &empty);
        assert!(text.contains("No courses to recommend."));
    }

    #[test]
    fn test_json_field_names() {
        let json = ReportRenderer::new(false).render_json(&outcome()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let first = &value["recommendations"][0];
        assert_eq!(first["courseTitle"], "Brand Strategy");
        assert_eq!(first["professor"], "Kim");
        assert_eq!(first["university"], "Yonsei University");
        assert_eq!(first["suitabilityPercent"], 95);
        assert_eq!(first["reason"], "Direct fit.");
        assert_eq!(first["matchedKeywordsSummary"], "marketing, branding(←marketing)");
        assert_eq!(first["relevance"], "judged");
        assert_eq!(value["recommendations"][1]["relevance"], "unavailable");
        assert_eq!(value["profile"]["branding"], 0.5);
    }
}
