//! Core types for persona-bridge.
//!
//! Key design decisions:
//! - Keyword weights are an explicit ordered `String → f64` mapping rather than
//!   loose JSON, with a documented coercion policy on load
//! - Insertion order is preserved: "encounter order" breaks ties when
//!   picking the strongest profile terms
//! - Courses are shared via `Arc` so recommendations can point back at them
//!   without copying

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Sentinel meaning "not provided", for the double major, the interest shown to
/// the collaborator, and the matched-keyword summary.
pub const NONE_SENTINEL: &str = "none";

/// Sentinel used by the original Korean intake form for "no double major".
const NONE_SENTINEL_KO: &str = "없음";

/// Ordered mapping from term to weight.
///
/// Used both for a course's keyword set and for a student profile. Overwriting
/// a key keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermWeights {
    entries: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

/// A course's keyword set.
pub type KeywordWeights = TermWeights;

/// A student's weighted keyword profile. Built fresh per request.
pub type StudentProfile = TermWeights;

impl TermWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `term` to `weight`, overwriting any previous value.
    pub fn set(&mut self, term: &str, weight: f64) {
        match self.index.get(term) {
            Some(&pos) => self.entries[pos].1 = weight,
            None => {
                self.index.insert(term.to_string(), self.entries.len());
                self.entries.push((term.to_string(), weight));
            }
        }
    }

    /// Add `delta` to `term`, starting from zero if absent.
    pub fn add(&mut self, term: &str, delta: f64) {
        let current = self.get(term).unwrap_or(0.0);
        self.set(term, current + delta);
    }

    pub fn get(&self, term: &str) -> Option<f64> {
        self.index.get(term).map(|&pos| self.entries[pos].1)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.index.contains_key(term)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(t, w)| (t.as_str(), *w))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by weight descending. Stable, so ties keep insertion order.
    pub fn by_weight(&self) -> Vec<(&str, f64)> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by(|a, b| b.1.total_cmp(&a.1));
        sorted
    }
}

impl<S: AsRef<str>> FromIterator<(S, f64)> for TermWeights {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut weights = TermWeights::new();
        for (term, weight) in iter {
            weights.set(term.as_ref(), weight);
        }
        weights
    }
}

impl Serialize for TermWeights {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (term, weight) in &self.entries {
            map.serialize_entry(term, weight)?;
        }
        map.end()
    }
}

/// Keyword loading policy:
///
/// - object: finite numbers kept as-is, numeric strings parsed, every other
///   value drops its entry with a warning
/// - array of strings: each entry at weight 1.0
/// - anything else: empty mapping with a warning
///
/// Keys are trimmed and blank keys dropped.
impl<'de> Deserialize<'de> for TermWeights {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TermWeightsVisitor)
    }
}

struct TermWeightsVisitor;

impl TermWeightsVisitor {
    fn unusable<E>(shape: &str) -> Result<TermWeights, E> {
        warn!(shape, "keyword set is not a mapping; treating as empty");
        Ok(TermWeights::new())
    }
}

impl<'de> Visitor<'de> for TermWeightsVisitor {
    type Value = TermWeights;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping of keyword to weight")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<TermWeights, A::Error> {
        let mut weights = TermWeights::new();
        while let Some((key, value)) = access.next_entry::<String, serde_json::Value>()? {
            let term = key.trim();
            if term.is_empty() {
                continue;
            }
            match coerce_weight(&value) {
                Some(weight) => weights.set(term, weight),
                None => warn!(term, %value, "dropping keyword with unusable weight"),
            }
        }
        Ok(weights)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<TermWeights, A::Error> {
        let mut weights = TermWeights::new();
        while let Some(value) = access.next_element::<serde_json::Value>()? {
            match value.as_str().map(str::trim) {
                Some(term) if !term.is_empty() => weights.set(term, 1.0),
                _ => warn!(%value, "dropping non-string keyword list entry"),
            }
        }
        Ok(weights)
    }

    fn visit_unit<E: de::Error>(self) -> Result<TermWeights, E> {
        Ok(TermWeights::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<TermWeights, E> {
        Ok(TermWeights::new())
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<TermWeights, E> {
        Self::unusable("bool")
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<TermWeights, E> {
        Self::unusable("number")
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<TermWeights, E> {
        Self::unusable("number")
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<TermWeights, E> {
        Self::unusable("number")
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<TermWeights, E> {
        Self::unusable("string")
    }
}

/// Coerce a raw JSON weight into a finite `f64`.
pub fn coerce_weight(value: &serde_json::Value) -> Option<f64> {
    let weight = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    weight.is_finite().then_some(weight)
}

/// A course from the exchange corpus.
///
/// Immutable once loaded. Fields the scoring core does not use (embeddings,
/// source filenames, learning-task breakdowns) are ignored on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawCourse")]
pub struct Course {
    pub id: String,
    #[serde(rename = "course_name")]
    pub name: String,
    pub professor: String,
    pub description: String,
    pub keywords: KeywordWeights,
    pub university: String,
}

impl Course {
    pub fn new(name: impl Into<String>, keywords: KeywordWeights) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            professor: "Unknown".to_string(),
            description: String::new(),
            keywords,
            university: "other university".to_string(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_professor(mut self, professor: impl Into<String>) -> Self {
        self.professor = professor.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_university(mut self, university: impl Into<String>) -> Self {
        self.university = university.into();
        self
    }
}

/// Course as it appears on disk; every field optional and nullable. Text
/// fields also accept numbers and booleans, which are stringified.
#[derive(Debug, Deserialize)]
struct RawCourse {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default, alias = "name")]
    course_name: Option<serde_json::Value>,
    #[serde(default)]
    professor: Option<serde_json::Value>,
    #[serde(default)]
    description: Option<serde_json::Value>,
    #[serde(default)]
    keywords: KeywordWeights,
    #[serde(default)]
    university: Option<serde_json::Value>,
}

/// Scalar JSON as text. Null, arrays and objects carry no usable text.
fn scalar_text(value: Option<serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl From<RawCourse> for Course {
    fn from(raw: RawCourse) -> Self {
        let id = scalar_text(raw.id).unwrap_or_default();
        let non_blank =
            |v: Option<serde_json::Value>| scalar_text(v).filter(|s| !s.trim().is_empty());

        Self {
            id,
            name: non_blank(raw.course_name).unwrap_or_else(|| "Unknown".to_string()),
            professor: non_blank(raw.professor).unwrap_or_else(|| "Unknown".to_string()),
            description: scalar_text(raw.description).unwrap_or_default(),
            keywords: raw.keywords,
            university: non_blank(raw.university)
                .unwrap_or_else(|| "other university".to_string()),
        }
    }
}

/// Raw student inputs from the intake form.
#[derive(Debug, Clone, Default)]
pub struct StudentInput {
    pub major: String,
    /// Double major; `None`, blank, or the "none" sentinel all mean absent.
    pub double_major: Option<String>,
    /// Previously taken course names, already split and trimmed.
    pub history: Vec<String>,
    pub interest: Option<String>,
}

impl StudentInput {
    pub fn new(major: impl Into<String>) -> Self {
        Self {
            major: major.into(),
            ..Default::default()
        }
    }

    pub fn with_double_major(mut self, double_major: impl Into<String>) -> Self {
        self.double_major = Some(double_major.into());
        self
    }

    pub fn with_history<I, S>(mut self, history: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.history = history.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_interest(mut self, interest: impl Into<String>) -> Self {
        self.interest = Some(interest.into());
        self
    }

    /// Seed terms for profile building: major, double major (unless the
    /// sentinel), then history. Blank entries are skipped.
    pub fn seeds(&self) -> Vec<&str> {
        let double_major = self
            .double_major
            .as_deref()
            .map(str::trim)
            .filter(|d| !is_none_sentinel(d));

        std::iter::once(self.major.trim())
            .chain(double_major)
            .chain(self.history.iter().map(|h| h.trim()))
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// The interest, if non-blank.
    pub fn interest(&self) -> Option<&str> {
        self.interest.as_deref().map(str::trim).filter(|i| !i.is_empty())
    }
}

/// True for the "none" sentinel (either language, any ASCII case).
pub fn is_none_sentinel(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case(NONE_SENTINEL) || value == NONE_SENTINEL_KO
}

// Scoring constants. Defaults for `ScoringConfig`; also used by the free
// `idf` function.
pub const IDF_LONG_WEIGHT: f64 = 1.5;
pub const IDF_SHORT_WEIGHT: f64 = 1.0;
pub const IDF_MIN_LONG_LEN: usize = 3;

/// Configuration for the scoring and ranking system.
/// All values are tunable at runtime for experimentation.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    // Common-term (CT) component
    pub idf_long_weight: f64,
    pub idf_short_weight: f64,
    /// Terms with at least this many characters get the long weight.
    pub idf_min_long_len: usize,

    // Propagated-match (WP) component
    /// How many of the strongest profile terms are sent for expansion.
    pub expansion_seeds: usize,
    /// Discount for matches reached through an expansion.
    pub wp_decay: f64,

    // Combination
    pub ct_mix: f64,
    pub wp_mix: f64,
    /// Brings the lexical score onto the collaborator's 0-50 scale.
    pub rescale: f64,

    // Collaborator
    pub max_relevance: u32,
    /// Profile terms included in the summary sent to the collaborator.
    pub summary_terms: usize,

    // Ranking output
    pub top_n: usize,
    pub display_matches: usize,
    pub suitability_ceiling: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            idf_long_weight: IDF_LONG_WEIGHT,
            idf_short_weight: IDF_SHORT_WEIGHT,
            idf_min_long_len: IDF_MIN_LONG_LEN,

            expansion_seeds: 5,
            wp_decay: 0.8,

            ct_mix: 0.5,
            wp_mix: 0.5,
            rescale: 5.0,

            max_relevance: 50,
            summary_terms: 10,

            top_n: 5,
            display_matches: 5,
            suitability_ceiling: 95.0,
        }
    }
}

impl ScoringConfig {
    /// Specificity proxy: longer terms are presumed more discriminative.
    pub fn idf(&self, term: &str) -> f64 {
        if term.chars().count() >= self.idf_min_long_len {
            self.idf_long_weight
        } else {
            self.idf_short_weight
        }
    }
}

/// Whether the collaborator actually judged a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelevanceStatus {
    Judged,
    Unavailable,
}

/// One scored course in a ranked shortlist.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub course: Arc<Course>,
    /// Hybrid lexical score (CT + WP, rescaled).
    pub ctwp_score: f64,
    /// Collaborator relevance, 0-50. Zero when unavailable.
    pub ai_score: u32,
    pub total_score: f64,
    /// Matched terms in match order; expanded matches read `term(←seed)`.
    pub matched: Vec<String>,
    /// Leading matches joined for display, or the "none" sentinel.
    pub matched_summary: String,
    pub reason: String,
    pub relevance: RelevanceStatus,
    /// Total relative to the best course, 0-95.
    pub suitability_percent: u8,
}

impl Recommendation {
    /// Leading matched terms for display, or "none".
    pub fn display_matches(&self) -> &str {
        &self.matched_summary
    }

    pub fn is_judged(&self) -> bool {
        self.relevance == RelevanceStatus::Judged
    }
}
