//! Generic academic vocabulary excluded from all keyword matching.
//!
//! Terms like "lecture" or "exam" appear in nearly every syllabus and carry
//! no signal about fit. The built-in set covers the Korean terms found in the
//! exchange-course corpus plus their English equivalents; configuration can
//! extend it with `extra-stopwords`.
//!
//! Membership is exact string equality. Keywords are compared verbatim
//! everywhere else in the pipeline, so case folding here would be inconsistent.

use std::collections::HashSet;

use once_cell::sync::Lazy;

const BUILTIN_TERMS: &[&str] = &[
    // Korean
    "강의", "수업", "학점", "교수", "시험", "과제", "평가", "출석",
    "중간고사", "기말고사", "이해", "개요", "목표", "방법", "분석",
    "활용", "이론", "실습", "소개", "기초", "응용", "진행", "관련",
    "학년", "전공", "필수", "선택", "학생", "사용자", "및", "의", "등", "대하여",
    // English
    "lecture", "class", "credit", "professor", "exam", "assignment",
    "evaluation", "attendance", "midterm", "final exam", "understanding",
    "overview", "objective", "method", "analysis", "application", "theory",
    "practice", "introduction", "basics", "applied", "progress", "related",
    "year", "major", "required", "elective", "student", "user", "and", "of",
    "etc", "about",
];

static BUILTIN: Lazy<StopwordSet> = Lazy::new(|| StopwordSet::from_terms(BUILTIN_TERMS));

/// Immutable set of stopwords.
#[derive(Debug, Clone, Default)]
pub struct StopwordSet {
    terms: HashSet<String>,
}

impl StopwordSet {
    /// The process-wide built-in set.
    pub fn builtin() -> &'static StopwordSet {
        &BUILTIN
    }

    /// Build a set from arbitrary terms. Entries are trimmed; blanks are dropped.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        Self { terms }
    }

    /// A copy of this set with additional terms.
    pub fn with_extra<I, S>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut terms = self.terms.clone();
        terms.extend(
            extra
                .into_iter()
                .map(|t| t.as_ref().trim().to_string())
                .filter(|t| !t.is_empty()),
        );
        Self { terms }
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
