//! Configuration loading from persona-bridge.toml.
//!
//! The file is looked up in the working directory first, then in each
//! ancestor, so running from a subdirectory of a project still picks it up.
//! Relative paths inside the file resolve against the file's directory.
//!
//! ## Example
//!
//! ```toml
//! [data]
//! nodes = "data/ontology_nodes.csv"
//! edges = "data/ontology_edges.csv"
//! courses = "data/courses.json"
//!
//! [agent]
//! kind = "gemini"          # gemini | claude | mock | none
//! model = "gemini-2.0-flash"
//! timeout-secs = 60
//! fixture = "data/fixture.json"
//!
//! [scoring]
//! top-n = 5
//! expansion-seeds = 5
//! summary-terms = 10
//! extra-stopwords = ["syllabus"]
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::relevance::{Agent, AgentCollaborator, MockCollaborator, RelevanceCollaborator};
use crate::stopwords::StopwordSet;
use crate::types::ScoringConfig;

/// File name searched for by [`Config::load`].
pub const CONFIG_FILE: &str = "persona-bridge.toml";

const DEFAULT_NODES: &str = "data/ontology_nodes.csv";
const DEFAULT_EDGES: &str = "data/ontology_edges.csv";
const DEFAULT_COURSES: &str = "data/courses.json";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Which collaborator backs relevance judgments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollaboratorKind {
    #[default]
    Gemini,
    Claude,
    /// Canned answers from a fixture file.
    Mock,
    /// No collaborator: no expansions, every judgment unavailable.
    #[serde(rename = "none", alias = "offline")]
    Offline,
}

impl std::str::FromStr for CollaboratorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(CollaboratorKind::Gemini),
            "claude" => Ok(CollaboratorKind::Claude),
            "mock" => Ok(CollaboratorKind::Mock),
            "none" | "offline" => Ok(CollaboratorKind::Offline),
            _ => Err(format!(
                "Unknown agent: {}. Use 'gemini', 'claude', 'mock', or 'none'",
                s
            )),
        }
    }
}

impl std::fmt::Display for CollaboratorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollaboratorKind::Gemini => write!(f, "gemini"),
            CollaboratorKind::Claude => write!(f, "claude"),
            CollaboratorKind::Mock => write!(f, "mock"),
            CollaboratorKind::Offline => write!(f, "none"),
        }
    }
}

/// Input data locations.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPaths {
    pub nodes: PathBuf,
    pub edges: PathBuf,
    pub courses: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            nodes: PathBuf::from(DEFAULT_NODES),
            edges: PathBuf::from(DEFAULT_EDGES),
            courses: PathBuf::from(DEFAULT_COURSES),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    pub kind: CollaboratorKind,
    /// Model name passed through to the agent CLI.
    pub model: Option<String>,
    pub timeout: Duration,
    /// Fixture for the mock collaborator.
    pub fixture: Option<PathBuf>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            kind: CollaboratorKind::default(),
            model: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            fixture: None,
        }
    }
}

/// Overrides for the scoring defaults in [`ScoringConfig`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringSettings {
    pub top_n: Option<usize>,
    pub expansion_seeds: Option<usize>,
    pub summary_terms: Option<usize>,
    pub extra_stopwords: Vec<String>,
}

/// persona-bridge configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Source file for this config (for display).
    pub source: Option<PathBuf>,
    pub data: DataPaths,
    pub agent: AgentSettings,
    pub scoring: ScoringSettings,
}

/// Raw config as deserialized from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawConfig {
    data: Option<RawData>,
    agent: Option<RawAgent>,
    scoring: Option<RawScoring>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawData {
    nodes: Option<PathBuf>,
    edges: Option<PathBuf>,
    courses: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawAgent {
    kind: Option<CollaboratorKind>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    fixture: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawScoring {
    top_n: Option<usize>,
    expansion_seeds: Option<usize>,
    summary_terms: Option<usize>,
    extra_stopwords: Option<Vec<String>>,
}

impl Config {
    /// Load configuration for the given directory.
    ///
    /// Search order:
    /// 1. persona-bridge.toml in directory
    /// 2. Walk up through ancestors
    /// 3. Default config if nothing found
    ///
    /// A file that is found but unreadable or invalid is reported and
    /// skipped, falling back to defaults.
    pub fn load(directory: &Path) -> Self {
        for dir in directory.ancestors() {
            let candidate = dir.join(CONFIG_FILE);
            if !candidate.is_file() {
                continue;
            }
            return match Self::load_file(&candidate) {
                Ok(config) => {
                    debug!(path = %candidate.display(), "loaded config");
                    config
                }
                Err(err) => {
                    warn!(error = %err, "ignoring config file; using defaults");
                    Self::default()
                }
            };
        }
        Self::default()
    }

    /// Load an explicitly named config file. Errors are not swallowed.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_raw(raw, path.to_path_buf()))
    }

    fn from_raw(raw: RawConfig, source: PathBuf) -> Self {
        let base = source.parent().map(Path::to_path_buf).unwrap_or_default();
        let resolve = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };

        let data = raw.data.unwrap_or_default();
        let agent = raw.agent.unwrap_or_default();
        let scoring = raw.scoring.unwrap_or_default();

        Self {
            data: DataPaths {
                nodes: resolve(data.nodes.unwrap_or_else(|| DEFAULT_NODES.into())),
                edges: resolve(data.edges.unwrap_or_else(|| DEFAULT_EDGES.into())),
                courses: resolve(data.courses.unwrap_or_else(|| DEFAULT_COURSES.into())),
            },
            agent: AgentSettings {
                kind: agent.kind.unwrap_or_default(),
                model: agent.model.filter(|m| !m.trim().is_empty()),
                timeout: Duration::from_secs(agent.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
                fixture: agent.fixture.map(resolve),
            },
            scoring: ScoringSettings {
                top_n: scoring.top_n,
                expansion_seeds: scoring.expansion_seeds,
                summary_terms: scoring.summary_terms,
                extra_stopwords: scoring.extra_stopwords.unwrap_or_default(),
            },
            source: Some(source),
        }
    }

    /// Scoring constants with this config's overrides applied.
    pub fn scoring_config(&self) -> ScoringConfig {
        let mut config = ScoringConfig::default();
        if let Some(n) = self.scoring.top_n {
            config.top_n = n;
        }
        if let Some(n) = self.scoring.expansion_seeds {
            config.expansion_seeds = n;
        }
        if let Some(n) = self.scoring.summary_terms {
            config.summary_terms = n;
        }
        config
    }

    /// Built-in stopwords plus `extra-stopwords`.
    pub fn stopwords(&self) -> StopwordSet {
        StopwordSet::builtin().with_extra(&self.scoring.extra_stopwords)
    }

    /// Construct the configured collaborator.
    ///
    /// Only a mock with an unreadable fixture fails; agent CLIs are not
    /// probed here, a missing binary surfaces per call and degrades.
    pub fn build_collaborator(&self) -> Result<Arc<dyn RelevanceCollaborator>> {
        let agent = &self.agent;
        let collaborator: Arc<dyn RelevanceCollaborator> = match agent.kind {
            CollaboratorKind::Gemini | CollaboratorKind::Claude => {
                let which = if agent.kind == CollaboratorKind::Claude {
                    Agent::Claude
                } else {
                    Agent::Gemini
                };
                let mut collaborator = AgentCollaborator::new(which).with_timeout(agent.timeout);
                if let Some(model) = &agent.model {
                    collaborator = collaborator.with_model(model);
                }
                Arc::new(collaborator)
            }
            CollaboratorKind::Mock => match &agent.fixture {
                Some(path) => Arc::new(MockCollaborator::from_file(path)?),
                None => Arc::new(MockCollaborator::empty()),
            },
            CollaboratorKind::Offline => Arc::new(MockCollaborator::empty()),
        };
        Ok(collaborator)
    }

    /// Format config for verbose display.
    pub fn display_summary(&self) -> String {
        let mut lines = Vec::new();

        if let Some(ref source) = self.source {
            lines.push(format!("   Config: {}", source.display()));
        } else {
            lines.push("   Config: (defaults)".to_string());
        }

        lines.push(format!(
            "   Ontology: {} + {}",
            self.data.nodes.display(),
            self.data.edges.display()
        ));
        lines.push(format!("   Courses: {}", self.data.courses.display()));

        let mut agent = format!("   Agent: {}", self.agent.kind);
        if let Some(ref model) = self.agent.model {
            agent.push_str(&format!(" ({})", model));
        }
        if let Some(ref fixture) = self.agent.fixture {
            agent.push_str(&format!(" fixture={}", fixture.display()));
        }
        agent.push_str(&format!(" timeout={}s", self.agent.timeout.as_secs()));
        lines.push(agent);

        let scoring = self.scoring_config();
        lines.push(format!(
            "   Scoring: top {} / {} expansion seeds / {} summary terms",
            scoring.top_n, scoring.expansion_seeds, scoring.summary_terms
        ));

        let extra = &self.scoring.extra_stopwords;
        if !extra.is_empty() {
            if extra.len() <= 3 {
                lines.push(format!("   Extra stopwords: {}", extra.join(", ")));
            } else {
                lines.push(format!(
                    "   Extra stopwords: {}, ... (+{} more)",
                    extra[..2].join(", "),
                    extra.len() - 2
                ));
            }
        }

        lines.join("\n")
    }
}
