//! Error types for persona-bridge.
//!
//! Each I/O seam gets its own enum. None of these abort a recommendation run:
//! the pipeline degrades on them (absent ontology, empty corpus, zero
//! collaborator contribution) and logs what it dropped.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure to load the concept ontology.
///
/// Any variant means the whole graph is absent; there is no partial load.
#[derive(Error, Debug)]
pub enum OntologyError {
    /// One of the two CSV sources does not exist.
    #[error("ontology source not found: {}", .0.display())]
    Missing(PathBuf),

    /// A source exists but could not be opened.
    #[error("failed to open ontology source {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row (or the header) did not deserialize.
    #[error("malformed {table} row {row}: {message}")]
    MalformedRow {
        table: &'static str,
        row: usize,
        message: String,
    },
}

/// Failure to load the course corpus.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("course corpus not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to read course corpus {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse course corpus: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure of a single collaborator call.
///
/// These never cross the scoring boundary; they are turned into an empty
/// expansion or an `Unavailable` relevance outcome.
#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("failed to launch {agent}: {source}")]
    Spawn {
        agent: String,
        #[source]
        source: std::io::Error,
    },

    #[error("lost contact with {agent}: {source}")]
    Io {
        agent: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{agent} exited with {status}: {stderr}")]
    Exit {
        agent: String,
        status: String,
        stderr: String,
    },

    #[error("{agent} did not answer within {timeout:?}")]
    Timeout { agent: String, timeout: Duration },

    #[error("empty response")]
    EmptyResponse,

    #[error("malformed response: {0}")]
    Malformed(String),

    /// No collaborator is configured, or it has nothing for this input.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}

impl CollaboratorError {
    /// Short, user-facing reason shown in place of a relevance justification.
    pub fn display_reason(&self) -> &'static str {
        match self {
            CollaboratorError::Unavailable(_) => "relevance analysis unavailable",
            CollaboratorError::Timeout { .. } => "relevance analysis timed out",
            _ => "relevance analysis failed",
        }
    }
}

/// Failure to read an explicitly requested configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_reason_distinguishes_unavailable() {
        let unavailable = CollaboratorError::Unavailable("no agent".into());
        let malformed = CollaboratorError::Malformed("not json".into());
        assert_eq!(unavailable.display_reason(), "relevance analysis unavailable");
        assert_eq!(malformed.display_reason(), "relevance analysis failed");
    }

    #[test]
    fn test_row_error_message() {
        let err = OntologyError::MalformedRow {
            table: "nodes",
            row: 3,
            message: "missing field `label`".into(),
        };
        assert_eq!(err.to_string(), "malformed nodes row 3: missing field `label`");
    }
}
