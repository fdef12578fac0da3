//! CSV loading for the concept ontology.
//!
//! Two tables, exported from the curated ontology spreadsheet:
//!
//! ```text
//! nodes.csv:  id,label,type,description        (type may be named "mode")
//! edges.csv:  sourceID,targetID,relation
//! ```
//!
//! Loading is all-or-nothing. A missing file, a short row, or a row lacking a
//! required column fails the whole load, so callers never see a graph with a
//! silently missing region.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{info, warn};

use super::graph::{ConceptEdge, ConceptGraph, ConceptNode};
use crate::error::OntologyError;

#[derive(Debug, Deserialize)]
struct NodeRow {
    id: String,
    label: String,
    #[serde(default, rename = "type", alias = "mode")]
    kind: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct EdgeRow {
    #[serde(rename = "sourceID", alias = "source_id", alias = "sourceId")]
    source_id: String,
    #[serde(rename = "targetID", alias = "target_id", alias = "targetId")]
    target_id: String,
    relation: String,
}

impl ConceptGraph {
    /// Load the ontology from a nodes CSV and an edges CSV.
    pub fn load(nodes_path: &Path, edges_path: &Path) -> Result<Self, OntologyError> {
        for path in [nodes_path, edges_path] {
            if !path.exists() {
                return Err(OntologyError::Missing(path.to_path_buf()));
            }
        }
        let open = |path: &Path| {
            File::open(path).map_err(|source| OntologyError::Io {
                path: path.to_path_buf(),
                source,
            })
        };
        Self::from_readers(open(nodes_path)?, open(edges_path)?)
    }

    /// Like [`ConceptGraph::load`], but an unusable ontology is reported and
    /// replaced by `None` so profile building falls back to unexpanded seeds.
    pub fn load_or_absent(nodes_path: &Path, edges_path: &Path) -> Option<Self> {
        match Self::load(nodes_path, edges_path) {
            Ok(graph) => {
                info!(
                    nodes = graph.node_count(),
                    edges = graph.edge_count(),
                    "ontology loaded"
                );
                Some(graph)
            }
            Err(err) => {
                warn!(error = %err, "ontology unavailable; profile expansion disabled");
                None
            }
        }
    }

    /// Parse both tables from arbitrary readers.
    pub fn from_readers<N: Read, E: Read>(nodes: N, edges: E) -> Result<Self, OntologyError> {
        let node_rows: Vec<NodeRow> = read_rows(nodes, "nodes")?;
        let edge_rows: Vec<EdgeRow> = read_rows(edges, "edges")?;

        let mut nodes = Vec::with_capacity(node_rows.len());
        for (i, row) in node_rows.into_iter().enumerate() {
            if row.id.is_empty() {
                return Err(OntologyError::MalformedRow {
                    table: "nodes",
                    row: i + 1,
                    message: "empty id".into(),
                });
            }
            nodes.push(
                ConceptNode::new(row.id, row.label)
                    .with_kind(row.kind)
                    .with_description(row.description),
            );
        }

        let mut edges = Vec::with_capacity(edge_rows.len());
        for (i, row) in edge_rows.into_iter().enumerate() {
            if row.source_id.is_empty() || row.target_id.is_empty() {
                return Err(OntologyError::MalformedRow {
                    table: "edges",
                    row: i + 1,
                    message: "empty endpoint".into(),
                });
            }
            edges.push(ConceptEdge::new(row.source_id, row.target_id, row.relation));
        }

        Ok(ConceptGraph::from_parts(nodes, edges))
    }
}

fn read_rows<T: DeserializeOwned, R: Read>(
    reader: R,
    table: &'static str,
) -> Result<Vec<T>, OntologyError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    rdr.deserialize::<T>()
        .enumerate()
        .map(|(i, row)| {
            row.map_err(|e| OntologyError::MalformedRow {
                table,
                row: i + 1,
                message: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const NODES: &str = "\
id,label,mode,description
n1, Business Administration ,major,Management of organisations
n2,Marketing,skill,
n3,Consumer Behavior,skill,
";

    const EDGES: &str = "\
sourceID,targetID,relation
n1,n2,includes
n3,n1,supports
";

    #[test]
    fn test_from_readers() {
        let g = ConceptGraph::from_readers(NODES.as_bytes(), EDGES.as_bytes()).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
        // cells are trimmed
        assert_eq!(g.label("n1"), Some("Business Administration"));
        assert_eq!(g.node("n1").map(|n| n.kind.as_str()), Some("major"));
        assert_eq!(g.relation("n3", "n1"), Some("supports"));
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let nodes = "id,label\nn1,Marketing\n";
        let edges = "sourceID,targetID,relation\n";
        let g = ConceptGraph::from_readers(nodes.as_bytes(), edges.as_bytes()).unwrap();
        assert_eq!(g.node("n1").map(|n| n.kind.as_str()), Some(""));
    }

    #[test]
    fn test_alternate_edge_headers() {
        let edges = "source_id,target_id,relation\nn1,n2,includes\n";
        let g = ConceptGraph::from_readers(NODES.as_bytes(), edges.as_bytes()).unwrap();
        assert_eq!(g.successors("n1"), vec!["n2"]);
    }

    #[test]
    fn test_short_row_aborts_whole_load() {
        let nodes = "id,label,mode,description\nn1,Marketing,skill,\nn2\n";
        let err = ConceptGraph::from_readers(nodes.as_bytes(), EDGES.as_bytes()).unwrap_err();
        assert!(matches!(err, OntologyError::MalformedRow { table: "nodes", row: 2, .. }));
    }

    #[test]
    fn test_missing_required_column_aborts() {
        let edges = "sourceID,targetID\nn1,n2\n";
        let err = ConceptGraph::from_readers(NODES.as_bytes(), edges.as_bytes()).unwrap_err();
        assert!(matches!(err, OntologyError::MalformedRow { table: "edges", .. }));
    }

    #[test]
    fn test_empty_id_aborts() {
        let nodes = "id,label\n,Orphan\n";
        let err = ConceptGraph::from_readers(nodes.as_bytes(), EDGES.as_bytes()).unwrap_err();
        assert!(matches!(err, OntologyError::MalformedRow { table: "nodes", row: 1, .. }));
    }

    #[test]
    fn test_load_from_files_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let nodes_path = dir.path().join("nodes.csv");
        let edges_path = dir.path().join("edges.csv");
        File::create(&nodes_path).unwrap().write_all(NODES.as_bytes()).unwrap();

        let err = ConceptGraph::load(&nodes_path, &edges_path).unwrap_err();
        assert!(matches!(err, OntologyError::Missing(_)));
        assert!(ConceptGraph::load_or_absent(&nodes_path, &edges_path).is_none());

        File::create(&edges_path).unwrap().write_all(EDGES.as_bytes()).unwrap();
        let g = ConceptGraph::load(&nodes_path, &edges_path).unwrap();
        assert_eq!(g.node_count(), 3);
    }
}
