//! Concept ontology - a curated directed graph of academic concepts.
//!
//! Student input is free text ("Business Admin", "intro to stats"). The
//! ontology maps that text onto canonical concepts and surfaces their direct
//! neighbours, so a profile can mention "Consumer Behavior" even though the
//! student only typed their major.
//!
//! Loaded once from two CSV tables; read-only afterwards.

mod graph;
mod loader;

pub use graph::{ConceptEdge, ConceptGraph, ConceptNode};
