//! Frontend contract
//!
//! Projects a [`TemporalNarrativeGraph`] into a payload whose node and edge
//! identifiers do not depend on the order episodes were discovered in.

use narrative_model::time::to_iso;
use narrative_model::{Episode, Fingerprint, SCHEMA_VERSION};
use serde::{Deserialize, Serialize};

use crate::graph::TemporalNarrativeGraph;
use crate::proximity::ProximityRelation;

/// Renumbered episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontendNode {
    pub id: Fingerprint,
    pub index: usize,
    pub start_time_iso: String,
    pub end_time_iso: String,
    pub event_count: usize,
    pub duration_seconds: f64,
}

/// Renumbered edge with a stable identifier
///
/// `source_index < target_index` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontendEdge {
    pub id: Fingerprint,
    pub source_id: Fingerprint,
    pub target_id: Fingerprint,
    pub source_index: usize,
    pub target_index: usize,
    pub relation: ProximityRelation,
}

/// Presentation payload handed to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontendGraphPayload {
    pub graph_id: Fingerprint,
    pub schema_version: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes: Vec<FrontendNode>,
    pub edges: Vec<FrontendEdge>,
}

/// Identifier of the edge between two episodes, endpoints in canonical order
#[must_use]
pub fn edge_id(source_id: &Fingerprint, target_id: &Fingerprint) -> Fingerprint {
    Fingerprint::compute_str(&format!("{source_id}:{target_id}"))
}

/// Build the canonical frontend projection of `graph`
///
/// Nodes are ordered by start time (ties broken by end time, then episode
/// identifier) and indexed `0..n`. Edges are remapped to the new indices,
/// flipped where remapping inverted them, and sorted by
/// `(source_index, target_index)`.
#[must_use]
pub fn build_frontend_payload(graph: &TemporalNarrativeGraph) -> FrontendGraphPayload {
    let ids = graph.node_ids();
    let mut order: Vec<(usize, &Episode)> = graph.nodes().iter().enumerate().collect();
    order.sort_by(|(i, a), (j, b)| {
        a.start()
            .cmp(&b.start())
            .then_with(|| a.end().cmp(&b.end()))
            .then_with(|| ids[*i].cmp(&ids[*j]))
    });

    let mut new_index = vec![0usize; order.len()];
    for (new, (old, _)) in order.iter().enumerate() {
        new_index[*old] = new;
    }

    let nodes: Vec<FrontendNode> = order
        .iter()
        .enumerate()
        .map(|(index, (old, episode))| FrontendNode {
            id: ids[*old],
            index,
            start_time_iso: to_iso(&episode.start()),
            end_time_iso: to_iso(&episode.end()),
            event_count: episode.len(),
            duration_seconds: episode.duration_secs(),
        })
        .collect();

    let mut edges: Vec<FrontendEdge> = graph
        .edges()
        .iter()
        .map(|edge| {
            let mut source = (new_index[edge.source_index()], ids[edge.source_index()]);
            let mut target = (new_index[edge.target_index()], ids[edge.target_index()]);
            if source.0 > target.0 {
                std::mem::swap(&mut source, &mut target);
            }
            FrontendEdge {
                id: edge_id(&source.1, &target.1),
                source_id: source.1,
                target_id: target.1,
                source_index: source.0,
                target_index: target.0,
                relation: edge.relation(),
            }
        })
        .collect();
    edges.sort_by_key(|e| (e.source_index, e.target_index));

    FrontendGraphPayload {
        graph_id: graph.graph_id(),
        schema_version: SCHEMA_VERSION.to_string(),
        node_count: nodes.len(),
        edge_count: edges.len(),
        nodes,
        edges,
    }
}
