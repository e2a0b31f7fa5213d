//! Temporal narrative graphs
//!
//! Nodes are episodes in caller order; edges connect every pair whose
//! proximity relation is kept. The graph identifier is computed from the
//! content of nodes and edges only, independent of node order.

use chrono::Duration;
use narrative_model::__private::Sealed;
use narrative_model::{Episode, Fingerprint, Identified};
use tracing::debug;

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::proximity::{classify, ProximityRelation};

/// Relation between two nodes, referenced by index
///
/// # Invariants
/// `source_index < target_index`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NarrativeEdge {
    source_index: usize,
    target_index: usize,
    relation: ProximityRelation,
}

impl NarrativeEdge {
    /// Create edge with canonical ordering
    ///
    /// # Errors
    /// Returns [`AnalyticsError::InvalidEdge`] unless `source_index < target_index`
    pub fn new(source_index: usize, target_index: usize, relation: ProximityRelation) -> AnalyticsResult<Self> {
        if source_index >= target_index {
            return Err(AnalyticsError::InvalidEdge {
                source_index,
                target_index,
            });
        }
        Ok(Self {
            source_index,
            target_index,
            relation,
        })
    }

    #[inline]
    #[must_use]
    pub fn source_index(&self) -> usize {
        self.source_index
    }

    #[inline]
    #[must_use]
    pub fn target_index(&self) -> usize {
        self.target_index
    }

    #[inline]
    #[must_use]
    pub fn relation(&self) -> ProximityRelation {
        self.relation
    }

    /// Whether `node` is one of the endpoints
    #[inline]
    #[must_use]
    pub fn touches(&self, node: usize) -> bool {
        self.source_index == node || self.target_index == node
    }
}

/// Episodes plus the proximity edges between them
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalNarrativeGraph {
    nodes: Vec<Episode>,
    node_ids: Vec<Fingerprint>,
    edges: Vec<NarrativeEdge>,
    adjacency_threshold: Option<Duration>,
}

impl TemporalNarrativeGraph {
    /// Assemble a graph from parts
    ///
    /// # Errors
    /// Returns [`AnalyticsError::NodeOutOfBounds`] if an edge references a
    /// missing node
    pub fn new(
        nodes: Vec<Episode>,
        edges: Vec<NarrativeEdge>,
        adjacency_threshold: Option<Duration>,
    ) -> AnalyticsResult<Self> {
        if let Some(edge) = edges.iter().find(|e| e.target_index >= nodes.len()) {
            return Err(AnalyticsError::NodeOutOfBounds {
                index: edge.target_index,
                len: nodes.len(),
            });
        }
        let node_ids = nodes.iter().map(Episode::episode_id).collect();
        Ok(Self {
            nodes,
            node_ids,
            edges,
            adjacency_threshold,
        })
    }

    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[Episode] {
        &self.nodes
    }

    /// Episode identifiers, parallel to [`Self::nodes`]
    #[inline]
    #[must_use]
    pub fn node_ids(&self) -> &[Fingerprint] {
        &self.node_ids
    }

    #[inline]
    #[must_use]
    pub fn edges(&self) -> &[NarrativeEdge] {
        &self.edges
    }

    #[inline]
    #[must_use]
    pub fn adjacency_threshold(&self) -> Option<Duration> {
        self.adjacency_threshold
    }

    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Edges incident to `node_index`
    ///
    /// # Errors
    /// Returns [`AnalyticsError::NodeOutOfBounds`] for an unknown index
    pub fn edges_for_node(&self, node_index: usize) -> AnalyticsResult<Vec<NarrativeEdge>> {
        if node_index >= self.nodes.len() {
            return Err(AnalyticsError::NodeOutOfBounds {
                index: node_index,
                len: self.nodes.len(),
            });
        }
        Ok(self.edges.iter().filter(|e| e.touches(node_index)).copied().collect())
    }

    /// Edges carrying `relation`
    #[must_use]
    pub fn edges_by_relation(&self, relation: ProximityRelation) -> Vec<NarrativeEdge> {
        self.edges.iter().filter(|e| e.relation == relation).copied().collect()
    }

    /// Content-derived graph identifier
    ///
    /// Hashes the sorted node identifiers and the sorted edge descriptors
    /// `"{lower_id}:{higher_id}:{relation}"`, so permuting the input episodes
    /// does not change the result.
    #[must_use]
    pub fn graph_id(&self) -> Fingerprint {
        let mut nodes: Vec<String> = self.node_ids.iter().map(ToString::to_string).collect();
        nodes.sort_unstable();

        let mut edges: Vec<String> = self
            .edges
            .iter()
            .map(|edge| {
                let a = self.node_ids[edge.source_index];
                let b = self.node_ids[edge.target_index];
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                format!("{lo}:{hi}:{}", edge.relation)
            })
            .collect();
        edges.sort_unstable();

        let content = format!("nodes={};edges={}", nodes.join(","), edges.join(","));
        Fingerprint::compute_str(&content)
    }
}

impl Sealed for TemporalNarrativeGraph {}

impl Identified for TemporalNarrativeGraph {
    const TYPE_ID: &'static str = "narrative_graph";

    fn identifier(&self) -> Fingerprint {
        self.graph_id()
    }
}

/// Build a graph by classifying every unordered pair of episodes
///
/// Nodes keep input order; edges follow the `(i, j)` scan order with
/// `i < j`. Disjoint pairs produce edges only when `include_disjoint_edges`
/// is set. The scan is quadratic, which suits per-subject episode counts.
///
/// # Errors
/// Returns [`AnalyticsError::InvalidArgument`] for a negative threshold
pub fn build_graph(
    episodes: Vec<Episode>,
    adjacency_threshold: Duration,
    include_disjoint_edges: bool,
) -> AnalyticsResult<TemporalNarrativeGraph> {
    if adjacency_threshold < Duration::zero() {
        return Err(AnalyticsError::invalid_argument(
            "adjacency_threshold must be non-negative",
        ));
    }

    let mut edges = Vec::new();
    for (i, a) in episodes.iter().enumerate() {
        for (j, b) in episodes.iter().enumerate().skip(i + 1) {
            let relation = classify(a, b, adjacency_threshold)?;
            if relation != ProximityRelation::Disjoint || include_disjoint_edges {
                edges.push(NarrativeEdge::new(i, j, relation)?);
            }
        }
    }

    debug!(
        nodes = episodes.len(),
        edges = edges.len(),
        include_disjoint_edges,
        "built narrative graph"
    );
    TemporalNarrativeGraph::new(episodes, edges, Some(adjacency_threshold))
}
