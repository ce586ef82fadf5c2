//! Label-keyed matching of a pattern graph inside a host graph.
//!
//! Matching here is not a backtracking subgraph-isomorphism search: labels
//! are unique within a graph, so each pattern node has at most one
//! candidate host node and the whole match is found in a single pass. The
//! mapping is returned explicitly as a [`PatternMatch`] so that callers
//! never have to re-derive node correspondence by re-scanning labels.

use bimap::BiHashMap;
use thiserror::Error;

use crate::graph::{Label, LabeledGraph, NodeId};

/// A witness that a pattern was found in a host graph.
///
/// Maps every live pattern node to the host node carrying the same label.
/// The mapping is injective: no two pattern nodes share a host node.
#[derive(Debug, Clone, Default)]
pub struct PatternMatch {
    map: BiHashMap<NodeId, NodeId>,
}

impl PatternMatch {
    /// The host node matched to `pattern_node`.
    pub fn host_node(&self, pattern_node: NodeId) -> Option<NodeId> {
        self.map.get_by_left(&pattern_node).copied()
    }

    /// The pattern node matched to `host_node`.
    pub fn pattern_node(&self, host_node: NodeId) -> Option<NodeId> {
        self.map.get_by_right(&host_node).copied()
    }

    /// The number of matched nodes.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the match is empty (the pattern had no live nodes).
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over (pattern node, host node) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.map.iter().map(|(&p, &h)| (p, h))
    }
}

/// Why a pattern was not found in a host graph.
///
/// This is a report, not an exceptional condition: a failed match is an
/// ordinary outcome and leaves the host untouched.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum MatchFailure<L: Label> {
    /// A pattern label has no live counterpart in the host.
    #[error("label {0} of the pattern does not appear in the host")]
    MissingLabel(L),
    /// A pattern edge is absent between the matched host nodes.
    #[error("edge {left}--{right} of the pattern is not an edge of the host")]
    MissingEdge {
        /// Label of one endpoint of the missing edge.
        left: L,
        /// Label of the other endpoint.
        right: L,
    },
}

/// Find `pattern` inside `host`, returning the node mapping.
///
/// Every live node of `pattern` must map to a live host node with the
/// identical label, and every pattern edge must map to an existing host
/// edge (direction-agnostic). An empty pattern always matches.
pub fn find_match<L: Label>(
    pattern: &LabeledGraph<L>,
    host: &LabeledGraph<L>,
) -> Result<PatternMatch, MatchFailure<L>> {
    let mut map = BiHashMap::new();
    for (node, label) in pattern.live_nodes() {
        let Some(host_node) = host.node_id(label) else {
            return Err(MatchFailure::MissingLabel(label.clone()));
        };
        map.insert(node, host_node);
    }
    for (u, v) in pattern.edges() {
        let (label_u, label_v) = edge_labels(pattern, u, v);
        let (Some(&host_u), Some(&host_v)) = (map.get_by_left(&u), map.get_by_left(&v)) else {
            unreachable!("edge endpoints are live nodes")
        };
        if !host.has_edge(host_u, host_v) {
            return Err(MatchFailure::MissingEdge {
                left: label_u.clone(),
                right: label_v.clone(),
            });
        }
    }
    Ok(PatternMatch { map })
}

/// Whether `pattern` is found inside `host`.
pub fn is_subgraph<L: Label>(pattern: &LabeledGraph<L>, host: &LabeledGraph<L>) -> bool {
    find_match(pattern, host).is_ok()
}

/// The labels of an edge's endpoints. Edge endpoints are never tombstoned.
pub(crate) fn edge_labels<L: Label>(graph: &LabeledGraph<L>, u: NodeId, v: NodeId) -> (&L, &L) {
    let label = |n| graph.label(n).expect("edge endpoints are never tombstoned");
    (label(u), label(v))
}
