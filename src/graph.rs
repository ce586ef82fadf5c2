//! The labeled graph data model.
//!
//! A [`LabeledGraph`] is an arena of node slots with an undirected edge set
//! over slot indices. Indices are stable for the lifetime of the graph:
//! deleting a node leaves a [`Slot::Tombstone`] behind instead of shifting
//! later slots. Live labels are unique within a graph, which is what makes
//! label-keyed matching and rewriting well defined; the uniqueness is
//! validated at construction time rather than assumed.

use std::fmt;
use std::hash::Hash;

use derive_more::{Display, From, Into};
use itertools::Itertools;
use thiserror::Error;

use crate::{HashMap, HashSet};

/// Types that can be used as node labels.
///
/// Blanket-implemented for any type with the required bounds.
pub trait Label: Clone + Eq + Hash + fmt::Debug + fmt::Display {}

impl<L: Clone + Eq + Hash + fmt::Debug + fmt::Display> Label for L {}

/// Identify nodes by their position in the slot array.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default, Debug, Display, From, Into, Hash,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub usize);

/// A node slot: either a live label or the tombstone left behind by a
/// rewrite that deleted the node.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Slot<L> {
    /// A live node carrying a label.
    Live(L),
    /// A logically deleted node. The slot stays allocated so that other
    /// node indices never shift.
    Tombstone,
}

impl<L> Slot<L> {
    /// Whether the slot is a tombstone.
    pub fn is_tombstone(&self) -> bool {
        matches!(self, Slot::Tombstone)
    }

    /// The label of a live slot, or `None` for a tombstone.
    pub fn label(&self) -> Option<&L> {
        match self {
            Slot::Live(label) => Some(label),
            Slot::Tombstone => None,
        }
    }
}

/// Errors in constructing a [`LabeledGraph`].
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum GraphError<L: Label> {
    /// An edge endpoint is not a valid node index.
    #[error("edge ({src}, {dst}) is out of range: the graph has {num_nodes} nodes")]
    OutOfRangeEdge {
        /// First endpoint of the offending edge.
        src: usize,
        /// Second endpoint of the offending edge.
        dst: usize,
        /// Number of node slots in the graph.
        num_nodes: usize,
    },
    /// Both endpoints of an edge are the same node.
    #[error("edge ({0}, {0}) is a self-loop")]
    SelfLoop(usize),
    /// An edge endpoint is a tombstoned node.
    #[error("edge ({src}, {dst}) has a tombstoned endpoint")]
    TombstonedEndpoint {
        /// First endpoint of the offending edge.
        src: usize,
        /// Second endpoint of the offending edge.
        dst: usize,
    },
    /// The same label appears on more than one node.
    #[error("label {0} appears on more than one node")]
    AmbiguousLabel(L),
}

/// A graph with indexed, labeled nodes and an undirected edge set.
///
/// Graphs are immutable once constructed, except when used as the host of
/// [`apply_pushout`](crate::apply_pushout), which is the single place
/// allowed to mutate them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(
        try_from = "SerialGraph<L>",
        into = "SerialGraph<L>",
        bound(
            serialize = "L: Label + serde::Serialize",
            deserialize = "L: Label + serde::Deserialize<'de>"
        )
    )
)]
pub struct LabeledGraph<L: Label> {
    slots: Vec<Slot<L>>,
    edges: HashSet<(NodeId, NodeId)>,
    /// Label lookup, live slots only. Kept in sync by the mutators below.
    label_ids: HashMap<L, NodeId>,
}

/// Store edges with the smaller index first, so that lookups are
/// direction-agnostic.
fn ordered(i: NodeId, j: NodeId) -> (NodeId, NodeId) {
    if i <= j {
        (i, j)
    } else {
        (j, i)
    }
}

impl<L: Label> LabeledGraph<L> {
    /// Construct a graph from a label sequence and an edge list.
    ///
    /// The i-th label becomes the live node with [`NodeId`] `i`. Edges are
    /// unordered index pairs into the label sequence.
    pub fn new(
        labels: impl IntoIterator<Item = L>,
        edges: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<Self, GraphError<L>> {
        Self::from_slots(labels.into_iter().map(Slot::Live).collect(), edges)
    }

    /// Construct a graph from raw slots, tombstones included.
    ///
    /// Validates index bounds, self-loops, tombstoned edge endpoints and
    /// live-label uniqueness. All construction paths funnel through here.
    pub(crate) fn from_slots(
        slots: Vec<Slot<L>>,
        edges: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<Self, GraphError<L>> {
        let num_nodes = slots.len();
        let mut label_ids = HashMap::default();
        for (i, slot) in slots.iter().enumerate() {
            let Some(label) = slot.label() else { continue };
            if label_ids.insert(label.clone(), NodeId(i)).is_some() {
                return Err(GraphError::AmbiguousLabel(label.clone()));
            }
        }
        let mut edge_set = HashSet::default();
        for (src, dst) in edges {
            if src >= num_nodes || dst >= num_nodes {
                return Err(GraphError::OutOfRangeEdge {
                    src,
                    dst,
                    num_nodes,
                });
            }
            if src == dst {
                return Err(GraphError::SelfLoop(src));
            }
            if slots[src].is_tombstone() || slots[dst].is_tombstone() {
                return Err(GraphError::TombstonedEndpoint { src, dst });
            }
            edge_set.insert(ordered(src.into(), dst.into()));
        }
        Ok(Self {
            slots,
            edges: edge_set,
            label_ids,
        })
    }

    /// The number of node slots, tombstones included.
    pub fn num_nodes(&self) -> usize {
        self.slots.len()
    }

    /// The number of live (non-tombstoned) nodes.
    pub fn num_live_nodes(&self) -> usize {
        self.label_ids.len()
    }

    /// The number of edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// All node slots, in index order.
    pub fn slots(&self) -> &[Slot<L>] {
        &self.slots
    }

    /// The label of `node`, or `None` if the slot is tombstoned.
    ///
    /// Panics if `node` is out of range.
    pub fn label(&self, node: NodeId) -> Option<&L> {
        self.slots[usize::from(node)].label()
    }

    /// Whether the slot of `node` is tombstoned.
    ///
    /// Panics if `node` is out of range.
    pub fn is_tombstoned(&self, node: NodeId) -> bool {
        self.slots[usize::from(node)].is_tombstone()
    }

    /// The live node carrying `label`, if any.
    ///
    /// Constant time: labels are unique, so the lookup map built at
    /// construction resolves the node directly.
    pub fn node_id(&self, label: &L) -> Option<NodeId> {
        self.label_ids.get(label).copied()
    }

    /// Whether some live node carries `label`.
    pub fn contains_label(&self, label: &L) -> bool {
        self.label_ids.contains_key(label)
    }

    /// All live nodes with their labels, in index order.
    pub fn live_nodes(&self) -> impl Iterator<Item = (NodeId, &L)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| Some((NodeId(i), slot.label()?)))
    }

    /// All live labels, in index order.
    pub fn live_labels(&self) -> impl Iterator<Item = &L> + '_ {
        self.slots.iter().filter_map(Slot::label)
    }

    /// Whether there is an edge between `i` and `j` (in either direction).
    pub fn has_edge(&self, i: NodeId, j: NodeId) -> bool {
        self.edges.contains(&ordered(i, j))
    }

    /// The neighbors of `node`.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.edges.iter().filter_map(move |&(i, j)| {
            if i == node {
                Some(j)
            } else if j == node {
                Some(i)
            } else {
                None
            }
        })
    }

    /// All edges, sorted by endpoint indices.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.edges.iter().copied().sorted()
    }

    /// Append a live node at the next free index.
    ///
    /// The caller must make sure `label` is not already live.
    pub(crate) fn append_node(&mut self, label: L) -> NodeId {
        let node = NodeId(self.slots.len());
        let prev = self.label_ids.insert(label.clone(), node);
        debug_assert!(prev.is_none(), "label {label} is already live");
        self.slots.push(Slot::Live(label));
        node
    }

    /// Remove all edges incident to `node`.
    pub(crate) fn remove_incident_edges(&mut self, node: NodeId) {
        self.edges.retain(|&(i, j)| i != node && j != node);
    }

    /// Tombstone `node`, keeping its slot allocated.
    ///
    /// The caller must remove incident edges first.
    pub(crate) fn tombstone(&mut self, node: NodeId) {
        debug_assert!(
            self.neighbors(node).next().is_none(),
            "tombstoning a node with incident edges"
        );
        let slot = std::mem::replace(&mut self.slots[usize::from(node)], Slot::Tombstone);
        if let Some(label) = slot.label() {
            self.label_ids.remove(label);
        }
    }

    /// Insert the edge `{i, j}`. Returns whether the edge was new.
    pub(crate) fn add_edge(&mut self, i: NodeId, j: NodeId) -> bool {
        debug_assert!(i != j, "self-loops are not allowed");
        debug_assert!(
            !self.is_tombstoned(i) && !self.is_tombstoned(j),
            "adding an edge to a tombstoned node"
        );
        self.edges.insert(ordered(i, j))
    }

    /// Remove the edge `{i, j}`. Returns whether the edge was present.
    pub(crate) fn remove_edge(&mut self, i: NodeId, j: NodeId) -> bool {
        self.edges.remove(&ordered(i, j))
    }
}

/// Serializable representation of a [`LabeledGraph`].
///
/// Deserialization re-runs construction validation, so invalid inputs are
/// rejected rather than producing a graph with broken invariants.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SerialGraph<L> {
    slots: Vec<Slot<L>>,
    edges: Vec<(usize, usize)>,
}

#[cfg(feature = "serde")]
impl<L: Label> From<LabeledGraph<L>> for SerialGraph<L> {
    fn from(graph: LabeledGraph<L>) -> Self {
        let edges = graph
            .edges()
            .map(|(i, j)| (usize::from(i), usize::from(j)))
            .collect();
        Self {
            slots: graph.slots,
            edges,
        }
    }
}

#[cfg(feature = "serde")]
impl<L: Label> TryFrom<SerialGraph<L>> for LabeledGraph<L> {
    type Error = GraphError<L>;

    fn try_from(serial: SerialGraph<L>) -> Result<Self, Self::Error> {
        Self::from_slots(serial.slots, serial.edges)
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn path() -> LabeledGraph<&'static str> {
        LabeledGraph::new(["a", "b", "c"], [(0, 1), (1, 2)]).unwrap()
    }

    #[rstest]
    fn queries(path: LabeledGraph<&'static str>) {
        assert_eq!(path.num_nodes(), 3);
        assert_eq!(path.num_live_nodes(), 3);
        assert_eq!(path.num_edges(), 2);
        assert_eq!(path.node_id(&"b"), Some(NodeId(1)));
        assert_eq!(path.node_id(&"z"), None);
        assert!(path.has_edge(NodeId(1), NodeId(0)));
        assert!(!path.has_edge(NodeId(0), NodeId(2)));
        assert_eq!(
            path.neighbors(NodeId(1)).sorted().collect_vec(),
            [NodeId(0), NodeId(2)]
        );
        assert_eq!(path.edges().collect_vec().len(), 2);
    }

    #[test]
    fn out_of_range_edge() {
        let err = LabeledGraph::new(["a", "b"], [(0, 2)]).unwrap_err();
        assert_eq!(
            err,
            GraphError::OutOfRangeEdge {
                src: 0,
                dst: 2,
                num_nodes: 2
            }
        );
    }

    #[test]
    fn self_loop() {
        let err = LabeledGraph::new(["a", "b"], [(1, 1)]).unwrap_err();
        assert_eq!(err, GraphError::SelfLoop(1));
    }

    #[test]
    fn ambiguous_label() {
        let err = LabeledGraph::new(["a", "b", "a"], []).unwrap_err();
        assert_eq!(err, GraphError::AmbiguousLabel("a"));
    }

    #[test]
    fn duplicate_edges_collapse() {
        let g = LabeledGraph::new(["a", "b"], [(0, 1), (1, 0), (0, 1)]).unwrap();
        assert_eq!(g.num_edges(), 1);
    }

    #[rstest]
    fn tombstone_keeps_indices(mut path: LabeledGraph<&'static str>) {
        let b = path.node_id(&"b").unwrap();
        path.remove_incident_edges(b);
        path.tombstone(b);

        assert_eq!(path.num_nodes(), 3);
        assert_eq!(path.num_live_nodes(), 2);
        assert!(path.is_tombstoned(b));
        assert_eq!(path.node_id(&"b"), None);
        // The other nodes keep their indices.
        assert_eq!(path.node_id(&"a"), Some(NodeId(0)));
        assert_eq!(path.node_id(&"c"), Some(NodeId(2)));
        assert_eq!(path.num_edges(), 0);
    }

    #[rstest]
    fn append_after_tombstone(mut path: LabeledGraph<&'static str>) {
        let b = path.node_id(&"b").unwrap();
        path.remove_incident_edges(b);
        path.tombstone(b);

        // New nodes go to the next free index, tombstoned slots are not
        // reused.
        let d = path.append_node("d");
        assert_eq!(d, NodeId(3));
        assert_eq!(path.num_nodes(), 4);
        assert_eq!(path.node_id(&"d"), Some(d));
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn serde_roundtrip(mut path: LabeledGraph<&'static str>) {
        let b = path.node_id(&"b").unwrap();
        path.remove_incident_edges(b);
        path.tombstone(b);

        let json = serde_json::to_string(&path).unwrap();
        let back: LabeledGraph<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.num_nodes(), 3);
        assert!(back.is_tombstoned(NodeId(1)));
        assert_eq!(back.node_id(&"a".to_string()), Some(NodeId(0)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_rejects_invalid() {
        let json = r#"{"slots":[{"Live":"a"},{"Live":"a"}],"edges":[]}"#;
        let res: Result<LabeledGraph<String>, _> = serde_json::from_str(json);
        assert!(res.is_err());
    }
}
