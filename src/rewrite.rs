//! Single-pushout rewriting of a host graph.
//!
//! A [`Rule`] is a pair of labeled graphs. Applying it to a host with
//! [`apply_pushout`] deletes the part of the host matched by the left-hand
//! side but absent from the right-hand side, then glues in the part of the
//! right-hand side absent from the host. Node correspondence between the
//! two sides is established purely by equal labels; the labels both sides
//! share are the rule's interface and survive the rewrite.

use itertools::Itertools;

use crate::graph::{Label, LabeledGraph};
use crate::matcher::{edge_labels, find_match, MatchFailure};

/// A rewrite rule: a left-hand pattern and a right-hand replacement.
///
/// Both sides are ordinary labeled graphs with independent node indices.
/// Rules are never mutated by rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        serialize = "L: Label + serde::Serialize",
        deserialize = "L: Label + serde::Deserialize<'de>"
    ))
)]
pub struct Rule<L: Label> {
    left: LabeledGraph<L>,
    right: LabeledGraph<L>,
}

impl<L: Label> Rule<L> {
    /// Create a rule from its left- and right-hand sides.
    pub fn new(left: LabeledGraph<L>, right: LabeledGraph<L>) -> Self {
        Self { left, right }
    }

    /// The left-hand side: what the rule consumes.
    pub fn left(&self) -> &LabeledGraph<L> {
        &self.left
    }

    /// The right-hand side: what the rule produces.
    pub fn right(&self) -> &LabeledGraph<L> {
        &self.right
    }

    /// The labels shared by both sides, preserved by the rewrite.
    pub fn interface(&self) -> impl Iterator<Item = &L> + '_ {
        self.left
            .live_labels()
            .filter(|label| self.right.contains_label(label))
    }
}

/// What a successful [`apply_pushout`] did to the host, by label.
///
/// All vectors are in a deterministic order (node fields in slot order of
/// the rule side that drove the phase, edge fields in sorted index order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteReport<L> {
    /// Labels whose host nodes were tombstoned.
    pub deleted_nodes: Vec<L>,
    /// Labels appended to the host as new nodes.
    pub added_nodes: Vec<L>,
    /// Host edges removed, as endpoint label pairs.
    pub removed_edges: Vec<(L, L)>,
    /// Host edges added, as endpoint label pairs.
    pub added_edges: Vec<(L, L)>,
}

// Not derived: labels need no `Default` for the report to start empty.
impl<L> Default for RewriteReport<L> {
    fn default() -> Self {
        Self {
            deleted_nodes: Vec::new(),
            added_nodes: Vec::new(),
            removed_edges: Vec::new(),
            added_edges: Vec::new(),
        }
    }
}

impl<L> RewriteReport<L> {
    /// Whether the rewrite changed the host at all.
    pub fn is_noop(&self) -> bool {
        self.deleted_nodes.is_empty()
            && self.added_nodes.is_empty()
            && self.removed_edges.is_empty()
            && self.added_edges.is_empty()
    }
}

/// The outcome of [`apply_pushout`].
#[derive(Debug, Clone, PartialEq)]
pub enum RewriteOutcome<L: Label> {
    /// The rule was applied; the report lists what changed.
    Applied(RewriteReport<L>),
    /// The left-hand side did not match; the host was left untouched.
    NoMatch(MatchFailure<L>),
}

impl<L: Label> RewriteOutcome<L> {
    /// Whether the rule was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, RewriteOutcome::Applied(_))
    }

    /// The report of an applied rewrite, if any.
    pub fn report(&self) -> Option<&RewriteReport<L>> {
        match self {
            RewriteOutcome::Applied(report) => Some(report),
            RewriteOutcome::NoMatch(_) => None,
        }
    }
}

/// Apply `rule` to `host` with single-pushout semantics.
///
/// The left-hand side must match the host
/// ([`find_match`](crate::find_match)); otherwise this is a soft failure:
/// the host is returned untouched inside [`RewriteOutcome::NoMatch`].
///
/// On a match, the host is mutated in place in four ordered phases:
/// 1. labels in `left` but not `right` are deleted (incident edges
///    removed, node tombstoned, index kept);
/// 2. labels in `right` not live in the host are appended as new nodes;
/// 3. edges of `left` whose endpoints are still live in the host are
///    removed;
/// 4. edges of `right` whose endpoints are live in the host are added.
///
/// Interface labels are neither deleted nor re-created; their edges are
/// removed in phase 3 and restored in phase 4 when present in `right`, so
/// a rule with identical sides leaves the host unchanged. Callers that
/// need the pre-rewrite host must clone it beforehand; the engine never
/// clones implicitly.
pub fn apply_pushout<L: Label>(rule: &Rule<L>, host: &mut LabeledGraph<L>) -> RewriteOutcome<L> {
    if let Err(failure) = find_match(rule.left(), host) {
        return RewriteOutcome::NoMatch(failure);
    }
    let mut report = RewriteReport::default();

    // Phase 1: delete what the rule consumes.
    let consumed = rule
        .left
        .live_labels()
        .filter(|label| !rule.right.contains_label(label))
        .cloned()
        .collect_vec();
    for label in consumed {
        if let Some(node) = host.node_id(&label) {
            host.remove_incident_edges(node);
            host.tombstone(node);
            report.deleted_nodes.push(label);
        }
    }

    // Phase 2: append what the rule produces.
    for label in rule.right.live_labels() {
        if host.node_id(label).is_none() {
            host.append_node(label.clone());
            report.added_nodes.push(label.clone());
        }
    }

    // Phase 3: drop the matched left-hand edges. Edges whose endpoints
    // were tombstoned in phase 1 are already gone and skipped here.
    for (u, v) in rule.left.edges() {
        let (label_u, label_v) = edge_labels(&rule.left, u, v);
        let (Some(host_u), Some(host_v)) = (host.node_id(label_u), host.node_id(label_v)) else {
            continue;
        };
        if host.remove_edge(host_u, host_v) {
            report.removed_edges.push((label_u.clone(), label_v.clone()));
        }
    }

    // Phase 4: glue in the right-hand edges. Set semantics, so re-adding
    // an interface edge is a no-op.
    for (u, v) in rule.right.edges() {
        let (label_u, label_v) = edge_labels(&rule.right, u, v);
        let (Some(host_u), Some(host_v)) = (host.node_id(label_u), host.node_id(label_v)) else {
            continue;
        };
        if host.add_edge(host_u, host_v) {
            report.added_edges.push((label_u.clone(), label_v.clone()));
        }
    }

    RewriteOutcome::Applied(report)
}
