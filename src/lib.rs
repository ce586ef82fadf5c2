#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod graph;
pub mod loader;
pub mod matcher;
pub mod render;
pub mod rewrite;

pub use graph::{GraphError, Label, LabeledGraph, NodeId, Slot};
pub use loader::{LoadError, RuleProgram};
pub use matcher::{find_match, is_subgraph, MatchFailure, PatternMatch};
pub use rewrite::{apply_pushout, RewriteOutcome, RewriteReport, Rule};

use rustc_hash::{FxHashMap, FxHashSet};

/// The hash map used throughout the crate.
pub type HashMap<K, V> = FxHashMap<K, V>;
/// The hash set used throughout the crate.
pub type HashSet<T> = FxHashSet<T>;
