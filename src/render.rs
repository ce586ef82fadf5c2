//! Rendering labeled graphs to Graphviz dot and exporting them to CSV.
//!
//! The core never deallocates node slots, so both outputs surface
//! tombstones explicitly: dashed gray `∅` nodes in dot, a `tombstone`
//! status column in CSV. Node identifiers in both outputs are the stable
//! slot indices.

use std::io;

use itertools::Itertools;
use petgraph::dot::{Config, Dot};
use petgraph::graph::UnGraph;

use crate::graph::{Label, LabeledGraph, NodeId};

/// Render `graph` as a Graphviz dot string.
///
/// Live nodes are labeled `index: label`; tombstoned slots are drawn
/// dashed and gray.
pub fn dot_string<L: Label>(graph: &LabeledGraph<L>) -> String {
    // Edge weights are unused but must be `Display` for dot output.
    let mut vis: UnGraph<String, String> = UnGraph::new_undirected();
    let ids = graph
        .slots()
        .iter()
        .map(|slot| {
            vis.add_node(match slot.label() {
                Some(label) => label.to_string(),
                None => String::new(),
            })
        })
        .collect_vec();
    for (i, j) in graph.edges() {
        vis.add_edge(ids[usize::from(i)], ids[usize::from(j)], String::new());
    }
    format!(
        "{}",
        Dot::with_attr_getters(
            &vis,
            &[Config::EdgeNoLabel, Config::NodeNoLabel],
            &|_, _| String::new(),
            &|_, (idx, label)| {
                if graph.is_tombstoned(NodeId(idx.index())) {
                    "label = \"∅\", style = \"dashed\", color = \"gray\"".to_string()
                } else {
                    format!("label = \"{}: {label}\"", idx.index())
                }
            },
        )
    )
}

/// Write the node table of `graph` as CSV: `node`, `label`, `status`.
pub fn write_node_csv<L: Label>(graph: &LabeledGraph<L>, writer: impl io::Write) -> csv::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["node", "label", "status"])?;
    for (i, slot) in graph.slots().iter().enumerate() {
        let (label, status) = match slot.label() {
            Some(label) => (label.to_string(), "live"),
            None => (String::new(), "tombstone"),
        };
        csv_writer.write_record([i.to_string(), label, status.to_string()])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the edge table of `graph` as CSV: `source`, `target`.
pub fn write_edge_csv<L: Label>(graph: &LabeledGraph<L>, writer: impl io::Write) -> csv::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["source", "target"])?;
    for (i, j) in graph.edges() {
        csv_writer.write_record([i.to_string(), j.to_string()])?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn rewritten() -> LabeledGraph<&'static str> {
        // a -- b -- c with b deleted, as a rewrite would leave it.
        let mut graph = LabeledGraph::new(["a", "b", "c"], [(0, 1), (1, 2)]).unwrap();
        let b = graph.node_id(&"b").unwrap();
        graph.remove_incident_edges(b);
        graph.tombstone(b);
        graph.add_edge(NodeId(0), NodeId(2));
        graph
    }

    #[rstest]
    fn dot_marks_tombstones(rewritten: LabeledGraph<&'static str>) {
        let dot = dot_string(&rewritten);
        assert!(dot.contains("label = \"0: a\""));
        assert!(dot.contains("label = \"2: c\""));
        assert!(dot.contains("style = \"dashed\""));
        // Exactly one tombstone.
        assert_eq!(dot.matches('∅').count(), 1);
        // The a -- c edge is drawn, undirected.
        assert!(dot.contains("--"));
    }

    #[rstest]
    fn node_csv(rewritten: LabeledGraph<&'static str>) {
        let mut buf = Vec::new();
        write_node_csv(&rewritten, &mut buf).unwrap();
        assert_snapshot!(String::from_utf8(buf).unwrap(), @r###"
        node,label,status
        0,a,live
        1,,tombstone
        2,c,live
        "###);
    }

    #[rstest]
    fn edge_csv(rewritten: LabeledGraph<&'static str>) {
        let mut buf = Vec::new();
        write_edge_csv(&rewritten, &mut buf).unwrap();
        assert_snapshot!(String::from_utf8(buf).unwrap(), @r###"
        source,target
        0,2
        "###);
    }
}
