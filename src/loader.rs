//! Loading rule programs from the line-oriented rule-definition format.
//!
//! A rule file is a sequence of graphs: the host graph first, then the
//! left/right sides of each rule, in order. Each graph is one label line,
//! a semicolon-separated list of labels, optionally preceded by an edge
//! line, a semicolon-separated list of `(i,j)` pairs of zero-based indices
//! into the label line that follows:
//!
//! ```text
//! (0,1)
//! A;B;C
//! (0,1)
//! A;B
//! (0,1)
//! A;C
//! ```
//!
//! declares a host `A -- B` with an isolated `C`, and one rule rerouting
//! the edge from `B` to `C`. Label tokens must be non-empty, and every
//! edge line must be followed by a label line. Graphs that fail
//! construction validation (out-of-range edges, duplicate labels) are
//! dropped.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::graph::LabeledGraph;
use crate::rewrite::Rule;

/// Errors in loading a rule file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    /// The file could not be read.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A token on an edge line is not a `(i,j)` pair of integers.
    #[error("line {line}: malformed edge token {token:?}")]
    MalformedRuleText {
        /// 1-based line number of the offending line.
        line: usize,
        /// The offending token.
        token: String,
    },
    /// An edge line was not followed by a label line.
    #[error("line {line}: edge line is not followed by a label line")]
    DanglingEdgeLine {
        /// 1-based line number of the edge line.
        line: usize,
    },
    /// The file contains no graph to act as the host.
    #[error("no host graph found")]
    NoHost,
    /// A left-hand side has no right-hand side.
    #[error("rule {index} has a left-hand side but no right-hand side")]
    UnpairedRule {
        /// 1-based index of the incomplete rule.
        index: usize,
    },
}

/// Parse the graphs of a rule file, in declaration order.
///
/// Graphs failing construction validation are dropped; malformed text is
/// an error.
pub fn load_graphs(text: &str) -> Result<Vec<LabeledGraph<String>>, LoadError> {
    let mut graphs = Vec::new();
    // The most recent edge line, waiting for its label line.
    let mut pending: Option<(usize, Vec<(usize, usize)>)> = None;
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('(') {
            // A second edge line in a row would silently drop the first
            // one; reject it like an edge line at EOF.
            if let Some(&(prev_line, _)) = pending.as_ref() {
                return Err(LoadError::DanglingEdgeLine { line: prev_line });
            }
            pending = Some((line_no + 1, parse_edge_line(line_no + 1, line)?));
        } else {
            let labels = line
                .split(';')
                .map(str::trim)
                .map(|token| {
                    if token.is_empty() {
                        return Err(LoadError::MalformedRuleText {
                            line: line_no + 1,
                            token: token.to_string(),
                        });
                    }
                    Ok(token.to_string())
                })
                .collect::<Result<Vec<_>, _>>()?;
            let edges = pending.take().map(|(_, edges)| edges).unwrap_or_default();
            if let Ok(graph) = LabeledGraph::new(labels, edges) {
                graphs.push(graph);
            }
        }
    }
    if let Some((line, _)) = pending {
        return Err(LoadError::DanglingEdgeLine { line });
    }
    Ok(graphs)
}

fn parse_edge_line(line_no: usize, line: &str) -> Result<Vec<(usize, usize)>, LoadError> {
    line.split(';')
        .map(str::trim)
        .map(|token| {
            let malformed = || LoadError::MalformedRuleText {
                line: line_no,
                token: token.to_string(),
            };
            let inner = token
                .strip_prefix('(')
                .and_then(|t| t.strip_suffix(')'))
                .ok_or_else(malformed)?;
            let (src, dst) = inner.split_once(',').ok_or_else(malformed)?;
            let parse = |s: &str| s.trim().parse::<usize>().map_err(|_| malformed());
            Ok((parse(src)?, parse(dst)?))
        })
        .collect()
}

/// A loaded rule file: the host graph and the rules to apply to it.
#[derive(Debug, Clone)]
pub struct RuleProgram {
    /// The graph the rules rewrite.
    pub host: LabeledGraph<String>,
    /// The rules, in declaration order.
    pub rules: Vec<Rule<String>>,
}

impl RuleProgram {
    /// Split an ordered graph sequence `[host, left₁, right₁, …]` into a
    /// program.
    pub fn from_graphs(graphs: Vec<LabeledGraph<String>>) -> Result<Self, LoadError> {
        let mut graphs = graphs.into_iter();
        let host = graphs.next().ok_or(LoadError::NoHost)?;
        let mut rules = Vec::new();
        while let Some(left) = graphs.next() {
            let Some(right) = graphs.next() else {
                return Err(LoadError::UnpairedRule {
                    index: rules.len() + 1,
                });
            };
            rules.push(Rule::new(left, right));
        }
        Ok(Self { host, rules })
    }

    /// Load a program from rule-definition text.
    pub fn load_str(text: &str) -> Result<Self, LoadError> {
        Self::from_graphs(load_graphs(text)?)
    }

    /// Load a program from a rule-definition file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Self::load_str(&fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    const EXAMPLE: &str = "\
(0,1)
A;B;C

(0,1)
A;B
(0,1)
A;C
";

    #[test]
    fn loads_host_and_rules() {
        let program = RuleProgram::load_str(EXAMPLE).unwrap();
        assert_eq!(program.host.num_nodes(), 3);
        assert_eq!(program.host.num_edges(), 1);
        assert_eq!(program.rules.len(), 1);
        let rule = &program.rules[0];
        assert_eq!(rule.left().live_labels().collect_vec(), ["A", "B"]);
        assert_eq!(rule.right().live_labels().collect_vec(), ["A", "C"]);
    }

    #[test]
    fn label_line_without_edges() {
        let graphs = load_graphs("A;B").unwrap();
        assert_eq!(graphs.len(), 1);
        assert_eq!(graphs[0].num_edges(), 0);
    }

    #[test]
    fn edges_are_consumed_by_one_label_line() {
        // The edge line belongs to the first graph only.
        let graphs = load_graphs("(0,1)\nA;B\nC;D").unwrap();
        assert_eq!(graphs[0].num_edges(), 1);
        assert_eq!(graphs[1].num_edges(), 0);
    }

    #[test]
    fn malformed_edge_token() {
        let err = load_graphs("(0,x)\nA;B").unwrap_err();
        assert!(matches!(
            err,
            LoadError::MalformedRuleText { line: 1, .. }
        ));
    }

    #[test]
    fn empty_label_token() {
        let err = load_graphs("X;").unwrap_err();
        assert!(matches!(
            err,
            LoadError::MalformedRuleText { line: 1, ref token } if token.is_empty()
        ));
        assert!(load_graphs("A;;B").is_err());
        // Whitespace-only tokens are empty after trimming.
        assert!(load_graphs("A; ;B").is_err());
    }

    #[test]
    fn consecutive_edge_lines() {
        let err = load_graphs("(0,1)\n(1,2)\nA;B;C").unwrap_err();
        assert!(matches!(err, LoadError::DanglingEdgeLine { line: 1 }));
    }

    #[test]
    fn dangling_edge_line() {
        let err = load_graphs("A;B\n(0,1)").unwrap_err();
        assert!(matches!(err, LoadError::DanglingEdgeLine { line: 2 }));
    }

    #[test]
    fn invalid_graphs_are_dropped() {
        // Out-of-range edge in the second graph: it is dropped, the
        // others survive.
        let graphs = load_graphs("A;B\n(0,5)\nC;D\nE").unwrap();
        assert_eq!(graphs.len(), 2);
        // Duplicate labels are dropped too.
        let graphs = load_graphs("A;A\nB").unwrap();
        assert_eq!(graphs.len(), 1);
    }

    #[test]
    fn empty_file_has_no_host() {
        assert!(matches!(
            RuleProgram::load_str("").unwrap_err(),
            LoadError::NoHost
        ));
    }

    #[test]
    fn unpaired_rule() {
        assert!(matches!(
            RuleProgram::load_str("A\nB").unwrap_err(),
            LoadError::UnpairedRule { index: 1 }
        ));
    }
}
