//! Proper edge coloring checks.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use super::{Color, Coloring, COLOR_ZERO};
use crate::graph::{Edge, Graph, NodeId};

/// Verdict of a validity check, with a human readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validity {
    pub valid: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The coloring has no color for this edge of the graph.
    MissingEdge(Edge),
    /// Two edges at `node` share `color`.
    DuplicateColor { node: NodeId, color: Color },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingEdge(edge) => write!(f, "Edge {} not found", edge),
            Violation::DuplicateColor { node, color: COLOR_ZERO } => {
                write!(f, "Node {}: two edges with same color -1", node)
            }
            Violation::DuplicateColor { node, color } => {
                write!(f, "Node {}: two edges with same color {}", node, color)
            }
        }
    }
}

/// Walk all nodes in ascending order and report violations until `f` says stop.
fn scan(coloring: &Coloring, graph: &Graph, mut f: impl FnMut(Violation) -> bool) {
    let mut incident = BTreeSet::new();
    for node in graph.nodes() {
        incident.clear();
        for neighbor in graph.neighbors(node) {
            let edge = Edge::new(node, neighbor);
            let Some(color) = coloring.color(edge) else {
                if !f(Violation::MissingEdge(edge)) {
                    return;
                }
                continue;
            };
            if !incident.insert(color) && !f(Violation::DuplicateColor { node, color }) {
                return;
            }
        }
    }
}

/// Check that `coloring` is a proper edge coloring of `graph`.
/// Stops at the first violation.
pub fn validate(coloring: &Coloring, graph: &Graph) -> Validity {
    let mut first = None;
    scan(coloring, graph, |v| {
        first = Some(v);
        false
    });
    match first {
        Some(violation) => Validity {
            valid: false,
            message: violation.to_string(),
        },
        None => Validity {
            valid: true,
            message: format!("Valid coloring ({} nodes checked)", graph.node_count()),
        },
    }
}

/// Collect every violation instead of stopping at the first one.
/// A missing edge is reported once from each endpoint.
pub fn validate_all(coloring: &Coloring, graph: &Graph) -> Vec<Violation> {
    let mut violations = Vec::new();
    scan(coloring, graph, |v| {
        violations.push(v);
        true
    });
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coloring::ColoringParser;

    #[test]
    fn empty_graph_is_valid() {
        let validity = validate(&Coloring::new(), &Graph::new());
        assert!(validity.valid);
        assert!(validity.message.contains("0 nodes"));
    }

    #[test]
    fn duplicate_color_at_shared_node() -> anyhow::Result<()> {
        let graph = Graph::from_edges([(0, 3), (0, 4)])?;
        let coloring =
            ColoringParser::default().parse_str("Edge 0 - 3 : Color 1\nEdge 0 - 4 : Color 1\n")?;
        let validity = validate(&coloring, &graph);
        assert!(!validity.valid);
        assert_eq!(validity.message, "Node 0: two edges with same color 0");
        Ok(())
    }

    #[test]
    fn color_zero_is_a_color_of_its_own() -> anyhow::Result<()> {
        let graph = Graph::from_edges([(0, 3), (0, 4)])?;
        let parser = ColoringParser::default();
        let coloring = parser.parse_str("Edge 0 - 3 : Color 0\nEdge 0 - 4 : Color 1\n")?;
        assert!(validate(&coloring, &graph).valid);

        let coloring = parser.parse_str("Edge 0 - 3 : Color 0\nEdge 0 - 4 : Color 0\n")?;
        let validity = validate(&coloring, &graph);
        assert!(!validity.valid);
        assert_eq!(validity.message, "Node 0: two edges with same color -1");
        Ok(())
    }

    #[test]
    fn missing_edge() -> anyhow::Result<()> {
        let graph = Graph::from_edges([(0, 3), (1, 3)])?;
        let coloring = Coloring::from_colors([(Edge(0, 3), 0)]);
        let validity = validate(&coloring, &graph);
        assert!(!validity.valid);
        assert_eq!(validity.message, "Edge (1, 3) not found");
        Ok(())
    }

    #[test]
    fn proper_coloring_passes() -> anyhow::Result<()> {
        // K(2,2)
        let graph = Graph::from_edges([(0, 2), (0, 3), (1, 2), (1, 3)])?;
        let coloring = Coloring::from_colors([
            (Edge(0, 2), 0),
            (Edge(1, 3), 0),
            (Edge(0, 3), 1),
            (Edge(1, 2), 1),
        ]);
        let validity = validate(&coloring, &graph);
        assert!(validity.valid, "{}", validity.message);
        assert!(validate_all(&coloring, &graph).is_empty());
        Ok(())
    }

    #[test]
    fn extra_edges_in_coloring_are_ignored() -> anyhow::Result<()> {
        let graph = Graph::from_edges([(0, 2)])?;
        let coloring = Coloring::from_colors([(Edge(0, 2), 0), (Edge(5, 9), 0)]);
        assert!(validate(&coloring, &graph).valid);
        Ok(())
    }

    #[test]
    fn collects_all_violations() -> anyhow::Result<()> {
        let graph = Graph::from_edges([(0, 3), (0, 4), (1, 3), (2, 5)])?;
        let coloring = Coloring::from_colors([(Edge(0, 3), 0), (Edge(0, 4), 0), (Edge(1, 3), 1)]);
        let violations = validate_all(&coloring, &graph);
        assert_eq!(
            violations,
            [
                Violation::DuplicateColor { node: 0, color: 0 },
                Violation::MissingEdge(Edge(2, 5)),
                Violation::MissingEdge(Edge(2, 5)),
            ]
        );
        assert_eq!(validate(&coloring, &graph).message, violations[0].to_string());
        Ok(())
    }

    #[test]
    fn verdict_is_deterministic() -> anyhow::Result<()> {
        let graph = Graph::from_edges([(0, 3), (0, 4), (1, 4), (2, 3)])?;
        let coloring = Coloring::from_colors([(Edge(0, 3), 0), (Edge(1, 4), 0), (Edge(2, 3), 0)]);
        let first = validate(&coloring, &graph);
        for _ in 0..10 {
            assert_eq!(validate(&coloring, &graph), first);
        }
        Ok(())
    }
}
