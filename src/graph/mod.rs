//! Bipartite graphs and the plain-text edge list format.
//!
//! The edge list format is one `"<u> <v>"` pair per line, with decimal node ids
//! separated by whitespace. There is no header and no edge-count prefix.
//! Parallel edges are collapsed when a file is loaded.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    ops::Bound,
    path::Path,
};

use serde::{Deserialize, Serialize};

pub mod generator;

pub type NodeId = usize;

/// An undirected edge, always stored with the smaller endpoint first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge(pub NodeId, pub NodeId);

impl Edge {
    pub fn new(u: NodeId, v: NodeId) -> Self {
        Self(u.min(v), u.max(v))
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.0 == node || self.1 == node
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

/// An undirected simple graph stored as sorted adjacency sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,
    edges: usize,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an edge. Returns `false` if the edge was already present.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId) -> anyhow::Result<bool> {
        if u == v {
            anyhow::bail!("Self-loop at node {}", u);
        }
        let inserted = self.adjacency.entry(u).or_default().insert(v);
        self.adjacency.entry(v).or_default().insert(u);
        if inserted {
            self.edges += 1;
        }
        Ok(inserted)
    }

    pub fn from_edges(edges: impl IntoIterator<Item = (NodeId, NodeId)>) -> anyhow::Result<Self> {
        let mut graph = Self::new();
        for (u, v) in edges {
            graph.add_edge(u, v)?;
        }
        Ok(graph)
    }

    /// Parse an edge list. Blank lines are skipped, anything else must be a pair of node ids.
    pub fn parse_edge_list(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut graph = Self::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let mut fields = line.split_whitespace();
            let (u, v) = match (fields.next(), fields.next(), fields.next()) {
                (None, _, _) => continue,
                (Some(u), Some(v), None) => (u, v),
                _ => anyhow::bail!("Line {}: expected `<u> <v>`, got `{}`", lineno + 1, line),
            };
            let parse = |s: &str| {
                s.parse::<NodeId>().map_err(|e| {
                    anyhow::anyhow!("Line {}: invalid node id `{}`: {}", lineno + 1, s, e)
                })
            };
            graph.add_edge(parse(u)?, parse(v)?)?;
        }
        Ok(graph)
    }

    pub fn read_edge_list(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .map_err(|e| anyhow::anyhow!("Failed to open graph {}: {}", path.display(), e))?;
        Self::parse_edge_list(BufReader::new(file))
    }

    pub fn write_edge_list(&self, path: &Path) -> anyhow::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        for edge in self.edges() {
            writeln!(out, "{} {}", edge.0, edge.1)?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// Nodes in ascending order. Only nodes with at least one edge exist.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.get(&node).into_iter().flatten().copied()
    }

    pub fn degree(&self, node: NodeId) -> usize {
        self.adjacency.get(&node).map_or(0, |n| n.len())
    }

    /// Maximum node degree, 0 for an edgeless graph.
    pub fn max_degree(&self) -> usize {
        self.adjacency.values().map(|n| n.len()).max().unwrap_or(0)
    }

    /// Every edge exactly once, in ascending order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.adjacency.iter().flat_map(|(&u, neighbors)| {
            neighbors
                .range((Bound::Excluded(u), Bound::Unbounded))
                .map(move |&v| Edge(u, v))
        })
    }

    pub fn has_edge(&self, edge: Edge) -> bool {
        self.adjacency
            .get(&edge.0)
            .is_some_and(|n| n.contains(&edge.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_edges_are_collapsed() -> anyhow::Result<()> {
        let graph = Graph::parse_edge_list("0 3\n3 0\n0 3\n1 3\n".as_bytes())?;
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edges().collect::<Vec<_>>(), [Edge(0, 3), Edge(1, 3)]);
        Ok(())
    }

    #[test]
    fn degrees() -> anyhow::Result<()> {
        let graph = Graph::from_edges([(0, 2), (0, 3), (1, 3)])?;
        assert_eq!(graph.degree(0), 2);
        assert_eq!(graph.degree(3), 2);
        assert_eq!(graph.degree(7), 0);
        assert_eq!(graph.max_degree(), 2);
        assert_eq!(Graph::new().max_degree(), 0);
        Ok(())
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(Graph::parse_edge_list("0 1 2\n".as_bytes()).is_err());
        assert!(Graph::parse_edge_list("0 x\n".as_bytes()).is_err());
        assert!(Graph::parse_edge_list("4 4\n".as_bytes()).is_err());
    }

    #[test]
    fn blank_lines_are_skipped() -> anyhow::Result<()> {
        let graph = Graph::parse_edge_list("\n0 1\n\n".as_bytes())?;
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.has_edge(Edge::new(1, 0)));
        Ok(())
    }

    #[test]
    fn largest_node_id() -> anyhow::Result<()> {
        let graph = Graph::parse_edge_list(format!("{} 0\n", usize::MAX).as_bytes())?;
        assert_eq!(graph.edges().collect::<Vec<_>>(), [Edge(0, usize::MAX)]);
        assert_eq!(graph.max_degree(), 1);
        Ok(())
    }
}
