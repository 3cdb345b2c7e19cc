//! In-process reference colorer: greedy vertex coloring of the line graph.
//!
//! Line graph nodes are visited largest degree first, ties broken by edge order.
//! Each node takes the smallest color not used by an already colored neighbor.

use std::{
    cmp::Reverse,
    collections::HashMap,
    time::{Duration, Instant},
};

use super::{Color, Coloring};
use crate::{
    graph::{Edge, Graph, NodeId},
    utils::alloc,
};

/// Line graph of a graph. Node `i` is the `i`-th original edge.
///
/// Adjacency is derived from per-node incidence lists instead of being
/// stored, so memory stays linear in the number of original edges.
pub struct LineGraph {
    edges: Vec<Edge>,
    incident: HashMap<NodeId, Vec<usize>>,
}

impl LineGraph {
    pub fn new(graph: &Graph) -> Self {
        let edges = graph.edges().collect::<Vec<_>>();
        let mut incident: HashMap<NodeId, Vec<usize>> = HashMap::new();
        for (i, edge) in edges.iter().enumerate() {
            incident.entry(edge.0).or_default().push(i);
            incident.entry(edge.1).or_default().push(i);
        }
        Self { edges, incident }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edge(&self, i: usize) -> Edge {
        self.edges[i]
    }

    fn incident(&self, node: NodeId) -> &[usize] {
        self.incident
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn degree(&self, i: usize) -> usize {
        let Edge(u, v) = self.edges[i];
        self.incident(u).len() + self.incident(v).len() - 2
    }

    /// Original edges sharing an endpoint with edge `i`.
    pub fn neighbors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        let Edge(u, v) = self.edges[i];
        self.incident(u)
            .iter()
            .chain(self.incident(v))
            .copied()
            .filter(move |&j| j != i)
    }

    /// First-fit coloring in largest-first order.
    pub fn greedy_color(&self) -> Vec<Color> {
        let mut order = (0..self.len()).collect::<Vec<_>>();
        order.sort_by_key(|&i| Reverse(self.degree(i)));
        const UNCOLORED: Color = Color::MAX;
        let mut colors = vec![UNCOLORED; self.len()];
        // `taken[c] == stamp` marks color `c` as used around the current node
        let mut taken: Vec<usize> = Vec::new();
        for (stamp, &i) in order.iter().enumerate() {
            for j in self.neighbors(i) {
                let c = colors[j];
                if c == UNCOLORED {
                    continue;
                }
                if c >= taken.len() {
                    taken.resize(c + 1, usize::MAX);
                }
                taken[c] = stamp;
            }
            colors[i] = (0..)
                .find(|&c| taken.get(c) != Some(&stamp))
                .unwrap_or_default();
        }
        colors
    }
}

/// Output of one reference run.
#[derive(Debug, Clone)]
pub struct ReferenceRun {
    pub coloring: Coloring,
    pub colors_used: usize,
    /// Maximum node degree, a lower bound on the chromatic index.
    pub theoretical_minimum: usize,
    pub elapsed: Duration,
    pub peak_memory_bytes: u64,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceColorer;

impl ReferenceColorer {
    pub fn new() -> Self {
        Self
    }

    pub fn run(&self, graph: &Graph) -> ReferenceRun {
        let start = Instant::now();
        let ((coloring, theoretical_minimum), peak_memory_bytes) = alloc::measure_peak(|| {
            let theoretical_minimum = graph.max_degree();
            let line_graph = LineGraph::new(graph);
            let colors = line_graph.greedy_color();
            let coloring = Coloring::from_colors(
                colors
                    .into_iter()
                    .enumerate()
                    .map(|(i, c)| (line_graph.edge(i), c)),
            );
            (coloring, theoretical_minimum)
        });
        let elapsed = start.elapsed();
        ReferenceRun {
            colors_used: coloring.num_colors,
            coloring,
            theoretical_minimum,
            elapsed,
            peak_memory_bytes,
        }
    }
}
