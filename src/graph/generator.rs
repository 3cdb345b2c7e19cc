//! Random bipartite graph generation.
//!
//! Part one holds nodes `0..n`, part two holds nodes `n..n+m`. Every cross pair
//! is kept independently with a fixed probability. Unless the generator is
//! seeded, the output differs from run to run.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use rand::{rngs::SmallRng, Rng, SeedableRng};

use super::{Graph, NodeId};

pub const DEFAULT_EDGE_PROBABILITY: f64 = 0.3;

pub struct GraphGenerator<R: Rng = SmallRng> {
    rng: R,
    probability: f64,
}

impl GraphGenerator<SmallRng> {
    /// Seeded from OS entropy. Output is not reproducible.
    pub fn from_entropy(probability: f64) -> anyhow::Result<Self> {
        Self::new(SmallRng::from_entropy(), probability)
    }

    pub fn seeded(seed: u64, probability: f64) -> anyhow::Result<Self> {
        Self::new(SmallRng::seed_from_u64(seed), probability)
    }

    /// `seed` if given, OS entropy otherwise.
    pub fn with_seed(seed: Option<u64>, probability: f64) -> anyhow::Result<Self> {
        match seed {
            Some(seed) => Self::seeded(seed, probability),
            None => Self::from_entropy(probability),
        }
    }
}

impl<R: Rng> GraphGenerator<R> {
    pub fn new(rng: R, probability: f64) -> anyhow::Result<Self> {
        if !(0.0..=1.0).contains(&probability) {
            anyhow::bail!("Edge probability must be within [0, 1], got {}", probability);
        }
        Ok(Self { rng, probability })
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    fn for_each_edge(
        &mut self,
        n: usize,
        m: usize,
        mut f: impl FnMut(NodeId, NodeId) -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        for u in 0..n {
            for v in n..n + m {
                if self.rng.gen::<f64>() < self.probability {
                    f(u, v)?;
                }
            }
        }
        Ok(())
    }

    /// Stream a random graph into `out` as an edge list. Returns the number of edges written.
    pub fn write_edges(&mut self, n: usize, m: usize, out: &mut impl Write) -> anyhow::Result<usize> {
        let mut edges = 0;
        self.for_each_edge(n, m, |u, v| {
            writeln!(out, "{} {}", u, v)?;
            edges += 1;
            Ok(())
        })?;
        Ok(edges)
    }

    /// Write a random graph to `path`, overwriting the file.
    /// Edges are streamed to disk, the graph is never held in memory.
    pub fn generate_to_file(&mut self, n: usize, m: usize, path: &Path) -> anyhow::Result<usize> {
        let file = File::create(path)
            .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", path.display(), e))?;
        let mut out = BufWriter::new(file);
        let edges = self.write_edges(n, m, &mut out)?;
        out.flush()?;
        log::debug!("Generated {}x{} graph with {} edges: {}", n, m, edges, path.display());
        Ok(edges)
    }

    /// Build a random graph in memory.
    pub fn generate(&mut self, n: usize, m: usize) -> anyhow::Result<Graph> {
        let mut graph = Graph::new();
        self.for_each_edge(n, m, |u, v| graph.add_edge(u, v).map(|_| ()))?;
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_parts_write_an_empty_file() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let edges = GraphGenerator::seeded(0, DEFAULT_EDGE_PROBABILITY)?.write_edges(0, 0, &mut out)?;
        assert_eq!(edges, 0);
        assert!(out.is_empty());
        Ok(())
    }

    #[test]
    fn probability_one_gives_complete_bipartite() -> anyhow::Result<()> {
        let graph = GraphGenerator::seeded(7, 1.0)?.generate(2, 3)?;
        assert_eq!(graph.edge_count(), 6);
        for u in 0..2 {
            assert_eq!(graph.neighbors(u).collect::<Vec<_>>(), [2, 3, 4]);
        }
        Ok(())
    }

    #[test]
    fn edges_cross_the_partition() -> anyhow::Result<()> {
        let graph = GraphGenerator::seeded(3, 0.5)?.generate(10, 20)?;
        for edge in graph.edges() {
            assert!(edge.0 < 10);
            assert!((10..30).contains(&edge.1));
        }
        Ok(())
    }

    #[test]
    fn seeded_output_is_reproducible() -> anyhow::Result<()> {
        let mut a = Vec::new();
        let mut b = Vec::new();
        GraphGenerator::seeded(42, 0.3)?.write_edges(20, 20, &mut a)?;
        GraphGenerator::seeded(42, 0.3)?.write_edges(20, 20, &mut b)?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn written_edges_match_in_memory_graph() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let written = GraphGenerator::seeded(9, 0.3)?.write_edges(15, 25, &mut out)?;
        let parsed = Graph::parse_edge_list(out.as_slice())?;
        let built = GraphGenerator::seeded(9, 0.3)?.generate(15, 25)?;
        assert_eq!(written, parsed.edge_count());
        assert_eq!(parsed, built);
        Ok(())
    }

    #[test]
    fn rejects_bad_probability() {
        assert!(GraphGenerator::seeded(0, 1.5).is_err());
        assert!(GraphGenerator::seeded(0, -0.1).is_err());
    }
}
