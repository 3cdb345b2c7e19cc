use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;

use crate::graph::generator::{GraphGenerator, DEFAULT_EDGE_PROBABILITY};

/// Generate a random bipartite graph as an edge list
#[derive(Parser)]
pub struct GenerateArgs {
    /// Number of nodes in the first part
    pub n: usize,
    /// Number of nodes in the second part
    pub m: usize,
    /// Output file
    pub output: PathBuf,
    /// Probability of each edge
    #[arg(short = 'p', long, default_value_t = DEFAULT_EDGE_PROBABILITY)]
    pub probability: f64,
    /// Seed for reproducible graphs. Default to OS entropy
    #[arg(long)]
    pub seed: Option<u64>,
}

impl GenerateArgs {
    pub fn run(&self) -> anyhow::Result<()> {
        let mut generator = GraphGenerator::with_seed(self.seed, self.probability)?;
        let edges = generator.generate_to_file(self.n, self.m, &self.output)?;
        println!(
            "{} {}x{} graph with {} edges: {}",
            "✔".green(),
            self.n,
            self.m,
            edges,
            self.output.display()
        );
        Ok(())
    }
}
