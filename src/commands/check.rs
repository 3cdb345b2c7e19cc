use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;

use crate::{
    coloring::{validate, validate_all, ColoringParser, ParseMode},
    graph::Graph,
};

/// Validate an external coloring output against a graph
#[derive(Parser)]
pub struct CheckArgs {
    /// Edge list of the graph
    pub graph: PathBuf,
    /// Coloring output to check
    pub coloring: PathBuf,
    /// Reject outputs that list an edge more than once
    #[arg(long, default_value = "false")]
    pub strict: bool,
    /// Report every violation instead of the first one
    #[arg(long, default_value = "false")]
    pub all: bool,
}

impl CheckArgs {
    pub fn run(&self) -> anyhow::Result<()> {
        let graph = Graph::read_edge_list(&self.graph)?;
        let mode = if self.strict {
            ParseMode::Strict
        } else {
            ParseMode::Lenient
        };
        let coloring = ColoringParser::new(mode).parse_file(&self.coloring)?;
        println!(
            "graph: {} nodes, {} edges, max degree {}",
            graph.node_count(),
            graph.edge_count(),
            graph.max_degree()
        );
        println!("coloring: {} edges, {} colors", coloring.len(), coloring.num_colors);
        if coloring.num_colors == 0 && graph.edge_count() > 0 {
            anyhow::bail!("No coloring produced");
        }
        if self.all {
            let violations = validate_all(&coloring, &graph);
            if violations.is_empty() {
                println!("{}", "✔ Valid coloring".green());
                return Ok(());
            }
            for v in &violations {
                eprintln!("  {}", v.to_string().red());
            }
            anyhow::bail!("{} violations found", violations.len());
        }
        let validity = validate(&coloring, &graph);
        if !validity.valid {
            anyhow::bail!("{}", validity.message);
        }
        println!("{}", format!("✔ {}", validity.message).green());
        Ok(())
    }
}
