//! Benchmark an external bipartite edge-coloring program against an in-process
//! greedy reference colorer.
//!
//! A run generates random bipartite graphs of increasing size, runs both
//! implementations on each, checks the external coloring for correctness and
//! records time, memory and color counts.

use clap::{Parser, Subcommand};

pub mod coloring;
pub mod commands;
pub mod configs;
pub mod external;
pub mod graph;
pub mod orchestrator;
pub mod report;
pub mod utils;

/// Edge-coloring benchmark CLI
#[derive(Parser)]
#[command(name = "edgebench", version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Run(commands::run::RunArgs),
    Report(commands::report::ReportArgs),
    Generate(commands::generate::GenerateArgs),
    Check(commands::check::CheckArgs),
}

#[doc(hidden)]
pub fn entry(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Run(cmd) => cmd.run(),
        Commands::Report(cmd) => cmd.run(),
        Commands::Generate(cmd) => cmd.run(),
        Commands::Check(cmd) => cmd.run(),
    }
}
