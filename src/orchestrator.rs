//! Drives one benchmark run over a sequence of graph sizes.
//!
//! Per configuration: generate a graph, run the external program, run the
//! reference colorer, parse and validate the external coloring. The external
//! program is built once before the first configuration. Configurations are
//! processed strictly one after another and share the same graph and output
//! files.

use std::time::Duration;

use rand::Rng;
use serde::Serialize;

use crate::{
    coloring::{validate, ColoringParser, ParseMode, ReferenceColorer, Validity},
    configs::bench::GraphConfig,
    external::{ExecutionOutcome, ExternalColoringService},
    graph::{generator::GraphGenerator, Graph},
};

/// Measurements of one implementation on one graph.
#[derive(Debug, Clone, Serialize)]
pub struct ImplementationStats {
    pub elapsed: Duration,
    pub peak_memory_bytes: u64,
    pub colors_used: usize,
}

impl ImplementationStats {
    pub fn seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn memory_mb(&self) -> f64 {
        self.peak_memory_bytes as f64 / 1024.0 / 1024.0
    }
}

/// Comparison of both implementations on one graph configuration.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResult {
    pub config: GraphConfig,
    /// Nodes with at least one edge
    pub nodes: usize,
    pub edges: usize,
    pub external: ImplementationStats,
    pub reference: ImplementationStats,
    /// Maximum degree of the graph
    pub theoretical_minimum: usize,
    pub validity: Validity,
    /// External time divided by reference time
    pub speedup: f64,
}

impl BenchmarkResult {
    /// The external program produced no colors for a graph that has edges.
    pub fn is_empty_coloring(&self) -> bool {
        self.external.colors_used == 0 && self.edges > 0
    }
}

/// A configuration that produced no result.
#[derive(Debug, Clone)]
pub struct SkippedConfig {
    pub config: GraphConfig,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct BenchmarkRun {
    pub results: Vec<BenchmarkResult>,
    pub skipped: Vec<SkippedConfig>,
}

/// Receives progress events from the orchestrator.
#[allow(unused_variables)]
pub trait RunListener {
    fn on_config_start(&mut self, config: GraphConfig) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_result(&mut self, result: &BenchmarkResult) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_skipped(&mut self, skipped: &SkippedConfig) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_finish(&mut self, run: &BenchmarkRun) -> anyhow::Result<()> {
        Ok(())
    }
}

impl RunListener for () {}

impl<A: RunListener, B: RunListener> RunListener for (A, B) {
    fn on_config_start(&mut self, config: GraphConfig) -> anyhow::Result<()> {
        self.0.on_config_start(config)?;
        self.1.on_config_start(config)
    }

    fn on_result(&mut self, result: &BenchmarkResult) -> anyhow::Result<()> {
        self.0.on_result(result)?;
        self.1.on_result(result)
    }

    fn on_skipped(&mut self, skipped: &SkippedConfig) -> anyhow::Result<()> {
        self.0.on_skipped(skipped)?;
        self.1.on_skipped(skipped)
    }

    fn on_finish(&mut self, run: &BenchmarkRun) -> anyhow::Result<()> {
        self.0.on_finish(run)?;
        self.1.on_finish(run)
    }
}

fn speedup(external: Duration, reference: Duration) -> f64 {
    let reference = reference.as_secs_f64();
    if reference == 0.0 {
        return f64::INFINITY;
    }
    external.as_secs_f64() / reference
}

pub struct BenchmarkOrchestrator<S: ExternalColoringService, R: Rng> {
    service: S,
    generator: GraphGenerator<R>,
    parser: ColoringParser,
    reference: ReferenceColorer,
}

impl<S: ExternalColoringService, R: Rng> BenchmarkOrchestrator<S, R> {
    pub fn new(service: S, generator: GraphGenerator<R>, mode: ParseMode) -> Self {
        Self {
            service,
            generator,
            parser: ColoringParser::new(mode),
            reference: ReferenceColorer::new(),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Run every configuration in order.
    ///
    /// A build failure aborts the whole run with an error. A configuration whose
    /// external run fails, or whose output cannot be read, is recorded as skipped.
    pub fn run(
        &mut self,
        configs: &[GraphConfig],
        listener: &mut impl RunListener,
    ) -> anyhow::Result<BenchmarkRun> {
        self.service.build()?;
        let mut run = BenchmarkRun::default();
        for &config in configs {
            listener.on_config_start(config)?;
            match self.run_one(config)? {
                Ok(result) => {
                    listener.on_result(&result)?;
                    run.results.push(result);
                }
                Err(reason) => {
                    log::warn!("Skipping {}: {}", config, reason);
                    let skipped = SkippedConfig { config, reason };
                    listener.on_skipped(&skipped)?;
                    run.skipped.push(skipped);
                }
            }
        }
        listener.on_finish(&run)?;
        Ok(run)
    }

    /// Benchmark one configuration. The inner `Err` is a reason to skip it.
    fn run_one(&mut self, config: GraphConfig) -> anyhow::Result<Result<BenchmarkResult, String>> {
        let graph_path = self.service.graph_path();
        let edges = self
            .generator
            .generate_to_file(config.n, config.m, &graph_path)?;
        log::info!("Generated {} graph with {} edges", config, edges);
        let graph = Graph::read_edge_list(&graph_path)?;

        let external = match self.service.run()? {
            ExecutionOutcome::Success(result) => result,
            ExecutionOutcome::Failed { code: Some(code) } => {
                return Ok(Err(format!("external program exited with code {}", code)))
            }
            ExecutionOutcome::Failed { code: None } => {
                return Ok(Err("external program was killed by a signal".to_owned()))
            }
            ExecutionOutcome::TimedOut { after } => {
                return Ok(Err(format!("external program timed out after {:.1?}", after)))
            }
        };

        let reference = self.reference.run(&graph);

        let coloring = match self.parser.parse_file(&self.service.output_path()) {
            Ok(coloring) => coloring,
            Err(e) => return Ok(Err(format!("unusable external output: {}", e))),
        };
        let validity = validate(&coloring, &graph);
        if !validity.valid {
            log::warn!("Invalid coloring for {}: {}", config, validity.message);
        }

        Ok(Ok(BenchmarkResult {
            config,
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            speedup: speedup(external.elapsed, reference.elapsed),
            external: ImplementationStats {
                elapsed: external.elapsed,
                peak_memory_bytes: external.peak_memory_bytes,
                colors_used: coloring.num_colors,
            },
            reference: ImplementationStats {
                elapsed: reference.elapsed,
                peak_memory_bytes: reference.peak_memory_bytes,
                colors_used: reference.colors_used,
            },
            theoretical_minimum: reference.theoretical_minimum,
            validity,
        }))
    }
}
