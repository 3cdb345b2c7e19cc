//! Text report and CSV export of benchmark results.
//!
//! The report is appended to while the run progresses, so a crash still leaves
//! the sections of every finished configuration behind.

use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    configs::bench::GraphConfig,
    orchestrator::{BenchmarkResult, BenchmarkRun, RunListener, SkippedConfig},
};

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";

pub const EXTERNAL_NAME: &str = "External";
pub const REFERENCE_NAME: &str = "Reference";

/// Human readable report file.
pub struct TextReport {
    path: PathBuf,
}

impl TextReport {
    /// Create the report, truncating any previous one, and write its header.
    pub fn create(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_owned();
        let mut f = File::create(&path)?;
        writeln!(f, "BENCHMARK REPORT")?;
        writeln!(f, "Using bipartite graph generator")?;
        writeln!(f, "{}\n", RULE)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self) -> anyhow::Result<File> {
        Ok(OpenOptions::new().append(true).open(&self.path)?)
    }

    /// Note that the run stopped early, e.g. because the external program could not be built.
    pub fn aborted(&self, error: &anyhow::Error) -> anyhow::Result<()> {
        let mut f = self.append()?;
        writeln!(f, "FAILED: {}", error)?;
        Ok(())
    }

    fn write_section(f: &mut impl Write, r: &BenchmarkResult) -> anyhow::Result<()> {
        writeln!(f, "\nRESULTS:")?;
        writeln!(f, "{}", THIN_RULE)?;
        writeln!(f, "{}:", EXTERNAL_NAME)?;
        writeln!(f, "  Colors used: {}", r.external.colors_used)?;
        writeln!(f, "  Time: {:.4} sec", r.external.seconds())?;
        writeln!(f, "  Memory: {:.2} MB", r.external.memory_mb())?;
        writeln!(f, "\n{}:", REFERENCE_NAME)?;
        writeln!(f, "  Colors used: {}", r.reference.colors_used)?;
        writeln!(f, "  Theoretical minimum: {}", r.theoretical_minimum)?;
        writeln!(f, "  Time: {:.4} sec", r.reference.seconds())?;
        writeln!(f, "  Memory: {:.2} MB", r.reference.memory_mb())?;
        writeln!(f, "\nValidity {}: {}", EXTERNAL_NAME, r.validity.message)?;
        if r.is_empty_coloring() {
            writeln!(f, "WARNING: no coloring produced for a graph with {} edges", r.edges)?;
        }
        writeln!(
            f,
            "\nSpeedup {} over {}: {:.2}x",
            EXTERNAL_NAME, REFERENCE_NAME, r.speedup
        )?;
        writeln!(f, "{}", RULE)?;
        Ok(())
    }

    fn write_summary(f: &mut impl Write, run: &BenchmarkRun) -> anyhow::Result<()> {
        writeln!(f, "\n{}", RULE)?;
        writeln!(f, "SUMMARY")?;
        writeln!(f, "{}\n", RULE)?;
        for r in &run.results {
            writeln!(f, "Nodes: {}, Edges: {}", r.nodes, r.edges)?;
            writeln!(
                f,
                "  {}: {:.4}s, {:.2}MB, Colors: {}",
                EXTERNAL_NAME,
                r.external.seconds(),
                r.external.memory_mb(),
                r.external.colors_used
            )?;
            writeln!(
                f,
                "  {}: {:.4}s, {:.2}MB, Colors: {}",
                REFERENCE_NAME,
                r.reference.seconds(),
                r.reference.memory_mb(),
                r.reference.colors_used
            )?;
            let verdict = if r.validity.valid { "valid" } else { "INVALID" };
            writeln!(f, "  Coloring: {}", verdict)?;
            writeln!(f, "  Speedup: {:.2}x\n", r.speedup)?;
        }
        for s in &run.skipped {
            writeln!(f, "Skipped {}: {}", s.config, s.reason)?;
        }
        Ok(())
    }
}

impl RunListener for TextReport {
    fn on_config_start(&mut self, config: GraphConfig) -> anyhow::Result<()> {
        let mut f = self.append()?;
        writeln!(f, "\n{}", RULE)?;
        writeln!(
            f,
            "BENCHMARK: {} vs {} ({} bipartite graph)",
            EXTERNAL_NAME, REFERENCE_NAME, config
        )?;
        writeln!(f, "{}", RULE)?;
        Ok(())
    }

    fn on_result(&mut self, result: &BenchmarkResult) -> anyhow::Result<()> {
        Self::write_section(&mut self.append()?, result)
    }

    fn on_skipped(&mut self, skipped: &SkippedConfig) -> anyhow::Result<()> {
        let mut f = self.append()?;
        writeln!(f, "FAILED: {}", skipped.reason)?;
        Ok(())
    }

    fn on_finish(&mut self, run: &BenchmarkRun) -> anyhow::Result<()> {
        Self::write_summary(&mut self.append()?, run)
    }
}

pub const CSV_HEADER: &str = "n,m,nodes,edges,external_time,external_memory_mb,external_colors,reference_time,reference_memory_mb,reference_colors,theoretical_minimum,valid,speedup";

/// Write one row per result, for plotting and `edgebench report`.
pub fn write_results_csv(path: &Path, results: &[BenchmarkResult]) -> anyhow::Result<()> {
    let mut csv = File::create(path)?;
    writeln!(csv, "{}", CSV_HEADER)?;
    for r in results {
        writeln!(
            csv,
            "{},{},{},{},{},{},{},{},{},{},{},{},{}",
            r.config.n,
            r.config.m,
            r.nodes,
            r.edges,
            r.external.seconds(),
            r.external.memory_mb(),
            r.external.colors_used,
            r.reference.seconds(),
            r.reference.memory_mb(),
            r.reference.colors_used,
            r.theoretical_minimum,
            r.validity.valid,
            r.speedup
        )?;
    }
    Ok(())
}
