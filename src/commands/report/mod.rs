use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Parser;

use crate::{configs::run_info::RunInfo, utils::md::MarkdownPrinter};

pub(crate) mod data;

/// Summarize the results of a benchmark run
#[derive(Parser)]
pub struct ReportArgs {
    /// The run id to report. Default to the latest run.
    pub run_id: Option<String>,
    #[arg(short = 'o', long, default_value = "edgebench-out")]
    /// Directory the run was written to
    pub output_dir: PathBuf,
}

fn format_timestamp(t: i64) -> String {
    DateTime::<Utc>::from_timestamp(t, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "N/A".to_owned())
}

impl ReportArgs {
    fn find_log_dir(&self) -> anyhow::Result<PathBuf> {
        let logs_dir = self.output_dir.join("logs");
        let log_dir = if let Some(run_id) = &self.run_id {
            logs_dir.join(run_id)
        } else {
            logs_dir.join("latest")
        };
        if !log_dir.exists() {
            anyhow::bail!("Log dir not found: {}", log_dir.display());
        }
        Ok(log_dir)
    }

    /// Render the report as markdown.
    pub fn render(&self) -> anyhow::Result<MarkdownPrinter> {
        let log_dir = self.find_log_dir()?;
        let config = RunInfo::load(&log_dir.join("config.toml"))?;
        let mut printer = MarkdownPrinter::new();
        printer.add(format!("# [{}] Benchmark Results Summary\n\n", config.profile_name));
        printer.add(format!("* Run ID: `{}`\n", config.runid));
        printer.add(format!(
            "* Start Time (UTC): `{}`\n",
            format_timestamp(config.start_timestamp_utc)
        ));
        match config.finish_timestamp_utc {
            Some(t) => printer.add(format!("* Finish Time (UTC): `{}`\n", format_timestamp(t))),
            None => printer.add("* Finish Time (UTC): `N/A`\n"),
        }
        printer.add(format!("* OS: `{}`\n", config.system.os));
        printer.add(format!("* CPU: `{}`\n", config.system.cpu_model));
        printer.add(format!("* Memory: `{} GB`\n", config.system.memory_size >> 30));
        printer.add(format!("* Compiler: `{}`\n", config.system.compiler));
        // Load benchmark result
        let results_csv = log_dir.join("results.csv");
        if !results_csv.exists() {
            anyhow::bail!("Benchmark results not found: {}", results_csv.display());
        }
        let raw_df = data::get_data(&results_csv)?;
        if raw_df.height() == 0 {
            printer.add("\nNo configuration completed.\n");
            return Ok(printer);
        }
        printer.add("\n## Results\n\n");
        printer.add_dataframe(&data::per_config_table(&raw_df)?);
        printer.add("\n## Speedup (external time / reference time)\n\n");
        printer.add_dataframe(&data::speedup_summary(&raw_df)?);
        printer.add("\n## Colors Above Max Degree\n\n");
        printer.add_dataframe(&data::color_excess_summary(&raw_df)?);
        let invalid = data::count_invalid(&raw_df)?;
        printer.add(format!("\n* Invalid external colorings: `{}`\n", invalid));
        Ok(printer)
    }

    pub fn run(&self) -> anyhow::Result<()> {
        self.render()?.dump();
        Ok(())
    }
}
