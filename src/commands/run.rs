use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use clap::Parser;
use colored::Colorize;

use crate::{
    configs::{
        bench::{BenchConfig, GraphConfig, Profile},
        run_info::RunInfo,
    },
    external::ProcessColoringService,
    graph::generator::GraphGenerator,
    orchestrator::{BenchmarkOrchestrator, BenchmarkResult, BenchmarkRun, RunListener, SkippedConfig},
    print_md,
    report::{self, TextReport},
};

/// Run the benchmark for every graph size of a profile
#[derive(Parser)]
pub struct RunArgs {
    #[arg(long, default_value = "default")]
    /// Benchmarking profile
    pub profile: String,
    #[arg(short = 'c', long)]
    /// Path to the config file. Default to `./edgebench.toml`
    pub config: Option<PathBuf>,
    #[arg(long)]
    /// Seed for the graph generator
    pub seed: Option<u64>,
    #[arg(long)]
    /// Kill the external program after this many seconds
    pub timeout: Option<u64>,
    #[arg(long, default_value = "false")]
    /// Reject external outputs that list an edge more than once
    pub strict: bool,
    #[arg(short = 'o', long, default_value = "edgebench-out")]
    /// Directory for run logs, reports and results
    pub output_dir: PathBuf,
}

/// Prints one status line per configuration.
struct ConsoleProgress {
    done: usize,
    total: usize,
}

impl RunListener for ConsoleProgress {
    fn on_config_start(&mut self, config: GraphConfig) -> anyhow::Result<()> {
        self.done += 1;
        let label = format!("[{}/{}] {}", self.done, self.total, config);
        print!("{}", format!("{:<24}", label).blue().bold());
        io::stdout().flush()?;
        Ok(())
    }

    fn on_result(&mut self, r: &BenchmarkResult) -> anyhow::Result<()> {
        let verdict = if r.validity.valid {
            "✔ valid".green()
        } else {
            "✘ invalid".red()
        };
        println!(
            "{} edges={} colors={}/{} (min {}) speedup={:.2}x",
            verdict,
            r.edges,
            r.external.colors_used,
            r.reference.colors_used,
            r.theoretical_minimum,
            r.speedup
        );
        Ok(())
    }

    fn on_skipped(&mut self, s: &SkippedConfig) -> anyhow::Result<()> {
        println!("{} {}", "✘ skipped:".red(), s.reason);
        Ok(())
    }
}

impl RunArgs {
    fn generate_runid(&self, host: &str) -> (String, DateTime<Local>) {
        let t = Local::now();
        let time = t.format("%Y-%m-%d-%a-%H%M%S").to_string();
        let run_id = format!("{}-{}-{}", self.profile, host, time);
        (run_id, t)
    }

    fn prepare_logs_dir(&self, run_id: &str) -> anyhow::Result<PathBuf> {
        let logs_dir = self.output_dir.join("logs");
        let log_dir = logs_dir.join(run_id);
        let latest_log_dir = logs_dir.join("latest");
        std::fs::create_dir_all(&log_dir)?;
        if latest_log_dir.exists() || latest_log_dir.is_symlink() {
            if latest_log_dir.is_dir() && !latest_log_dir.is_symlink() {
                std::fs::remove_dir_all(&latest_log_dir)?;
            } else {
                std::fs::remove_file(&latest_log_dir)?;
            }
        }
        #[cfg(target_os = "windows")]
        std::os::windows::fs::symlink_dir(run_id, latest_log_dir)?;
        #[cfg(not(target_os = "windows"))]
        std::os::unix::fs::symlink(run_id, latest_log_dir)?;
        Ok(log_dir)
    }

    fn load_profile(&self) -> anyhow::Result<Profile> {
        let config = BenchConfig::load(self.config.as_deref())?;
        let mut profile = config.profile(&self.profile)?.clone();
        // Command line overrides
        if let Some(seed) = self.seed {
            profile.seed = Some(seed);
        }
        if let Some(timeout) = self.timeout {
            profile.timeout_secs = Some(timeout);
        }
        if self.strict {
            profile.strict_parsing = true;
        }
        Ok(profile)
    }

    fn print_before_run(&self, run_info: &RunInfo, log_dir: &Path) {
        let profile = &run_info.profile;
        print_md!("# {}\n\n", run_info.runid);
        print_md!("* logs: `{}`", log_dir.display());
        print_md!(
            "* external: `{} {} {}`",
            profile.external.compiler,
            profile.external.flags.join(" "),
            profile.external.source.display()
        );
        print_md!("* configurations: `{}`", profile.configs.len());
        print_md!("* edge probability: `{}`", profile.probability);
        match profile.seed {
            Some(seed) => {
                print_md!("* seed: `{}`", seed);
            }
            None => {
                print_md!("* seed: `random`");
            }
        }
        println!();
        println!("{}\n", "Running Benchmarks...".blue());
    }

    fn print_after_run(&self, run: &BenchmarkRun, log_dir: &Path) {
        println!("\n{}\n", "✔ Benchmarking Finished.".green());
        let invalid = run.results.iter().filter(|r| !r.validity.valid).count();
        print_md!(
            "* completed: `{}`, skipped: `{}`, invalid: `{}`",
            run.results.len(),
            run.skipped.len(),
            invalid
        );
        print_md!("* report: `{}`", log_dir.join("benchmark_report.txt").display());
        print_md!("* results: `{}`\n\n", log_dir.join("results.csv").display());
        print_md!("Please run `edgebench report` to view results.\n");
    }

    pub fn run(&self) -> anyhow::Result<()> {
        let profile = self.load_profile()?;
        let system = crate::utils::sys::get_current_system_info(&profile.external.compiler);
        let (run_id, start_time) = self.generate_runid(&system.host);
        let log_dir = self.prepare_logs_dir(&run_id)?;
        let mut run_info = RunInfo::new(
            self.profile.clone(),
            profile.clone(),
            system,
            run_id,
            start_time,
        );
        run_info.save(&log_dir.join("config.toml"))?;
        self.print_before_run(&run_info, &log_dir);

        let service = ProcessColoringService::new(profile.external.clone())
            .with_timeout(profile.timeout())
            .with_sample_interval(profile.sample_interval())
            .with_log_file(log_dir.join("external.log"));
        let generator = GraphGenerator::with_seed(profile.seed, profile.probability)?;
        let mut orchestrator = BenchmarkOrchestrator::new(service, generator, profile.parse_mode());

        let report = TextReport::create(log_dir.join("benchmark_report.txt"))?;
        let progress = ConsoleProgress {
            done: 0,
            total: profile.configs.len(),
        };
        let mut listeners = (report, progress);
        let run = match orchestrator.run(&profile.configs, &mut listeners) {
            Ok(run) => run,
            Err(e) => {
                listeners.0.aborted(&e)?;
                return Err(e);
            }
        };
        report::write_results_csv(&log_dir.join("results.csv"), &run.results)?;

        run_info.finish_timestamp_utc = Some(chrono::Utc::now().timestamp());
        run_info.save(&log_dir.join("config.toml"))?;
        self.print_after_run(&run, &log_dir);
        Ok(())
    }
}
