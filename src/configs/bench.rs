//! The benchmark configuration file.
//!
//! By default the runner reads `edgebench.toml` from the current directory.
//! If the file does not exist, a `default` profile reproducing the classic
//! setup is used: `g++ -O2 main.cpp -o main`, graph in `test.txt`, coloring in
//! `output.txt`, edge probability 0.3 and five graph sizes up to 1000x1000.
//!
//! # Example:
//!
//! ```toml
//! [profiles.default]
//! configs = [[5, 10], [10, 100], [100, 100]] # Optional. (n, m) part sizes, in run order
//! probability = 0.3 # Optional. Edge probability
//! seed = 42 # Optional. Default to OS entropy
//! strict-parsing = false # Optional. Reject colorings that list an edge twice
//! timeout-secs = 600 # Optional. Default to no timeout
//!
//! [profiles.default.external]
//! compiler = "clang++" # Optional. Default to `g++`
//! flags = ["-O3"] # Optional. Default to `["-O2"]`
//! source = "main.cpp"
//! executable = "main"
//! graph-file = "test.txt"
//! output-file = "output.txt"
//! working-dir = "." # Optional. All paths above are relative to this directory
//! ```
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{coloring::ParseMode, graph::generator::DEFAULT_EDGE_PROBABILITY};

pub const DEFAULT_CONFIG_FILE: &str = "edgebench.toml";

/// Sizes of the two parts of a generated bipartite graph.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct GraphConfig {
    pub n: usize,
    pub m: usize,
}

impl GraphConfig {
    pub fn new(n: usize, m: usize) -> Self {
        Self { n, m }
    }
}

impl From<(usize, usize)> for GraphConfig {
    fn from((n, m): (usize, usize)) -> Self {
        Self { n, m }
    }
}

impl From<GraphConfig> for (usize, usize) {
    fn from(c: GraphConfig) -> Self {
        (c.n, c.m)
    }
}

impl std::fmt::Display for GraphConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.n, self.m)
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BenchConfig {
    /// Benchmark profiles
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl BenchConfig {
    /// Load the config from `path`, or from `./edgebench.toml` if no path is given.
    /// An explicitly given path must exist. A missing default file yields the default config.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(p) => {
                if !p.is_file() {
                    anyhow::bail!("Failed to load {}", p.display());
                }
                p.to_owned()
            }
            None => {
                let p = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !p.is_file() {
                    log::info!("No {} found, using the default profile", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                p
            }
        };
        let s = std::fs::read_to_string(&file)?;
        let mut config = toml::from_str::<BenchConfig>(&s)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", file.display(), e))?;
        if config.profiles.is_empty() {
            config
                .profiles
                .insert("default".to_owned(), Default::default());
        }
        Ok(config)
    }

    pub fn profile(&self, name: &str) -> anyhow::Result<&Profile> {
        let Some(profile) = self.profiles.get(name) else {
            anyhow::bail!("Could not find profile `{}`", name);
        };
        Ok(profile)
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            profiles: [("default".to_owned(), Default::default())]
                .into_iter()
                .collect(),
        }
    }
}

fn default_configs() -> Vec<GraphConfig> {
    [(5, 10), (10, 100), (100, 100), (32, 1000), (1000, 1000)]
        .into_iter()
        .map(GraphConfig::from)
        .collect()
}

fn default_probability() -> f64 {
    DEFAULT_EDGE_PROBABILITY
}

fn default_sample_interval_ms() -> u64 {
    5
}

/// A benchmarking profile.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Profile {
    /// Graph sizes to benchmark, in order
    #[serde(default = "default_configs")]
    pub configs: Vec<GraphConfig>,
    /// Probability of each cross edge
    #[serde(default = "default_probability")]
    pub probability: f64,
    /// Generator seed. Graphs are not reproducible without one.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Reject external outputs that color the same edge twice
    #[serde(default)]
    pub strict_parsing: bool,
    /// Kill the external program after this many seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// How often the external program's memory is sampled
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
    /// How to build and run the external program
    #[serde(default)]
    pub external: ExternalConfig,
}

impl Profile {
    pub fn parse_mode(&self) -> ParseMode {
        if self.strict_parsing {
            ParseMode::Strict
        } else {
            ParseMode::Lenient
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms.max(1))
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            configs: default_configs(),
            probability: default_probability(),
            seed: None,
            strict_parsing: false,
            timeout_secs: None,
            sample_interval_ms: default_sample_interval_ms(),
            external: ExternalConfig::default(),
        }
    }
}

fn default_compiler() -> String {
    "g++".to_owned()
}

fn default_flags() -> Vec<String> {
    vec!["-O2".to_owned()]
}

fn default_source() -> PathBuf {
    PathBuf::from("main.cpp")
}

fn default_executable() -> PathBuf {
    PathBuf::from("main")
}

fn default_graph_file() -> PathBuf {
    PathBuf::from("test.txt")
}

fn default_output_file() -> PathBuf {
    PathBuf::from("output.txt")
}

fn default_working_dir() -> PathBuf {
    PathBuf::from(".")
}

/// The external colorer: built with `<compiler> <flags..> <source> -o <executable>`,
/// then run without arguments from `working-dir`.
/// It reads `graph-file` and writes `output-file`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ExternalConfig {
    #[serde(default = "default_compiler")]
    pub compiler: String,
    #[serde(default = "default_flags")]
    pub flags: Vec<String>,
    #[serde(default = "default_source")]
    pub source: PathBuf,
    #[serde(default = "default_executable")]
    pub executable: PathBuf,
    #[serde(default = "default_graph_file")]
    pub graph_file: PathBuf,
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,
}

impl ExternalConfig {
    pub fn source_path(&self) -> PathBuf {
        self.working_dir.join(&self.source)
    }

    pub fn executable_path(&self) -> PathBuf {
        self.working_dir.join(&self.executable)
    }

    pub fn graph_path(&self) -> PathBuf {
        self.working_dir.join(&self.graph_file)
    }

    pub fn output_path(&self) -> PathBuf {
        self.working_dir.join(&self.output_file)
    }
}

impl Default for ExternalConfig {
    fn default() -> Self {
        Self {
            compiler: default_compiler(),
            flags: default_flags(),
            source: default_source(),
            executable: default_executable(),
            graph_file: default_graph_file(),
            output_file: default_output_file(),
            working_dir: default_working_dir(),
        }
    }
}
