//! Metadata of one benchmark run, dumped as `config.toml` in the run's log directory.

use std::path::Path;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use super::bench::Profile;

/// Machine the benchmark ran on.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SystemInfo {
    pub host: String,
    pub os: String,
    pub arch: String,
    pub kernel: String,
    #[serde(rename = "cpu-model")]
    pub cpu_model: String,
    #[serde(rename = "cpu-frequency")]
    pub cpu_frequency: Vec<usize>,
    #[serde(rename = "memory-size")]
    pub memory_size: usize,
    #[serde(rename = "swap-size")]
    pub swap_size: usize,
    pub processes: usize,
    pub pid: usize,
    /// First line of `<compiler> --version`
    pub compiler: String,
    #[cfg(target_os = "linux")]
    #[serde(default)]
    pub users: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunInfo {
    /// Benchmark run id
    pub runid: String,

    /// Benchmark start time
    #[serde(rename = "start-time-utc")]
    pub start_timestamp_utc: i64,

    /// Benchmark finish time
    #[serde(rename = "finish-time-utc")]
    pub finish_timestamp_utc: Option<i64>,

    /// Name of the profile used for this run
    #[serde(rename = "profile-name")]
    pub profile_name: String,

    pub profile: Profile,

    pub system: SystemInfo,
}

impl RunInfo {
    pub fn new(
        profile_name: String,
        profile: Profile,
        system: SystemInfo,
        runid: String,
        start_time: DateTime<Local>,
    ) -> Self {
        Self {
            runid,
            start_timestamp_utc: start_time.with_timezone(&Utc).timestamp(),
            finish_timestamp_utc: None,
            profile_name,
            profile,
            system,
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, toml::to_string(self)?)?;
        Ok(())
    }
}
