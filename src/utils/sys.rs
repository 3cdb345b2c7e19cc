use sysinfo::{CpuExt, Pid, PidExt, ProcessExt, System, SystemExt};

use crate::configs::run_info::SystemInfo;

#[cfg(target_os = "linux")]
fn get_logged_in_users() -> anyhow::Result<Vec<String>> {
    use std::process::Command;

    Command::new("users")
        .output()
        .map(|o| {
            let mut users = String::from_utf8_lossy(&o.stdout)
                .split_whitespace()
                .map(|s| s.to_owned())
                .collect::<Vec<_>>();
            users.dedup();
            users
        })
        .map_err(|e| e.into())
}

fn get_compiler_version(compiler: &str) -> Option<String> {
    let output = std::process::Command::new(compiler)
        .arg("--version")
        .output()
        .ok()?;
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|l| l.trim().to_owned())
}

pub fn get_current_system_info(compiler: &str) -> SystemInfo {
    let mut sys = System::new_all();
    sys.refresh_all();
    const UNKNOWN: &str = "<unknown>";
    SystemInfo {
        host: sys.host_name().unwrap_or(UNKNOWN.to_string()),
        os: sys.long_os_version().unwrap_or(UNKNOWN.to_string()),
        arch: std::env::consts::ARCH.to_string(),
        kernel: sys.kernel_version().unwrap_or(UNKNOWN.to_string()),
        cpu_model: sys.global_cpu_info().brand().to_owned(),
        cpu_frequency: sys.cpus().iter().map(|c| c.frequency() as usize).collect(),
        memory_size: sys.total_memory() as usize,
        swap_size: sys.total_swap() as usize,
        processes: sys.processes().len(),
        pid: std::process::id() as usize,
        compiler: get_compiler_version(compiler).unwrap_or_else(|| UNKNOWN.to_string()),
        #[cfg(target_os = "linux")]
        users: get_logged_in_users().unwrap_or_default(),
    }
}

/// Tracks the highest resident set size seen for one process.
pub struct RssSampler {
    sys: System,
    pid: Pid,
    peak: u64,
}

impl RssSampler {
    pub fn new(pid: u32) -> Self {
        Self {
            sys: System::new(),
            pid: Pid::from_u32(pid),
            peak: 0,
        }
    }

    /// Take one sample. Returns `false` once the process is gone.
    pub fn sample(&mut self) -> bool {
        if !self.sys.refresh_process(self.pid) {
            return false;
        }
        if let Some(process) = self.sys.process(self.pid) {
            self.peak = self.peak.max(process.memory());
        }
        true
    }

    /// Peak resident bytes over all samples.
    pub fn peak(&self) -> u64 {
        self.peak
    }
}

/// Resident bytes of the current process.
pub fn current_process_rss() -> Option<u64> {
    let mut sampler = RssSampler::new(std::process::id());
    sampler.sample().then(|| sampler.peak())
}
