//! Building and running the external colorer.
//!
//! The external program talks to us through files only: it reads the graph
//! file and writes the coloring file, both at fixed names agreed on in
//! [`ExternalConfig`]. Its stdout and stderr are appended to a log file.

use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    time::{Duration, Instant},
};

use crate::{configs::bench::ExternalConfig, utils::sys::RssSampler};

/// How often the child is checked for exit.
const POLL_INTERVAL: Duration = Duration::from_micros(100);

/// Reap `child` if it has exited, with the peak RSS the kernel recorded for it.
#[cfg(unix)]
fn try_reap(child: &mut Child) -> anyhow::Result<Option<(ExitStatus, u64)>> {
    use std::os::unix::process::ExitStatusExt;

    let mut status = 0;
    let mut usage = unsafe { std::mem::zeroed::<libc::rusage>() };
    let pid = child.id() as libc::pid_t;
    let ret = unsafe { libc::wait4(pid, &mut status, libc::WNOHANG, &mut usage) };
    if ret == 0 {
        return Ok(None);
    }
    if ret < 0 {
        let err = std::io::Error::last_os_error();
        if err.kind() == std::io::ErrorKind::Interrupted {
            return Ok(None);
        }
        return Err(err.into());
    }
    // `ru_maxrss` is in bytes on macOS and kilobytes elsewhere
    let max_rss = usage.ru_maxrss.max(0) as u64;
    let peak = if cfg!(target_os = "macos") {
        max_rss
    } else {
        max_rss * 1024
    };
    Ok(Some((ExitStatus::from_raw(status), peak)))
}

#[cfg(not(unix))]
fn try_reap(child: &mut Child) -> anyhow::Result<Option<(ExitStatus, u64)>> {
    Ok(child.try_wait()?.map(|status| (status, 0)))
}

/// Measurements of a successful run.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub elapsed: Duration,
    /// Peak resident memory of the child process
    pub peak_memory_bytes: u64,
}

#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    Success(ExecutionResult),
    /// Non-zero exit, or killed by a signal (`code` is `None`)
    Failed { code: Option<i32> },
    TimedOut { after: Duration },
}

impl ExecutionOutcome {
    pub fn success(self) -> Option<ExecutionResult> {
        match self {
            ExecutionOutcome::Success(result) => Some(result),
            _ => None,
        }
    }
}

/// An external edge colorer that can be built once and run many times.
pub trait ExternalColoringService {
    /// Build the program. The error carries the build diagnostics.
    fn build(&mut self) -> anyhow::Result<()>;

    /// Run the program once on the current graph file.
    /// `Err` is reserved for failures to launch or observe the process.
    fn run(&mut self) -> anyhow::Result<ExecutionOutcome>;

    /// Where the program expects its input graph.
    fn graph_path(&self) -> PathBuf;

    /// Where the program writes its coloring.
    fn output_path(&self) -> PathBuf;
}

/// Runs the external program as a child process.
#[derive(Debug)]
pub struct ProcessColoringService {
    config: ExternalConfig,
    timeout: Option<Duration>,
    sample_interval: Duration,
    log_file: Option<PathBuf>,
}

impl ProcessColoringService {
    pub fn new(config: ExternalConfig) -> Self {
        Self {
            config,
            timeout: None,
            sample_interval: Duration::from_millis(5),
            log_file: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }

    /// Append the program's stdout and stderr to `path`. Discarded otherwise.
    pub fn with_log_file(mut self, path: impl AsRef<Path>) -> Self {
        self.log_file = Some(path.as_ref().to_owned());
        self
    }

    pub fn config(&self) -> &ExternalConfig {
        &self.config
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.config.compiler);
        cmd.args(&self.config.flags)
            .arg(&self.config.source)
            .arg("-o")
            .arg(&self.config.executable)
            .current_dir(&self.config.working_dir);
        cmd
    }

    fn run_command(&self) -> anyhow::Result<Command> {
        // A relative program path would be resolved against the child's working dir
        let mut program = self.config.executable_path();
        if program.is_relative() {
            program = std::env::current_dir()?.join(program);
        }
        let mut cmd = Command::new(program);
        cmd.current_dir(&self.config.working_dir).stdin(Stdio::null());
        match &self.log_file {
            Some(path) => {
                let outputs = OpenOptions::new().append(true).create(true).open(path)?;
                let errors = outputs.try_clone()?;
                let mut header = outputs.try_clone()?;
                writeln!(header, "---")?;
                writeln!(header, "command: {}", cmd.get_program().to_string_lossy())?;
                writeln!(header, "---")?;
                cmd.stdout(outputs).stderr(errors);
            }
            None => {
                cmd.stdout(Stdio::null()).stderr(Stdio::null());
            }
        }
        Ok(cmd)
    }
}

impl ExternalColoringService for ProcessColoringService {
    fn build(&mut self) -> anyhow::Result<()> {
        let mut cmd = self.build_command();
        let args = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        log::info!("Building: {} {}", self.config.compiler, args.join(" "));
        let output = cmd
            .output()
            .map_err(|e| anyhow::anyhow!("Failed to launch `{}`: {}", self.config.compiler, e))?;
        if !output.status.success() {
            anyhow::bail!(
                "Compilation failed ({}):\n{}{}",
                output.status,
                String::from_utf8_lossy(&output.stderr),
                String::from_utf8_lossy(&output.stdout)
            );
        }
        let warnings = String::from_utf8_lossy(&output.stderr);
        if !warnings.trim().is_empty() {
            log::warn!("Compiler output:\n{}", warnings.trim_end());
        }
        Ok(())
    }

    fn run(&mut self) -> anyhow::Result<ExecutionOutcome> {
        let mut cmd = self.run_command()?;
        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|e| {
            anyhow::anyhow!(
                "Failed to launch {}: {}",
                self.config.executable_path().display(),
                e
            )
        })?;
        let mut sampler = RssSampler::new(child.id());
        sampler.sample();
        let mut last_sample = Instant::now();
        let (status, reaped_peak) = loop {
            if let Some(reaped) = try_reap(&mut child)? {
                break reaped;
            }
            if let Some(timeout) = self.timeout {
                let elapsed = start.elapsed();
                if elapsed >= timeout {
                    child.kill()?;
                    child.wait()?;
                    log::warn!("External program killed after {:.1?}", elapsed);
                    return Ok(ExecutionOutcome::TimedOut { after: elapsed });
                }
            }
            if last_sample.elapsed() >= self.sample_interval {
                sampler.sample();
                last_sample = Instant::now();
            }
            std::thread::sleep(POLL_INTERVAL);
        };
        let elapsed = start.elapsed();
        if !status.success() {
            log::warn!("External program exited with {}", status);
            return Ok(ExecutionOutcome::Failed {
                code: status.code(),
            });
        }
        Ok(ExecutionOutcome::Success(ExecutionResult {
            elapsed,
            peak_memory_bytes: sampler.peak().max(reaped_peak),
        }))
    }

    fn graph_path(&self) -> PathBuf {
        self.config.graph_path()
    }

    fn output_path(&self) -> PathBuf {
        self.config.output_path()
    }
}
