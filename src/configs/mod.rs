//! Benchmark configuration and run metadata.

pub mod bench;
pub mod run_info;
