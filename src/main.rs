use clap::Parser;
use colored::Colorize;
use edgebench::{utils::alloc::PeakAllocator, Cli};

#[global_allocator]
static ALLOCATOR: PeakAllocator = PeakAllocator;

fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = edgebench::entry(&cli) {
        eprintln!("❌ {}: {}", "ERROR".red().bold(), err.to_string().red());
        std::process::exit(1);
    }
}
