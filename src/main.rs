//! trak - Personal task tracking CLI
//!
//! A standalone CLI that keeps a personal task list consistent across eight
//! synchronized views, with search, tags, and session undo/redo.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use trak::cli::Cli;
use trak::output::emit_error;

fn main() {
    // Tracing is opt-in via RUST_LOG.
    // Keep startup robust in CI/robot envs: ignore invalid/huge filters.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let cli = Cli::parse();
    let json = cli.json;
    if let Err(err) = cli.run() {
        let _ = emit_error("trak", &err, json);
        std::process::exit(err.exit_code());
    }
}
