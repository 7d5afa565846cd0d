mod cli;
mod config;
mod generate;
mod ledger;
mod model;
mod mutation;
mod planner;
mod repository;
mod session;
mod suggest;
mod unwind;

use std::{io, process};

use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    if let Err(e) = cli::run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Log to stderr, `info` unless `RUST_LOG` says otherwise.
fn init_logging() {
    let default_level = "info";
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
