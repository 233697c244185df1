// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! cachet - inspect and exercise a shared, lock-protected cache

mod commands;
mod params;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{cache, lock};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "cachet",
    version,
    about = "cachet - cross-process access to a shared credential cache"
)]
struct Cli {
    #[command(flatten)]
    params: params::ParamArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the persisted blob
    Read,
    /// Replace the persisted blob
    Write(cache::WriteArgs),
    /// Append an open/close marker pair while holding the write lock
    AppendMarker(cache::AppendMarkerArgs),
    /// Delete the persisted blob
    Delete,
    /// Acquire the lock, hold it, then release it
    Hold(lock::HoldArgs),
    /// Show which process last took the exclusive lock
    Holder,
}

fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();
    let settings = params::resolve(&cli.params)?;

    match cli.command {
        Commands::Read => cache::read(&settings.open()?),
        Commands::Write(args) => cache::write(&settings.open()?, args),
        Commands::AppendMarker(args) => cache::append_marker(&settings.open()?, args),
        Commands::Delete => cache::delete(&settings.open()?),
        Commands::Hold(args) => lock::hold(&settings.params, args),
        Commands::Holder => lock::holder(&settings.params),
    }
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub(crate) fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

pub(crate) fn default_dir() -> Result<PathBuf> {
    dirs::cache_dir()
        .map(|dir| dir.join("cachet"))
        .ok_or_else(|| anyhow::anyhow!("no user cache directory; pass --cache and --lock"))
}
