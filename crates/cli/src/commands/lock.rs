// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock commands

use anyhow::{Context, Result};
use cachet_core::{LockMode, PersistenceParams};
use clap::{Args, ValueEnum};
use std::io::{self, Write};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModeArg {
    Shared,
    Exclusive,
}

impl From<ModeArg> for LockMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Shared => LockMode::Shared,
            ModeArg::Exclusive => LockMode::Exclusive,
        }
    }
}

#[derive(Args)]
pub struct HoldArgs {
    /// Lock mode
    #[arg(long, value_enum, default_value_t = ModeArg::Exclusive)]
    mode: ModeArg,

    /// How long to hold the lock
    #[arg(long, value_parser = crate::parse_duration, default_value = "0ms")]
    duration: Duration,
}

/// Prints `ACQUIRED <ms>` once held and `RELEASED <ms>`, stamped just
/// before unlocking, once released.
pub fn hold(params: &PersistenceParams, args: HoldArgs) -> Result<()> {
    let mode = LockMode::from(args.mode);
    let guard = params.lock().acquire(mode)?;
    tracing::info!(?mode, path = %params.lock_path().display(), "lock held");

    let mut stdout = io::stdout();
    let acquired_at = unix_ms();
    writeln!(stdout, "ACQUIRED {}", acquired_at)?;
    stdout.flush()?;

    thread::sleep(args.duration);

    let released_at = unix_ms();
    guard.release()?;
    tracing::info!(
        ?mode,
        held_ms = released_at.saturating_sub(acquired_at),
        "lock released"
    );
    writeln!(stdout, "RELEASED {}", released_at)?;
    Ok(())
}

pub fn holder(params: &PersistenceParams) -> Result<()> {
    let holder = params
        .lock()
        .holder()
        .with_context(|| format!("reading {}", params.lock_path().display()))?;

    match holder {
        Some(identity) => println!("{}", identity),
        None => println!("none"),
    }
    Ok(())
}

fn unix_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
