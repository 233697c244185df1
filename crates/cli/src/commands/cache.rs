// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cache blob commands

use crate::params::Access;
use anyhow::{Context, Result};
use cachet_adapters::StorageBackend;
use cachet_engine::AccessIntent;
use clap::Args;
use std::io::{self, Read, Write};
use std::thread;
use std::time::Duration;

#[derive(Args)]
pub struct WriteArgs {
    /// New blob contents (read from stdin when omitted)
    data: Option<String>,
}

#[derive(Args)]
pub struct AppendMarkerArgs {
    /// Marker identifier
    #[arg(long)]
    id: String,

    /// How long to keep the lock between the two markers
    #[arg(long, value_parser = crate::parse_duration, default_value = "0ms")]
    hold: Duration,
}

pub fn read(access: &Access) -> Result<()> {
    let mut blob = Vec::new();
    access.refresh(&mut blob)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(&blob)?;
    stdout.flush()?;
    Ok(())
}

pub fn write(access: &Access, args: WriteArgs) -> Result<()> {
    let data = match args.data {
        Some(data) => data.into_bytes(),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("reading blob from stdin")?;
            buf
        }
    };

    let mut cache = Vec::new();
    access.update(&mut cache, |c| *c = data)?;
    Ok(())
}

/// Write `<id` then, after `hold`, `>id`, all inside one write window.
///
/// The opening marker is flushed to the backend immediately so that a
/// concurrent writer slipping in would leave an interleaved pair behind.
pub fn append_marker(access: &Access, args: AppendMarkerArgs) -> Result<()> {
    let mut cache = Vec::new();
    let window = access.before_access(AccessIntent::Write, &mut cache)?;

    cache.extend_from_slice(format!("<{}\n", args.id).as_bytes());
    access.backend().write(&cache)?;
    tracing::info!(id = %args.id, "opening marker flushed");

    thread::sleep(args.hold);

    cache.extend_from_slice(format!(">{}\n", args.id).as_bytes());
    window.after_access(&cache)?;
    tracing::info!(id = %args.id, "marker pair saved");
    Ok(())
}

pub fn delete(access: &Access) -> Result<()> {
    access.clear()?;
    Ok(())
}
