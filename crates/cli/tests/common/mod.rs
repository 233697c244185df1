// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test utilities for CLI integration tests.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Lines};
use std::path::PathBuf;
use std::process::{Child, ChildStdout, Stdio};
use tempfile::TempDir;

/// Temporary cache and lock paths plus a command builder pointed at them
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn cache(&self) -> PathBuf {
        self.dir.path().join("cache.bin")
    }

    pub fn lock(&self) -> PathBuf {
        self.dir.path().join("cache.lock")
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn base_args(&self) -> Vec<String> {
        vec![
            "--cache".to_string(),
            self.cache().display().to_string(),
            "--lock".to_string(),
            self.lock().display().to_string(),
            "--backend".to_string(),
            "file".to_string(),
        ]
    }

    /// `cachet` with this sandbox's paths and the plain file backend
    pub fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("cachet").expect("cachet binary");
        cmd.args(self.base_args());
        cmd
    }

    /// Start `cachet` in the background with stdout piped
    pub fn spawn(&self, args: &[&str]) -> Child {
        std::process::Command::new(assert_cmd::cargo::cargo_bin("cachet"))
            .args(self.base_args())
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to spawn cachet")
    }
}

/// Reads `ACQUIRED <ms>` / `RELEASED <ms>` lines from a running `hold`
pub struct HoldOutput {
    lines: Lines<BufReader<ChildStdout>>,
}

impl HoldOutput {
    pub fn new(child: &mut Child) -> Self {
        let stdout = child.stdout.take().expect("stdout piped");
        Self {
            lines: BufReader::new(stdout).lines(),
        }
    }

    /// Block until the next line and return the timestamp it carries
    pub fn expect(&mut self, label: &str) -> u128 {
        let line = self
            .lines
            .next()
            .expect("hold exited early")
            .expect("Failed to read stdout");
        let stamp = line
            .strip_prefix(label)
            .and_then(|rest| rest.trim().parse().ok());
        stamp.unwrap_or_else(|| panic!("expected {label} line, got {line:?}"))
    }
}

/// Check that `content` is a sequence of `<id` / `>id` pairs, each closed
/// before the next opens. Returns the ids in order.
pub fn validate_markers(content: &str) -> Result<Vec<String>, String> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.len() % 2 != 0 {
        return Err(format!("odd number of marker lines: {}", lines.len()));
    }

    let mut ids = Vec::new();
    for (i, pair) in lines.chunks(2).enumerate() {
        let open = pair[0]
            .strip_prefix('<')
            .ok_or_else(|| format!("pair {i}: expected opening marker, got {:?}", pair[0]))?;
        let close = pair[1]
            .strip_prefix('>')
            .ok_or_else(|| format!("pair {i}: expected closing marker, got {:?}", pair[1]))?;
        if open != close {
            return Err(format!("pair {i}: <{open} closed by >{close}"));
        }
        ids.push(open.to_string());
    }
    Ok(ids)
}
