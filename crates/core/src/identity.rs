// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diagnostic identity of a lock holder

use std::fmt;

/// Process and thread that requested or holds a lock.
///
/// Written into the lock file on exclusive acquisition and carried by
/// acquisition errors. Informational only.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HolderIdentity {
    pub pid: u32,
    pub thread: String,
}

impl HolderIdentity {
    pub fn new(pid: u32, thread: impl Into<String>) -> Self {
        Self {
            pid,
            thread: thread.into(),
        }
    }

    /// Identity of the calling thread
    pub fn current() -> Self {
        let thread = std::thread::current();
        let thread = match thread.name() {
            Some(name) => format!("{}/{:?}", name, thread.id()),
            None => format!("{:?}", thread.id()),
        };
        Self::new(std::process::id(), thread)
    }

    /// Parse the form produced by `Display`
    pub fn parse(s: &str) -> Option<Self> {
        let rest = s.trim().strip_prefix("pid:")?;
        let (pid, thread) = rest.split_once(" thread:")?;
        let pid = pid.parse().ok()?;
        Some(Self::new(pid, thread))
    }
}

impl fmt::Display for HolderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pid:{} thread:{}", self.pid, self.thread)
    }
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
