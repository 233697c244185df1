// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plain file backend

use super::{BackendError, BackendKind, StorageBackend};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Cache blob stored as a plain file
#[derive(Clone, Debug)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bump the file's modification time without changing its content,
    /// creating it empty if needed.
    ///
    /// Backends that keep the blob elsewhere use this so that
    /// `last_modified` still tracks their writes.
    pub fn touch(&self) -> Result<(), BackendError> {
        self.ensure_parent()?;
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| BackendError::io(&self.path, e))?;
        file.set_modified(SystemTime::now())
            .map_err(|e| BackendError::io(&self.path, e))
    }

    fn ensure_parent(&self) -> Result<(), BackendError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| BackendError::io(parent, e))?;
            }
        }
        Ok(())
    }

    fn create_truncated(&self) -> io::Result<File> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        options.open(&self.path)
    }
}

impl StorageBackend for FileBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::File
    }

    fn read(&self) -> Result<Option<Vec<u8>>, BackendError> {
        match fs::read(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BackendError::io(&self.path, e)),
        }
    }

    fn write(&self, data: &[u8]) -> Result<(), BackendError> {
        self.ensure_parent()?;
        let mut file = self
            .create_truncated()
            .map_err(|e| BackendError::io(&self.path, e))?;
        file.write_all(data)
            .and_then(|()| file.sync_all())
            .map_err(|e| BackendError::io(&self.path, e))
    }

    fn delete(&self) -> Result<(), BackendError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BackendError::io(&self.path, e)),
        }
    }

    fn last_modified(&self) -> Result<Option<SystemTime>, BackendError> {
        match fs::metadata(&self.path) {
            Ok(meta) => meta
                .modified()
                .map(Some)
                .map_err(|e| BackendError::io(&self.path, e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BackendError::io(&self.path, e)),
        }
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
