// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn script_runs_non_interactively() {
    let args = script_args(PROTECT_SCRIPT);

    assert_eq!(&args[..3], ["-NoProfile", "-NonInteractive", "-Command"]);
    assert!(args[3].contains("'CurrentUser'"));
}

#[test]
fn empty_blob_skips_encryption() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ProtectedFileBackend::new(dir.path().join("cache.bin"));

    // No tool is spawned for an empty payload, so this works on every OS
    backend.write(b"").unwrap();

    assert_eq!(backend.read().unwrap(), Some(Vec::new()));
    assert!(backend.last_modified().unwrap().is_some());
}

#[test]
fn missing_file_reads_none() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ProtectedFileBackend::new(dir.path().join("cache.bin"));

    assert_eq!(backend.read().unwrap(), None);
    backend.delete().unwrap();
}

#[test]
#[cfg(windows)]
fn protected_round_trip_is_encrypted_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.bin");
    let backend = ProtectedFileBackend::new(&path);

    backend.write(b"token cache").unwrap();

    assert_ne!(std::fs::read(&path).unwrap(), b"token cache");
    assert_eq!(backend.read().unwrap(), Some(b"token cache".to_vec()));
}
