// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn empty_fake_has_nothing_stored() {
    let fake = FakeBackend::new();

    assert_eq!(fake.read().unwrap(), None);
    assert_eq!(fake.last_modified().unwrap(), None);
    assert_eq!(fake.kind(), BackendKind::Memory);
}

#[test]
fn write_then_read() {
    let fake = FakeBackend::new();

    fake.write(b"abc").unwrap();

    assert_eq!(fake.read().unwrap(), Some(b"abc".to_vec()));
    assert_eq!(
        fake.calls(),
        vec![BackendCall::Write { len: 3 }, BackendCall::Read]
    );
}

#[test]
fn every_change_advances_modification_time() {
    let fake = FakeBackend::with_data("x");
    let first = fake.last_modified().unwrap().unwrap();

    fake.write(b"y").unwrap();
    let second = fake.last_modified().unwrap().unwrap();
    fake.delete().unwrap();
    let third = fake.last_modified().unwrap().unwrap();
    fake.touch();
    let fourth = fake.last_modified().unwrap().unwrap();

    assert!(first < second && second < third && third < fourth);
}

#[test]
fn external_changes_are_not_recorded_as_calls() {
    let fake = FakeBackend::new();

    fake.set_external("other process");

    assert!(fake.calls().is_empty());
    assert_eq!(fake.data(), Some(b"other process".to_vec()));
}

#[test]
fn injected_failures_surface_and_keep_data() {
    let fake = FakeBackend::with_data("kept");
    fake.fail_reads(true);
    fake.fail_writes(true);

    assert!(fake.read().is_err());
    assert!(fake.write(b"lost").is_err());
    assert!(fake.delete().is_err());
    assert_eq!(fake.data(), Some(b"kept".to_vec()));

    fake.fail_reads(false);
    assert_eq!(fake.read().unwrap(), Some(b"kept".to_vec()));
}

#[test]
fn counters_track_reads_and_writes() {
    let fake = FakeBackend::new();
    let clone = fake.clone();

    clone.write(b"1").unwrap();
    clone.read().unwrap();
    clone.read().unwrap();

    assert_eq!(fake.reads(), 2);
    assert_eq!(fake.writes(), 1);
}
