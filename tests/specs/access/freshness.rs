//! Freshness shortcut specs
//!
//! Two access instances over one backend stand in for two processes.

use crate::prelude::*;

#[test]
fn unchanged_blob_costs_no_lock_and_no_read() {
    let ws = Workspace::new();
    let fake = FakeBackend::with_data("shared");
    let access = ws.fake_access(&fake, retry(1, 1));
    let mut cache = Vec::new();
    access.refresh(&mut cache).unwrap();
    let before = access.stats();

    for _ in 0..10 {
        access.refresh(&mut cache).unwrap();
    }

    let after = access.stats();
    assert_eq!(after.lock_acquisitions, before.lock_acquisitions);
    assert_eq!(after.backend_reads, before.backend_reads);
    assert_eq!(after.skipped_reads, before.skipped_reads + 10);
}

#[test]
fn other_writer_forces_exactly_one_reload() {
    let ws = Workspace::new();
    let fake = FakeBackend::with_data("v1");
    let reader = ws.fake_access(&fake, retry(1, 1));
    let writer = ws.fake_access(&fake, retry(1, 1));
    let mut reader_cache = String::new();
    let mut writer_cache = String::new();
    reader.refresh(&mut reader_cache).unwrap();
    let before = reader.stats();

    writer
        .update(&mut writer_cache, |c| c.push_str("+v2"))
        .unwrap();
    reader.refresh(&mut reader_cache).unwrap();
    reader.refresh(&mut reader_cache).unwrap();

    let after = reader.stats();
    assert_eq!(after.lock_acquisitions - before.lock_acquisitions, 1);
    assert_eq!(after.backend_reads - before.backend_reads, 1);
    similar_asserts::assert_eq!(reader_cache, "v1+v2");
}

#[test]
fn writes_never_take_the_shortcut() {
    let ws = Workspace::new();
    let fake = FakeBackend::with_data("v1");
    let access = ws.fake_access(&fake, retry(1, 1));
    let mut cache = String::new();
    access.refresh(&mut cache).unwrap();

    for _ in 0..3 {
        access.update(&mut cache, |c| c.push('.')).unwrap();
    }

    assert_eq!(fake.reads(), 4);
    assert_eq!(fake.writes(), 3);
    similar_asserts::assert_eq!(fake.data().unwrap(), b"v1...".to_vec());
}

#[test]
fn abandoned_write_window_persists_nothing() {
    let ws = Workspace::new();
    let fake = FakeBackend::with_data("v1");
    let access = ws.fake_access(&fake, retry(1, 1));
    let mut cache = String::new();

    let window = access.before_access(AccessIntent::Write, &mut cache).unwrap();
    cache.push_str("+unsaved");
    drop(window);

    assert_eq!(fake.writes(), 0);
    assert_eq!(fake.data().unwrap(), b"v1".to_vec());
    assert!(ws.lock(retry(1, 1)).acquire_exclusive().is_ok());
}
