//! Concurrent writer specs
//!
//! Each thread opens its own access instance, so each acquisition is a
//! separate open of the lock file, as it would be across processes.

use crate::prelude::*;
use std::collections::BTreeSet;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Instant;

/// Append `<id`, flush, linger, append `>id`, save. Returns the interval
/// during which the exclusive lock was certainly held.
fn append_marker(access: &CacheAccess<FileBackend>, id: usize, linger: Duration) -> (Instant, Instant) {
    let mut cache = Vec::new();
    let window = access.before_access(AccessIntent::Write, &mut cache).unwrap();
    let held_from = Instant::now();

    cache.extend_from_slice(format!("<{id}\n").as_bytes());
    access.backend().write(&cache).unwrap();
    thread::sleep(linger);
    cache.extend_from_slice(format!(">{id}\n").as_bytes());

    let held_until = Instant::now();
    window.after_access(&cache).unwrap();
    (held_from, held_until)
}

#[test]
fn two_hundred_writers_never_interleave() {
    let ws = Arc::new(Workspace::new());
    let writers = 200;
    let barrier = Arc::new(Barrier::new(writers));

    let handles: Vec<_> = (0..writers)
        .map(|id| {
            let ws = Arc::clone(&ws);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let access = ws.file_access(retry(150, 100));
                barrier.wait();
                append_marker(&access, id, Duration::from_millis((id % 5) as u64))
            })
        })
        .collect();

    let mut intervals: Vec<(Instant, Instant)> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    let content = ws.read_cache();
    let ids = validate_markers(&content).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(ids.len(), writers);
    let unique: BTreeSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), writers, "a writer's update was lost");

    intervals.sort();
    for pair in intervals.windows(2) {
        assert!(
            pair[0].1 <= pair[1].0,
            "exclusive holds overlapped: {:?} and {:?}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn sequential_updates_accumulate() {
    let ws = Workspace::new();

    for id in 0..5 {
        let access = ws.file_access(retry(1, 1));
        append_marker(&access, id, Duration::ZERO);
    }

    similar_asserts::assert_eq!(
        ws.read_cache(),
        "<0\n>0\n<1\n>1\n<2\n>2\n<3\n>3\n<4\n>4\n"
    );
}

#[test]
fn readers_see_only_whole_pairs() {
    let ws = Arc::new(Workspace::new());

    let writer = {
        let ws = Arc::clone(&ws);
        thread::spawn(move || {
            let access = ws.file_access(retry(5, 400));
            for id in 0..20 {
                append_marker(&access, id, Duration::from_millis(2));
            }
        })
    };

    let reader = {
        let ws = Arc::clone(&ws);
        thread::spawn(move || {
            for _ in 0..50 {
                let access = ws.file_access(retry(5, 400));
                let mut cache = String::new();
                access.refresh(&mut cache).unwrap();
                validate_markers(&cache).unwrap_or_else(|e| panic!("torn read: {e}"));
                thread::sleep(Duration::from_millis(1));
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();
}
