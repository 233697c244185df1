//! Lock mode specs
//!
//! Verify shared and exclusive holders exclude each other as documented.

use crate::prelude::*;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn many_shared_holders_coexist() {
    let ws = Workspace::new();
    let readers = 8;
    let barrier = Arc::new(Barrier::new(readers));

    let handles: Vec<_> = (0..readers)
        .map(|_| {
            let lock = ws.lock(retry(1, 1));
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let guard = lock.acquire_shared().unwrap();
                // Every reader holds its lock at this point
                barrier.wait();
                guard.release().unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn exclusive_blocks_shared_and_exclusive() {
    let ws = Workspace::new();
    let held = ws.lock(retry(1, 1)).acquire_exclusive().unwrap();

    for mode in [LockMode::Shared, LockMode::Exclusive] {
        let err = ws.lock(retry(2, 4)).acquire(mode).unwrap_err();
        match err {
            LockError::AcquisitionFailed {
                mode: failed,
                attempts,
                path,
                ..
            } => {
                assert_eq!(failed, mode);
                assert_eq!(attempts, 4);
                assert_eq!(path, ws.lock_path());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    held.release().unwrap();
}

#[test]
fn shared_blocks_exclusive_until_released() {
    let ws = Workspace::new();
    let reader = ws.lock(retry(1, 1)).acquire_shared().unwrap();

    assert!(ws.lock(retry(1, 2)).acquire_exclusive().is_err());

    reader.release().unwrap();
    assert!(ws.lock(retry(1, 1)).acquire_exclusive().is_ok());
}

#[test]
fn exhausted_budget_is_bounded() {
    let ws = Workspace::new();
    let _held = ws.lock(retry(1, 1)).acquire_exclusive().unwrap();
    let policy = retry(20, 5);

    let start = std::time::Instant::now();
    let result = ws.lock(policy).acquire_exclusive();
    let elapsed = start.elapsed();

    assert!(result.is_err());
    assert!(elapsed >= policy.budget(), "gave up after {elapsed:?}");
    assert!(elapsed < policy.budget() + Duration::from_secs(2));
}

#[test]
fn guard_dropped_on_panic_releases_lock() {
    let ws = Workspace::new();
    let lock = ws.lock(retry(1, 1));

    let result = thread::spawn(move || {
        let _guard = lock.acquire_exclusive().unwrap();
        panic!("holder crashed");
    })
    .join();

    assert!(result.is_err());
    assert!(ws.lock(retry(1, 1)).acquire_exclusive().is_ok());
}
