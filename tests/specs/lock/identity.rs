//! Lock file content specs

use crate::prelude::*;

#[test]
fn exclusive_holder_is_recorded_and_survives_release() {
    let ws = Workspace::new();
    let lock = ws.lock(retry(1, 1));

    lock.acquire_exclusive().unwrap().release().unwrap();

    let content = std::fs::read_to_string(ws.lock_path()).unwrap();
    assert!(
        content.starts_with(&format!("pid:{} thread:", std::process::id())),
        "{content:?}"
    );
    assert!(content.ends_with('\n'));
    assert_eq!(lock.holder().unwrap().unwrap().pid, std::process::id());
}

#[test]
fn shared_holder_leaves_content_alone() {
    let ws = Workspace::new();
    std::fs::write(ws.lock_path(), "pid:1 thread:earlier\n").unwrap();

    ws.lock(retry(1, 1)).acquire_shared().unwrap().release().unwrap();

    assert_eq!(
        std::fs::read_to_string(ws.lock_path()).unwrap(),
        "pid:1 thread:earlier\n"
    );
}

#[test]
fn lock_file_is_never_removed() {
    let ws = Workspace::new();
    let access = ws.file_access(retry(1, 1));
    let mut cache = b"blob".to_vec();

    access.update(&mut cache, |_| ()).unwrap();
    access.clear().unwrap();

    assert!(!ws.cache_path().exists());
    assert!(ws.lock_path().exists());
}
