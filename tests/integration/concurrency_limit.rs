//! Worker pool bounds on remote fetches

use super::test_utils::{repo, FakeRemote};
use reposync::sync::{run_sync, SyncRequest};
use std::time::Duration;
use tempfile::TempDir;

fn five_files() -> FakeRemote {
    FakeRemote::new(&[
        ("1.txt", b"one"),
        ("2.txt", b"two"),
        ("3.txt", b"three"),
        ("4.txt", b"four"),
        ("5.txt", b"five"),
    ])
    .with_delay(Duration::from_millis(20))
}

#[tokio::test]
async fn test_downloads_respect_max_concurrent() {
    let temp_dir = TempDir::new().unwrap();
    let remote = five_files();
    let request = SyncRequest::new(repo(), "heads/master", temp_dir.path()).with_max_concurrent(2);

    let report = run_sync(&remote, &request).await.unwrap();

    assert!(report.is_success());
    assert_eq!(remote.blob_calls(), 5);
    // Five pending 20ms fetches must fill the pool without exceeding it
    assert_eq!(remote.max_in_flight(), 2);
    remote.assert_mirrored(temp_dir.path());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_single_slot_serializes_downloads() {
    let temp_dir = TempDir::new().unwrap();
    let remote = five_files();
    let request = SyncRequest::new(repo(), "heads/master", temp_dir.path()).with_max_concurrent(1);

    let report = run_sync(&remote, &request).await.unwrap();

    assert!(report.is_success());
    assert_eq!(remote.max_in_flight(), 1);
}

#[tokio::test]
async fn test_zero_is_clamped_to_one() {
    let temp_dir = TempDir::new().unwrap();
    let remote = five_files();
    let request = SyncRequest::new(repo(), "heads/master", temp_dir.path()).with_max_concurrent(0);

    let report = run_sync(&remote, &request).await.unwrap();

    assert!(report.is_success());
    assert_eq!(remote.max_in_flight(), 1);
}
