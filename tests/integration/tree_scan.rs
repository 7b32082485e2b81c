//! Local tree scanning

use reposync::concurrency::WorkerPool;
use reposync::tree::hasher::compute_blob_hash;
use reposync::tree::Scanner;
use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn test_keys_are_root_relative_with_forward_slashes() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("a.txt"), "a").unwrap();
    fs::create_dir_all(root.join("c")).unwrap();
    fs::write(root.join("c/d.txt"), "d").unwrap();

    // Trailing separator on the root must not leak into keys
    let root_with_sep = format!("{}/", root.display());
    let snapshot = Scanner::new(root_with_sep, WorkerPool::new(2))
        .scan()
        .await
        .unwrap();

    let keys: Vec<&str> = snapshot.keys().collect();
    assert_eq!(keys, vec!["a.txt", "c/d.txt"]);
    assert_eq!(snapshot.get("c/d.txt"), Some(&compute_blob_hash(b"d")));
}

#[tokio::test]
async fn test_missing_root_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let snapshot = Scanner::new(temp_dir.path().join("absent"), WorkerPool::default())
        .scan()
        .await
        .unwrap();
    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn test_empty_directories_are_not_keys() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("empty/nested")).unwrap();
    fs::write(root.join("file"), "").unwrap();

    let snapshot = Scanner::new(root, WorkerPool::new(1)).scan().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert!(snapshot.contains("file"));
    assert!(!snapshot.contains("empty"));
}

#[tokio::test]
async fn test_scan_with_single_slot_pool() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    for i in 0..20 {
        fs::write(root.join(format!("f{:02}.txt", i)), format!("{}", i)).unwrap();
    }

    let snapshot = Scanner::new(root, WorkerPool::new(1)).scan().await.unwrap();
    assert_eq!(snapshot.len(), 20);
    assert_eq!(snapshot.get("f07.txt"), Some(&compute_blob_hash(b"7")));
}
