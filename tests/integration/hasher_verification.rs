//! Blob hash compatibility with git object ids

use reposync::tree::hasher::{compute_blob_hash, hash_file, hash_reader, BlobHasher};
use std::fs;
use std::io::Cursor;
use tempfile::TempDir;

#[test]
fn test_matches_git_hash_object() {
    // `git hash-object` output for the same content
    assert_eq!(
        compute_blob_hash(b"").as_str(),
        "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391"
    );
    assert_eq!(
        compute_blob_hash(b"hello world\n").as_str(),
        "3b18e512dba79e4c8300dd08aeb37f8e728b8dad"
    );
}

#[test]
fn test_length_is_part_of_the_hash() {
    // Same bytes hashed as plain sha1 would differ from the blob id
    assert_ne!(
        compute_blob_hash(b"abc").as_str(),
        "a9993e364706816aba3e25717850c26c9cd0d89d"
    );
    assert_ne!(compute_blob_hash(b"abc"), compute_blob_hash(b"abc\0"));
}

#[test]
fn test_streamed_hash_matches_in_memory() {
    let content: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    let streamed = hash_reader(Cursor::new(&content), content.len() as u64).unwrap();
    assert_eq!(streamed, compute_blob_hash(&content));

    let mut hasher = BlobHasher::new(content.len() as u64);
    for chunk in content.chunks(777) {
        hasher.update(chunk);
    }
    assert_eq!(hasher.finalize().unwrap(), streamed);
}

#[test]
fn test_declared_length_mismatch_fails() {
    let err = hash_reader(Cursor::new(b"short"), 10).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
}

#[tokio::test]
async fn test_file_hash_matches_content_hash() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("data.bin");
    let content = vec![7u8; 150_000];
    fs::write(&path, &content).unwrap();

    assert_eq!(hash_file(&path).await.unwrap(), compute_blob_hash(&content));
}

#[tokio::test]
async fn test_missing_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    assert!(hash_file(&temp_dir.path().join("nope")).await.is_err());
}
