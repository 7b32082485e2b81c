//! Blob hash computation compatible with git object ids
//!
//! BlobHash = sha1("blob " || decimal_len || "\0" || content)
//!
//! The length goes into the preamble, so it must be known before the first content byte is
//! hashed. Streaming hashers verify that exactly that many bytes arrived.

use crate::error::ScanError;
use crate::types::BlobHash;
use sha1::{Digest, Sha1};
use std::io::{self, Read};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Read buffer size for streaming file content
const CHUNK_SIZE: usize = 64 * 1024;

/// Incremental blob hasher with a declared length.
pub struct BlobHasher {
    inner: Sha1,
    expected_len: u64,
    seen: u64,
}

impl BlobHasher {
    /// Start a hash for content of exactly `len` bytes.
    pub fn new(len: u64) -> Self {
        let mut inner = Sha1::new();
        inner.update(format!("blob {}\0", len).as_bytes());
        Self {
            inner,
            expected_len: len,
            seen: 0,
        }
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.seen += chunk.len() as u64;
        self.inner.update(chunk);
    }

    /// Finish the hash. Fails if the content length differs from the declared length.
    pub fn finalize(self) -> io::Result<BlobHash> {
        if self.seen != self.expected_len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "content length changed while hashing: expected {} bytes, read {}",
                    self.expected_len, self.seen
                ),
            ));
        }
        Ok(BlobHash::from_digest(&self.inner.finalize()))
    }
}

/// Compute the blob hash of in-memory content
pub fn compute_blob_hash(content: &[u8]) -> BlobHash {
    let mut hasher = BlobHasher::new(content.len() as u64);
    hasher.update(content);
    // Length is taken from the slice itself, so it always matches.
    BlobHash::from_digest(&hasher.inner.finalize())
}

/// Hash a reader whose total length is known up front
pub fn hash_reader<R: Read>(mut reader: R, len: u64) -> io::Result<BlobHash> {
    let mut hasher = BlobHasher::new(len);
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    hasher.finalize()
}

/// Hash a file on disk without loading it into memory
pub async fn hash_file(path: &Path) -> Result<BlobHash, ScanError> {
    let io_err = |source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = tokio::fs::File::open(path).await.map_err(io_err)?;
    let len = file.metadata().await.map_err(io_err)?.len();

    let mut hasher = BlobHasher::new(len);
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut buf).await.map_err(io_err)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    hasher.finalize().map_err(io_err)
}
