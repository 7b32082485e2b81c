//! Integration tests for the repository sync engine

mod concurrency_limit;
mod hasher_verification;
mod test_utils;
mod tree_scan;
