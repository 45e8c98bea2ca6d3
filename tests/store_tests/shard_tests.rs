//! Tests for PathSharder
//!
//! These tests verify:
//! - Chunking into fixed-width segments
//! - Remainder handling
//! - Full path construction

use std::path::Path;

use sshmanage::store::{KeyDeriver, PathSharder};
use sshmanage::ManageError;

#[test]
fn test_shard_even_length() {
    let sharder = PathSharder::new(2).unwrap();
    assert_eq!(sharder.shard("abcdef"), vec!["ab", "cd", "ef"]);
}

#[test]
fn test_shard_drops_partial_chunk() {
    let sharder = PathSharder::new(2).unwrap();
    assert_eq!(sharder.shard("abcde"), vec!["ab", "cd"]);

    let sharder = PathSharder::new(3).unwrap();
    assert_eq!(sharder.shard("abcdefgh"), vec!["abc", "def"]);
}

#[test]
fn test_shard_shorter_than_one_chunk() {
    let sharder = PathSharder::new(4).unwrap();
    assert!(sharder.shard("abc").is_empty());
    assert_eq!(sharder.path(Path::new("/root"), "abc"), Path::new("/root/abc"));
}

#[test]
fn test_zero_width_rejected() {
    assert!(matches!(PathSharder::new(0), Err(ManageError::Config(_))));
}

#[test]
fn test_segments_are_identifier_prefix() {
    let sharder = PathSharder::default();
    let id = KeyDeriver::derive("box1");

    let segments = sharder.shard(&id);
    assert_eq!(segments.len(), id.len() / 2);
    assert_eq!(segments.concat(), id);

    // Same answer every time
    assert_eq!(segments, sharder.shard(&id));
}

#[test]
fn test_path_ends_with_full_identifier() {
    let sharder = PathSharder::new(3).unwrap();
    let id = KeyDeriver::derive("box1"); // 32 chars: 10 segments + 2 left over

    let path = sharder.path(Path::new("/store"), &id);

    assert_eq!(path.file_name().unwrap().to_str().unwrap(), id);
    let dirs: Vec<String> = path
        .strip_prefix("/store")
        .unwrap()
        .parent()
        .unwrap()
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    assert_eq!(dirs.len(), 10);
    assert!(id.starts_with(&dirs.concat()));
}
