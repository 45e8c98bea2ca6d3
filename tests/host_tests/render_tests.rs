//! Tests for SSH config rendering
//!
//! These tests verify:
//! - One block per record, sorted by nickname
//! - Atomic write to the target path

use std::fs;

use sshmanage::render::{self, GENERATED_HEADER};
use tempfile::TempDir;

use crate::common::sample_record;

#[test]
fn test_render_single_block() {
    let record = sample_record("db", "/keys/id");

    let out = render::render(&[record]);

    let expected = format!(
        concat!(
            "{}\n\n# db\nHost db.example.com\n    HostName 10.0.0.5\n    Port 2222\n",
            "    User deploy\n    IdentityFile /keys/id\n    ServerAliveInterval 60\n",
        ),
        GENERATED_HEADER
    );
    assert_eq!(out, expected);
}

#[test]
fn test_render_sorted_by_nickname() {
    let records = vec![
        sample_record("web", "/k"),
        sample_record("app", "/k"),
        sample_record("db", "/k"),
    ];

    let out = render::render(&records);

    let app = out.find("# app").unwrap();
    let db = out.find("# db").unwrap();
    let web = out.find("# web").unwrap();
    assert!(app < db && db < web);
    assert_eq!(out.matches("\nHost ").count(), 3);
}

#[test]
fn test_render_empty() {
    assert_eq!(render::render(&[]), format!("{}\n", GENERATED_HEADER));
}

#[test]
fn test_write_config_creates_and_replaces() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join(".ssh").join("config");

    render::write_config(&target, &[sample_record("db", "/k")]).unwrap();
    assert!(fs::read_to_string(&target).unwrap().contains("# db"));

    render::write_config(&target, &[sample_record("web", "/k")]).unwrap();
    let contents = fs::read_to_string(&target).unwrap();
    assert!(contents.contains("# web"));
    assert!(!contents.contains("# db"));

    let leftovers: Vec<_> = fs::read_dir(target.parent().unwrap())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers.len(), 1);
}
