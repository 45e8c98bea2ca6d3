//! Tests for HostManager
//!
//! These tests verify:
//! - create (positional and field forms), upsert semantics
//! - fetch / remove not-found handling
//! - list_all totals, decode policies and records filed under foreign keys
//! - modify as a sparse read-modify-write

use std::fs;

use sshmanage::config::DecodePolicy;
use sshmanage::host::HostFields;
use sshmanage::store::{KeyDeriver, PathSharder};
use sshmanage::ManageError;

use crate::common::{sample_record, Fixture};

// =============================================================================
// Create / Fetch
// =============================================================================

#[test]
fn test_create_then_fetch() {
    let fx = Fixture::new();

    let created = fx
        .manager
        .create_positional("box1", &format!("srv.example.com:{}", fx.key_path))
        .unwrap();
    let fetched = fx.manager.fetch("box1").unwrap();

    assert_eq!(created, fetched);
    assert_eq!(fetched.hostname, "srv.example.com");
    assert_eq!(fetched.address, "srv.example.com");
    assert_eq!(fetched.port, 22);
    assert_eq!(fetched.user, "tester");
    assert_eq!(fetched.key_path, fx.key_path);
    assert_eq!(fetched.keep_alive_interval, 30);
}

#[test]
fn test_create_uses_configured_defaults() {
    let fx = Fixture::with_config(|b| b.default_port(2222).default_keep_alive(15));

    let record = fx
        .manager
        .create_positional("box1", &format!("srv:{}", fx.key_path))
        .unwrap();

    assert_eq!(record.port, 2222);
    assert_eq!(record.keep_alive_interval, 15);
}

#[test]
fn test_create_is_upsert() {
    let fx = Fixture::new();
    let second_key = fx.extra_key("id_second");

    fx.manager
        .create_positional("box1", &format!("srv:{}", fx.key_path))
        .unwrap();
    fx.manager
        .create_positional("box1", &format!("srv:{}", second_key))
        .unwrap();

    assert_eq!(fx.manager.fetch("box1").unwrap().key_path, second_key);
    assert_eq!(fx.manager.list_all().unwrap().total(), 1);
}

#[test]
fn test_failed_create_writes_nothing() {
    let fx = Fixture::new();

    let err = fx
        .manager
        .create_positional("box1", "srv:/missing/key")
        .unwrap_err();

    assert!(matches!(err, ManageError::Validation(_)));
    assert!(fx.manager.fetch("box1").unwrap_err().is_not_found());
    assert_eq!(fx.manager.store().enumerate().count(), 0);
}

#[test]
fn test_create_rejects_empty_nickname() {
    let fx = Fixture::new();

    let err = fx
        .manager
        .create_positional("", &format!("srv:{}", fx.key_path))
        .unwrap_err();

    assert!(matches!(err, ManageError::Validation(_)));
}

#[test]
fn test_fetch_missing_message() {
    let fx = Fixture::new();

    let err = fx.manager.fetch("ghost").unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "no configuration found for ghost");
}

#[test]
fn test_fetch_corrupt_record_is_decode_error() {
    let fx = Fixture::new();
    fx.manager.store().put("broken", b"{not json").unwrap();

    let err = fx.manager.fetch("broken").unwrap_err();

    assert!(matches!(err, ManageError::Decode { ref identifier, .. }
        if *identifier == KeyDeriver::derive("broken")));
}

// =============================================================================
// Remove
// =============================================================================

#[test]
fn test_remove_then_fetch_not_found() {
    let fx = Fixture::new();
    fx.manager
        .create_positional("box1", &format!("srv:{}", fx.key_path))
        .unwrap();

    fx.manager.remove("box1").unwrap();

    assert!(fx.manager.fetch("box1").unwrap_err().is_not_found());
    assert_eq!(fx.manager.list_all().unwrap().total(), 0);
}

#[test]
fn test_remove_ghost_leaves_store_unchanged() {
    let fx = Fixture::new();
    fx.manager
        .create_positional("box1", &format!("srv:{}", fx.key_path))
        .unwrap();

    let err = fx.manager.remove("ghost").unwrap_err();

    assert!(matches!(err, ManageError::NotFound(ref name) if name == "ghost"));
    let listing = fx.manager.list_all().unwrap();
    assert_eq!(listing.total(), 1);
    assert_eq!(listing.records[0].nickname, "box1");
}

// =============================================================================
// List
// =============================================================================

#[test]
fn test_list_all_three_records() {
    let fx = Fixture::new();
    for name in ["gamma", "alpha", "beta"] {
        fx.manager
            .create_positional(name, &format!("{}.example.com:{}", name, fx.key_path))
            .unwrap();
    }

    let listing = fx.manager.list_all().unwrap();

    assert_eq!(listing.total(), 3);
    assert!(listing.skipped.is_empty());
    let mut names: Vec<_> = listing.records.iter().map(|r| r.nickname.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["alpha", "beta", "gamma"]);
}

#[test]
fn test_list_all_aborts_on_corrupt_entry_by_default() {
    let fx = Fixture::new();
    fx.manager
        .create_positional("good", &format!("srv:{}", fx.key_path))
        .unwrap();
    fx.manager.store().put("bad", b"garbage").unwrap();

    let err = fx.manager.list_all().unwrap_err();

    assert!(matches!(err, ManageError::Decode { .. }));
}

#[test]
fn test_list_all_skip_policy_reports_corrupt_entries() {
    let fx = Fixture::with_config(|b| b.decode_policy(DecodePolicy::Skip));
    fx.manager
        .create_positional("good", &format!("srv:{}", fx.key_path))
        .unwrap();
    fx.manager.store().put("bad", b"garbage").unwrap();

    let listing = fx.manager.list_all().unwrap();

    assert_eq!(listing.total(), 1);
    assert_eq!(listing.records[0].nickname, "good");
    assert_eq!(listing.skipped.len(), 1);
    assert_eq!(listing.skipped[0].identifier, KeyDeriver::derive("bad"));
}

#[test]
fn test_list_all_sets_aside_record_filed_under_md5_key() {
    let fx = Fixture::new();
    fx.manager
        .create_positional("good", &format!("srv:{}", fx.key_path))
        .unwrap();

    // md5("a"), the key an md5-keyed release gave nickname "a"
    let identifier = "0cc175b9c0f1b6a831c399e269772661";
    let path = PathSharder::default().path(fx.manager.store().root(), identifier);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, sample_record("a", &fx.key_path).encode().unwrap()).unwrap();

    let listing = fx.manager.list_all().unwrap();

    assert_eq!(listing.total(), 1);
    assert_eq!(listing.records[0].nickname, "good");
    assert_eq!(listing.skipped.len(), 1);
    assert_eq!(listing.skipped[0].identifier, identifier);
    assert!(listing.skipped[0].reason.contains("'a'"));
    assert!(fx.manager.fetch("a").unwrap_err().is_not_found());
}

// =============================================================================
// Modify
// =============================================================================

#[test]
fn test_modify_is_sparse() {
    let fx = Fixture::new();
    fx.manager
        .create_positional("box1", &format!("srv:{}", fx.key_path))
        .unwrap();

    let updated = fx
        .manager
        .modify(
            "box1",
            HostFields {
                address: Some("10.9.8.7".to_string()),
                port: Some(8022),
                ..HostFields::default()
            },
        )
        .unwrap();

    let fetched = fx.manager.fetch("box1").unwrap();
    assert_eq!(updated, fetched);
    assert_eq!(fetched.address, "10.9.8.7");
    assert_eq!(fetched.port, 8022);
    assert_eq!(fetched.hostname, "srv");
    assert_eq!(fetched.user, "tester");
    assert_eq!(fetched.key_path, fx.key_path);
}

#[test]
fn test_modify_persists_to_disk() {
    let fx = Fixture::new();
    fx.manager
        .create_positional("box1", &format!("srv:{}", fx.key_path))
        .unwrap();

    fx.manager
        .modify(
            "box1",
            HostFields {
                user: Some("admin".to_string()),
                ..HostFields::default()
            },
        )
        .unwrap();

    let on_disk = fs::read_to_string(fx.manager.store().path_for("box1")).unwrap();
    assert!(on_disk.contains("\"User\":\"admin\""));
}

#[test]
fn test_modify_missing_record() {
    let fx = Fixture::new();

    let err = fx.manager.modify("ghost", HostFields::default()).unwrap_err();

    assert!(err.is_not_found());
}

#[test]
fn test_modify_invalid_patch_keeps_record() {
    let fx = Fixture::new();
    fx.manager
        .create_positional("box1", &format!("srv:{}", fx.key_path))
        .unwrap();
    let before = fx.manager.fetch("box1").unwrap();

    let err = fx
        .manager
        .modify(
            "box1",
            HostFields {
                port: Some(0),
                ..HostFields::default()
            },
        )
        .unwrap_err();

    assert!(matches!(err, ManageError::Validation(_)));
    assert_eq!(fx.manager.fetch("box1").unwrap(), before);
}
