//! # ssh-manage
//!
//! A personal SSH host-configuration manager:
//! - Named host profiles stored one file per record
//! - Content-addressed keys, sharded into a bounded directory tree
//! - Byte-budgeted LRU cache in front of the filesystem
//! - Rendering of all profiles into an SSH client configuration file
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   CLI (add/get/list/rm/update/write)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   HostManager                                │
//! │        (validate, fill defaults, encode/decode JSON)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   RecordStore                                │
//! └──────┬──────────────────┬───────────────────┬───────────────┘
//!        │                  │                   │
//!        ▼                  ▼                   ▼
//!  ┌───────────┐     ┌─────────────┐     ┌─────────────┐
//!  │ KeyDeriver│     │ PathSharder │     │BoundedCache │
//!  │ (SHA-256) │     │ (ab/cd/...) │     │   (LRU)     │
//!  └───────────┘     └─────────────┘     └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod host;
pub mod prompt;
pub mod render;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ManageError, Result};
pub use config::{Config, DecodePolicy};
pub use host::{HostFields, HostManager, HostRecord, Listing};
pub use store::RecordStore;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ssh-manage
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
