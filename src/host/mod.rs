//! Host Module
//!
//! SSH host profiles and their lifecycle on top of the record store.
//!
//! ## Responsibilities
//! - Fill defaults into collected input and validate it
//! - Encode/decode records as JSON
//! - create / fetch / list_all / remove / modify
//!
//! ## Record States
//! ```text
//!            create                 create / modify
//!   absent ──────────▶ present ◀──────────────┐
//!      ▲                  │  └────────────────┘
//!      └──────────────────┘
//!            remove
//! ```
//! `create` is an upsert; `fetch` and `list_all` never change state.

mod record;
mod manager;

pub use record::{Defaults, HostFields, HostRecord};
pub use manager::{HostManager, Listing, SkippedEntry};
