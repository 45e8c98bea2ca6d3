//! Tests for host records and the operations built on them
//!
//! Records, lifecycle operations, interactive collection and rendering.

mod manager_tests;
mod render_tests;
