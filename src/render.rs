//! SSH config rendering
//!
//! Turns stored host records into `ssh_config(5)` blocks, one per record.
//!
//! ## Block Format
//! ```text
//! # <nickname>
//! Host <hostname>
//!     HostName <address>
//!     Port <port>
//!     User <user>
//!     IdentityFile <key_path>
//!     ServerAliveInterval <keep_alive_interval>
//! ```

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::host::HostRecord;

/// Header written at the top of every generated file
pub const GENERATED_HEADER: &str = "# Generated by ssh-manage. Edits will be overwritten.";

/// Render all records, sorted by nickname so output is stable
pub fn render(records: &[HostRecord]) -> String {
    let mut sorted: Vec<&HostRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.nickname.cmp(&b.nickname));

    let mut out = String::new();
    out.push_str(GENERATED_HEADER);
    out.push('\n');

    for record in sorted {
        out.push('\n');
        render_block(&mut out, record);
    }
    out
}

fn render_block(out: &mut String, record: &HostRecord) {
    // Writing into a String cannot fail
    let _ = writeln!(out, "# {}", record.nickname);
    let _ = writeln!(out, "Host {}", record.hostname);
    let _ = writeln!(out, "    HostName {}", record.address);
    let _ = writeln!(out, "    Port {}", record.port);
    let _ = writeln!(out, "    User {}", record.user);
    let _ = writeln!(out, "    IdentityFile {}", record.key_path);
    let _ = writeln!(out, "    ServerAliveInterval {}", record.keep_alive_interval);
}

/// Render `records` and replace the file at `path` atomically
pub fn write_config(path: &Path, records: &[HostRecord]) -> Result<()> {
    let contents = render(records);

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "config".to_string());
    let tmp_path = dir.join(format!(".{}.{}.tmp", file_name, std::process::id()));

    let mut file = File::create(&tmp_path)?;
    if let Err(e) = file.write_all(contents.as_bytes()).and_then(|_| file.sync_all()) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    drop(file);

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    tracing::debug!(path = %path.display(), hosts = records.len(), "wrote SSH configuration");
    Ok(())
}
