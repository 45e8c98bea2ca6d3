//! Path sharding
//!
//! Splits an identifier into fixed-width directory segments so no single
//! directory holds more than `alphabet_size ^ width` children.

use std::path::{Path, PathBuf};

use crate::error::{ManageError, Result};

/// Maps identifiers to nested directory paths
#[derive(Debug, Clone, Copy)]
pub struct PathSharder {
    width: usize,
}

impl PathSharder {
    /// Create a sharder consuming `width` characters per directory level
    pub fn new(width: usize) -> Result<Self> {
        if width == 0 {
            return Err(ManageError::Config("shard width must be at least 1".to_string()));
        }
        Ok(Self { width })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Directory segments for `identifier`
    ///
    /// A trailing partial chunk is dropped; an identifier shorter than one
    /// chunk yields no segments and lands directly under the root. The file
    /// itself is always named by the full identifier, so nothing is lost.
    pub fn shard(&self, identifier: &str) -> Vec<String> {
        let chars: Vec<char> = identifier.chars().collect();
        chars
            .chunks_exact(self.width)
            .map(|chunk| chunk.iter().collect())
            .collect()
    }

    /// Full file path for `identifier` under `root`
    pub fn path(&self, root: &Path, identifier: &str) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in self.shard(identifier) {
            path.push(segment);
        }
        path.push(identifier);
        path
    }
}

impl Default for PathSharder {
    fn default() -> Self {
        Self { width: crate::config::DEFAULT_SHARD_WIDTH }
    }
}
