//! Key derivation
//!
//! Maps a human-chosen record name to the opaque identifier used on disk.

use sha2::{Digest, Sha256};

/// Bytes of the digest kept in an identifier
const DIGEST_BYTES: usize = 16;

/// Length of an identifier in characters (two hex digits per byte)
pub const IDENTIFIER_LEN: usize = DIGEST_BYTES * 2;

/// Derives storage identifiers from record names
///
/// The identifier is the lowercase hex of the first 16 bytes of the SHA-256
/// of the name's UTF-8 bytes. No normalization is applied: `"box1"` and
/// `"Box1"` are different records.
pub struct KeyDeriver;

impl KeyDeriver {
    /// Derive the identifier for `name`
    pub fn derive(name: &str) -> String {
        let digest = Sha256::digest(name.as_bytes());
        digest[..DIGEST_BYTES]
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }

    /// Whether `s` has the shape of a derived identifier
    pub fn is_identifier(s: &str) -> bool {
        s.len() == IDENTIFIER_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }
}
