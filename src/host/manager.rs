//! Host lifecycle operations
//!
//! Applies the record store primitives to JSON-encoded host records.

use crate::config::{Config, DecodePolicy};
use crate::error::{ManageError, Result};
use crate::store::{KeyDeriver, RecordStore};

use super::{Defaults, HostFields, HostRecord};

/// A stored entry left out of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub identifier: String,
    pub reason: String,
}

/// Result of `list_all`
#[derive(Debug, Default)]
pub struct Listing {
    /// Decoded records, in traversal order
    pub records: Vec<HostRecord>,

    /// Entries left out: undecodable ones under `DecodePolicy::Skip`, and
    /// records filed under an identifier their nickname does not derive to
    pub skipped: Vec<SkippedEntry>,
}

impl Listing {
    /// Number of records listed
    pub fn total(&self) -> usize {
        self.records.len()
    }
}

/// Create/fetch/list/remove/modify host records
///
/// Holds no logger: every outcome is reported through the returned `Result`.
pub struct HostManager {
    config: Config,
    store: RecordStore,
}

impl HostManager {
    /// Open the store described by `config`
    pub fn open(config: Config) -> Result<Self> {
        let store = RecordStore::open(&config)?;
        Ok(Self { config, store })
    }

    /// Wrap an already opened store
    pub fn new(config: Config, store: RecordStore) -> Self {
        Self { config, store }
    }

    /// Defaults applied to omitted fields
    pub fn defaults(&self) -> Result<Defaults> {
        Defaults::from_config(&self.config)
    }

    /// Validate `fields`, fill defaults and store under `nickname`
    ///
    /// Upsert: an existing record under the same nickname is replaced.
    pub fn create(&self, nickname: &str, fields: HostFields) -> Result<HostRecord> {
        check_nickname(nickname)?;
        let defaults = self.defaults_for(&fields)?;
        let record = fields.into_record(nickname, &defaults)?;

        self.store.put(nickname, &record.encode()?)?;
        Ok(record)
    }

    /// `create` from the positional `hostname:key_path` form
    pub fn create_positional(&self, nickname: &str, host_info: &str) -> Result<HostRecord> {
        self.create(nickname, HostFields::parse_positional(host_info)?)
    }

    /// Load the record stored under `nickname`
    pub fn fetch(&self, nickname: &str) -> Result<HostRecord> {
        check_nickname(nickname)?;
        let bytes = self.store.get(nickname)?;
        HostRecord::decode(&KeyDeriver::derive(nickname), &bytes)
    }

    /// Decode every stored record
    ///
    /// Undecodable entries abort the listing or are set aside, depending on
    /// `Config::decode_policy`. I/O errors always abort. A record whose
    /// nickname does not derive to the identifier it is filed under cannot
    /// be fetched or removed by name, so it is always set aside.
    pub fn list_all(&self) -> Result<Listing> {
        let mut listing = Listing::default();

        for entry in self.store.enumerate() {
            let (identifier, bytes) = entry?;
            match HostRecord::decode(&identifier, &bytes) {
                Ok(record) if KeyDeriver::derive(&record.nickname) != identifier => {
                    listing.skipped.push(SkippedEntry {
                        reason: format!(
                            "record '{}' is filed under a different key; add it again",
                            record.nickname
                        ),
                        identifier,
                    });
                }
                Ok(record) => listing.records.push(record),
                Err(e) if self.config.decode_policy == DecodePolicy::Skip => {
                    listing.skipped.push(SkippedEntry {
                        identifier,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Ok(listing)
    }

    /// Delete the record stored under `nickname`
    pub fn remove(&self, nickname: &str) -> Result<()> {
        check_nickname(nickname)?;
        self.store.delete(nickname)
    }

    /// Apply a sparse patch to an existing record and store it back
    pub fn modify(&self, nickname: &str, patch: HostFields) -> Result<HostRecord> {
        let mut record = self.fetch(nickname)?;
        record.apply(patch)?;
        self.store.put(nickname, &record.encode()?)?;
        Ok(record)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve the OS user only when the caller did not supply one
    fn defaults_for(&self, fields: &HostFields) -> Result<Defaults> {
        let supplied_user = fields.user.as_deref().map(str::trim).filter(|u| !u.is_empty());
        match supplied_user {
            Some(user) => Ok(Defaults {
                port: self.config.default_port,
                keep_alive_interval: self.config.default_keep_alive,
                user: user.to_string(),
            }),
            None => self.defaults(),
        }
    }
}

fn check_nickname(nickname: &str) -> Result<()> {
    if nickname.is_empty() {
        return Err(ManageError::validation("nickname is required"));
    }
    Ok(())
}
