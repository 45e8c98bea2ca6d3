//! Host record definitions
//!
//! The persisted profile, the sparse input used to build or patch it, and
//! the pure fill-defaults-and-validate step between the two.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{ManageError, Result};

/// A stored SSH host profile
///
/// Serialized as JSON with the field names used by earlier releases. Files
/// from those releases decode, but their store keys were derived with md5,
/// so a copied-over tree lists them as set aside until each host is re-added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecord {
    /// Name given to ssh-manage; derives the storage key
    #[serde(rename = "Nickname")]
    pub nickname: String,

    /// Hostname(s) or alias(es) of the server
    #[serde(rename = "Name")]
    pub hostname: String,

    /// Address actually dialed
    #[serde(rename = "IP")]
    pub address: String,

    #[serde(rename = "Port")]
    pub port: u16,

    /// Remote login user
    #[serde(rename = "User")]
    pub user: String,

    /// Path to the private key (the key itself is never stored)
    #[serde(rename = "Key")]
    pub key_path: String,

    /// Seconds between keep-alive messages
    #[serde(rename = "KeepAlive")]
    pub keep_alive_interval: u32,
}

impl HostRecord {
    /// Check the invariants every stored record must hold
    pub fn validate(&self) -> Result<()> {
        if self.nickname.is_empty() {
            return Err(ManageError::validation("nickname is required"));
        }
        if self.hostname.is_empty() {
            return Err(ManageError::validation("hostname or alias is required"));
        }
        if self.key_path.is_empty() {
            return Err(ManageError::validation("SSH key is required"));
        }
        if self.port == 0 {
            return Err(ManageError::validation("port must be between 1 and 65535"));
        }
        if self.keep_alive_interval == 0 {
            return Err(ManageError::validation("keep-alive interval must be positive"));
        }
        Ok(())
    }

    /// Apply a sparse patch: supplied fields replace, omitted ones stay
    ///
    /// A newly supplied key path must exist on disk.
    pub fn apply(&mut self, patch: HostFields) -> Result<()> {
        let patch = patch.normalized();

        if let Some(key_path) = patch.key_path {
            ensure_key_exists(&key_path)?;
            self.key_path = key_path;
        }
        if let Some(hostname) = patch.hostname {
            self.hostname = hostname;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(port) = patch.port {
            self.port = port;
        }
        if let Some(user) = patch.user {
            self.user = user;
        }
        if let Some(interval) = patch.keep_alive_interval {
            self.keep_alive_interval = interval;
        }

        self.validate()
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ManageError::Serialization(e.to_string()))
    }

    /// Decode the blob stored under `identifier`
    pub fn decode(identifier: &str, bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|source| ManageError::Decode {
            identifier: identifier.to_string(),
            source,
        })
    }
}

// =============================================================================
// Collected Input
// =============================================================================

/// Values used for any field the caller leaves out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub port: u16,
    pub keep_alive_interval: u32,
    pub user: String,
}

impl Defaults {
    /// Resolve defaults from config (the user falls back to the OS user)
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            port: config.default_port,
            keep_alive_interval: config.default_keep_alive,
            user: config.resolve_user()?,
        })
    }
}

/// Field values as collected from arguments or prompts; `None` means "not given"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostFields {
    pub hostname: Option<String>,
    pub address: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub key_path: Option<String>,
    pub keep_alive_interval: Option<u32>,
}

impl HostFields {
    /// Parse the positional `hostname:key_path` form
    ///
    /// Splits on the first `:`, so the key path may itself contain colons.
    pub fn parse_positional(host_info: &str) -> Result<Self> {
        let (hostname, key_path) = host_info.split_once(':').ok_or_else(|| {
            ManageError::validation(format!("expected <hostname>:<key_path>, got '{}'", host_info))
        })?;

        Ok(Self {
            hostname: Some(hostname.to_string()),
            key_path: Some(key_path.to_string()),
            ..Self::default()
        }
        .normalized())
    }

    /// True when no field was supplied
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fill defaults and validate, producing the record to store
    pub fn into_record(self, nickname: &str, defaults: &Defaults) -> Result<HostRecord> {
        if nickname.is_empty() {
            return Err(ManageError::validation("nickname is required"));
        }
        let fields = self.normalized();

        let hostname = fields
            .hostname
            .ok_or_else(|| ManageError::validation("hostname or alias is required"))?;
        let key_path = fields
            .key_path
            .ok_or_else(|| ManageError::validation("SSH key is required"))?;
        ensure_key_exists(&key_path)?;

        let record = HostRecord {
            nickname: nickname.to_string(),
            address: fields.address.unwrap_or_else(|| hostname.clone()),
            hostname,
            port: fields.port.unwrap_or(defaults.port),
            user: fields.user.unwrap_or_else(|| defaults.user.clone()),
            key_path,
            keep_alive_interval: fields
                .keep_alive_interval
                .unwrap_or(defaults.keep_alive_interval),
        };
        record.validate()?;
        Ok(record)
    }

    /// Trim text fields and treat blank ones as not given
    fn normalized(self) -> Self {
        Self {
            hostname: non_blank(self.hostname),
            address: non_blank(self.address),
            port: self.port,
            user: non_blank(self.user),
            key_path: non_blank(self.key_path),
            keep_alive_interval: self.keep_alive_interval,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn ensure_key_exists(key_path: &str) -> Result<()> {
    if Path::new(key_path).exists() {
        Ok(())
    } else {
        Err(ManageError::validation(format!("SSH key does not exist: {}", key_path)))
    }
}
