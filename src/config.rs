//! Configuration for ssh-manage
//!
//! Centralized configuration with sensible defaults, plus discovery of the
//! per-user configuration directory and its optional environment file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ManageError, Result};

/// Name of the application directory under the user's config root
pub const APP_DIR_NAME: &str = "ssh-manage";

/// Optional `KEY=VALUE` file inside the application directory
pub const ENV_FILE_NAME: &str = "ssh-manage.env";

/// Directory under the application directory holding the record tree
pub const HOSTS_DIR_NAME: &str = "hosts";

pub const DEFAULT_PORT: u16 = 22;
pub const DEFAULT_KEEP_ALIVE: u32 = 30;
pub const DEFAULT_CACHE_SIZE: usize = 1024 * 1024; // 1 MiB
pub const DEFAULT_SHARD_WIDTH: usize = 2;

/// Main configuration for an ssh-manage instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory of the record tree
    /// Internal structure:
    ///   {data_dir}/
    ///     └── 3f/a2/.../3fa2...c9   (one JSON file per host record)
    pub data_dir: PathBuf,

    /// Max aggregate bytes held by the in-memory cache
    pub cache_size_limit: usize,

    /// Characters of the identifier consumed per directory level
    pub shard_width: usize,

    // -------------------------------------------------------------------------
    // Record Defaults
    // -------------------------------------------------------------------------
    /// Port used when none is supplied
    pub default_port: u16,

    /// Keep-alive interval (seconds) used when none is supplied
    pub default_keep_alive: u32,

    /// Remote user used when none is supplied; `None` means the local OS user
    pub default_user: Option<String>,

    // -------------------------------------------------------------------------
    // Listing
    // -------------------------------------------------------------------------
    /// What to do with stored entries that fail to decode during a listing
    pub decode_policy: DecodePolicy,
}

/// Listing behavior for undecodable entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// Fail the whole listing on the first bad entry
    #[default]
    Abort,

    /// Leave bad entries out and report them alongside the result
    Skip,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./ssh-manage-data"),
            cache_size_limit: DEFAULT_CACHE_SIZE,
            shard_width: DEFAULT_SHARD_WIDTH,
            default_port: DEFAULT_PORT,
            default_keep_alive: DEFAULT_KEEP_ALIVE,
            default_user: None,
            decode_policy: DecodePolicy::Abort,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Build a config from the user's environment.
    ///
    /// 1. Resolve `$XDG_CONFIG_HOME/ssh-manage` (absolute only) or `~/.config/ssh-manage`
    /// 2. Create the directory if it doesn't exist
    /// 3. Read `ssh-manage.env` if present (process variables win)
    /// 4. Apply `SSH_PORT` / `SSH_KEEPALIVE`
    pub fn discover() -> Result<Self> {
        let app_dir = Self::app_dir()?;
        fs::create_dir_all(&app_dir).map_err(|e| {
            ManageError::Config(format!(
                "could not make configuration directory {}: {}",
                app_dir.display(),
                e
            ))
        })?;

        let env = EnvSource::load(&app_dir.join(ENV_FILE_NAME))?;
        tracing::debug!(dir = %app_dir.display(), "configuration directory");

        Ok(Self::builder()
            .data_dir(app_dir.join(HOSTS_DIR_NAME))
            .default_port(env.port())
            .default_keep_alive(env.keep_alive())
            .build())
    }

    /// The application directory (`.../ssh-manage`), not created
    pub fn app_dir() -> Result<PathBuf> {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            let xdg = PathBuf::from(xdg);
            if xdg.is_absolute() {
                return Ok(xdg.join(APP_DIR_NAME));
            }
        }

        match dirs::home_dir() {
            Some(home) if home.is_absolute() => Ok(home.join(".config").join(APP_DIR_NAME)),
            _ => Err(ManageError::Config(
                "could not detect valid XDG_CONFIG_HOME or HOME environment variables".to_string(),
            )),
        }
    }

    /// Remote user to fall back on: configured value, else the local OS user
    pub fn resolve_user(&self) -> Result<String> {
        if let Some(user) = &self.default_user {
            return Ok(user.clone());
        }
        current_user()
    }
}

/// Name of the user running the process
///
/// Asks the password database first; `$USER`, `$USERNAME` and `$LOGNAME` are
/// only consulted when that lookup has no answer.
pub fn current_user() -> Result<String> {
    if let Some(name) = os_user() {
        return Ok(name);
    }
    ["USER", "USERNAME", "LOGNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|name| !name.trim().is_empty())
        .ok_or_else(|| {
            ManageError::Config("failed getting current user information".to_string())
        })
}

/// Login name of the effective uid, from the password database
#[cfg(unix)]
pub fn os_user() -> Option<String> {
    use std::ffi::CStr;
    use std::mem::MaybeUninit;
    use std::ptr;

    let buf_len = match unsafe { libc::sysconf(libc::_SC_GETPW_R_SIZE_MAX) } {
        n if n > 0 => n as usize,
        _ => 16 * 1024,
    };
    let mut pwd = MaybeUninit::<libc::passwd>::zeroed();
    let mut result: *mut libc::passwd = ptr::null_mut();
    let mut buf = vec![0u8; buf_len];

    let rc = unsafe {
        libc::getpwuid_r(
            libc::geteuid(),
            pwd.as_mut_ptr(),
            buf.as_mut_ptr() as *mut libc::c_char,
            buf.len(),
            &mut result,
        )
    };
    if rc != 0 || result.is_null() {
        tracing::debug!(rc, "no password database entry for the current user");
        return None;
    }

    // pw_name points into `buf`, which is still alive here
    let pwd = unsafe { pwd.assume_init() };
    if pwd.pw_name.is_null() {
        return None;
    }
    let name = unsafe { CStr::from_ptr(pwd.pw_name) }.to_string_lossy().into_owned();
    (!name.is_empty()).then_some(name)
}

#[cfg(not(unix))]
pub fn os_user() -> Option<String> {
    None
}

// =============================================================================
// Environment File
// =============================================================================

/// Process environment layered over the optional env file
#[derive(Debug, Default)]
pub struct EnvSource {
    file: HashMap<String, String>,
}

impl EnvSource {
    /// Load the env file at `path`; a missing file is an empty source
    ///
    /// Lines dotenv cannot parse are skipped with a warning so one bad entry
    /// does not hide the rest of the file.
    pub fn load(path: &Path) -> Result<Self> {
        let lines = match dotenv::from_path_iter(path) {
            Ok(lines) => lines,
            Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => return Err(env_error(path, e)),
        };

        let mut file = HashMap::new();
        for line in lines {
            match line {
                Ok((key, value)) => {
                    file.insert(key, value);
                }
                Err(dotenv::Error::LineParse(line, _)) => {
                    tracing::warn!(
                        path = %path.display(),
                        line = %line,
                        "skipping malformed env line"
                    );
                }
                Err(e) => return Err(env_error(path, e)),
            }
        }
        Ok(Self { file })
    }

    /// Look up a variable, preferring the process environment
    pub fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().or_else(|| self.file.get(key).cloned())
    }

    /// Default port from `SSH_PORT` (or a legacy `SSH-PORT` process variable;
    /// dotenv rejects that key in the file)
    pub fn port(&self) -> u16 {
        let raw = self.get("SSH_PORT").or_else(|| self.get("SSH-PORT"));
        parse_positive(raw.as_deref(), DEFAULT_PORT, "SSH_PORT")
    }

    /// Default keep-alive interval from `SSH_KEEPALIVE`
    pub fn keep_alive(&self) -> u32 {
        parse_positive(self.get("SSH_KEEPALIVE").as_deref(), DEFAULT_KEEP_ALIVE, "SSH_KEEPALIVE")
    }
}

fn env_error(path: &Path, e: dotenv::Error) -> ManageError {
    match e {
        dotenv::Error::Io(e) => ManageError::Io(e),
        other => ManageError::Config(format!("failed reading {}: {}", path.display(), other)),
    }
}

/// Parse a positive number, falling back to `default` on anything else
fn parse_positive<T>(raw: Option<&str>, default: T, name: &str) -> T
where
    T: std::str::FromStr + PartialEq + Default,
{
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(v) if v != T::default() => v,
        _ => {
            tracing::warn!(value = raw, "ignoring invalid {}, using default", name);
            default
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root of the record tree)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the cache byte budget
    pub fn cache_size_limit(mut self, size: usize) -> Self {
        self.config.cache_size_limit = size;
        self
    }

    /// Set the number of identifier characters per directory level
    pub fn shard_width(mut self, width: usize) -> Self {
        self.config.shard_width = width;
        self
    }

    pub fn default_port(mut self, port: u16) -> Self {
        self.config.default_port = port;
        self
    }

    pub fn default_keep_alive(mut self, seconds: u32) -> Self {
        self.config.default_keep_alive = seconds;
        self
    }

    pub fn default_user(mut self, user: impl Into<String>) -> Self {
        self.config.default_user = Some(user.into());
        self
    }

    pub fn decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.config.decode_policy = policy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
