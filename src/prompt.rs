//! Interactive field collection
//!
//! Asks for host fields one line at a time and returns them as `HostFields`.
//! Defaulting and validation stay in `host`; this module only gathers text,
//! so it works against any reader/writer pair (stdin/stdout or in-memory).

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use crate::error::{ManageError, Result};
use crate::host::{Defaults, HostFields, HostRecord};

/// Line-oriented question/answer collector
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompter bound to the terminal
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Questions for a new record
    ///
    /// A blank answer accepts the shown default. Hostname and key path have
    /// no default: a blank answer fails at once instead of asking again.
    pub fn collect_new(&mut self, defaults: &Defaults) -> Result<HostFields> {
        let hostname = self.ask("Hostname(s) or alias(es) of server: ")?;
        if hostname.is_none() {
            return Err(ManageError::validation("hostname or alias is required to continue"));
        }

        let address = self.ask("Hostname or IP address of server (same as hostname): ")?;
        let port =
            self.ask_number(&format!("Port number of server ({}): ", defaults.port), "port")?;
        let user = self.ask(&format!("User on server ({}): ", defaults.user))?;

        let key_path = self.ask("SSH key: ")?;
        if key_path.is_none() {
            return Err(ManageError::validation("SSH key is required"));
        }

        let keep_alive_interval = self.ask_number(
            &format!("Keep-alive interval in seconds ({}): ", defaults.keep_alive_interval),
            "keep-alive interval",
        )?;

        Ok(HostFields {
            hostname,
            address,
            port,
            user,
            key_path,
            keep_alive_interval,
        })
    }

    /// Questions for updating `current`; only non-blank answers are returned
    pub fn collect_patch(&mut self, current: &HostRecord) -> Result<HostFields> {
        let hostname = self.ask(&format!(
            "Hostname(s) or aliases for the server ({}): ",
            current.hostname
        ))?;
        let address = self.ask(&format!(
            "Hostname or IP address of the server ({}): ",
            current.address
        ))?;
        let port = self.ask_number(
            &format!("Port number of the server ({}): ", current.port),
            "port",
        )?;
        let user = self.ask(&format!("User on the server ({}): ", current.user))?;
        let key_path = self.ask(&format!("SSH key ({}): ", current.key_path))?;
        let keep_alive_interval = self.ask_number(
            &format!("Keep-alive interval in seconds ({}): ", current.keep_alive_interval),
            "keep-alive interval",
        )?;

        Ok(HostFields {
            hostname,
            address,
            port,
            user,
            key_path,
            keep_alive_interval,
        })
    }

    /// Print `question`, read one line. Blank input or end of input → `None`.
    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        self.output.write_all(question.as_bytes())?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;

        let answer = line.trim();
        Ok((!answer.is_empty()).then(|| answer.to_string()))
    }

    fn ask_number<T: FromStr>(&mut self, question: &str, field: &str) -> Result<Option<T>> {
        match self.ask(question)? {
            None => Ok(None),
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|_| ManageError::validation(format!("invalid {}: '{}'", field, raw))),
        }
    }

    /// Give back the writer (used by tests to inspect the questions asked)
    pub fn into_output(self) -> W {
        self.output
    }
}
