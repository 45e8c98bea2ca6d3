//! ssh-manage CLI
//!
//! Runs one command against the host store and exits: 0 on success, 1 on
//! any failure.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sshmanage::prompt::Prompter;
use sshmanage::{render, Config, DecodePolicy, HostManager, HostRecord, ManageError, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// ssh-manage
#[derive(Parser, Debug)]
#[command(name = "ssh-manage")]
#[command(about = "Manage SSH host configurations")]
#[command(version)]
struct Args {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, default_value = "error")]
    log: String,

    /// Store directory (defaults to ~/.config/ssh-manage/hosts)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Leave undecodable records out of listings instead of failing
    #[arg(long)]
    skip_corrupt: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a new host record to the datastore
    Add {
        /// Nickname of the record
        name: String,

        /// `<hostname>:<key_path>`; prompts for every field when omitted
        host_info: Option<String>,
    },

    /// Get details about a host record from the datastore
    Get {
        /// Nickname of the record
        name: String,
    },

    /// List all records in the datastore
    List,

    /// Remove a record from the datastore
    Rm {
        /// Nickname of the record
        name: String,
    },

    /// Update a record, prompting for each field
    Update {
        /// Nickname of the record
        name: String,
    },

    /// Write out the SSH configuration file
    Write {
        /// Destination (defaults to ~/.ssh/config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Commands {
    /// Prefix for the error message when the command fails
    fn failure_context(&self) -> &'static str {
        match self {
            Commands::Add { .. } => "failed creating a new record",
            Commands::Get { .. } => "failed fetching record details",
            Commands::List => "failed fetching all records",
            Commands::Rm { .. } => "failed removing record",
            Commands::Update { .. } => "failed updating record",
            Commands::Write { .. } => "failed when writing out SSH configuration file",
        }
    }
}

fn main() {
    let args = Args::parse();

    // Logger lives for exactly this invocation
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log))
        .unwrap_or_else(|_| EnvFilter::new("error"));
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    let code = tracing::subscriber::with_default(subscriber, || {
        let context = args.command.failure_context();
        match run(args) {
            Ok(()) => 0,
            Err(e) => {
                tracing::error!("{}: {}", context, e);
                1
            }
        }
    });

    std::process::exit(code);
}

fn run(args: Args) -> Result<()> {
    let mut config = match Config::discover() {
        Ok(config) => config,
        Err(e) if args.data_dir.is_none() => return Err(e),
        Err(_) => Config::default(),
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if args.skip_corrupt {
        config.decode_policy = DecodePolicy::Skip;
    }

    tracing::debug!(data_dir = %config.data_dir.display(), "opening store");
    let manager = HostManager::open(config)?;

    match args.command {
        Commands::Add { name, host_info } => {
            let name = name.trim();
            let record = match host_info {
                Some(info) => manager.create_positional(name, &info)?,
                None => {
                    let fields = Prompter::stdio().collect_new(&manager.defaults()?)?;
                    manager.create(name, fields)?
                }
            };
            tracing::info!(nickname = %record.nickname, "record stored");
        }
        Commands::Get { name } => {
            let name = name.trim();
            let record = manager.fetch(name)?;
            println!("Configuration for {}", name);
            println!("{}", to_json(&record)?);
        }
        Commands::List => {
            let listing = manager.list_all()?;
            for record in &listing.records {
                println!("{}: {}", record.nickname, to_json(record)?);
            }
            for skipped in &listing.skipped {
                tracing::warn!(
                    identifier = %skipped.identifier,
                    "skipped record: {}",
                    skipped.reason
                );
            }
            println!("Total configuration(s) currently stored: {}", listing.total());
        }
        Commands::Rm { name } => {
            let name = name.trim();
            manager.remove(name)?;
            tracing::info!(nickname = %name, "record removed");
        }
        Commands::Update { name } => {
            let name = name.trim();
            let current = manager.fetch(name)?;
            let patch = Prompter::stdio().collect_patch(&current)?;
            manager.modify(name, patch)?;
            tracing::info!(nickname = %name, "record updated");
        }
        Commands::Write { output } => {
            let target = match output {
                Some(path) => path,
                None => dirs::home_dir()
                    .map(|home| home.join(".ssh").join("config"))
                    .ok_or_else(|| {
                        ManageError::Config("could not detect a valid HOME directory".to_string())
                    })?,
            };
            let listing = manager.list_all()?;
            render::write_config(&target, &listing.records)?;
            println!("Wrote {} host(s) to {}", listing.total(), target.display());
        }
    }

    Ok(())
}

fn to_json(record: &HostRecord) -> Result<String> {
    Ok(String::from_utf8_lossy(&record.encode()?).into_owned())
}
