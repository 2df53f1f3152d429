//! CLI definitions and command routing.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::{Config, HosteditPaths};
use crate::error::HostsError;
use crate::hosts::HostsEntry;
use crate::platform::{self, HostsFile};
use crate::session::HostsSession;

#[derive(Parser)]
#[command(name = "hostedit")]
#[command(about = "Edit hosts file entries while keeping comments and layout intact")]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List entries, one row per IP/hostname pair
    List {
        /// Print entries as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Edit one row and write the whole table back to the hosts file
    Set {
        /// Row number as shown by `list` (starts at 1)
        row: usize,
        /// New IP address for the row
        #[arg(long)]
        ip: Option<String>,
        /// New hostname for the row
        #[arg(long)]
        hostname: Option<String>,
    },

    /// Print the path of the hosts file being edited
    Path,

    /// Show or change hostedit settings
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },
}

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Print current settings
    Show,
    /// Edit this file instead of the system hosts file
    SetHostsFile { path: PathBuf },
    /// Go back to editing the system hosts file
    ClearHostsFile,
    /// Command used to gain privilege for writes (e.g. "pkexec", "sudo -n")
    SetElevate { command: String },
    /// Whether writes require superuser privilege
    SetPrivilege {
        #[arg(value_enum)]
        mode: PrivilegeMode,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PrivilegeMode {
    /// Escalate with the elevation command when not root
    Require,
    /// Write as the current user
    #[value(name = "none")]
    Unprivileged,
}

/// Run CLI and dispatch to handlers.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    crate::logging::init(cli.verbose);
    let paths = HosteditPaths::default_paths();

    match cli.command {
        Commands::List { json } => cmd_list(&paths, json),
        Commands::Set { row, ip, hostname } => cmd_set(&paths, row, ip, hostname),
        Commands::Path => {
            let config = Config::load(&paths)?;
            let file = platform::default_hosts_file(&config);
            println!("{}", file.path().display());
            Ok(())
        }
        Commands::Config { cmd } => cmd_config(&paths, cmd),
    }
}

fn cmd_list(paths: &HosteditPaths, json: bool) -> Result<()> {
    let config = Config::load(paths)?;
    let file = platform::default_hosts_file(&config);
    let session = open_session(file.as_ref(), &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(session.entries())?);
        return Ok(());
    }
    for (i, entry) in session.entries().iter().enumerate() {
        println!("{}\t{}\t{}", i + 1, entry.ip_address, entry.hostname);
    }
    Ok(())
}

fn cmd_set(
    paths: &HosteditPaths,
    row: usize,
    ip: Option<String>,
    hostname: Option<String>,
) -> Result<()> {
    if ip.is_none() && hostname.is_none() {
        anyhow::bail!("nothing to change; pass --ip and/or --hostname");
    }
    let index = row
        .checked_sub(1)
        .ok_or_else(|| anyhow::anyhow!("rows start at 1"))?;

    let config = Config::load(paths)?;
    let file = platform::default_hosts_file(&config);
    let mut session = open_session(file.as_ref(), &config)?;

    let current = session
        .entries()
        .get(index)
        .cloned()
        .ok_or(HostsError::NoSuchRow {
            row,
            len: session.entries().len(),
        })?;
    let edited = HostsEntry {
        ip_address: ip.unwrap_or(current.ip_address),
        hostname: hostname.unwrap_or(current.hostname),
    };
    if !session.change(index, edited.clone())? {
        println!("Row {row} unchanged");
        return Ok(());
    }

    let summary = match session.persist() {
        Ok(summary) => summary,
        Err(e @ HostsError::Reread { .. }) => {
            return Err(e).context(format!("row {row} was saved"));
        }
        Err(e) => {
            return Err(e).with_context(|| format!("could not update {}", file.path().display()));
        }
    };
    for ip in &summary.unmatched {
        eprintln!(
            "Warning: {ip} has no line in {}; its hostnames were not written.",
            file.path().display()
        );
    }
    println!("Updated row {row}: {}\t{}", edited.ip_address, edited.hostname);
    Ok(())
}

fn open_session<'a>(file: &'a dyn HostsFile, config: &Config) -> Result<HostsSession<'a>> {
    HostsSession::open(file, config.privilege())
        .with_context(|| format!("could not fetch {}", file.path().display()))
}

fn cmd_config(paths: &HosteditPaths, cmd: ConfigCmd) -> Result<()> {
    let mut config = Config::load(paths)?;
    let message = match cmd {
        ConfigCmd::Show => {
            print!("{}", toml::to_string_pretty(&config)?);
            return Ok(());
        }
        ConfigCmd::SetHostsFile { path } => {
            let message = format!("Hosts file: {}", path.display());
            config.hosts_file = Some(path);
            message
        }
        ConfigCmd::ClearHostsFile => {
            config.hosts_file = None;
            format!("Hosts file: {}", platform::system_hosts_path().display())
        }
        ConfigCmd::SetElevate { command } => {
            if command.trim().is_empty() {
                anyhow::bail!("elevation command cannot be empty");
            }
            let message = format!("Elevate with: {command}");
            config.elevate_with = command;
            message
        }
        ConfigCmd::SetPrivilege { mode } => {
            config.require_privilege = matches!(mode, PrivilegeMode::Require);
            format!("Require privilege: {}", config.require_privilege)
        }
    };
    config.save(paths)?;
    println!("{message}");
    Ok(())
}
