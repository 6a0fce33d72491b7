mod cmd;
mod output;
mod prompts;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{InstallerArgs, PinTypeArg};

/// gistget - keep winget packages in sync with a manifest in a GitHub gist
#[derive(Parser)]
#[command(name = "gistget")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Install a package and record it in the manifest
  Install {
    /// Package identifier
    id: String,

    /// Install this version instead of the pinned or latest one
    #[arg(long)]
    version: Option<String>,

    #[command(flatten)]
    installer: InstallerArgs,
  },

  /// Uninstall a package and mark it as uninstalled in the manifest
  Uninstall {
    /// Package identifier
    id: String,

    #[command(flatten)]
    installer: InstallerArgs,
  },

  /// Upgrade a package, moving its pin along if it has one
  Upgrade {
    /// Package identifier
    id: String,

    /// Upgrade to this version instead of the latest one
    #[arg(long)]
    version: Option<String>,

    #[command(flatten)]
    installer: InstallerArgs,
  },

  /// Manage version pins
  Pin {
    #[command(subcommand)]
    action: PinCommands,
  },

  /// Bring this machine in line with a manifest
  Sync {
    /// Read the manifest anonymously from a URL
    #[arg(long, conflicts_with = "file")]
    url: Option<String>,

    /// Read the manifest from a local file
    #[arg(long)]
    file: Option<PathBuf>,

    /// Show what would change without changing anything
    #[arg(long)]
    dry_run: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
  },

  /// Write a manifest of the installed packages
  Export {
    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
  },

  /// Replace the stored manifest with a local file
  Import {
    /// Manifest file to upload
    path: PathBuf,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    force: bool,
  },

  /// Log in to GitHub
  Login,

  /// Remove the stored GitHub credential
  Logout,

  /// Show the logged-in user and configuration
  Status {
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },
}

#[derive(Subcommand)]
enum PinCommands {
  /// Pin a package to a version and record the pin
  Add {
    /// Package identifier
    id: String,

    /// Version or version range to pin to
    #[arg(long)]
    version: String,

    /// Pin type (default: the stored one, else gating)
    #[arg(long, value_enum)]
    pin_type: Option<PinTypeArg>,

    /// Replace an existing pin
    #[arg(short, long)]
    force: bool,
  },

  /// Remove a pin
  Remove {
    /// Package identifier
    id: String,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let code = match cli.command {
    Commands::Install { id, version, installer } => cmd::cmd_install(&id, version, installer.into())?,
    Commands::Uninstall { id, installer } => cmd::cmd_uninstall(&id, installer.into())?,
    Commands::Upgrade { id, version, installer } => cmd::cmd_upgrade(&id, version, installer.into())?,
    Commands::Pin { action } => match action {
      PinCommands::Add {
        id,
        version,
        pin_type,
        force,
      } => cmd::cmd_pin_add(&id, version, pin_type.map(Into::into), force)?,
      PinCommands::Remove { id } => cmd::cmd_pin_remove(&id)?,
    },
    Commands::Sync {
      url,
      file,
      dry_run,
      json,
    } => cmd::cmd_sync(url, file, dry_run, json)?,
    Commands::Export { output } => cmd::cmd_export(output.as_deref())?,
    Commands::Import { path, force } => cmd::cmd_import(&path, force)?,
    Commands::Login => cmd::cmd_login()?,
    Commands::Logout => cmd::cmd_logout()?,
    Commands::Status { json } => cmd::cmd_status(json)?,
  };

  if code != 0 {
    std::process::exit(code);
  }
  Ok(())
}
