mod export;
mod import;
mod install;
mod login;
mod logout;
mod pin;
mod status;
mod sync;
mod uninstall;
mod upgrade;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tokio::runtime::Runtime;
use tracing::debug;

use gistget_lib::auth::{CredentialGate, DeviceCode, DeviceFlowLogin, FileCredentialStore};
use gistget_lib::config::Config;
use gistget_lib::manifest::{InstallerAttrs, PinType};
use gistget_lib::mutate::MutationOutcome;
use gistget_lib::store::GistStore;
use gistget_lib::winget::WingetCli;

use crate::output::{print_error, print_success, print_warning};

pub use export::cmd_export;
pub use import::cmd_import;
pub use install::cmd_install;
pub use login::cmd_login;
pub use logout::cmd_logout;
pub use pin::{cmd_pin_add, cmd_pin_remove};
pub use status::cmd_status;
pub use sync::cmd_sync;
pub use uninstall::cmd_uninstall;
pub use upgrade::cmd_upgrade;

/// Installer options passed through to winget and recorded in the manifest.
#[derive(Args, Debug, Default)]
pub struct InstallerArgs {
  /// Install scope (user or machine)
  #[arg(long)]
  scope: Option<String>,

  /// Architecture to install
  #[arg(long)]
  architecture: Option<String>,

  /// Install location
  #[arg(long)]
  location: Option<String>,

  /// Installer locale
  #[arg(long)]
  locale: Option<String>,

  /// Installer type
  #[arg(long)]
  installer_type: Option<String>,

  /// Installer log file
  #[arg(long)]
  log: Option<String>,

  /// Replace the installer arguments
  #[arg(long = "override")]
  override_args: Option<String>,

  /// Extra installer arguments
  #[arg(long)]
  custom: Option<String>,

  /// Custom HTTP header for REST sources
  #[arg(long)]
  header: Option<String>,

  /// Request a silent install
  #[arg(long, conflicts_with = "interactive")]
  silent: bool,

  /// Request an interactive install
  #[arg(long)]
  interactive: bool,

  /// Force the operation
  #[arg(long)]
  force: bool,

  /// Skip dependencies
  #[arg(long)]
  skip_dependencies: bool,

  /// Ignore installer hash mismatches
  #[arg(long)]
  allow_hash_mismatch: bool,
}

impl From<InstallerArgs> for InstallerAttrs {
  fn from(args: InstallerArgs) -> Self {
    // unset flags stay undeclared so they never override stored values
    let flag = |set: bool| set.then_some(true);
    InstallerAttrs {
      scope: args.scope,
      architecture: args.architecture,
      location: args.location,
      locale: args.locale,
      installer_type: args.installer_type,
      log: args.log,
      override_args: args.override_args,
      custom: args.custom,
      header: args.header,
      silent: flag(args.silent),
      interactive: flag(args.interactive),
      force: flag(args.force),
      skip_dependencies: flag(args.skip_dependencies),
      allow_hash_mismatch: flag(args.allow_hash_mismatch),
    }
  }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PinTypeArg {
  Blocking,
  Gating,
}

impl From<PinTypeArg> for PinType {
  fn from(arg: PinTypeArg) -> Self {
    match arg {
      PinTypeArg::Blocking => PinType::Blocking,
      PinTypeArg::Gating => PinType::Gating,
    }
  }
}

pub(crate) type Gate = CredentialGate<FileCredentialStore, DeviceFlowLogin>;

/// Everything a command needs to talk to GitHub and winget.
pub(crate) struct Services {
  pub config: Config,
  pub gate: Gate,
  pub store: GistStore,
  pub driver: WingetCli,
}

impl Services {
  pub fn from_env() -> Result<Self> {
    let config = Config::from_env();
    debug!(
      api_url = %config.api_url,
      winget = %config.winget,
      credentials = %config.credentials_path.display(),
      "loaded configuration"
    );
    let login = DeviceFlowLogin::new(&config, show_device_code).context("Failed to set up GitHub login")?;
    let gate = CredentialGate::new(FileCredentialStore::new(config.credentials_path.clone()), login);
    let store = GistStore::new(&config).context("Failed to set up GitHub client")?;
    let driver = WingetCli::from_config(&config);

    Ok(Self {
      config,
      gate,
      store,
      driver,
    })
  }
}

fn show_device_code(code: &DeviceCode) {
  eprintln!();
  eprintln!("To log in, open {} and enter the code {}", code.verification_uri, code.user_code);
  eprintln!();
}

pub(crate) fn runtime() -> Result<Runtime> {
  Runtime::new().context("Failed to create async runtime")
}

/// Print a mutation outcome and return the process exit code.
///
/// `action` names the operation ("install"), `done` describes it finished
/// ("Installed").
pub(crate) fn report_outcome(action: &str, done: &str, id: &str, outcome: &MutationOutcome) -> i32 {
  for warning in &outcome.warnings {
    print_warning(warning);
  }

  if !outcome.is_success() {
    print_error(&format!(
      "{} of {} failed with exit code {}, manifest unchanged",
      action, id, outcome.exit_code
    ));
    return outcome.exit_code;
  }

  if outcome.manifest_written {
    print_success(&format!("{} {}, manifest updated", done, id));
  } else {
    print_success(&format!("{} {}", done, id));
  }
  0
}
