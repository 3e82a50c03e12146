//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the global configuration plus the action
//! the binary should run.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use secrecy::SecretString;

use crate::app::default_data_dir;
use crate::cli::actions::{Action, AreaAction};
use crate::cli::commands::{ARG_API_URL, ARG_DATA_DIR, ARG_TIMEOUT};
use crate::cli::globals::GlobalArgs;

/// Map validated CLI matches to globals and an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<(GlobalArgs, Action)> {
    let api_url = matches
        .get_one::<String>(ARG_API_URL)
        .cloned()
        .context("missing required argument: --api-url")?;

    let data_dir = match matches.get_one::<String>(ARG_DATA_DIR) {
        Some(dir) => PathBuf::from(dir),
        None => default_data_dir()?,
    };

    let timeout = Duration::from_secs(matches.get_one::<u64>(ARG_TIMEOUT).copied().unwrap_or(10));

    let globals = GlobalArgs::new(api_url, data_dir, timeout);

    let action = match matches.subcommand() {
        Some(("login", sub)) => Action::Login {
            email: sub
                .get_one::<String>("email")
                .cloned()
                .context("missing required argument: --email")?,
            password: sub
                .get_one::<String>("password")
                .map(|password| SecretString::from(password.clone())),
        },
        Some(("logout", _)) => Action::Logout,
        Some(("whoami", _)) => Action::Whoami,
        Some(("update", sub)) => Action::Update {
            name: sub.get_one::<String>("name").cloned(),
            email: sub.get_one::<String>("email").cloned(),
        },
        Some(("passwd", sub)) => Action::Passwd {
            current: SecretString::from(
                sub.get_one::<String>("current-password")
                    .cloned()
                    .context("missing required argument: --current-password")?,
            ),
            new: SecretString::from(
                sub.get_one::<String>("new-password")
                    .cloned()
                    .context("missing required argument: --new-password")?,
            ),
        },
        Some(("stats", _)) => Action::Stats,
        Some(("area", sub)) => Action::Area(match sub.subcommand() {
            Some(("set", set)) => AreaAction::Set {
                id: set
                    .get_one::<String>("id")
                    .cloned()
                    .context("missing required argument: area id")?,
            },
            Some(("history", _)) => AreaAction::History,
            _ => AreaAction::Show,
        }),
        _ => anyhow::bail!("no subcommand provided"),
    };

    Ok((globals, action))
}
