//! Command parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::common::*;
use crate::config::Configuration;

pub(crate) mod acquire;
pub(crate) mod report;

/// Command-line options.
#[derive(Debug, Parser)]
#[command(
    name = "cadata",
    about = "Publish California county health datasets and refresh the joined report."
)]
pub struct Opt {
    /// Read configuration overrides from this file instead of the default
    /// location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// The command to run.
    #[command(subcommand)]
    cmd: Command,
}

/// The command to run.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Download the source datasets and upload them to the acquisition
    /// bucket.
    Acquire {
        #[command(flatten)]
        command: acquire::Opt,
    },

    /// Run the report query on Athena and rename its output object.
    Report {
        #[command(flatten)]
        command: report::Opt,
    },
}

/// Run the selected command.
pub async fn run(opt: Opt) -> Result<()> {
    let config = match &opt.config {
        Some(path) => Configuration::from_path(path)?,
        None => Configuration::try_default()?,
    };
    match opt.cmd {
        Command::Acquire { command } => acquire::run(config.acquire, command).await,
        Command::Report { command } => report::run(config.report, command).await,
    }
}
