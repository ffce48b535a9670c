//! The `acquire` subcommand.

use clap::Args;

use crate::common::*;
use crate::config::AcquireConfig;
use crate::handlers;

/// Acquisition arguments.
#[derive(Debug, Args)]
pub(crate) struct Opt {
    /// Upload to this bucket instead of the configured one.
    #[arg(long)]
    bucket: Option<String>,
}

/// Run the acquisition handler.
pub(crate) async fn run(mut config: AcquireConfig, opt: Opt) -> Result<()> {
    if let Some(bucket) = opt.bucket {
        config.bucket = bucket;
    }
    handlers::acquire::run(&config).await
}
