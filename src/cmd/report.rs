//! The `report` subcommand.

use clap::Args;
use std::time::Duration;

use crate::common::*;
use crate::config::ReportConfig;
use crate::handlers;

/// Report arguments.
#[derive(Debug, Args)]
pub(crate) struct Opt {
    /// Give up if the query has not finished after this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

/// Run the report handler and print its summary as JSON.
pub(crate) async fn run(mut config: ReportConfig, opt: Opt) -> Result<()> {
    if let Some(secs) = opt.timeout_secs {
        config.wait = config.wait.timeout(Duration::from_secs(secs));
    }
    let summary = handlers::report::run(&config).await?;
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}
