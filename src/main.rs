//! Publish California county health datasets to S3 and refresh the joined
//! Athena report.

use anyhow::Result;
use cadata::cmd::{self, Opt};
use clap::Parser;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let opt = Opt::parse();
    debug!("{:?}", opt);
    cmd::run(opt).await
}
