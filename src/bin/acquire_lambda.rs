//! Lambda entry point for the acquisition handler.

use cadata::{config::Configuration, handlers::acquire};
use lambda_runtime::{run, service_fn, tracing, Error, LambdaEvent};
use serde_json::Value;

/// The event payload carries nothing we use; scheduling is the caller's
/// concern.
async fn handler(_event: LambdaEvent<Value>) -> Result<(), Error> {
    let config = Configuration::try_default()?;
    acquire::run(&config.acquire).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();
    run(service_fn(handler)).await
}
