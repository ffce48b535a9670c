//! Lambda entry point for the report handler.

use cadata::{
    config::Configuration,
    handlers::report::{self, ReportSummary},
};
use lambda_runtime::{run, service_fn, tracing, Error, LambdaEvent};
use serde_json::Value;

/// The event payload carries nothing we use; the summary becomes the
/// function's response.
async fn handler(_event: LambdaEvent<Value>) -> Result<ReportSummary, Error> {
    let config = Configuration::try_default()?;
    Ok(report::run(&config.report).await?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();
    run(service_fn(handler)).await
}
