//! Publish California county health datasets to S3 and refresh the joined
//! Athena report.
//!
//! Two independent handlers make up the pipeline:
//!
//! - [`handlers::acquire`] downloads the census population and OSHPD
//!   hospitalization CSVs, scrapes the county income table, and uploads all
//!   three to the acquisition bucket.
//! - [`handlers::report`] runs the county health join on Athena, waits for
//!   it to finish, and renames the result object to a stable key.
//!
//! Both are callable from the `cadata` CLI or from the Lambda entry points
//! in `src/bin/`.

pub mod clouds;
pub mod cmd;
pub mod config;
pub mod handlers;
pub mod wait;

mod common;
mod fetch;
mod income;
mod scrape;
