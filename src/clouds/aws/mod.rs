//! Interfaces to Amazon Web Services.

use aws_config::{BehaviorVersion, SdkConfig};

pub mod athena;
pub mod s3;

pub use athena::QueryService;
pub use s3::ObjectStore;

/// Load shared AWS configuration (region, credential chain) from the
/// environment.
pub async fn sdk_config() -> SdkConfig {
    aws_config::load_defaults(BehaviorVersion::latest()).await
}
