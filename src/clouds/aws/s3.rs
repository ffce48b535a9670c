//! S3 object operations.

use aws_config::SdkConfig;
use aws_sdk_s3::{primitives::ByteStream, Client};

use crate::common::*;

/// The handful of object operations the pipeline needs, with `s3://`
/// context attached to every error.
#[derive(Clone, Debug)]
pub struct ObjectStore {
    client: Client,
}

impl ObjectStore {
    /// Create a store using the shared AWS configuration.
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    /// Upload `body` to `s3://bucket/key`, overwriting any existing object.
    #[instrument(level = "trace", skip(self, body), fields(len = body.len()))]
    pub async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> Result<()> {
        trace!("uploading {} bytes to s3://{}/{}", body.len(), bucket, key);
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .with_context(|| format!("could not upload s3://{}/{}", bucket, key))?;
        Ok(())
    }

    /// Copy `source_key` to `dest_key` within `bucket`.
    #[instrument(level = "trace", skip(self))]
    pub async fn copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        dest_key: &str,
    ) -> Result<()> {
        trace!("copying s3://{}/{} to {}", bucket, source_key, dest_key);
        self.client
            .copy_object()
            .bucket(bucket)
            .copy_source(copy_source(bucket, source_key))
            .key(dest_key)
            .send()
            .await
            .with_context(|| {
                format!("could not copy s3://{}/{} to {}", bucket, source_key, dest_key)
            })?;
        Ok(())
    }

    /// Delete `s3://bucket/key`.
    #[instrument(level = "trace", skip(self))]
    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        trace!("deleting s3://{}/{}", bucket, key);
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("could not delete s3://{}/{}", bucket, key))?;
        Ok(())
    }

    /// Rename `source_key` to `dest_key` within `bucket`. S3 has no rename,
    /// so this is a copy followed by a delete; the copy must land before the
    /// delete runs.
    #[instrument(level = "trace", skip(self))]
    pub async fn rename_object(
        &self,
        bucket: &str,
        source_key: &str,
        dest_key: &str,
    ) -> Result<()> {
        self.copy_object(bucket, source_key, dest_key).await?;
        self.delete_object(bucket, source_key).await?;
        Ok(())
    }
}

/// The `CopySource` form of a bucket and key.
fn copy_source(bucket: &str, key: &str) -> String {
    format!("{}/{}", bucket, key)
}
