//! The acquisition handler: download public datasets and publish them to
//! S3.

use crate::clouds::aws::{self, ObjectStore};
use crate::common::*;
use crate::config::AcquireConfig;
use crate::{fetch, income, scrape};

/// Download every configured dataset plus the scraped income table, and
/// upload each to the acquisition bucket. Any failure aborts the remaining
/// work; objects already uploaded stay in place.
#[instrument(level = "debug", skip(config), fields(bucket = %config.bucket))]
pub async fn run(config: &AcquireConfig) -> Result<()> {
    let http = fetch::http_client()?;
    let store = ObjectStore::new(&aws::sdk_config().await);

    upload_sources(&http, &store, config).await?;
    upload_income_table(&http, &store, config).await?;
    Ok(())
}

/// Fetch each source URL and store its body under the configured key,
/// byte-for-byte.
async fn upload_sources(
    http: &reqwest::Client,
    store: &ObjectStore,
    config: &AcquireConfig,
) -> Result<()> {
    for source in &config.sources {
        let text = fetch::fetch_text(http, &source.url).await?;
        store
            .put_object(&config.bucket, &source.key, text.into_bytes())
            .await?;
        info!("uploaded s3://{}/{}", config.bucket, source.key);
    }
    Ok(())
}

/// Scrape the income page, normalize its table, and store the result as
/// CSV.
async fn upload_income_table(
    http: &reqwest::Client,
    store: &ObjectStore,
    config: &AcquireConfig,
) -> Result<()> {
    let html = fetch::fetch_text(http, &config.income.url).await?;
    let tables = scrape::parse_tables(&html);
    let table = scrape::find_table(&tables, income::COLUMN_COUNT, income::HEADER_FRAGMENT)
        .with_context(|| format!("no income table at {}", config.income.url))?;
    let records = income::normalize(table)?;
    store
        .put_object(&config.bucket, &config.income.key, income::to_csv(&records)?)
        .await?;
    info!("uploaded s3://{}/{}", config.bucket, config.income.key);
    Ok(())
}
