//! The report handler: run the county health join on Athena and give the
//! result object a stable name.

use serde::Serialize;

use crate::clouds::aws::{self, ObjectStore, QueryService};
use crate::common::*;
use crate::config::ReportConfig;

/// What the handler reports on success. Serialized as the Lambda response
/// body, and printed as JSON by the CLI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// HTTP-style status code.
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// Human-readable description naming the report's destination.
    pub body: String,
}

/// Submit the report query, wait for it to finish, and rename its output
/// object from the service-generated `{prefix}/{execution_id}.csv` to the
/// configured report key. A failed submission stops everything before any
/// object is touched.
#[instrument(level = "debug", skip(config), fields(database = %config.database))]
pub async fn run(config: &ReportConfig) -> Result<ReportSummary> {
    let sdk = aws::sdk_config().await;
    let athena = QueryService::new(&sdk);
    let store = ObjectStore::new(&sdk);

    let execution_id = athena
        .start_query(&config.query, &config.database, &config.output_location())
        .await?;
    debug!("submitted query execution {}", execution_id);
    athena.wait_for_completion(&execution_id, &config.wait).await?;

    // Athena names its output after the execution id; give it a readable
    // name instead.
    let report_key = config.report_key();
    store
        .rename_object(&config.bucket, &config.result_key(&execution_id), &report_key)
        .await?;
    info!("renamed query results to s3://{}/{}", config.bucket, report_key);

    Ok(ReportSummary {
        status_code: 200,
        body: format!("successfully renamed: {}/{}", config.bucket, report_key),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn summary_serializes_with_lambda_field_names() {
        let summary = ReportSummary {
            status_code: 200,
            body: "successfully renamed: california-data/output/report.csv"
                .to_owned(),
        };
        assert_eq!(
            serde_json::to_string(&summary).unwrap(),
            r#"{"statusCode":200,"body":"successfully renamed: california-data/output/report.csv"}"#,
        );
    }

    #[test]
    fn summary_body_names_the_destination() {
        let config = ReportConfig::default();
        let body = format!("successfully renamed: {}/{}", config.bucket, config.report_key());
        assert_eq!(
            body,
            "successfully renamed: california-data/output/ca-hospitalization-population-income.csv",
        );
    }
}
