//! Submitting queries to Athena and waiting for them to finish.
//!
//! Athena accepts a query and writes its result to S3 later. Submission
//! success only means the query was accepted, so callers must wait for a
//! terminal state before touching the result object.

use aws_config::SdkConfig;
use aws_sdk_athena::{
    types::{
        EncryptionConfiguration, EncryptionOption, QueryExecutionContext,
        QueryExecutionState, ResultConfiguration,
    },
    Client,
};

use crate::common::*;
use crate::wait::{wait, WaitOptions, WaitStatus};

/// The query-execution service.
#[derive(Clone, Debug)]
pub struct QueryService {
    client: Client,
}

/// A snapshot of one execution's progress.
#[derive(Clone, Debug)]
struct QueryStatus {
    state: QueryExecutionState,
    reason: Option<String>,
}

impl QueryService {
    /// Create a service client using the shared AWS configuration.
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    /// Submit `query` against `database`, directing results to
    /// `output_location` with SSE-S3 encryption. Returns the execution id
    /// the service assigned. A rejected submission, or a response carrying
    /// no execution id, is an error.
    #[instrument(level = "trace", skip(self, query))]
    pub async fn start_query(
        &self,
        query: &str,
        database: &str,
        output_location: &str,
    ) -> Result<String> {
        trace!("executing SQL against {}: {}", database, query);
        let encryption = EncryptionConfiguration::builder()
            .encryption_option(EncryptionOption::SseS3)
            .build()
            .context("could not configure result encryption")?;
        let response = self
            .client
            .start_query_execution()
            .query_string(query)
            .query_execution_context(
                QueryExecutionContext::builder().database(database).build(),
            )
            .result_configuration(
                ResultConfiguration::builder()
                    .output_location(output_location)
                    .encryption_configuration(encryption)
                    .build(),
            )
            .send()
            .await
            .with_context(|| {
                format!("could not submit query to database {}", database)
            })?;
        response
            .query_execution_id()
            .map(str::to_owned)
            .ok_or_else(|| format_err!("query submission returned no execution id"))
    }

    /// Poll until `execution_id` reaches a terminal state. `SUCCEEDED`
    /// returns `Ok`; `FAILED` and `CANCELLED` report the service's reason;
    /// anything still in flight when `options` runs out of time surfaces as
    /// a timed-out error.
    #[instrument(level = "trace", skip(self, options))]
    pub async fn wait_for_completion(
        &self,
        execution_id: &str,
        options: &WaitOptions,
    ) -> Result<()> {
        wait(options, || async move {
            let status = match self.query_status(execution_id).await {
                Ok(status) => status,
                // Status fetches are reads; a failed one is worth another
                // poll.
                Err(err) => return WaitStatus::FailedTemporarily(err),
            };
            match &status.state {
                QueryExecutionState::Succeeded => WaitStatus::Finished(()),
                QueryExecutionState::Failed | QueryExecutionState::Cancelled => {
                    WaitStatus::FailedPermanently(format_err!(
                        "query execution {} {}: {}",
                        execution_id,
                        status.state.as_str().to_lowercase(),
                        status.reason.as_deref().unwrap_or("no reason given"),
                    ))
                }
                state => WaitStatus::FailedTemporarily(format_err!(
                    "query execution {} still {}",
                    execution_id,
                    state.as_str(),
                )),
            }
        })
        .await
    }

    /// Fetch the current status of `execution_id`.
    async fn query_status(&self, execution_id: &str) -> Result<QueryStatus> {
        let response = self
            .client
            .get_query_execution()
            .query_execution_id(execution_id)
            .send()
            .await
            .with_context(|| {
                format!("could not fetch status of query execution {}", execution_id)
            })?;
        let status = response
            .query_execution()
            .and_then(|execution| execution.status())
            .ok_or_else(|| {
                format_err!("no status reported for query execution {}", execution_id)
            })?;
        let state = status
            .state()
            .ok_or_else(|| {
                format_err!("no state reported for query execution {}", execution_id)
            })?
            .clone();
        Ok(QueryStatus {
            state,
            reason: status.state_change_reason().map(str::to_owned),
        })
    }
}
