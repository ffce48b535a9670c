//! Bounded polling with exponential backoff.

use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;

use crate::common::*;

/// Options controlling how often and for how long [`wait`] polls.
#[derive(Clone, Debug)]
pub struct WaitOptions {
    /// Time to sleep after the first unfinished poll. Doubles after each
    /// subsequent one.
    retry_interval: Duration,
    /// Cap on the doubling interval.
    max_interval: Duration,
    /// Total time to keep polling before giving up.
    timeout: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            retry_interval: Duration::from_secs(2),
            max_interval: Duration::from_secs(30),
            timeout: Duration::from_secs(600),
        }
    }
}

impl WaitOptions {
    /// Set the initial retry interval.
    pub fn retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    /// Set the cap on the doubling interval.
    pub fn max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = max_interval;
        self
    }

    /// Set the total time to keep polling before giving up.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// The outcome of a single poll.
#[derive(Debug)]
pub enum WaitStatus<T> {
    /// The operation finished successfully.
    Finished(T),
    /// Not done yet, or failed in a way worth polling again.
    FailedTemporarily(Error),
    /// Failed for good. Polling again will not help.
    FailedPermanently(Error),
}

/// Poll `f` until it finishes, fails permanently, or `options.timeout`
/// elapses. On timeout, the last temporary error is returned wrapped in an
/// explicit timed-out context.
pub async fn wait<T, F, Fut>(options: &WaitOptions, mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = WaitStatus<T>>,
{
    let started = Instant::now();
    let mut interval = options.retry_interval;

    loop {
        match f().await {
            WaitStatus::Finished(value) => return Ok(value),
            WaitStatus::FailedPermanently(err) => return Err(err),
            WaitStatus::FailedTemporarily(err) => {
                if started.elapsed() + interval > options.timeout {
                    return Err(err.context(format!(
                        "timed out after {:?}",
                        started.elapsed(),
                    )));
                }

                trace!("not finished, polling again in {:?}: {}", interval, err);
                sleep(interval).await;
                interval = interval.saturating_mul(2).min(options.max_interval);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn quick() -> WaitOptions {
        WaitOptions::default()
            .retry_interval(Duration::from_millis(1))
            .max_interval(Duration::from_millis(2))
            .timeout(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn retries_temporary_failures_until_finished() {
        let mut polls = 0;
        let result = wait(&quick(), || {
            polls += 1;
            let done = polls >= 3;
            async move {
                if done {
                    WaitStatus::Finished("done")
                } else {
                    WaitStatus::FailedTemporarily(format_err!("not yet"))
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(result, "done");
        assert_eq!(polls, 3);
    }

    #[tokio::test]
    async fn permanent_failures_stop_polling() {
        let mut polls = 0;
        let result: Result<()> = wait(&quick(), || {
            polls += 1;
            async { WaitStatus::FailedPermanently(format_err!("fatal")) }
        })
        .await;
        assert_eq!(result.unwrap_err().to_string(), "fatal");
        assert_eq!(polls, 1);
    }

    #[tokio::test]
    async fn timeouts_report_an_explicit_error() {
        let options = quick().timeout(Duration::from_millis(5));
        let result: Result<()> = wait(&options, || async {
            WaitStatus::FailedTemporarily(format_err!("still running"))
        })
        .await;
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("timed out after"), "got: {}", message);
        assert!(message.contains("still running"), "got: {}", message);
    }
}
