//! Downloading source datasets over HTTP.

use crate::common::*;

/// Build the HTTP client used for all downloads.
pub(crate) fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION"),
        ))
        .build()
        .context("could not build HTTP client")
}

/// Fetch `url` and return the response body as text. A non-success status
/// or transport failure is an error; the caller aborts on it.
#[instrument(level = "trace", skip(client))]
pub(crate) async fn fetch_text(client: &reqwest::Client, url: &Url) -> Result<String> {
    debug!("fetching {}", url);
    let response = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("could not GET {}", url))?;
    let response = response
        .error_for_status()
        .with_context(|| format!("error response from {}", url))?;
    response
        .text()
        .await
        .with_context(|| format!("could not read body from {}", url))
}
