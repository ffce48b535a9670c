//! Common imports used throughout the crate.

pub(crate) use anyhow::{anyhow as format_err, Context as _, Error, Result};
pub(crate) use tracing::{debug, info, instrument, trace};
pub(crate) use url::Url;
