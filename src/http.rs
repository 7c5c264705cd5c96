//! Shared HTTP client configuration.

use crate::error::{Result, TubescribeError};
use std::time::Duration;

/// Default connect timeout for outbound HTTP requests.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Create an HTTP client for the outbound services.
///
/// Only the connect phase is bounded here; whole-call budgets are applied per
/// call by [`crate::cancel::bounded`].
pub fn create_client() -> Result<reqwest::Client> {
    create_client_with_connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
}

/// Create an HTTP client with a custom connect timeout.
pub fn create_client_with_connect_timeout(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(timeout)
        .user_agent(concat!("tubescribe/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| TubescribeError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Join a base URL and a path without doubling or dropping the slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
