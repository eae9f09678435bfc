//! Helpers shared by the integration suites.
//!
//! The unit-test fixtures live in `src/testsupport.rs` behind `cfg(test)`,
//! which integration tests cannot see, so the file is pulled in by path.

#![allow(dead_code)]

#[path = "../../src/testsupport.rs"]
mod testsupport;

pub use testsupport::*;

use chatwire::api::{ApiClient, RetryPolicy};
use std::time::Duration;

/// Client with millisecond backoff so retry paths finish quickly.
pub fn fast_client() -> ApiClient {
    ApiClient::with_retry_policy(
        Duration::from_secs(5),
        RetryPolicy {
            max_attempts: 4,
            initial_backoff: Duration::from_millis(1),
        },
    )
}
