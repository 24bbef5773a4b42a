//! Network resilience utilities for the request executor.

mod retry;

pub use retry::{retry_transient, RetryConfig};
