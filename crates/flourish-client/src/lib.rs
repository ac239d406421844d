//! HTTP client for the rewrite service.
//!
//! Wraps `POST /rewrite` behind the [`RewriteService`] trait with a
//! per-request deadline and one bounded retry for transient failures.
//!
//! [`RewriteService`]: flourish_protocols::rewrite::RewriteService

mod client;

pub use client::{MAX_ATTEMPTS, REQUEST_TIMEOUT_SECS, RETRY_DELAY_MS, RewriteClient};
