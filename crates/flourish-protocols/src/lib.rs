//! # Flourish Protocols
//!
//! Shared contracts between the Flourish crates:
//! - the rewrite wire format (`RewriteRequest`, `RewriteResponse`, `ErrorBody`)
//! - the `RewriteService` trait implemented by the HTTP client and test fakes
//! - the error taxonomy (`RewriteError`, `PageError`)

pub mod error;
pub mod rewrite;

pub use error::{PageError, RewriteError};
pub use rewrite::{ErrorBody, ErrorDetail, RewriteRequest, RewriteResponse, RewriteService};
