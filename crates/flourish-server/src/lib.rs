//! Rewrite service backend.
//!
//! A small HTTP service exposing `POST /rewrite`: validates the request,
//! renders a style prompt for the configured text-generation provider, and
//! returns the rewritten draft. Error bodies follow the
//! `{ "error": { "code", "message" } }` shape clients rely on.

pub mod config;
pub mod routes;
pub mod server;
pub mod upstream;

pub use config::{ServerConfig, UpstreamConfig};
pub use server::RewriteServer;
