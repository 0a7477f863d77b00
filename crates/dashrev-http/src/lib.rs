//! HTTP backend for dashrev
//!
//! Implements the revision log, diff and restore port of `dashrev-history`
//! against a dashboard server.
//!
//! ## Features
//!
//! - **Configurable**: base URL, timeouts, retries, user-agent, bearer token
//! - **Retry middleware**: exponential backoff for idempotent GETs
//! - **Short-circuits**: no request at all for unsaved documents
//! - **Testing support**: exercised against wiremock servers

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod middleware;

pub use backend::HttpRevisionBackend;
pub use client::HttpClient;
pub use config::HttpConfig;
pub use error::{HttpError, Result};
pub use middleware::{RetryConfig, RetryMiddleware};

/// Re-export commonly used types
pub use reqwest::StatusCode;
