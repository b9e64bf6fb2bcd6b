//! Remote REST Client
//!
//! Delivers queued actions to a Supabase-style REST endpoint: each action is
//! inserted as a row into the table named by its kind.

mod client;

pub use client::{RemoteClient, RemoteConfig};

use thiserror::Error;

/// Errors that can occur when talking to the remote
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Remote is not configured")]
    NotConfigured,

    #[error("Invalid table name: {0}")]
    InvalidTable(String),

    #[error("Remote unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Rate limited")]
    RateLimited,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },
}

impl RemoteError {
    fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RemoteError::Timeout
        } else if e.is_connect() {
            RemoteError::Unavailable
        } else {
            RemoteError::Request(e)
        }
    }
}
