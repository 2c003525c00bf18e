//! Fitbit → Intervals.icu wellness plumbing: config, defensive payload
//! extractors, field-map remapping, and thin clients for both APIs.

use thiserror::Error;

pub mod config;
pub mod extract;
pub mod fitbit;
pub mod intervals;
pub mod remap;
pub mod token_store;

pub use config::{AuthMode, Config};
pub use fitbit::FitbitClient;
pub use intervals::IntervalsClient;
pub use remap::{DailyRecord, FieldMap, build_payload, resolve};
pub use token_store::{CredentialStore, EnvFileStore};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("token refresh error: {0}")]
    TokenRefresh(String),
    #[error("fitbit api error {status}: {body}")]
    VendorApi { status: u16, body: String },
    #[error("intervals api error {status}: {body}")]
    TargetApi { status: u16, body: String },
    #[error("decoding response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("credential store error: {0}")]
    Store(#[from] std::io::Error),
}

/// Truncate an error body so failed responses stay loggable.
pub(crate) fn body_snippet(body: &str) -> String {
    body.chars().take(512).collect()
}
