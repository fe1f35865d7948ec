//! Courtpost - post status updates to Twitter / X for the CourtLab accounts
//!
//! This library resolves per-account OAuth credentials from a `KEY=VALUE`
//! secrets file, builds an authenticated client for the selected account and
//! submits a single post, reporting the outcome as a [`PostResult`].

pub mod accounts;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod oauth;
pub mod publisher;

// Mock service is available for all builds (not just tests) to support integration tests
pub mod mock;

// Re-export commonly used types
pub use accounts::{Account, AccountCredentials, CredentialRole};
pub use client::{ClientFactory, CreatedPost, StatusApi, TwitterClient, TwitterClientFactory};
pub use config::Config;
pub use credentials::CredentialBundle;
pub use error::{ConfigError, CourtpostError, FailureKind, Result, SubmissionError};
pub use publisher::{PostResult, PublishedPost, Publisher};
