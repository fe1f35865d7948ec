//! Mock status service for testing
//!
//! A configurable stand-in for the remote service that records every build
//! and submission. It lets tests check call counts (for example that a failed
//! credential lookup never reaches the network) without real credentials.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::accounts::{Account, AccountCredentials};
use crate::client::{ClientFactory, CreatedPost, StatusApi};
use crate::error::{Result, SubmissionError};

/// Configuration for mock service behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Id returned for every successful post
    pub post_id: String,

    /// Error returned instead of posting
    pub post_error: Option<SubmissionError>,

    /// Accounts a client was built for, in order
    pub built_for: Arc<Mutex<Vec<Account>>>,

    /// Number of times create_post has been called
    pub post_call_count: Arc<Mutex<usize>>,

    /// Texts that have been posted (for verification)
    pub posted_content: Arc<Mutex<Vec<String>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            post_id: "1".to_string(),
            post_error: None,
            built_for: Arc::new(Mutex::new(Vec::new())),
            post_call_count: Arc::new(Mutex::new(0)),
            posted_content: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Factory handing out [`MockClient`]s that share one [`MockConfig`]
#[derive(Debug, Clone, Default)]
pub struct MockFactory {
    config: MockConfig,
}

impl MockFactory {
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// Every post succeeds with `post_id`
    pub fn success(post_id: &str) -> Self {
        Self::new(MockConfig {
            post_id: post_id.to_string(),
            ..Default::default()
        })
    }

    /// Every post is rejected by the service with `message`
    pub fn rejecting(message: &str) -> Self {
        Self::failing(SubmissionError::Rejected(message.to_string()))
    }

    /// Every post fails with `error`
    pub fn failing(error: SubmissionError) -> Self {
        Self::new(MockConfig {
            post_error: Some(error),
            ..Default::default()
        })
    }

    /// Number of clients built
    pub fn build_count(&self) -> usize {
        lock(&self.config.built_for).len()
    }

    /// Accounts clients were built for
    pub fn built_for(&self) -> Vec<Account> {
        lock(&self.config.built_for).clone()
    }

    /// Number of submissions across all clients
    pub fn post_call_count(&self) -> usize {
        *lock(&self.config.post_call_count)
    }

    /// All texts that were posted successfully
    pub fn posted_content(&self) -> Vec<String> {
        lock(&self.config.posted_content).clone()
    }
}

impl ClientFactory for MockFactory {
    type Client = MockClient;

    fn build(&self, credentials: AccountCredentials) -> Result<MockClient> {
        credentials.ensure_complete()?;
        lock(&self.config.built_for).push(credentials.account());

        Ok(MockClient {
            config: self.config.clone(),
            credentials,
        })
    }
}

/// Mock handle bound to one account
#[derive(Debug)]
pub struct MockClient {
    config: MockConfig,
    credentials: AccountCredentials,
}

impl MockClient {
    pub fn account(&self) -> Account {
        self.credentials.account()
    }
}

#[async_trait]
impl StatusApi for MockClient {
    async fn create_post(&self, text: &str) -> std::result::Result<CreatedPost, SubmissionError> {
        *lock(&self.config.post_call_count) += 1;

        if let Some(error) = &self.config.post_error {
            return Err(error.clone());
        }

        lock(&self.config.posted_content).push(text.to_string());

        Ok(CreatedPost {
            id: self.config.post_id.clone(),
            text: Some(text.to_string()),
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
