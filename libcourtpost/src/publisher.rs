//! Single-shot publishing
//!
//! One invocation walks `Start -> CredentialsResolved -> ClientBuilt ->
//! Submitted` and ends in either [`PostResult::Posted`] or
//! [`PostResult::Failed`]. There is at most one submission per call and no
//! retry loop; calling twice posts twice.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::accounts::{self, Account};
use crate::client::{ClientFactory, StatusApi};
use crate::config::DEFAULT_STATUS_URL_BASE;
use crate::credentials::CredentialBundle;
use crate::error::{CourtpostError, FailureKind, Result};

/// Terminal outcome of one publish attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PostResult {
    Posted { id: String, url: String },
    Failed { kind: FailureKind, reason: String },
}

impl PostResult {
    pub fn is_posted(&self) -> bool {
        matches!(self, PostResult::Posted { .. })
    }

    /// 0 when posted, otherwise the failure's exit code
    pub fn exit_code(&self) -> i32 {
        match self {
            PostResult::Posted { .. } => 0,
            PostResult::Failed { kind, .. } => kind.exit_code(),
        }
    }
}

impl From<CourtpostError> for PostResult {
    fn from(error: CourtpostError) -> Self {
        PostResult::Failed {
            kind: error.kind(),
            reason: error.to_string(),
        }
    }
}

/// A post the service acknowledged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub account: Account,
    pub id: String,
    pub url: String,
}

impl From<PublishedPost> for PostResult {
    fn from(post: PublishedPost) -> Self {
        PostResult::Posted {
            id: post.id,
            url: post.url,
        }
    }
}

/// Publishes posts using an injected credential bundle and client factory
pub struct Publisher<F> {
    credentials: CredentialBundle,
    factory: F,
    status_url_base: String,
}

impl<F: ClientFactory> Publisher<F> {
    pub fn new(credentials: CredentialBundle, factory: F) -> Self {
        Self {
            credentials,
            factory,
            status_url_base: DEFAULT_STATUS_URL_BASE.to_string(),
        }
    }

    /// Override the base used to build status URLs
    pub fn with_status_url_base(mut self, base: impl Into<String>) -> Self {
        self.status_url_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Publish `text` as `alias`, folding every failure into the result
    pub async fn publish(&self, alias: &str, text: &str) -> PostResult {
        match self.try_publish(alias, text).await {
            Ok(post) => post.into(),
            Err(e) => {
                warn!(alias, kind = ?e.kind(), "Publish failed: {}", e);
                e.into()
            }
        }
    }

    /// Publish `text` as `alias`
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for empty text
    /// - `UnknownAccount` / `MissingCredential` from credential resolution;
    ///   no request is made in either case
    /// - `Submission` with the service or transport message
    pub async fn try_publish(&self, alias: &str, text: &str) -> Result<PublishedPost> {
        let (account, client) = self.prepare(alias, text)?;

        let created = client.create_post(text).await?;
        debug!(account = %account, id = %created.id, "Submitted");

        let url = self.status_url(account, &created.id);
        info!(account = %account, id = %created.id, url = %url, "Posted");

        Ok(PublishedPost {
            account,
            id: created.id,
            url,
        })
    }

    /// Validate input, resolve credentials and build the client without submitting
    pub fn prepare(&self, alias: &str, text: &str) -> Result<(Account, F::Client)> {
        if text.is_empty() {
            return Err(CourtpostError::InvalidInput(
                "Message text cannot be empty".to_string(),
            ));
        }

        let credentials = accounts::resolve_alias(alias, &self.credentials)?;
        let account = credentials.account();
        debug!(account = %account, "Credentials resolved");

        let client = self.factory.build(credentials)?;
        debug!(account = %account, "Client built");

        Ok((account, client))
    }

    /// `<base>/<alias>/status/<id>`
    pub fn status_url(&self, account: Account, id: &str) -> String {
        format!("{}/{}/status/{}", self.status_url_base, account.alias(), id)
    }
}
