//! Account registry
//!
//! The set of accounts is closed: adding one means adding an [`Account`]
//! variant, which forces every `match` over accounts to be revisited.
//! Each account needs four credentials named `<PREFIX><SUFFIX>`, where the
//! suffix comes from [`CredentialRole`].

use std::fmt;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::credentials::CredentialBundle;
use crate::error::{CourtpostError, Result};

/// Accounts this tool can post as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Account {
    /// @CourtLabApp
    Courtlab,
    /// @EstherCourtLab
    Esther,
}

impl Account {
    pub const ALL: [Account; 2] = [Account::Courtlab, Account::Esther];

    /// Alias used on the command line and in status URLs
    pub fn alias(&self) -> &'static str {
        match self {
            Account::Courtlab => "courtlab",
            Account::Esther => "esther",
        }
    }

    /// Prefix of this account's keys in the credentials file
    pub fn credential_prefix(&self) -> &'static str {
        match self {
            Account::Courtlab => "COURTLAB",
            Account::Esther => "ESTHER",
        }
    }

    /// The four credential keys this account needs, in role order
    pub fn requirement(&self) -> CredentialRequirement {
        let prefix = self.credential_prefix();
        CredentialRequirement {
            keys: CredentialRole::ALL.map(|role| (role, format!("{}{}", prefix, role.suffix()))),
        }
    }

    /// Comma-separated aliases, for error and help messages
    pub fn alias_list() -> String {
        Self::ALL
            .iter()
            .map(Account::alias)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias())
    }
}

impl FromStr for Account {
    type Err = CourtpostError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|account| account.alias() == s)
            .ok_or_else(|| CourtpostError::UnknownAccount(s.to_string()))
    }
}

/// Role of a credential in OAuth 1.0a user-context signing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialRole {
    ConsumerKey,
    ConsumerSecret,
    AccessToken,
    AccessSecret,
}

impl CredentialRole {
    pub const ALL: [CredentialRole; 4] = [
        CredentialRole::ConsumerKey,
        CredentialRole::ConsumerSecret,
        CredentialRole::AccessToken,
        CredentialRole::AccessSecret,
    ];

    pub fn suffix(&self) -> &'static str {
        match self {
            CredentialRole::ConsumerKey => "_API_KEY",
            CredentialRole::ConsumerSecret => "_API_SECRET",
            CredentialRole::AccessToken => "_ACCESS_TOKEN",
            CredentialRole::AccessSecret => "_ACCESS_SECRET",
        }
    }
}

/// Ordered `(role, key)` pairs an account must provide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRequirement {
    keys: [(CredentialRole, String); 4],
}

impl CredentialRequirement {
    pub fn keys(&self) -> impl Iterator<Item = (CredentialRole, &str)> {
        self.keys.iter().map(|(role, key)| (*role, key.as_str()))
    }

    pub fn key_for(&self, role: CredentialRole) -> &str {
        self.keys()
            .find(|(r, _)| *r == role)
            .map(|(_, key)| key)
            .unwrap_or_default()
    }
}

/// The four resolved secrets for one account, labelled by role
pub struct AccountCredentials {
    account: Account,
    consumer_key: SecretString,
    consumer_secret: SecretString,
    access_token: SecretString,
    access_secret: SecretString,
}

impl AccountCredentials {
    pub fn account(&self) -> Account {
        self.account
    }

    pub fn get(&self, role: CredentialRole) -> &SecretString {
        match role {
            CredentialRole::ConsumerKey => &self.consumer_key,
            CredentialRole::ConsumerSecret => &self.consumer_secret,
            CredentialRole::AccessToken => &self.access_token,
            CredentialRole::AccessSecret => &self.access_secret,
        }
    }

    pub fn consumer_key(&self) -> &SecretString {
        &self.consumer_key
    }

    pub fn consumer_secret(&self) -> &SecretString {
        &self.consumer_secret
    }

    pub fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    pub fn access_secret(&self) -> &SecretString {
        &self.access_secret
    }

    /// Fail with the key of the first empty secret, if any
    pub fn ensure_complete(&self) -> Result<()> {
        let requirement = self.account.requirement();
        for (role, key) in requirement.keys() {
            if self.get(role).expose_secret().is_empty() {
                return Err(CourtpostError::MissingCredential(key.to_string()));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for AccountCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountCredentials")
            .field("account", &self.account)
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &self.consumer_secret)
            .field("access_token", &self.access_token)
            .field("access_secret", &self.access_secret)
            .finish()
    }
}

/// Pick the credentials `account` needs out of `bundle`
///
/// # Errors
///
/// Returns `CourtpostError::MissingCredential` naming the first required key
/// that is absent or empty. Partial credentials are never returned.
pub fn resolve(account: Account, bundle: &CredentialBundle) -> Result<AccountCredentials> {
    let requirement = account.requirement();

    let fetch = |role: CredentialRole| -> Result<SecretString> {
        let key = requirement.key_for(role);
        match bundle.get(key) {
            Some(value) if !value.expose_secret().is_empty() => {
                Ok(SecretString::from(value.expose_secret().to_string()))
            }
            _ => Err(CourtpostError::MissingCredential(key.to_string())),
        }
    };

    let credentials = AccountCredentials {
        account,
        consumer_key: fetch(CredentialRole::ConsumerKey)?,
        consumer_secret: fetch(CredentialRole::ConsumerSecret)?,
        access_token: fetch(CredentialRole::AccessToken)?,
        access_secret: fetch(CredentialRole::AccessSecret)?,
    };

    debug!(account = %account, "Resolved account credentials");
    Ok(credentials)
}

/// Parse `alias` and resolve its credentials
///
/// An unknown alias fails before the bundle is consulted.
pub fn resolve_alias(alias: &str, bundle: &CredentialBundle) -> Result<AccountCredentials> {
    let account: Account = alias.parse()?;
    resolve(account, bundle)
}
