//! Credential source for Courtpost
//!
//! Credentials live in a plain-text secrets file kept outside source control,
//! one `KEY=VALUE` pair per line:
//!
//! ```text
//! # CourtLab app
//! COURTLAB_API_KEY=xvz1evFS4wEEPTGEFPHBog
//! COURTLAB_API_SECRET=kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Each line is split on
//! the first `=` only, so values may themselves contain `=`.
//!
//! # Example
//!
//! ```no_run
//! use libcourtpost::credentials;
//!
//! # fn example() -> libcourtpost::Result<()> {
//! let bundle = credentials::load("~/.config/courtpost/.env.twitter")?;
//! println!("loaded {} credentials", bundle.len());
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::{ConfigError, Result};

/// Immutable mapping from credential key to secret value
///
/// Built once by the entry point and passed down explicitly. Values are held
/// as [`SecretString`] and never appear in `Debug` output.
#[derive(Default)]
pub struct CredentialBundle {
    entries: BTreeMap<String, SecretString>,
}

impl CredentialBundle {
    /// Parse `KEY=VALUE` content
    ///
    /// `source` is only used to label errors.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MalformedLine` for a non-blank, non-comment line
    /// without `=` or with an empty key.
    pub fn parse(content: &str, source: &Path) -> Result<Self> {
        let mut entries = BTreeMap::new();

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let malformed = || ConfigError::MalformedLine {
                path: source.to_path_buf(),
                line: index + 1,
            };

            let (key, value) = line.split_once('=').ok_or_else(malformed)?;
            let key = key.trim();
            if key.is_empty() {
                return Err(malformed().into());
            }

            // Last occurrence wins
            entries.insert(key.to_string(), SecretString::from(value.to_string()));
        }

        Ok(Self { entries })
    }

    /// Build a bundle from in-memory pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let entries = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), SecretString::from(Into::<String>::into(v))))
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&SecretString> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Credential keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for CredentialBundle {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(other.entries.iter())
                .all(|((ka, va), (kb, vb))| ka == kb && va.expose_secret() == vb.expose_secret())
    }
}

impl Eq for CredentialBundle {}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Load a credentials file
///
/// The path is tilde-expanded. Every call reads the file again; nothing is
/// cached.
///
/// # Errors
///
/// - `ConfigError::Read` if the file is missing or unreadable
/// - `ConfigError::MalformedLine` if a line is not `KEY=VALUE`
pub fn load(path: impl AsRef<Path>) -> Result<CredentialBundle> {
    let path = expand_path(path.as_ref());

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;

    let bundle = CredentialBundle::parse(&content, &path)?;
    debug!(path = %path.display(), count = bundle.len(), "Loaded credentials file");
    Ok(bundle)
}

fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).to_string()),
        None => path.to_path_buf(),
    }
}
