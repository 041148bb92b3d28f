//! API credentials and their optional on-disk copy
//!
//! The credential file is plain JSON holding the API key and the instance URL:
//!
//! ```json
//! {
//!     "api_key": "...",
//!     "instance": "https://photos.example.com/api/"
//! }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// API endpoint and key for one session
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Opaque API key, sent as `x-api-key`
    pub api_key: String,
    /// Base URL of the API, usually `https://<host>/api/`
    pub instance: String,
}

// Keep the key out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("instance", &self.instance)
            .finish()
    }
}

impl Credentials {
    /// Create credentials, trimming surrounding whitespace from pasted values
    pub fn new(instance: impl AsRef<str>, api_key: impl AsRef<str>) -> Self {
        Self {
            api_key: api_key.as_ref().trim().to_string(),
            instance: instance.as_ref().trim().to_string(),
        }
    }

    /// The instance URL as a base every endpoint path can be joined onto
    ///
    /// A missing trailing slash is added, so `https://host/api` and
    /// `https://host/api/` are equivalent.
    pub fn base_url(&self) -> Result<Url> {
        let mut raw = self.instance.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw).map_err(|e| Error::InvalidInstance {
            url: self.instance.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidInstance {
                url: self.instance.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }
        Ok(url)
    }
}

/// Outcome of reading the credential file
#[derive(Debug)]
pub enum StoredCredentials {
    /// File read and parsed
    Found(Credentials),
    /// No file at the configured path
    Missing,
    /// File present but not valid credential JSON
    Unreadable(String),
}

/// Reads and writes the credential file
#[derive(Clone, Debug)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Create a store for the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the credential file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read stored credentials
    ///
    /// A missing or malformed file is not an error; the caller falls back to
    /// manual entry.
    pub fn load(&self) -> StoredCredentials {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return StoredCredentials::Missing;
            }
            Err(e) => return StoredCredentials::Unreadable(e.to_string()),
        };
        match serde_json::from_str(&content) {
            Ok(creds) => StoredCredentials::Found(creds),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "credential file unreadable");
                StoredCredentials::Unreadable(e.to_string())
            }
        }
    }

    /// Write `creds` to the file, replacing any previous content
    pub fn save(&self, creds: &Credentials) -> Result<()> {
        let json = serde_json::to_string_pretty(creds)?;
        std::fs::write(&self.path, json)?;
        tracing::info!(path = %self.path.display(), "saved credentials");
        Ok(())
    }
}
