//! Durable storage for the credential record (`token` + `user`).
//!
//! The record is a cache consulted once at startup; the server stays the
//! source of truth. Both keys are always written and removed together.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::User;

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Keychain service and account for the keyring backend
const SERVICE_NAME: &str = "talentdesk";
const KEYRING_ACCOUNT: &str = "session";

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// The durable counterpart of an authenticated session.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedCredentials {
    pub token: String,
    pub user: User,
}

/// On-disk layout: string keys to string values, user as JSON text.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<String>,
}

impl StoredRecord {
    fn from_credentials(creds: &PersistedCredentials) -> Result<Self> {
        let user = serde_json::to_string(&creds.user).context("Failed to serialize user record")?;
        Ok(Self {
            token: Some(creds.token.clone()),
            user: Some(user),
        })
    }

    /// Both keys present and the user parses, or `None`.
    fn into_credentials(self) -> Option<PersistedCredentials> {
        match (self.token, self.user) {
            (Some(token), Some(user)) if !token.is_empty() => match serde_json::from_str(&user) {
                Ok(user) => Some(PersistedCredentials { token, user }),
                Err(e) => {
                    warn!(error = %e, "Stored user record is malformed");
                    None
                }
            },
            (None, None) => None,
            _ => {
                warn!("Stored credential record is incomplete");
                None
            }
        }
    }
}

pub trait CredentialStore: Send + Sync {
    /// Load the stored pair. An incomplete or malformed record is cleared
    /// and reported as absent.
    fn load(&self) -> Result<Option<PersistedCredentials>>;

    fn save(&self, credentials: &PersistedCredentials) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// `session.json` in the cache directory.
pub struct FileCredentialStore {
    cache_dir: PathBuf,
}

impl FileCredentialStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<PersistedCredentials>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path).context("Failed to read session file")?;
        let record = serde_json::from_str::<StoredRecord>(&contents).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to parse session file");
            StoredRecord::default()
        });

        let credentials = record.into_credentials();
        if credentials.is_none() {
            self.clear()?;
        }
        Ok(credentials)
    }

    fn save(&self, credentials: &PersistedCredentials) -> Result<()> {
        let path = self.session_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create cache directory")?;
        }
        let record = StoredRecord::from_credentials(credentials)?;
        let contents = serde_json::to_string_pretty(&record)?;

        // Both keys land in one rename.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).context("Failed to write session file")?;
        std::fs::rename(&tmp, &path).context("Failed to replace session file")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove session file")?;
        }
        Ok(())
    }
}

/// One OS keychain entry holding the same JSON record.
pub struct KeyringCredentialStore {
    account: String,
}

impl KeyringCredentialStore {
    pub fn new() -> Self {
        Self {
            account: KEYRING_ACCOUNT.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(SERVICE_NAME, &self.account).context("Failed to create keyring entry")
    }
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn load(&self) -> Result<Option<PersistedCredentials>> {
        let entry = self.entry()?;
        let contents = match entry.get_password() {
            Ok(contents) => contents,
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(e) => return Err(anyhow!(e).context("Failed to read session from keychain")),
        };

        let record = serde_json::from_str::<StoredRecord>(&contents).unwrap_or_default();
        let credentials = record.into_credentials();
        if credentials.is_none() {
            self.clear()?;
        }
        Ok(credentials)
    }

    fn save(&self, credentials: &PersistedCredentials) -> Result<()> {
        let record = StoredRecord::from_credentials(credentials)?;
        let contents = serde_json::to_string(&record)?;
        self.entry()?
            .set_password(&contents)
            .context("Failed to store session in keychain")
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(anyhow!(e).context("Failed to delete session from keychain")),
        }
    }
}

/// In-process key/value store. Used by tests and hosts that must not
/// touch the disk.
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value under `key`, for inspecting the stored layout.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().ok()?.get(key).cloned()
    }

    /// Write one raw key, bypassing the paired write. Lets tests build
    /// the partial records `load` must reject.
    pub fn insert_raw(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lock().map(|e| e.is_empty()).unwrap_or(true)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow!("credential store lock poisoned"))
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<PersistedCredentials>> {
        let record = {
            let entries = self.lock()?;
            StoredRecord {
                token: entries.get(TOKEN_KEY).cloned(),
                user: entries.get(USER_KEY).cloned(),
            }
        };
        let credentials = record.into_credentials();
        if credentials.is_none() {
            self.clear()?;
        }
        Ok(credentials)
    }

    fn save(&self, credentials: &PersistedCredentials) -> Result<()> {
        let record = StoredRecord::from_credentials(credentials)?;
        let mut entries = self.lock()?;
        if let (Some(token), Some(user)) = (record.token, record.user) {
            entries.insert(TOKEN_KEY.to_string(), token);
            entries.insert(USER_KEY.to_string(), user);
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut entries = self.lock()?;
        entries.remove(TOKEN_KEY);
        entries.remove(USER_KEY);
        Ok(())
    }
}
