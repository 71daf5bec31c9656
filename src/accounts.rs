//! Account list loading
//!
//! One base58 secret key per line. Blank lines and `#` comments are skipped.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{ClaimError, Result};
use crate::wallet::SecretKey;

const TEMPLATE: &str = "# Format: One private key per line\n# Lines starting with # are comments";

/// Supplies the ordered batch of accounts for a run
pub trait KeySource {
    fn list_accounts(&self) -> Result<Vec<SecretKey>>;
}

/// Newline-delimited accounts file on disk
#[derive(Debug, Clone)]
pub struct AccountsFile {
    path: PathBuf,
}

impl AccountsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file: leave a template behind. Either way there are no accounts.
    fn missing_source(&self) -> ClaimError {
        warn!("{} not found. Creating sample file...", self.path.display());
        let reason = match std::fs::write(&self.path, TEMPLATE) {
            Ok(()) => "file was missing; add your private keys to it".to_string(),
            Err(e) => format!("file was missing and the sample could not be created: {}", e),
        };
        ClaimError::NoAccountsConfigured {
            path: self.path.clone(),
            reason,
        }
    }
}

impl KeySource for AccountsFile {
    fn list_accounts(&self) -> Result<Vec<SecretKey>> {
        if !self.path.exists() {
            return Err(self.missing_source());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|source| ClaimError::Io {
            path: self.path.clone(),
            source,
        })?;

        let accounts = parse_accounts(&content);
        if accounts.is_empty() {
            return Err(ClaimError::NoAccountsConfigured {
                path: self.path.clone(),
                reason: "no private keys found".to_string(),
            });
        }

        info!("Loaded {} accounts from {}", accounts.len(), self.path.display());
        Ok(accounts)
    }
}

pub fn parse_accounts(content: &str) -> Vec<SecretKey> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(SecretKey::new)
        .collect()
}
