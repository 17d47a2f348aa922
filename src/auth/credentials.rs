use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "ruhcart-client";

/// Optional "remember me" storage for a user's login password, backed by
/// the OS keychain. Lets the host re-authenticate after a session teardown
/// without prompting again.
pub struct CredentialStore {
    username: String,
}

impl CredentialStore {
    pub fn for_user(username: &str) -> Self {
        Self {
            username: username.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(SERVICE_NAME, &self.username).context("Failed to create keyring entry")
    }

    /// Store the password in the OS keychain
    pub fn remember(&self, password: &str) -> Result<()> {
        self.entry()?
            .set_password(password)
            .context("Failed to store password in keychain")
    }

    /// Retrieve the stored password, if any
    pub fn recall(&self) -> Result<String> {
        self.entry()?
            .get_password()
            .context("Failed to retrieve password from keychain")
    }

    /// Remove the stored password
    pub fn forget(&self) -> Result<()> {
        self.entry()?
            .delete_credential()
            .context("Failed to delete credential from keychain")
    }

    pub fn is_remembered(&self) -> bool {
        self.entry().map(|e| e.get_password().is_ok()).unwrap_or(false)
    }
}
