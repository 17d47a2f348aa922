use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session file name in the cache directory
const SESSION_FILE: &str = "session.json";

/// The credential pair issued at login.
///
/// The access token authorizes API calls and is replaced in place by every
/// successful refresh; the refresh token is used solely to obtain new access
/// tokens and lives until logout or an unrecoverable refresh failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub tokens: TokenPair,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(tokens: TokenPair, username: &str) -> Self {
        Self {
            tokens,
            username: username.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Persistent session storage, surviving process restarts.
///
/// Created at login, rewritten on every refresh, removed on teardown.
pub struct Session {
    cache_dir: PathBuf,
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            data: None,
        }
    }

    /// Load session from disk. Returns true if a session was found.
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if path.exists() {
            let contents =
                std::fs::read_to_string(&path).context("Failed to read session file")?;
            let data: SessionData =
                serde_json::from_str(&contents).context("Failed to parse session file")?;
            self.data = Some(data);
            return Ok(true);
        }
        Ok(false)
    }

    /// Save session to disk
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            std::fs::write(path, contents)?;
        }
        Ok(())
    }

    /// Clear session data and remove the file
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Replace the session with freshly issued credentials
    pub fn update(&mut self, data: SessionData) {
        self.data = Some(data);
    }

    /// Swap in a new access token after a successful refresh, keeping the
    /// refresh token unless the server rotated it too.
    pub fn update_access(&mut self, access: &str, refresh: Option<&str>) {
        if let Some(ref mut data) = self.data {
            data.tokens.access = access.to_string();
            if let Some(refresh) = refresh {
                data.tokens.refresh = refresh.to_string();
            }
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.tokens.access.as_str())
    }

    /// The stored refresh credential. An empty string counts as absent:
    /// there is nothing to present to the refresh endpoint.
    pub fn refresh_token(&self) -> Option<&str> {
        self.data
            .as_ref()
            .map(|d| d.tokens.refresh.as_str())
            .filter(|t| !t.is_empty())
    }

    pub fn username(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.username.as_str())
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}
