//! Recently applied search tokens, most recent first.

use crate::kernel::services::ports::{RecentTokenStore, SearchToken};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug)]
pub enum RecentTokensError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for RecentTokensError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecentTokensError::Io(e) => write!(f, "IO error: {}", e),
            RecentTokensError::Json(e) => write!(f, "Invalid recent tokens file: {}", e),
        }
    }
}

impl std::error::Error for RecentTokensError {}

impl From<io::Error> for RecentTokensError {
    fn from(e: io::Error) -> Self {
        RecentTokensError::Io(e)
    }
}

impl From<serde_json::Error> for RecentTokensError {
    fn from(e: serde_json::Error) -> Self {
        RecentTokensError::Json(e)
    }
}

fn push_recent(tokens: &mut Vec<SearchToken>, token: SearchToken, limit: usize) {
    tokens.retain(|existing| *existing != token);
    tokens.insert(0, token);
    tokens.truncate(limit);
}

fn lock(tokens: &Mutex<Vec<SearchToken>>) -> MutexGuard<'_, Vec<SearchToken>> {
    match tokens.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub struct MemoryRecentTokens {
    limit: usize,
    tokens: Mutex<Vec<SearchToken>>,
}

impl MemoryRecentTokens {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            tokens: Mutex::new(Vec::new()),
        }
    }
}

impl RecentTokenStore for MemoryRecentTokens {
    fn recent_tokens(&self) -> Vec<SearchToken> {
        lock(&self.tokens).clone()
    }

    fn save_recent_token(&self, token: SearchToken) {
        push_recent(&mut lock(&self.tokens), token, self.limit);
    }
}

/// Recent tokens persisted as a JSON array.
pub struct JsonRecentTokens {
    path: PathBuf,
    limit: usize,
    tokens: Mutex<Vec<SearchToken>>,
}

impl JsonRecentTokens {
    /// Loads `path` if it exists; a missing file starts empty.
    pub fn open(path: impl Into<PathBuf>, limit: usize) -> Result<Self, RecentTokensError> {
        let path = path.into();
        let mut tokens: Vec<SearchToken> = match std::fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        tokens.truncate(limit);
        Ok(Self {
            path,
            limit,
            tokens: Mutex::new(tokens),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, tokens: &[SearchToken]) -> Result<(), RecentTokensError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(tokens)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl RecentTokenStore for JsonRecentTokens {
    fn recent_tokens(&self) -> Vec<SearchToken> {
        lock(&self.tokens).clone()
    }

    fn save_recent_token(&self, token: SearchToken) {
        let tokens = {
            let mut tokens = lock(&self.tokens);
            push_recent(&mut tokens, token, self.limit);
            tokens.clone()
        };
        if let Err(e) = self.persist(&tokens) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to save recent tokens");
        }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/recent.rs"]
mod tests;
