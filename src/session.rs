//! Bearer/refresh token pair for the REST backend.
//!
//! Tokens are issued by the authentication service; this store only keeps
//! them, hands them to the HTTP gateway, and writes refreshed pairs back to
//! `.pipeline/session.json` when it was loaded from a file.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::errors::BoardError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    path: Option<PathBuf>,
    tokens: Mutex<SessionTokens>,
}

impl SessionStore {
    pub fn in_memory(tokens: SessionTokens) -> Self {
        Self {
            path: None,
            tokens: Mutex::new(tokens),
        }
    }

    /// Load tokens from `path`. A missing file is an empty session.
    pub fn load(path: &Path) -> Result<Self, BoardError> {
        let tokens = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| BoardError::Session {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            serde_json::from_str(&content).map_err(|e| BoardError::Session {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        } else {
            SessionTokens::default()
        };
        Ok(Self {
            path: Some(path.to_path_buf()),
            tokens: Mutex::new(tokens),
        })
    }

    /// File session with `PIPELINE_TOKEN` / `PIPELINE_REFRESH_TOKEN` taking precedence.
    pub fn from_env_or_file(path: &Path) -> Result<Self, BoardError> {
        let store = Self::load(path)?;
        {
            let mut tokens = store.lock();
            if let Ok(token) = std::env::var("PIPELINE_TOKEN") {
                tokens.token = Some(token);
            }
            if let Ok(refresh) = std::env::var("PIPELINE_REFRESH_TOKEN") {
                tokens.refresh_token = Some(refresh);
            }
        }
        Ok(store)
    }

    fn lock(&self) -> MutexGuard<'_, SessionTokens> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.lock().refresh_token.clone()
    }

    pub fn snapshot(&self) -> SessionTokens {
        self.lock().clone()
    }

    /// Store a refreshed pair and persist it.
    pub fn update(&self, token: String, refresh_token: String) -> Result<(), BoardError> {
        let snapshot = {
            let mut tokens = self.lock();
            tokens.token = Some(token);
            tokens.refresh_token = Some(refresh_token);
            tokens.clone()
        };
        self.persist(&snapshot)
    }

    /// Forget both tokens, e.g. after a failed refresh.
    pub fn clear(&self) -> Result<(), BoardError> {
        *self.lock() = SessionTokens::default();
        match &self.path {
            Some(path) if path.exists() => {
                std::fs::remove_file(path).map_err(|e| BoardError::Session {
                    path: path.clone(),
                    message: e.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    fn persist(&self, tokens: &SessionTokens) -> Result<(), BoardError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let to_err = |message: String| BoardError::Session {
            path: path.clone(),
            message,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| to_err(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(tokens).map_err(|e| to_err(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| to_err(e.to_string()))
    }
}
