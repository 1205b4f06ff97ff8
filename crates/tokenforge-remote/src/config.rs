use crate::RemoteError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "https://api.figma.com/v1";

/// Environment variable consulted when no token is configured.
pub const TOKEN_ENV_VAR: &str = "TOKENFORGE_API_TOKEN";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn new(file_id: &str) -> Self {
        Self {
            base_url: default_base_url(),
            file_id: file_id.trim().to_owned(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_owned());
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_owned();
        self
    }

    /// Fill in the token from [`TOKEN_ENV_VAR`] when none is configured.
    #[must_use]
    pub fn with_env_token(mut self) -> Self {
        if self.token.is_none() {
            self.token = std::env::var(TOKEN_ENV_VAR)
                .ok()
                .filter(|t| !t.trim().is_empty());
        }
        self
    }

    pub fn validate(&self) -> Result<(), RemoteError> {
        if self.file_id.trim().is_empty() {
            return Err(RemoteError::Config("file_id must not be empty".to_owned()));
        }
        if self.base_url.trim().is_empty() {
            return Err(RemoteError::Config("base_url must not be empty".to_owned()));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, RemoteError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&content)
            .map_err(|e| RemoteError::Config(format!("invalid API config: {e}")))?;
        config.base_url = config.base_url.trim_end_matches('/').to_owned();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), RemoteError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| RemoteError::Serialization(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
