#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::utils::error::Result;
use crate::utils::validation::{
    validate_base_url, validate_non_empty_string, validate_positive_number, Validate,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_URL: &str = "https://sandbox.nextgis.com";
pub const DEFAULT_LOGIN: &str = "administrator";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    Direct,
    Resumable,
    #[default]
    Auto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    pub mode: UploadMode,
    pub chunk_size: usize,
    /// Files of at least this many bytes go through the resumable protocol
    /// when `mode` is `auto`.
    pub resumable_threshold: u64,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            mode: UploadMode::Auto,
            chunk_size: 4 * 1024 * 1024,
            resumable_threshold: 16 * 1024 * 1024,
        }
    }
}

/// Everything an `NgwClient` needs to talk to one service instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub url: String,
    pub login: String,
    pub password: String,
    pub timeout_seconds: Option<u64>,
    pub upload: UploadSettings,
}

impl ConnectionConfig {
    pub fn new(url: impl Into<String>, login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            login: login.into(),
            password: password.into(),
            timeout_seconds: None,
            upload: UploadSettings::default(),
        }
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    pub fn with_upload(mut self, upload: UploadSettings) -> Self {
        self.upload = upload;
        self
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL, DEFAULT_LOGIN, "")
    }
}

impl Validate for ConnectionConfig {
    fn validate(&self) -> Result<()> {
        validate_base_url("connection.url", &self.url)?;
        validate_non_empty_string("connection.login", &self.login)?;
        validate_positive_number("upload.chunk_size", self.upload.chunk_size, 1)?;
        if let Some(timeout) = self.timeout_seconds {
            validate_positive_number("connection.timeout_seconds", timeout as usize, 1)?;
        }
        Ok(())
    }
}
