use crate::config::{ConnectionConfig, UploadSettings, DEFAULT_LOGIN, DEFAULT_URL};
use crate::utils::error::{NgwError, Result};
use crate::utils::validation::{validate_required_field, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NgwConfig {
    #[serde(default)]
    pub connection: ConnectionSection,
    #[serde(default)]
    pub upload: UploadSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSection {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_login")]
    pub login: String,
    #[serde(default)]
    pub password: String,
    pub timeout_seconds: Option<u64>,
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_login() -> String {
    DEFAULT_LOGIN.to_string()
}

impl Default for ConnectionSection {
    fn default() -> Self {
        Self {
            url: default_url(),
            login: default_login(),
            password: String::new(),
            timeout_seconds: None,
        }
    }
}

impl NgwConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(NgwError::Io)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| NgwError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value. An unset variable is a
    /// `MissingConfigError` naming it.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| NgwError::ConfigError {
            message: e.to_string(),
        })?;

        let mut values = HashMap::new();
        for caps in re.captures_iter(content) {
            let var_name = caps[1].to_string();
            let value = std::env::var(&var_name).ok();
            let value = validate_required_field(&format!("env.{}", var_name), &value)?.clone();
            values.insert(var_name, value);
        }

        let result = re.replace_all(content, |caps: &regex::Captures| {
            values.get(&caps[1]).cloned().unwrap_or_default()
        });

        Ok(result.to_string())
    }

    pub fn into_connection(self) -> ConnectionConfig {
        ConnectionConfig {
            url: self.connection.url,
            login: self.connection.login,
            password: self.connection.password,
            timeout_seconds: self.connection.timeout_seconds,
            upload: self.upload,
        }
    }
}

impl Validate for NgwConfig {
    fn validate(&self) -> Result<()> {
        self.clone().into_connection().validate()
    }
}
