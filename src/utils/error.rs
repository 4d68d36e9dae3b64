use thiserror::Error;

#[derive(Error, Debug)]
pub enum NgwError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{method} {url} returned {status}: {body}")]
    UnexpectedStatus {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("Precondition failed: {message}")]
    Precondition { message: String },

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("Already exists: {what}")]
    AlreadyExists { what: String },

    #[error("Response is missing field '{field}'")]
    MissingField { field: String },

    #[error("Upload protocol error: {message}")]
    UploadProtocol { message: String },

    #[error("Layer replace interrupted at step '{step}' (old layer {old_id}, new layer {new_id}): {source}")]
    ReplaceInterrupted {
        step: ReplaceStep,
        old_id: u64,
        new_id: u64,
        #[source]
        source: Box<NgwError>,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration '{field}'")]
    MissingConfigError { field: String },
}

/// Steps of the layer-replace workflow that run after the new layer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceStep {
    MoveChildren,
    DeleteOld,
    Rename,
}

impl std::fmt::Display for ReplaceStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReplaceStep::MoveChildren => "move children",
            ReplaceStep::DeleteOld => "delete old layer",
            ReplaceStep::Rename => "rename new layer",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Transport,
    Remote,
    Precondition,
    Local,
}

impl NgwError {
    pub fn precondition(message: impl Into<String>) -> Self {
        NgwError::Precondition {
            message: message.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        NgwError::MissingField {
            field: field.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            NgwError::Http(_) => ErrorCategory::Transport,
            NgwError::Io(_) => ErrorCategory::Local,
            NgwError::Serialization(_)
            | NgwError::UnexpectedStatus { .. }
            | NgwError::MissingField { .. }
            | NgwError::UploadProtocol { .. } => ErrorCategory::Remote,
            NgwError::Precondition { .. }
            | NgwError::NotFound { .. }
            | NgwError::AlreadyExists { .. } => ErrorCategory::Precondition,
            NgwError::ReplaceInterrupted { source, .. } => source.category(),
            NgwError::ConfigError { .. }
            | NgwError::ConfigValidationError { .. }
            | NgwError::InvalidConfigValueError { .. }
            | NgwError::MissingConfigError { .. } => ErrorCategory::Config,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            NgwError::Http(_) => "Check that the service URL is reachable",
            NgwError::Io(_) => "Check the local file path and permissions",
            NgwError::UnexpectedStatus { status: 401, .. }
            | NgwError::UnexpectedStatus { status: 403, .. } => {
                "Check the login and password"
            }
            NgwError::UnexpectedStatus { .. } => "Inspect the response body for the service's reason",
            NgwError::ReplaceInterrupted { .. } => {
                "Both layers may exist now; finish or undo the remaining steps by hand"
            }
            NgwError::ConfigError { .. }
            | NgwError::ConfigValidationError { .. }
            | NgwError::InvalidConfigValueError { .. }
            | NgwError::MissingConfigError { .. } => "Fix the configuration file or flags",
            _ => "Check the arguments of the call",
        }
    }
}

pub type Result<T> = std::result::Result<T, NgwError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_interrupted_takes_source_category() {
        let err = NgwError::ReplaceInterrupted {
            step: ReplaceStep::DeleteOld,
            old_id: 1,
            new_id: 2,
            source: Box::new(NgwError::UnexpectedStatus {
                method: "DELETE".to_string(),
                url: "http://x/api/resource/1".to_string(),
                status: 500,
                body: String::new(),
            }),
        };
        assert_eq!(err.category(), ErrorCategory::Remote);
        assert!(err.to_string().contains("delete old layer"));
    }

    #[test]
    fn test_auth_failures_suggest_credentials() {
        let err = NgwError::UnexpectedStatus {
            method: "GET".to_string(),
            url: "http://x".to_string(),
            status: 401,
            body: String::new(),
        };
        assert_eq!(err.recovery_suggestion(), "Check the login and password");
    }
}
