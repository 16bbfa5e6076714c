use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuardError {
    #[error("Cannot use --dry-run and --force at the same time")]
    ConflictingFlagsError,

    #[error("Invalid command: '{command}' (expected 'start' or 'stop')")]
    InvalidCommandError { command: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}': '{value}' - {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to parse configuration file {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    #[error("Compose root {path} is not a readable directory")]
    ComposeRootError { path: PathBuf },

    #[error("Failed to read compose file {path}: {source}")]
    ComposeReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse compose file {path}: {source}")]
    ComposeParseError {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Malformed compose file {path}: {message}")]
    MalformedComposeError { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Usage,
    Configuration,
    Discovery,
    System,
}

impl GuardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GuardError::ConflictingFlagsError | GuardError::InvalidCommandError { .. } => {
                ErrorCategory::Usage
            }
            GuardError::ConfigError { .. }
            | GuardError::InvalidConfigValueError { .. }
            | GuardError::ConfigParseError { .. } => ErrorCategory::Configuration,
            GuardError::ComposeRootError { .. }
            | GuardError::ComposeReadError { .. }
            | GuardError::ComposeParseError { .. }
            | GuardError::MalformedComposeError { .. } => ErrorCategory::Discovery,
            GuardError::IoError(_) => ErrorCategory::System,
        }
    }

    /// Process exit code for this error. Usage errors keep their historical
    /// codes (1 for the flag conflict, 2 for an unknown command).
    pub fn exit_code(&self) -> i32 {
        match self {
            GuardError::ConflictingFlagsError => 1,
            GuardError::InvalidCommandError { .. } => 2,
            _ => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            GuardError::ConflictingFlagsError => {
                "Pass either --dry-run or --force, not both".to_string()
            }
            GuardError::InvalidCommandError { .. } => {
                "Use 'start' or 'stop' as the command".to_string()
            }
            GuardError::IoError(_) => "Check file permissions and available disk space".to_string(),
            GuardError::ConfigError { .. }
            | GuardError::InvalidConfigValueError { .. }
            | GuardError::ConfigParseError { .. } => {
                "Check the configuration file and command-line overrides".to_string()
            }
            GuardError::ComposeRootError { .. } => {
                "Point compose.root (or --compose-root) at the directory holding your compose files"
                    .to_string()
            }
            GuardError::ComposeReadError { .. }
            | GuardError::ComposeParseError { .. }
            | GuardError::MalformedComposeError { .. } => {
                "Fix the compose file before retrying; no containers were touched".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Usage => format!("Error: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Discovery => format!("Service discovery failed: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, GuardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors_keep_distinct_exit_codes() {
        assert_eq!(GuardError::ConflictingFlagsError.exit_code(), 1);
        let invalid = GuardError::InvalidCommandError {
            command: "restart".to_string(),
        };
        assert_eq!(invalid.exit_code(), 2);
        assert_eq!(invalid.category(), ErrorCategory::Usage);
    }

    #[test]
    fn test_discovery_errors_are_fatal_with_code_three() {
        let err = GuardError::MalformedComposeError {
            path: PathBuf::from("/srv/compose/a.yml"),
            message: "services is not a mapping".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Discovery);
        assert_eq!(err.exit_code(), 3);
        assert!(err.user_friendly_message().contains("a.yml"));
    }
}
