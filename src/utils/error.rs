use thiserror::Error;

#[derive(Error, Debug)]
pub enum InterpreterError {
    #[error("No source node at '{path}': key '{key}' not found")]
    NotFound { path: String, key: String },

    #[error("Invalid value path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Node '{name}' has no {axis} axis")]
    NotASeries { name: String, axis: String },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration field '{field}' is invalid: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Traversal,
    Source,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl InterpreterError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } | Self::InvalidPath { .. } | Self::NotASeries { .. } => {
                ErrorCategory::Traversal
            }
            Self::Unsupported { .. } | Self::SerializationError(_) => ErrorCategory::Source,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Traversal => ErrorSeverity::Medium,
            ErrorCategory::Source | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::NotFound { path, .. } => format!("Nothing to plot at '{}'", path),
            Self::InvalidPath { path, .. } => format!("'{}' is not a valid value path", path),
            Self::NotASeries { name, axis } => {
                format!("'{}' does not carry a {} series", name, axis)
            }
            Self::SerializationError(_) => "The source file could not be parsed".to_string(),
            Self::IoError(_) => "The source file could not be read".to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Traversal => {
                "Check the path against the ids of the generated model (e.g. nwbfile/acquisition/<series>/time)"
            }
            ErrorCategory::Source => "Make sure the source file is a valid NWB JSON export",
            ErrorCategory::Configuration => "Review the configuration file and command line flags",
            ErrorCategory::System => "Check that the file exists and is readable",
        }
    }
}

pub type Result<T> = std::result::Result<T, InterpreterError>;
