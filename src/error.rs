//! Error types for Handoff
//!
//! All modules use `HandoffResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Handoff operations
pub type HandoffResult<T> = Result<T, HandoffError>;

/// All errors that can occur in Handoff
#[derive(Error, Debug)]
pub enum HandoffError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value for {key}: {reason}")]
    ConfigKey { key: String, reason: String },

    #[error("Configuration file already exists: {0}")]
    ConfigExists(PathBuf),

    // Identity errors
    #[error("Invalid numeric ID in {var}: {value:?}")]
    InvalidId { var: String, value: String },

    #[error("Invalid umask: {0:?}")]
    InvalidUmask(String),

    // Account errors
    #[error("No account tools found on PATH (need groupadd/useradd or addgroup/adduser)")]
    AccountToolsNotFound,

    #[error("{tool} failed with exit code {code}: {stderr}")]
    ToolFailed {
        tool: String,
        code: i32,
        stderr: String,
    },

    #[error("Account not found after setup: {0}")]
    AccountNotFound(String),

    #[error("Malformed {file} entry: {line:?}")]
    AccountEntry { file: String, line: String },

    // Ownership errors
    #[error("Failed to change ownership of {path}: {source}")]
    Chown {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("No command given")]
    NoCommand,

    #[error("Failed to execute {command}: {source}")]
    Exec {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Cache errors
    #[error("Cache operation failed: {0}")]
    CacheOperation(String),

    #[error("Client claim failed: {0}")]
    ClientClaim(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl HandoffError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create an account tool failure
    pub fn tool_failed(tool: impl Into<String>, code: i32, stderr: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            code,
            stderr: stderr.into(),
        }
    }

    /// Create a cache operation error
    pub fn cache(message: impl Into<String>) -> Self {
        Self::CacheOperation(message.into())
    }

    /// Process exit status for this error
    ///
    /// Account tools keep their own status; exec failures use the shell's
    /// 126/127 convention.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ToolFailed { code, .. } => match u8::try_from(*code) {
                Ok(0) | Err(_) => 1,
                Ok(c) => c,
            },
            Self::Exec { source, .. } if source.kind() == std::io::ErrorKind::NotFound => 127,
            Self::Exec { .. } => 126,
            _ => 1,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidId { .. } => Some("PUID and PGID must be non-negative integers"),
            Self::AccountToolsNotFound => {
                Some("Install shadow (groupadd/useradd) or busybox in the image")
            }
            Self::NoCommand => Some("Pass the command after --, e.g. handoff entrypoint -- nginx"),
            Self::ConfigExists(_) => Some("Run: handoff config init --force"),
            _ => None,
        }
    }
}
