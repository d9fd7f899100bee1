//! Error types for renutil.

use crate::version::VersionParseError;
use std::path::PathBuf;

/// Result type alias using the renutil Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Error codes for categorizing failures, mapped to exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Cache root missing or not read+write accessible
    CacheUnwritable,
    /// Registry file exists but cannot be deserialized
    RegistryUnreadable,
    /// Version string rejected or never released
    InvalidVersion,
    /// Install requested for an already-installed version
    AlreadyInstalled,
    /// Operation requested for a version that is not installed
    NotInstalled,
    /// Download target does not exist upstream
    PackageNotFound,
    /// Release listing could not be fetched
    CatalogUnreachable,
    /// I/O error
    IoError,
    /// Subprocess execution failed
    CommandFailed,
}

/// A fix suggestion for an error.
#[derive(Debug, Clone)]
pub struct Fix {
    /// Description of what this fix does
    pub description: String,
    /// Command to run, if applicable
    pub command: Option<String>,
}

impl Fix {
    /// Create a fix with just a description.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            command: None,
        }
    }

    /// Create a fix with a command.
    pub fn with_command(description: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            command: Some(command.into()),
        }
    }
}

/// Structured error type for renutil.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cache directory is not writable: {path}")]
    CacheUnwritable { path: PathBuf },

    #[error("registry file is unreadable: {path}")]
    RegistryUnreadable {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("invalid version: {input}")]
    InvalidVersion {
        input: String,
        #[source]
        source: Option<VersionParseError>,
    },

    #[error("{version} is already installed")]
    AlreadyInstalled { version: String, fixes: Vec<Fix> },

    #[error("{version} is not installed")]
    NotInstalled { version: String, fixes: Vec<Fix> },

    #[error("package not found: {url}")]
    PackageNotFound { url: String },

    #[error("could not retrieve the release listing")]
    CatalogUnreachable {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("I/O error: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    #[error("command failed: {command}")]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        fixes: Vec<Fix>,
    },

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Get the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::CacheUnwritable { .. } => ErrorCode::CacheUnwritable,
            Error::RegistryUnreadable { .. } => ErrorCode::RegistryUnreadable,
            Error::InvalidVersion { .. } => ErrorCode::InvalidVersion,
            Error::AlreadyInstalled { .. } => ErrorCode::AlreadyInstalled,
            Error::NotInstalled { .. } => ErrorCode::NotInstalled,
            Error::PackageNotFound { .. } => ErrorCode::PackageNotFound,
            Error::CatalogUnreachable { .. } => ErrorCode::CatalogUnreachable,
            Error::Io { .. } | Error::Other(_) => ErrorCode::IoError,
            Error::CommandFailed { .. } => ErrorCode::CommandFailed,
        }
    }

    /// Get suggested fixes for this error.
    pub fn fixes(&self) -> &[Fix] {
        match self {
            Error::AlreadyInstalled { fixes, .. } => fixes,
            Error::NotInstalled { fixes, .. } => fixes,
            Error::CommandFailed { fixes, .. } => fixes,
            _ => &[],
        }
    }

    /// Create an invalid-version error for a string that never parsed.
    pub fn invalid_version(input: impl Into<String>, source: Option<VersionParseError>) -> Self {
        Error::InvalidVersion {
            input: input.into(),
            source,
        }
    }

    /// Create an already-installed error with the standard force hint.
    pub fn already_installed(version: impl std::fmt::Display) -> Self {
        let version = version.to_string();
        Error::AlreadyInstalled {
            fixes: vec![Fix::with_command(
                "Reinstall over the existing copy",
                format!("renutil install {} --force", version),
            )],
            version,
        }
    }

    /// Create a not-installed error with the standard install hint.
    pub fn not_installed(version: impl std::fmt::Display) -> Self {
        let version = version.to_string();
        Error::NotInstalled {
            fixes: vec![Fix::with_command(
                "Install it first",
                format!("renutil install {}", version),
            )],
            version,
        }
    }

    /// Create an I/O error with context.
    pub fn io(message: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            message: message.into(),
            path: Some(path.into()),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::already_installed("7.3.5").code(),
            ErrorCode::AlreadyInstalled
        );
        assert_eq!(
            Error::not_installed("7.3.5").code(),
            ErrorCode::NotInstalled
        );
        assert_eq!(
            Error::invalid_version("x.y.z", None).code(),
            ErrorCode::InvalidVersion
        );
    }

    #[test]
    fn test_already_installed_suggests_force() {
        let err = Error::already_installed("7.3.5");
        let fixes = err.fixes();
        assert_eq!(fixes.len(), 1);
        assert!(fixes[0].command.as_deref().unwrap().contains("--force"));
    }
}
