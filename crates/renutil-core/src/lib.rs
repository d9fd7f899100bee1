//! Core types and shared utilities for renutil.
//!
//! This crate provides the semantic-version model, error handling, and
//! subprocess execution utilities used across all renutil crates.

pub mod command;
pub mod env;
pub mod error;
pub mod version;

pub use command::{CommandOutput, CommandRunner};
pub use env::EnvVars;
pub use error::{Error, ErrorCode, Fix, Result};
pub use version::{Identifier, Version, VersionParseError};

/// Exit codes for the renutil CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    GeneralError = 1,
    /// Usage error (bad arguments)
    UsageError = 2,
    /// Cache root missing or unwritable
    CacheError = 3,
    /// Invalid, unknown, or unreachable version
    VersionError = 4,
    /// Install, uninstall, or launch failure
    InstallError = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

impl ExitCode {
    /// Map an error to the exit code its category carries.
    pub fn from_error(error: &Error) -> Self {
        match error.code() {
            ErrorCode::CacheUnwritable => ExitCode::CacheError,
            ErrorCode::InvalidVersion | ErrorCode::CatalogUnreachable => ExitCode::VersionError,
            ErrorCode::AlreadyInstalled
            | ErrorCode::NotInstalled
            | ErrorCode::PackageNotFound
            | ErrorCode::CommandFailed => ExitCode::InstallError,
            ErrorCode::RegistryUnreadable | ErrorCode::IoError => ExitCode::GeneralError,
        }
    }
}
