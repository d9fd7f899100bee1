//! Output formatting for the renutil CLI.

use crate::style::Style;
use renutil_core::error::{Error, Fix};

/// Verbosity level for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal output
    #[default]
    Normal,
    /// Verbose output
    Verbose,
}

/// Output handler for consistent CLI output.
///
/// Status and diagnostics go to stderr; command results (version lists)
/// go to stdout so they stay scriptable.
#[derive(Debug, Clone, Default)]
pub struct Output {
    verbosity: Verbosity,
}

impl Output {
    /// Create a new output handler with default verbosity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an output handler with specified verbosity.
    pub fn with_verbosity(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    /// Check if verbose output is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbosity >= Verbosity::Verbose
    }

    /// Print a result line to stdout.
    pub fn result(&self, message: &str) {
        println!("{}", message);
    }

    /// Print a status message with a step title.
    pub fn status(&self, action: &str, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{:>12} {}", Style::bold(Style::success(action)), message);
        }
    }

    /// Print an info message.
    pub fn info(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{}", message);
        }
    }

    /// Print a warning message.
    pub fn warn(&self, message: &str) {
        eprintln!("{}: {}", Style::warning("warning"), message);
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        eprintln!("{}: {}", Style::error("error"), message);
    }

    /// Print verbose output (only shown in verbose mode).
    pub fn verbose(&self, message: &str) {
        if self.verbosity >= Verbosity::Verbose {
            eprintln!("{}", Style::dim(message));
        }
    }

    /// Print a structured error with context and fix suggestions.
    pub fn print_error(&self, error: &Error) {
        eprintln!();
        eprintln!("{}: {}", Style::error("error"), error);

        match error {
            Error::Io { path: Some(p), .. } => {
                eprintln!("  {} {}", Style::dim("-->"), p.display());
            }
            Error::CacheUnwritable { path } | Error::RegistryUnreadable { path, .. } => {
                eprintln!("  {} {}", Style::dim("-->"), path.display());
            }
            Error::CommandFailed {
                exit_code, stderr, ..
            } => {
                if let Some(code) = exit_code {
                    eprintln!("  {} {}", Style::dim("exit code:"), code);
                }
                if !stderr.trim().is_empty() {
                    eprintln!("  {} {}", Style::dim("stderr:"), stderr.trim());
                }
            }
            _ => {}
        }

        let fixes = error.fixes();
        if !fixes.is_empty() {
            eprintln!();
            for fix in fixes {
                self.print_fix(fix);
            }
        }
    }

    /// Print a fix suggestion.
    pub fn print_fix(&self, fix: &Fix) {
        if let Some(ref cmd) = fix.command {
            eprintln!(
                "{}: {} `{}`",
                Style::info("fix"),
                fix.description,
                Style::command(cmd)
            );
        } else {
            eprintln!("{}: {}", Style::info("fix"), fix.description);
        }
    }
}
