//! CLI argument parsing.

use clap::{Args, Parser, Subcommand};
use renutil_core::EnvVars;
use std::path::PathBuf;

use crate::styles::STYLES;

/// renutil - Ren'Py SDK version manager
#[derive(Parser, Debug)]
#[command(name = "renutil")]
#[command(author, version, about = "Manage Ren'Py SDK installations")]
#[command(long_about = None)]
#[command(infer_subcommands = true)]
#[command(styles = STYLES)]
#[command(after_help = "Use `renutil help <command>` for more information about a command.")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true, env = EnvVars::RENUTIL_VERBOSE)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = EnvVars::RENUTIL_NO_COLOR)]
    pub no_color: bool,

    /// Path to the cache root directory (default: ~/.renutil)
    #[arg(short, long, global = true, value_name = "PATH", env = EnvVars::RENUTIL_CACHE_DIR)]
    pub registry: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List installed or available versions
    List {
        /// List versions available for download instead of installed ones
        #[arg(short, long, conflicts_with = "local")]
        all: bool,

        /// List installed versions (the default)
        #[arg(short, long)]
        local: bool,

        /// Maximum number of versions to show
        #[arg(short, long, default_value_t = 5)]
        num_versions: usize,
    },

    /// Install a version
    Install {
        /// The version to install, e.g. 7.3.5
        version: String,

        /// Reinstall over an existing copy
        #[arg(short, long)]
        force: bool,
    },

    /// Uninstall a version
    Uninstall {
        /// The version to uninstall
        version: String,
    },

    /// Launch an installed version
    Launch {
        /// The version to launch
        version: String,

        /// Skip the launcher and run the engine entry point directly
        #[arg(short, long)]
        direct: bool,

        /// Arguments to pass to the engine
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Remove transient build output from an installed version
    Cleanup {
        /// The version to clean up
        version: String,
    },
}
