//! Command implementations.

mod cleanup;
mod install;
mod launch;
mod list;
mod uninstall;

use crate::cli::{Cli, Commands};
use renutil_core::{Error, ExitCode, Result, Version};
use renutil_registry::CacheConfig;
use renutil_ui::{Output, Verbosity};

/// Parse a version argument, mapping bad grammar to the shared error type
/// so every command reports it the same way.
fn parse_version(input: &str) -> Result<Version> {
    input
        .parse()
        .map_err(|e| Error::invalid_version(input, Some(e)))
}

/// Run the CLI command, returning the process exit code.
pub async fn run(cli: Cli) -> i32 {
    let output = Output::with_verbosity(if cli.global.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    });

    let config = match CacheConfig::resolve(cli.global.registry) {
        Ok(config) => config,
        Err(e) => {
            output.print_error(&e);
            return ExitCode::from_error(&e).into();
        }
    };

    let result = match cli.command {
        Commands::List {
            all,
            local: _,
            num_versions,
        } => list::run(&config, all, num_versions, &output).await,
        Commands::Install { version, force } => {
            install::run(&config, &version, force, &output).await
        }
        Commands::Uninstall { version } => uninstall::run(&config, &version, &output),
        Commands::Launch {
            version,
            direct,
            args,
        } => return launch::run(&config, &version, direct, &args, &output).await,
        Commands::Cleanup { version } => cleanup::run(&config, &version, &output),
    };

    match result {
        Ok(()) => ExitCode::Success.into(),
        Err(e) => {
            output.print_error(&e);
            ExitCode::from_error(&e).into()
        }
    }
}
