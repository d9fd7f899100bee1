//! renutil - Ren'Py SDK version manager
//!
//! Installs, launches, and removes SDK releases under a self-contained
//! cache directory.

use clap::Parser;

mod cli;
mod commands;
mod styles;

use cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    renutil_telemetry::init(cli.global.verbose);

    let exit_code = commands::run(cli).await;

    std::process::exit(exit_code);
}
