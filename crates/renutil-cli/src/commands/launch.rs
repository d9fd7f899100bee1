//! Launch command implementation.

use super::parse_version;
use renutil_core::ExitCode;
use renutil_registry::CacheConfig;
use renutil_ui::Output;

/// Run the launch command, forwarding the child's exit code.
pub async fn run(
    config: &CacheConfig,
    version: &str,
    direct: bool,
    args: &[String],
    output: &Output,
) -> i32 {
    let version = match parse_version(version) {
        Ok(v) => v,
        Err(e) => {
            output.print_error(&e);
            return ExitCode::from_error(&e).into();
        }
    };

    match renutil_install::launch(config, &version, direct, args).await {
        Ok(code) => code,
        Err(e) => {
            output.print_error(&e);
            ExitCode::from_error(&e).into()
        }
    }
}
