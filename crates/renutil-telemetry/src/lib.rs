//! Tracing setup for renutil.

use renutil_core::EnvVars;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

/// Initialize the tracing subscriber.
///
/// Filtering follows the RUST_LOG environment variable when set, otherwise
/// the verbose flag picks between debug and warn for renutil targets.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("renutil=debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("renutil=warn"))
    };

    let subscriber = tracing_subscriber::registry().with(filter);

    if std::env::var(EnvVars::RENUTIL_LOG_JSON).is_ok() {
        let json_layer = fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        subscriber.with(json_layer).init();
    } else {
        let fmt_layer = fmt::layer()
            .with_target(false)
            .with_file(false)
            .without_time();

        subscriber.with(fmt_layer).init();
    }
}
