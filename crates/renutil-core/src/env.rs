//! Environment variable constants for renutil.
//!
//! Single source of truth for every environment variable renutil reads or
//! sets around subprocess launches.

/// Environment variable names used by renutil.
pub struct EnvVars;

impl EnvVars {
    // ─── Global Settings ─────────────────────────────────────────────────────

    /// Directory holding the registry and installed versions.
    pub const RENUTIL_CACHE_DIR: &'static str = "RENUTIL_CACHE_DIR";

    /// Enable verbose output.
    pub const RENUTIL_VERBOSE: &'static str = "RENUTIL_VERBOSE";

    /// Disable colored output.
    pub const RENUTIL_NO_COLOR: &'static str = "RENUTIL_NO_COLOR";

    /// Enable JSON log output.
    pub const RENUTIL_LOG_JSON: &'static str = "RENUTIL_LOG_JSON";

    // ─── Subprocess Settings ─────────────────────────────────────────────────

    /// Audio driver override so headless launches don't grab a device.
    pub const SDL_AUDIODRIVER: &'static str = "SDL_AUDIODRIVER";

    /// Dynamic library search path for the bundled runtime.
    pub const LD_LIBRARY_PATH: &'static str = "LD_LIBRARY_PATH";

    /// License-acceptance flag consulted by the RAPT install script.
    pub const RAPT_NO_TERMS: &'static str = "RAPT_NO_TERMS";

    // ─── Standard Environment Variables ──────────────────────────────────────

    /// Standard NO_COLOR environment variable.
    pub const NO_COLOR: &'static str = "NO_COLOR";

    /// Standard CLICOLOR environment variable.
    pub const CLICOLOR: &'static str = "CLICOLOR";

    /// CI environment indicator.
    pub const CI: &'static str = "CI";

    /// Standard HOME environment variable.
    pub const HOME: &'static str = "HOME";
}

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    std::env::var(EnvVars::CI).is_ok()
}

/// Check if colors should be disabled based on environment.
pub fn no_color() -> bool {
    std::env::var(EnvVars::NO_COLOR).is_ok()
        || std::env::var(EnvVars::RENUTIL_NO_COLOR).is_ok()
        || std::env::var(EnvVars::CLICOLOR)
            .map(|v| v == "0")
            .unwrap_or(false)
}
