//! Application-wide constants

/// Config file read at startup. Missing files fall back to defaults.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Prefix for configuration environment variables, e.g. `FORUM_MARKUP__ENGINE`.
pub const CONFIG_ENV_PREFIX: &str = "FORUM";

/// Command line name of the anonymous identity in the audit tool.
/// Grants to guests are stored against this identity rather than a user row.
pub const ANONYMOUS_USERNAME: &str = "anonymous";
