//! Application configuration from file and environment variables
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (prefixed with FORUM_, nested keys split by `__`)
//! 2. Config file (config.toml)
//! 3. Default values
//!
//! e.g. `FORUM_MARKUP__ENGINE=bbcode` or
//! `FORUM_PERMISSIONS__DEFAULT_AUTHENTICATED_USER_FORUM_PERMISSIONS=can_see_forum,can_read_forum`

use crate::constants::{CONFIG_ENV_PREFIX, DEFAULT_CONFIG_PATH};
use crate::markup::MarkupEngine;
use crate::permission::{ForumPermission, ForumPermissions};
use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Global application configuration, installed by `init`
static APP_CONFIG: OnceCell<RwLock<AppConfig>> = OnceCell::new();

/// Forum permission configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionsConfig {
    /// Forum permissions any user holds when nobody was explicitly granted them
    pub default_authenticated_user_forum_permissions: Vec<ForumPermission>,
}

impl PermissionsConfig {
    pub fn default_permissions(&self) -> ForumPermissions {
        self.default_authenticated_user_forum_permissions
            .iter()
            .copied()
            .collect()
    }
}

/// Markup validation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    /// Markup language posts are written in: "plain", "bbcode" or "markdown"
    pub engine: MarkupEngine,
    /// Maximum post length once markup is stripped. Unset means unlimited.
    pub max_length: Option<usize>,
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub permissions: PermissionsConfig,
    pub markup: MarkupConfig,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        use config::FileFormat;

        let config = Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Add config file (optional)
            .add_source(File::new(path, FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("permissions.default_authenticated_user_forum_permissions")
                    .try_parsing(true),
            )
            .build()?;

        // Unknown markup engines or permission codenames fail here.
        config.try_deserialize()
    }

    /// Reload configuration from file
    /// On error the previous configuration stays in place.
    pub fn reload() -> Result<(), ConfigError> {
        install(Self::load()?);
        log::info!("Configuration reloaded");
        Ok(())
    }
}

fn install(new_config: AppConfig) {
    let lock = APP_CONFIG.get_or_init(|| RwLock::new(AppConfig::default()));
    match lock.write() {
        Ok(mut config) => *config = new_config,
        Err(_) => log::error!("Configuration lock poisoned"),
    }
}

/// Initialize application configuration
///
/// Should be called early in application startup. An unknown markup engine
/// or permission codename is returned as an error instead of being replaced
/// by defaults.
pub fn init() -> Result<(), ConfigError> {
    init_from_path(DEFAULT_CONFIG_PATH)
}

/// Initialize application configuration from a specific path
pub fn init_from_path(path: &str) -> Result<(), ConfigError> {
    let config = AppConfig::load_from_path(path)?;
    log::info!(
        "Configuration loaded: markup.engine = {:?}, {} default forum permissions",
        config.markup.engine,
        config
            .permissions
            .default_authenticated_user_forum_permissions
            .len()
    );
    install(config);
    Ok(())
}

/// Get the current application configuration
/// Defaults are returned until `init` succeeds.
pub fn get_config() -> AppConfig {
    APP_CONFIG
        .get()
        .and_then(|lock| lock.read().ok().map(|c| c.clone()))
        .unwrap_or_default()
}

/// Get permission configuration
pub fn permissions() -> PermissionsConfig {
    get_config().permissions
}

/// Get markup configuration
pub fn markup() -> MarkupConfig {
    get_config().markup
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut temp_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(temp_file, "{}", contents).unwrap();
        temp_file
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config
            .permissions
            .default_authenticated_user_forum_permissions
            .is_empty());
        assert_eq!(config.markup.engine, MarkupEngine::Plain);
        assert_eq!(config.markup.max_length, None);
    }

    #[test]
    #[serial]
    fn test_load_from_toml_file() {
        let mut temp_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[permissions]
default_authenticated_user_forum_permissions = ["can_see_forum", "can_read_forum", "can_reply_to_topics"]

[markup]
engine = "bbcode"
max_length = 5000
"#
        )
        .unwrap();

        let config = AppConfig::load_from_path(temp_file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.markup.engine, MarkupEngine::BbCode);
        assert_eq!(config.markup.max_length, Some(5000));
        assert_eq!(
            config.permissions.default_permissions(),
            ForumPermissions::VISIBILITY | ForumPermissions::CAN_REPLY_TO_TOPICS
        );
    }

    #[test]
    #[serial]
    fn test_unknown_markup_engine_is_rejected() {
        let mut temp_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[markup]
engine = "textile"
"#
        )
        .unwrap();

        assert!(AppConfig::load_from_path(temp_file.path().to_str().unwrap()).is_err());
    }

    #[test]
    #[serial]
    fn test_unknown_permission_is_rejected() {
        let mut temp_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[permissions]
default_authenticated_user_forum_permissions = ["can_fly"]
"#
        )
        .unwrap();

        assert!(AppConfig::load_from_path(temp_file.path().to_str().unwrap()).is_err());
    }

    #[test]
    #[serial]
    fn test_missing_config_file_uses_defaults() {
        let config = AppConfig::load_from_path("/nonexistent/config.toml").unwrap();
        assert_eq!(config.markup.engine, MarkupEngine::Plain);
        assert!(config.permissions.default_permissions().is_empty());
    }

    #[test]
    #[serial]
    fn test_init_fails_on_unknown_engine_and_keeps_previous_config() {
        let good = write_config("[markup]\nengine = \"markdown\"\nmax_length = 20");
        init_from_path(good.path().to_str().unwrap()).unwrap();
        assert_eq!(markup().engine, MarkupEngine::Markdown);

        let bad = write_config("[markup]\nengine = \"textile\"");
        assert!(init_from_path(bad.path().to_str().unwrap()).is_err());
        assert_eq!(markup().engine, MarkupEngine::Markdown);
        assert_eq!(markup().max_length, Some(20));
    }

    #[test]
    #[serial]
    fn test_init_fails_on_unknown_engine_from_env() {
        std::env::set_var("FORUM_MARKUP__ENGINE", "textile");
        let result = init_from_path("/nonexistent/config.toml");
        std::env::remove_var("FORUM_MARKUP__ENGINE");

        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let file = write_config("[markup]\nengine = \"bbcode\"");
        std::env::set_var("FORUM_MARKUP__ENGINE", "markdown");
        let result = AppConfig::load_from_path(file.path().to_str().unwrap());
        std::env::remove_var("FORUM_MARKUP__ENGINE");

        assert_eq!(result.unwrap().markup.engine, MarkupEngine::Markdown);
    }

    #[test]
    #[serial]
    fn test_unknown_default_permission_fails_init() {
        let bad = write_config(
            "[permissions]\ndefault_authenticated_user_forum_permissions = [\"can_see_forum\", \"can_raed_forum\"]",
        );
        assert!(init_from_path(bad.path().to_str().unwrap()).is_err());
    }
}
