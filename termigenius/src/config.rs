//! Manage the app configuration by creating, loading and modifying the
//! settings file

use std::{
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use serde_derive::{Deserialize, Serialize};
use termigenius_core::SafetyLevel;
use tracing::{debug, warn};

use crate::{env::Environment, history::History, Error, Result};

const DEFAULT_SETTING_FILE_NAME: &str = "settings.yaml";
const HISTORY_FILE_NAME: &str = "history.jsonl";

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Environment variable overriding the configured safety level
pub const SAFETY_LEVEL_ENV: &str = "TERMIGENIUS_SAFETY_LEVEL";

/// describe configuration folder
#[derive(Debug, Clone)]
pub struct Config {
    /// Configuration folder path.
    pub root_folder: PathBuf,
    /// config file.
    pub setting_file_path: PathBuf,
}

/// Describe the configuration yaml
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// AI provider name. Only `gemini` is supported.
    pub ai_provider: String,
    /// Model used for generation
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
    pub safety_level: SafetyLevel,
    /// Run generated commands without asking for confirmation
    pub auto_confirm: bool,
    pub history_enabled: bool,
    /// Oldest history entries are pruned beyond this count
    pub max_history: usize,
    /// Command execution timeout in seconds
    pub timeout_secs: u64,
    /// AI request timeout in milliseconds
    pub llm_timeout_ms: u64,
    pub use_colors: bool,
    /// Log at `debug` unless `--log` or `RUST_LOG` say otherwise
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ai_provider: "gemini".into(),
            model: "gemini-2.5-flash".into(),
            gemini_api_key: None,
            safety_level: SafetyLevel::Medium,
            auto_confirm: false,
            history_enabled: true,
            max_history: 100,
            timeout_secs: 30,
            llm_timeout_ms: 30_000,
            use_colors: true,
            verbose: false,
        }
    }
}

impl Settings {
    /// Apply environment variable overrides on top of the file settings.
    ///
    /// An invalid safety level in the environment is ignored with a warning.
    #[must_use]
    pub fn with_env_overrides(mut self, env: &dyn Environment) -> Self {
        if let Some(key) = env.var(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            debug!("using API key from {API_KEY_ENV}");
            self.gemini_api_key = Some(key);
        }
        if let Some(level) = env.var(SAFETY_LEVEL_ENV) {
            match level.parse::<SafetyLevel>() {
                Ok(level) => self.safety_level = level,
                Err(err) => warn!(error = %err, "ignoring {SAFETY_LEVEL_ENV}"),
            }
        }
        self
    }

    /// Log level used when neither `--log` nor `RUST_LOG` is given.
    #[must_use]
    pub const fn default_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// API key with surrounding whitespace removed, if set.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// How to treat the current settings file on reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    Override,
    Backup,
}

impl Config {
    /// Get application setting config.
    ///
    /// # Errors
    ///
    /// Will return `Err` error return on load/save config
    pub fn new(path: Option<&str>) -> Result<Self> {
        let package_name = env!("CARGO_PKG_NAME");

        let config_folder = match path {
            Some(p) => PathBuf::from(p),
            None => match dirs::home_dir() {
                Some(p) => {
                    // $HOME/.termigenius wins when it exists, otherwise the
                    // platform config dir is used
                    let homedir = p.join(format!(".{package_name}"));
                    let conf_dir = dirs::config_dir().unwrap_or_else(|| homedir.clone());
                    if homedir.is_dir() {
                        homedir
                    } else {
                        conf_dir.join(package_name)
                    }
                }
                None => return Err(Error::Config("could not get directory path".into())),
            },
        };

        let setting_config = Self {
            setting_file_path: config_folder.join(DEFAULT_SETTING_FILE_NAME),
            root_folder: config_folder,
        };

        setting_config.create_config_folder()?;
        setting_config.manage_setting_file()?;
        debug!(configuration = ?setting_config, "configuration settings loaded");
        Ok(setting_config)
    }

    /// Path of the command history file.
    #[must_use]
    pub fn history_path(&self) -> PathBuf {
        self.root_folder.join(HISTORY_FILE_NAME)
    }

    /// Command history configured by `settings`.
    #[must_use]
    pub fn history(&self, settings: &Settings) -> History {
        History::new(
            self.history_path(),
            settings.history_enabled,
            settings.max_history,
        )
    }

    /// Convert user settings yaml to struct.
    ///
    /// # Errors
    ///
    /// Will return `Err` has an error when loading the config file
    pub fn get_settings_from_file(&self) -> Result<Settings> {
        Ok(serde_yaml::from_str(&fs::read_to_string(
            &self.setting_file_path,
        )?)?)
    }

    /// Settings from file with environment overrides applied.
    ///
    /// # Errors
    ///
    /// Will return `Err` has an error when loading the config file
    pub fn load_settings(&self, env: &dyn Environment) -> Result<Settings> {
        Ok(self.get_settings_from_file()?.with_env_overrides(env))
    }

    /// Create the default settings file when it is missing.
    ///
    /// # Errors
    ///
    /// Will return `Err` file could not created or loaded
    pub fn manage_setting_file(&self) -> Result<()> {
        if !self.setting_file_path.is_file() {
            debug!(path = %self.setting_file_path.display(), "setting file not found");
            self.save_settings_file_from_struct(&Settings::default())?;
        }
        Ok(())
    }

    /// Store the Gemini API key in the settings file.
    ///
    /// # Errors
    ///
    /// Will return `Err` error return on load/save config
    pub fn update_api_key(&self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::Config("API key cannot be empty".into()));
        }
        self.update(|settings| settings.gemini_api_key = Some(key.to_string()))
    }

    /// # Errors
    ///
    /// Will return `Err` error return on load/save config
    pub fn update_safety_level(&self, level: SafetyLevel) -> Result<()> {
        self.update(|settings| settings.safety_level = level)
    }

    /// # Errors
    ///
    /// Will return `Err` error return on load/save config
    pub fn update_auto_confirm(&self, auto_confirm: bool) -> Result<()> {
        self.update(|settings| settings.auto_confirm = auto_confirm)
    }

    /// Reset user configuration to the defaults. Returns the backup path when
    /// the previous file was kept.
    ///
    /// # Errors
    ///
    /// Will return `Err` when the settings file could not be moved or written
    pub fn reset_config(&self, mode: ResetMode) -> Result<Option<PathBuf>> {
        let backup = match mode {
            ResetMode::Override => None,
            ResetMode::Backup => Some(self.backup()?),
        };
        self.save_settings_file_from_struct(&Settings::default())?;
        Ok(backup)
    }

    fn update(&self, change: impl FnOnce(&mut Settings)) -> Result<()> {
        let mut settings = self.get_settings_from_file()?;
        change(&mut settings);
        self.save_settings_file_from_struct(&settings)
    }

    /// Create config folder if not exists.
    fn create_config_folder(&self) -> Result<()> {
        if let Err(err) = fs::create_dir_all(&self.root_folder) {
            return Err(Error::Config(format!("could not create folder: {err}")));
        }
        debug!(path = %self.root_folder.display(), "configuration folder ready");
        Ok(())
    }

    /// Convert the given config to YAML format and the file.
    fn save_settings_file_from_struct(&self, settings: &Settings) -> Result<()> {
        let content = serde_yaml::to_string(settings)?;
        fs::write(&self.setting_file_path, content)?;
        debug!(path = %self.setting_file_path.display(), "settings file saved");
        Ok(())
    }

    fn backup(&self) -> Result<PathBuf> {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let backup_to = PathBuf::from(format!(
            "{}.{secs}.bak",
            self.setting_file_path.display()
        ));
        fs::rename(&self.setting_file_path, &backup_to)?;
        Ok(backup_to)
    }
}

/// Mask an API key for display, keeping the last four characters.
#[must_use]
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{visible}", "*".repeat(chars.len() - 4))
}

#[cfg(test)]
mod test_config {
    use std::{fs::read_dir, path::Path};

    use super::*;
    use crate::env::MockEnvironment;

    fn initialize_config_folder(temp_dir: &Path) -> Config {
        Config::new(Some(&temp_dir.join("app").display().to_string()))
            .expect("Failed to create new config")
    }

    #[test]
    fn can_create_new_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = initialize_config_folder(temp_dir.path());
        assert!(config.root_folder.is_dir());
        assert!(config.setting_file_path.is_file());
        assert!(config.history_path().starts_with(&config.root_folder));
    }

    #[test]
    fn new_config_has_default_settings() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = initialize_config_folder(temp_dir.path());
        assert_eq!(config.get_settings_from_file().unwrap(), Settings::default());
    }

    #[test]
    fn partial_settings_file_is_filled_with_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = initialize_config_folder(temp_dir.path());
        fs::write(&config.setting_file_path, "safety_level: high\nmax_history: 5\n").unwrap();

        let settings = config.get_settings_from_file().unwrap();
        assert_eq!(settings.safety_level, SafetyLevel::High);
        assert_eq!(settings.max_history, 5);
        assert_eq!(settings.model, "gemini-2.5-flash");
    }

    #[test]
    fn can_update_fields() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = initialize_config_folder(temp_dir.path());

        config.update_api_key("  secret-key ").unwrap();
        config.update_safety_level(SafetyLevel::Low).unwrap();
        config.update_auto_confirm(true).unwrap();

        let settings = config.get_settings_from_file().unwrap();
        assert_eq!(settings.api_key(), Some("secret-key"));
        assert_eq!(settings.safety_level, SafetyLevel::Low);
        assert!(settings.auto_confirm);
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = initialize_config_folder(temp_dir.path());
        assert!(config.update_api_key("   ").is_err());
    }

    #[test]
    fn can_reset_config_with_override() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = initialize_config_folder(temp_dir.path());
        config.update_auto_confirm(true).unwrap();

        let backup = config.reset_config(ResetMode::Override).unwrap();
        assert_eq!(backup, None);
        assert_eq!(config.get_settings_from_file().unwrap(), Settings::default());
        assert_eq!(read_dir(&config.root_folder).unwrap().count(), 1);
    }

    #[test]
    fn can_reset_config_with_backup() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = initialize_config_folder(temp_dir.path());
        config.update_auto_confirm(true).unwrap();

        let backup = config.reset_config(ResetMode::Backup).unwrap().unwrap();
        assert!(backup.is_file());
        assert_eq!(config.get_settings_from_file().unwrap(), Settings::default());
        assert_eq!(read_dir(&config.root_folder).unwrap().count(), 2);
    }

    #[test]
    fn env_overrides() {
        let mut env = MockEnvironment::default();
        env.env_vars.insert(API_KEY_ENV.into(), "from-env".into());
        env.env_vars.insert(SAFETY_LEVEL_ENV.into(), "HIGH".into());

        let settings = Settings::default().with_env_overrides(&env);
        assert_eq!(settings.api_key(), Some("from-env"));
        assert_eq!(settings.safety_level, SafetyLevel::High);
    }

    #[test]
    fn invalid_env_safety_level_is_ignored() {
        let mut env = MockEnvironment::default();
        env.env_vars.insert(SAFETY_LEVEL_ENV.into(), "extreme".into());
        let settings = Settings::default().with_env_overrides(&env);
        assert_eq!(settings.safety_level, SafetyLevel::Medium);
    }

    #[test]
    fn verbose_lowers_default_log_level() {
        assert_eq!(Settings::default().default_log_level(), "info");
        let settings: Settings = serde_yaml::from_str("verbose: true\n").unwrap();
        assert_eq!(settings.default_log_level(), "debug");
    }

    #[test]
    fn mask_key_keeps_last_four() {
        assert_eq!(mask_key("abcdefgh"), "****efgh");
        assert_eq!(mask_key("abc"), "***");
    }
}
