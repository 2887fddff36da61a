// rc file handling (~/.taskpad/rc)
//
// The file is a list of `key=value` lines. Blank lines and lines starting
// with '#' are skipped.

use crate::models::Priority;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_CATEGORIES: &[&str] = &["General", "Work", "Personal", "Shopping"];

/// How often a due-today task produces a reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderPolicy {
    /// One reminder per task on every render pass
    Every,
    /// At most one reminder per task per day
    Daily,
    /// Notifications unsupported; the reminder check is skipped
    Off,
}

impl ReminderPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "every" => Some(ReminderPolicy::Every),
            "daily" => Some(ReminderPolicy::Daily),
            "off" => Some(ReminderPolicy::Off),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(ColorMode::Auto),
            "always" => Some(ColorMode::Always),
            "never" => Some(ColorMode::Never),
            _ => None,
        }
    }
}

/// Invalid value in the rc file
#[derive(Debug, thiserror::Error)]
#[error("invalid value for '{key}' in {path}: {message}")]
pub struct ConfigError {
    pub key: String,
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_location: PathBuf,
    pub default_priority: Priority,
    pub default_category: String,
    pub categories: Vec<String>,
    pub reminders: ReminderPolicy,
    pub color: ColorMode,
}

impl Config {
    /// Directory holding the rc file and the default database
    pub fn home_dir() -> Result<PathBuf> {
        // HOME wins so tests and wrappers can relocate everything
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
            .context("Failed to determine home directory")?;
        Ok(home.join(".taskpad"))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join("rc"))
    }

    /// Defaults rooted at the given config directory
    pub fn with_base(base: &Path) -> Self {
        Self {
            data_location: base.join("store.db"),
            default_priority: Priority::Low,
            default_category: DEFAULT_CATEGORIES[0].to_string(),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            reminders: ReminderPolicy::Every,
            color: ColorMode::Auto,
        }
    }

    /// Load the rc file, falling back to defaults when it does not exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            let base = Self::home_dir()?;
            return Ok(Self::with_base(&base));
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Ok(Self::parse(&content, &path)?)
    }

    /// Parse rc file content. Relative paths resolve against the rc directory.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut config = Self::with_base(&base);
        let mut category_set = false;

        let invalid = |key: &str, message: String| ConfigError {
            key: key.to_string(),
            path: path.to_path_buf(),
            message,
        };

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                log::warn!("Ignoring malformed config line: {}", line);
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            match key {
                "data.location" => {
                    let location = PathBuf::from(value);
                    config.data_location = if location.is_relative() {
                        base.join(location)
                    } else {
                        location
                    };
                }
                "default.priority" => {
                    config.default_priority = Priority::from_str(value)
                        .ok_or_else(|| invalid(key, format!("'{}' is not low, medium or high", value)))?;
                }
                "default.category" => {
                    config.default_category = value.to_string();
                    category_set = true;
                }
                "categories" => {
                    let categories: Vec<String> = value
                        .split(',')
                        .map(str::trim)
                        .filter(|c| !c.is_empty())
                        .map(String::from)
                        .collect();
                    if categories.is_empty() {
                        return Err(invalid(key, "at least one category is required".to_string()));
                    }
                    config.categories = categories;
                }
                "reminders" => {
                    config.reminders = ReminderPolicy::from_str(value)
                        .ok_or_else(|| invalid(key, format!("'{}' is not every, daily or off", value)))?;
                }
                "color" => {
                    config.color = ColorMode::from_str(value)
                        .ok_or_else(|| invalid(key, format!("'{}' is not auto, always or never", value)))?;
                }
                _ => log::warn!("Ignoring unknown config key: {}", key),
            }
        }

        if !category_set {
            config.default_category = config.categories[0].clone();
        }
        if !config.categories.iter().any(|c| c == &config.default_category) {
            return Err(invalid(
                "default.category",
                format!("'{}' is not one of the configured categories", config.default_category),
            ));
        }

        Ok(config)
    }

    /// Look up an offered category, ignoring case
    pub fn resolve_category(&self, name: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.eq_ignore_ascii_case(name.trim()))
            .map(String::as_str)
    }
}
