// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! User configuration.
//!
//! Sources are layered, later wins: built-in defaults, the TOML config file, `XR_TUI_*`
//! environment variables, then command-line flags (applied by the binary).

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV: &str = "XR_TUI_CONFIG";
pub const BINS_ENV: &str = "XR_TUI_BINS";
pub const THEME_ENV: &str = "XR_TUI_THEME";
pub const LOG_ENV: &str = "XR_TUI_LOG";

const DEFAULT_HISTOGRAM_BINS: usize = 100;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid config {path:?}: {source}")]
    Toml { path: PathBuf, source: toml::de::Error },
    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidValue { name: String, value: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Number of histogram bins on the statistics screen.
    pub histogram_bins: usize,
    pub theme: ThemeMode,
    pub http_timeout_secs: u64,
    /// Log file; logging is disabled when unset because the UI owns the terminal.
    pub log_file: Option<PathBuf>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            theme: ThemeMode::Dark,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            log_file: None,
            log_level: "info".to_owned(),
        }
    }
}

impl Config {
    /// Loads defaults, the config file, and environment overrides.
    ///
    /// `explicit` (from `--config`) must exist; the implicit locations are optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|name| env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
            .map_err(|source| ConfigError::Toml { path: path.to_path_buf(), source })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(raw) = lookup(BINS_ENV).filter(|raw| !raw.trim().is_empty()) {
            self.histogram_bins = parse_bins(BINS_ENV, &raw)?;
        }
        if let Some(raw) = lookup(THEME_ENV).filter(|raw| !raw.trim().is_empty()) {
            self.theme = ThemeMode::parse(&raw).ok_or_else(|| ConfigError::InvalidValue {
                name: THEME_ENV.to_owned(),
                value: raw.clone(),
                reason: "expected dark or light".to_owned(),
            })?;
        }
        if let Some(raw) = lookup(LOG_ENV).filter(|raw| !raw.trim().is_empty()) {
            self.log_file = Some(PathBuf::from(raw.trim()));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.histogram_bins == 0 {
            return Err(ConfigError::InvalidValue {
                name: "histogram_bins".to_owned(),
                value: "0".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "http_timeout_secs".to_owned(),
                value: "0".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

pub fn parse_bins(name: &str, raw: &str) -> Result<usize, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        name: name.to_owned(),
        value: raw.to_owned(),
        reason: reason.to_owned(),
    };
    let bins = raw.trim().parse::<usize>().map_err(|_| invalid("expected a positive integer"))?;
    if bins == 0 {
        return Err(invalid("must be at least 1"));
    }
    Ok(bins)
}

fn default_config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_ENV).filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(path));
    }
    let base = env::var_os("XDG_CONFIG_HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("xr-tui").join("config.toml"))
}
