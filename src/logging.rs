// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub file: Option<PathBuf>,
    pub level: String,
}

impl From<&Config> for LogConfig {
    fn from(config: &Config) -> Self {
        Self { file: config.log_file.clone(), level: config.log_level.clone() }
    }
}

pub(crate) fn default_directives(level: &str) -> String {
    format!("{level},xr_tui={level},reqwest=warn")
}

/// Installs the global subscriber writing to the configured log file.
///
/// The terminal UI owns stdout, so nothing is installed without a log file. Returns whether a
/// subscriber was installed.
pub fn init_logging(config: &LogConfig) -> io::Result<bool> {
    let Some(path) = &config.file else {
        return Ok(false);
    };
    let file: File = OpenOptions::new().create(true).append(true).open(path)?;

    // Base level from config, still overridable via RUST_LOG.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true)
        .try_init()
        .is_ok();
    Ok(installed)
}
