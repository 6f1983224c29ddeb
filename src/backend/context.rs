// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::OnceLock;

use reqwest::blocking::Client;

use crate::config::Config;
use crate::store::{http, StoreError};

/// Application state handed to every backend when it opens a dataset.
#[derive(Debug, Default)]
pub struct LoadContext {
    config: Config,
    http: OnceLock<Client>,
}

impl LoadContext {
    pub fn new(config: Config) -> Self {
        Self { config, http: OnceLock::new() }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared HTTP client, built on first use with the configured timeout.
    pub fn http_client(&self) -> Result<Client, StoreError> {
        if let Some(client) = self.http.get() {
            return Ok(client.clone());
        }
        let client = http::build_client(self.config.http_timeout())?;
        Ok(self.http.get_or_init(|| client).clone())
    }
}
