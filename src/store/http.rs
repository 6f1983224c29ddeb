// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::{Duration, Instant};

use reqwest::{blocking::Client, StatusCode, Url};
use tracing::{debug, warn};

use super::{ByteStore, StoreError};

const USER_AGENT: &str = concat!("xr-tui/", env!("CARGO_PKG_VERSION"));

pub fn build_client(timeout: Duration) -> Result<Client, StoreError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|source| StoreError::Http { url: String::new(), source })
}

/// Fetches `url` in full. `Ok(None)` means the server answered 404.
pub fn fetch(client: &Client, url: &Url) -> Result<Option<Vec<u8>>, StoreError> {
    let start = Instant::now();
    debug!(%url, "HTTP GET start");
    let response = client
        .get(url.clone())
        .send()
        .map_err(|source| StoreError::Http { url: url.to_string(), source })?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        debug!(%url, "HTTP GET not found");
        return Ok(None);
    }
    if !status.is_success() {
        warn!(%url, status = status.as_u16(), "HTTP GET failed");
        return Err(StoreError::Status { url: url.to_string(), status: status.as_u16() });
    }

    let bytes = response
        .bytes()
        .map_err(|source| StoreError::Http { url: url.to_string(), source })?;
    debug!(
        %url,
        bytes = bytes.len(),
        latency_ms = start.elapsed().as_millis() as u64,
        "HTTP GET done"
    );
    Ok(Some(bytes.to_vec()))
}

/// Read-only key/value store rooted at a base URL.
///
/// HTTP has no directory listing, so hierarchies must be discoverable from metadata.
#[derive(Debug, Clone)]
pub struct HttpStore {
    base: Url,
    client: Client,
}

impl HttpStore {
    pub fn new(base: Url, client: Client) -> Self {
        let mut base = base;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { base, client }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url_for(&self, key: &str) -> Result<Url, StoreError> {
        let key = key.trim_start_matches('/');
        if key.split('/').any(|segment| segment == "..") {
            return Err(StoreError::InvalidKey(key.to_owned()));
        }
        self.base.join(key).map_err(|source| StoreError::InvalidUrl {
            url: format!("{}{key}", self.base),
            reason: source.to_string(),
        })
    }
}

impl ByteStore for HttpStore {
    fn describe(&self) -> String {
        self.base.to_string()
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let url = self.url_for(key)?;
        fetch(&self.client, &url)
    }

    fn list_dir(&self, _prefix: &str) -> Result<Option<Vec<String>>, StoreError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::Url;

    use super::{build_client, HttpStore};
    use crate::store::StoreError;

    fn store(base: &str) -> HttpStore {
        let client = build_client(Duration::from_secs(1)).expect("client");
        HttpStore::new(Url::parse(base).expect("url"), client)
    }

    #[test]
    fn base_gets_trailing_slash_so_keys_nest() {
        let store = store("https://example.org/data/store.zarr");
        assert_eq!(store.base().as_str(), "https://example.org/data/store.zarr/");
        assert_eq!(
            store.url_for("temp/.zarray").expect("url").as_str(),
            "https://example.org/data/store.zarr/temp/.zarray"
        );
    }

    #[test]
    fn rejects_parent_segments() {
        let store = store("https://example.org/data/");
        assert!(matches!(store.url_for("../secret"), Err(StoreError::InvalidKey(_))));
    }
}
