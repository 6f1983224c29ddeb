// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Byte access for dataset readers.
//!
//! Directory-shaped formats (Zarr) read through a [`ByteStore`]; single-file formats (NetCDF)
//! read through a [`ByteSource`]. Both work the same for local paths and HTTP(S) URLs.

pub mod fs;
pub mod http;
pub mod location;
pub mod source;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use fs::FsStore;
pub use http::HttpStore;
pub use location::Location;
pub use source::ByteSource;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("http request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },
    #[error("http request to {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid store key {0:?}")]
    InvalidKey(String),
    #[error("{source_name}: wanted {wanted} bytes at offset {offset}, got {got}")]
    Truncated { source_name: String, offset: u64, wanted: usize, got: usize },
}

/// Read-only key/value access to a hierarchy of objects.
pub trait ByteStore: Send + Sync {
    fn describe(&self) -> String;

    /// Fetches the object at `key`; `Ok(None)` when it does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Names of the sub-directories under `prefix`, or `None` when the store cannot list.
    fn list_dir(&self, prefix: &str) -> Result<Option<Vec<String>>, StoreError>;
}
