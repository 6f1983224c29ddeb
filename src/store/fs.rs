// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use super::{ByteStore, StoreError};

/// Key/value view of a directory tree (keys are `/`-separated relative paths).
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(key.trim_start_matches('/'));
        if relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir))
        {
            return Err(StoreError::InvalidKey(key.to_owned()));
        }
        Ok(self.root.join(relative))
    }
}

impl ByteStore for FsStore {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.resolve(key)?;
        tracing::trace!(path = %path.display(), "fs store get");
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn list_dir(&self, prefix: &str) -> Result<Option<Vec<String>>, StoreError> {
        let path = self.resolve(prefix)?;
        let entries = match fs::read_dir(&path) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Some(Vec::new())),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io { path: path.clone(), source })?;
            let file_type =
                entry.file_type().map_err(|source| StoreError::Io { path: entry.path(), source })?;
            if file_type.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(Some(names))
    }
}
