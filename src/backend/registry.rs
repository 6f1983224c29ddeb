// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, info, warn};

use super::glob::compile_glob;
use super::{Backend, LoadContext, LoadError, RegistryError};
use crate::format::{netcdf::NetCdfBackend, zarr::ZarrBackend};
use crate::model::DataTree;
use crate::store::Location;

struct RegistryEntry {
    pattern: String,
    matcher: Regex,
    backend: Arc<dyn Backend>,
}

/// Backends keyed by file glob, consulted in registration order.
#[derive(Default)]
pub struct BackendRegistry {
    entries: Vec<RegistryEntry>,
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries()).finish()
    }
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the NetCDF, Zarr, and (with the `hdf5` feature) HDF5 backends.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let builtins: Vec<Arc<dyn Backend>> = vec![
            Arc::new(NetCdfBackend),
            Arc::new(ZarrBackend),
            #[cfg(feature = "hdf5")]
            Arc::new(crate::format::hdf5::Hdf5Backend),
        ];
        for backend in builtins {
            for pattern in backend.patterns() {
                let matcher = match compile_glob(pattern) {
                    Ok(matcher) => matcher,
                    Err(err) => {
                        warn!(%err, "skipping built-in pattern");
                        continue;
                    }
                };
                registry.insert(pattern, matcher, backend.clone());
            }
        }
        registry
    }

    /// Registers `backend` under `pattern`. A repeated pattern replaces the earlier backend.
    pub fn register(
        &mut self,
        pattern: &str,
        backend: Arc<dyn Backend>,
    ) -> Result<(), RegistryError> {
        let matcher = compile_glob(pattern)?;
        self.insert(pattern, matcher, backend);
        Ok(())
    }

    /// Registers `backend` under every pattern it declares.
    pub fn register_backend(&mut self, backend: Arc<dyn Backend>) -> Result<(), RegistryError> {
        for pattern in backend.patterns() {
            self.register(pattern, backend.clone())?;
        }
        Ok(())
    }

    fn insert(&mut self, pattern: &str, matcher: Regex, backend: Arc<dyn Backend>) {
        let key = pattern.to_ascii_lowercase();
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.pattern == key) {
            warn!(
                pattern = %key,
                previous = entry.backend.name(),
                replacement = backend.name(),
                "backend pattern registered twice; last registration wins"
            );
            entry.backend = backend;
            entry.matcher = matcher;
            return;
        }
        debug!(pattern = %key, backend = backend.name(), "registered backend");
        self.entries.push(RegistryEntry { pattern: key, matcher, backend });
    }

    /// `(pattern, backend name)` pairs in registration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|entry| (entry.pattern.as_str(), entry.backend.name()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Picks the backend for a single location: first matching glob, then content sniffing.
    pub fn resolve(&self, location: &Location) -> Result<Arc<dyn Backend>, RegistryError> {
        let name = location.file_name().unwrap_or_default();
        if let Some(entry) = self.entries.iter().find(|entry| entry.matcher.is_match(&name)) {
            return Ok(entry.backend.clone());
        }
        if let Some(entry) = self.entries.iter().find(|entry| entry.backend.sniff(location)) {
            debug!(%location, backend = entry.backend.name(), "backend chosen by content");
            return Ok(entry.backend.clone());
        }
        let pattern = if name.is_empty() { location.to_string() } else { name };
        Err(RegistryError::NoBackend { pattern })
    }

    /// Picks the backend for several files.
    ///
    /// All files must share one directory and one extension; the backend registered under
    /// exactly `*.{ext}` is used.
    pub fn resolve_multi(&self, paths: &[PathBuf]) -> Result<Arc<dyn Backend>, RegistryError> {
        let ext = shared_extension(paths)?;
        let pattern = format!("*.{ext}");
        self.entries
            .iter()
            .find(|entry| entry.pattern == pattern)
            .map(|entry| entry.backend.clone())
            .ok_or(RegistryError::NoBackend { pattern })
    }

    /// Opens one location, or several sibling files, then optionally re-roots at `group`.
    pub fn open(
        &self,
        ctx: &LoadContext,
        locations: &[Location],
        group: Option<&str>,
    ) -> Result<DataTree, LoadError> {
        let tree = match locations {
            [] => return Err(RegistryError::EmptyFileList.into()),
            [location] => {
                if let Location::Local(path) = location {
                    if !path.exists() {
                        return Err(LoadError::NotFound(path.display().to_string()));
                    }
                }
                let backend = self.resolve(location)?;
                info!(%location, backend = backend.name(), "opening dataset");
                backend.open(ctx, location)?
            }
            many => {
                let mut paths = Vec::with_capacity(many.len());
                for location in many {
                    match location {
                        Location::Local(path) if path.exists() => paths.push(path.clone()),
                        Location::Local(path) => {
                            return Err(LoadError::NotFound(path.display().to_string()))
                        }
                        Location::Remote(_) => return Err(RegistryError::RemoteMultiFile.into()),
                    }
                }
                let backend = self.resolve_multi(&paths)?;
                info!(files = paths.len(), backend = backend.name(), "opening multi-file dataset");
                backend.open_multi(ctx, &paths)?
            }
        };

        match group.map(str::trim).filter(|group| !group.is_empty() && *group != "/") {
            None => Ok(tree),
            Some(group) => tree.subtree(group).ok_or_else(|| LoadError::GroupNotFound {
                group: group.to_owned(),
                source_name: describe_locations(locations),
            }),
        }
    }
}

fn describe_locations(locations: &[Location]) -> String {
    match locations {
        [location] => location.to_string(),
        many => format!("{} files", many.len()),
    }
}

fn shared_extension(paths: &[PathBuf]) -> Result<String, RegistryError> {
    let Some(first) = paths.first() else {
        return Err(RegistryError::EmptyFileList);
    };
    let first_dir = parent_dir(first);
    let first_key = normalized_dir(first_dir);
    let first_ext = extension_of(first)?;

    for path in &paths[1..] {
        let dir = parent_dir(path);
        if normalized_dir(dir) != first_key {
            return Err(RegistryError::MixedDirectories {
                first: first_dir.to_path_buf(),
                other: dir.to_path_buf(),
            });
        }
        let ext = extension_of(path)?;
        if ext != first_ext {
            return Err(RegistryError::MixedExtensions { first: first_ext, other: ext });
        }
    }
    Ok(first_ext)
}

/// A bare file name lives in `.`.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Absolute form of `dir` for comparing spellings like `.`, `./x/..` and `$PWD`. Falls back to
/// lexical cleanup when the directory cannot be resolved on disk.
fn normalized_dir(dir: &Path) -> PathBuf {
    if let Ok(resolved) = std::fs::canonicalize(dir) {
        return resolved;
    }
    let mut out = if dir.is_absolute() {
        PathBuf::new()
    } else {
        std::env::current_dir().unwrap_or_default()
    };
    for component in dir.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn extension_of(path: &Path) -> Result<String, RegistryError> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .ok_or_else(|| RegistryError::MissingExtension(path.to_path_buf()))
}
