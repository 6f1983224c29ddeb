// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Dataset backends and the glob-keyed registry that dispatches to them.
//!
//! A backend turns a [`Location`] (or a list of sibling files) into a [`DataTree`]. Backends
//! register under file globs such as `*.nc`; third-party loaders plug in the same way the
//! built-in NetCDF, Zarr, and HDF5 readers do.

pub mod context;
pub mod error;
mod glob;
pub mod registry;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::model::DataTree;
use crate::store::Location;

pub use context::LoadContext;
pub use error::{LoadError, RegistryError};
pub use registry::BackendRegistry;

/// A dataset reader.
pub trait Backend: Send + Sync {
    /// Short identifier shown by `--list-backends`.
    fn name(&self) -> &str;

    /// File globs this backend registers under by default.
    fn patterns(&self) -> &[&str];

    /// Content-based fallback when no glob matches (e.g. a Zarr store without `.zarr`).
    fn sniff(&self, _location: &Location) -> bool {
        false
    }

    fn open(&self, ctx: &LoadContext, location: &Location) -> Result<DataTree, LoadError>;

    /// Opens several files that share one directory and one extension.
    ///
    /// The default opens each file and attaches it as a child group named by its file stem.
    fn open_multi(&self, ctx: &LoadContext, paths: &[PathBuf]) -> Result<DataTree, LoadError> {
        open_each_as_child(self, ctx, paths)
    }
}

/// Opens `paths` in parallel with `backend` and nests each result under one root.
///
/// The root is named after the shared parent directory; children keep input order.
pub fn open_each_as_child<B: Backend + ?Sized>(
    backend: &B,
    ctx: &LoadContext,
    paths: &[PathBuf],
) -> Result<DataTree, LoadError> {
    let trees = paths
        .par_iter()
        .map(|path| {
            let mut tree = backend.open(ctx, &Location::Local(path.clone()))?;
            tree.set_name(file_stem(path));
            Ok(tree)
        })
        .collect::<Result<Vec<_>, LoadError>>()?;

    let root_name = paths
        .first()
        .and_then(|path| path.parent())
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_owned());
    let mut root = DataTree::new(root_name);
    for tree in trees {
        root.add_child(tree)?;
    }
    Ok(root)
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(OsStr::to_string_lossy)
        .map(|stem| stem.into_owned())
        .unwrap_or_else(|| "root".to_owned())
}
