// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::path::PathBuf;

use thiserror::Error;

use crate::format::netcdf::NetCdfError;
use crate::format::zarr::ZarrError;
use crate::model::TreeError;
use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no files given")]
    EmptyFileList,
    #[error("all files must share one directory: {first:?} vs {other:?}")]
    MixedDirectories { first: PathBuf, other: PathBuf },
    #[error("all files must share one extension: {first:?} vs {other:?}")]
    MixedExtensions { first: String, other: String },
    #[error("file {0:?} has no extension")]
    MissingExtension(PathBuf),
    #[error("no backend registered for {pattern}")]
    NoBackend { pattern: String },
    #[error("invalid backend pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("remote datasets cannot be combined; open one URL at a time")]
    RemoteMultiFile,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("netcdf: {0}")]
    NetCdf(#[from] NetCdfError),
    #[error("zarr: {0}")]
    Zarr(#[from] ZarrError),
    #[error("{0} does not exist")]
    NotFound(String),
    #[error("Group '{group}' not found in {source_name}.")]
    GroupNotFound { group: String, source_name: String },
    #[error("unsupported: {0}")]
    Unsupported(String),
    #[error("variable '{name}' decoded to shape {found:?}, expected {expected:?}")]
    ShapeMismatch { name: String, expected: Vec<usize>, found: Vec<usize> },
    #[error("variable '{variable}' has no dimension '{dim}'")]
    UnknownDimension { variable: String, dim: String },
    #[error("index {index} out of range for dimension '{dim}' of size {size}")]
    IndexOutOfRange { dim: String, index: usize, size: usize },
    #[cfg(feature = "hdf5")]
    #[error("hdf5: {0}")]
    Hdf5(#[from] hdf5::Error),
}
