// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! xr-tui: a terminal browser for NetCDF, Zarr, and HDF5 datasets.
//!
//! Datasets are opened through a glob-keyed [`backend::BackendRegistry`] into an in-memory
//! [`model::DataTree`] whose variable values load lazily. The [`tui`] module renders the tree
//! and the statistics and plot screens built by [`analysis`] and [`render`].

pub mod analysis;
pub mod backend;
pub mod config;
pub mod file_info;
pub mod format;
pub mod logging;
pub mod model;
pub mod render;
pub mod store;
pub mod tui;

#[cfg(test)]
mod test_utils;
