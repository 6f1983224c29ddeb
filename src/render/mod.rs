// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal-independent render models.
//!
//! Everything here turns dataset values into plain data (labels, matrices, normalised cell
//! grids) so the TUI only has to map them onto widgets.

pub mod heatmap;
pub mod plot;
pub(crate) mod text;

pub use heatmap::{viridis, HeatmapGrid};
pub use plot::{HeatmapPlot, LinePlot, PlotError, PlotModel};

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Formats a byte count with two decimals in 1024 steps, e.g. `"1.50 KB"`.
pub fn human_bytes(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in BYTE_UNITS {
        if size < 1024.0 {
            return format!("{size:.2} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.2} PB")
}

/// `"dim (units)"`, or just the dimension name when units are unknown.
pub fn axis_label(dim: &str, units: Option<&str>) -> String {
    match units.map(str::trim).filter(|units| !units.is_empty()) {
        Some(units) => format!("{dim} ({units})"),
        None => dim.to_owned(),
    }
}
