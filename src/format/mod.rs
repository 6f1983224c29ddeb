// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Built-in dataset readers.
//!
//! Each reader decodes headers eagerly and hands out lazy [`crate::model::ArrayLoader`]s for
//! variable values.

#[cfg(feature = "hdf5")]
pub mod hdf5;
pub mod netcdf;
pub mod zarr;

use crate::model::{AttrValue, Attrs};

/// Applies CF packing conventions in place: `_FillValue` / `missing_value` become NaN, then
/// `scale_factor` and `add_offset` are applied.
pub(crate) fn apply_cf_decoding(values: &mut [f64], attrs: &Attrs) {
    let fill = attrs.get("_FillValue").and_then(AttrValue::as_f64);
    let missing = attrs.get("missing_value").and_then(AttrValue::as_f64);
    let scale = attrs.get("scale_factor").and_then(AttrValue::as_f64);
    let offset = attrs.get("add_offset").and_then(AttrValue::as_f64);
    if fill.is_none() && missing.is_none() && scale.is_none() && offset.is_none() {
        return;
    }

    let is_missing = |v: f64| {
        [fill, missing].into_iter().flatten().any(|m| v == m || (m.is_nan() && v.is_nan()))
    };
    let scale = scale.unwrap_or(1.0);
    let offset = offset.unwrap_or(0.0);
    for value in values.iter_mut() {
        *value = if is_missing(*value) { f64::NAN } else { *value * scale + offset };
    }
}
