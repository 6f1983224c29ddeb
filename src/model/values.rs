// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn};

/// Decoded contents of a variable.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValues {
    Numeric(ArrayD<f64>),
    Text(ArrayD<String>),
}

impl ArrayValues {
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::Numeric(array) => array.shape(),
            Self::Text(array) => array.shape(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(array) => array.len(),
            Self::Text(array) => array.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_numeric(&self) -> Option<&ArrayD<f64>> {
        match self {
            Self::Numeric(array) => Some(array),
            Self::Text(_) => None,
        }
    }

    /// Builds a numeric array from row-major values.
    ///
    /// Returns `None` when `values.len()` does not match the shape.
    pub fn numeric(shape: &[usize], values: Vec<f64>) -> Option<Self> {
        ArrayD::from_shape_vec(IxDyn(shape), values).ok().map(Self::Numeric)
    }

    pub fn text(shape: &[usize], values: Vec<String>) -> Option<Self> {
        ArrayD::from_shape_vec(IxDyn(shape), values).ok().map(Self::Text)
    }

    /// Fixes each `(axis, index)` in turn, dropping that axis. Axes refer to the shape left by
    /// the earlier picks. Only the final slice is copied.
    pub(crate) fn pick(&self, picks: &[(usize, usize)]) -> Self {
        match self {
            Self::Numeric(array) => Self::Numeric(pick_view(array.view(), picks).to_owned()),
            Self::Text(array) => Self::Text(pick_view(array.view(), picks).to_owned()),
        }
    }

    /// Flat row-major copy of the numeric values, for coordinate axes.
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        self.as_numeric().map(|array| array.iter().copied().collect())
    }
}

fn pick_view<'a, T>(mut view: ArrayViewD<'a, T>, picks: &[(usize, usize)]) -> ArrayViewD<'a, T> {
    for &(axis, index) in picks {
        view = view.index_axis_move(Axis(axis), index);
    }
    view
}

/// Decodes a fixed-width, NUL-padded byte field up to its first NUL.
pub(crate) fn nul_terminated(bytes: &[u8]) -> String {
    let end = memchr::memchr(0, bytes).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
