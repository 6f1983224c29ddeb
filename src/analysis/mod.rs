// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Viewer-side numerics: summary statistics, histograms, and N-D slicing.

pub mod histogram;
pub mod slice;
pub mod stats;

use thiserror::Error;

use crate::backend::LoadError;
use crate::model::{DType, Variable};

pub use histogram::Histogram;
pub use slice::SliceSelection;
pub use stats::Statistics;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("variable '{name}' with dtype {dtype} is not numeric")]
    NonNumeric { name: String, dtype: DType },
    #[error("histogram needs at least one bin")]
    NoBins,
    #[error("variable '{name}' has {ndim} dimensions; slicing needs at least 2")]
    TooFewDims { name: String, ndim: usize },
    #[error("dimension index {0} out of range")]
    NoSuchDim(usize),
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Loads the numeric values of `var`, rejecting text and reference variables.
pub fn numeric_values(var: &Variable) -> Result<&ndarray::ArrayD<f64>, AnalysisError> {
    let non_numeric =
        || AnalysisError::NonNumeric { name: var.name().to_owned(), dtype: var.dtype() };
    if !var.dtype().is_numeric() {
        return Err(non_numeric());
    }
    var.values()?.as_numeric().ok_or_else(non_numeric)
}
