// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use ndarray::{Array2, Ix2};
use thiserror::Error;

use super::axis_label;
use crate::analysis::{AnalysisError, SliceSelection};
use crate::backend::LoadError;
use crate::model::{DType, DataTree, Variable};

#[derive(Debug, Error)]
pub enum PlotError {
    #[error(
        "Cannot plot variable '{name}' with dtype {dtype}! Plotting is only supported for numeric data types."
    )]
    NonNumeric { name: String, dtype: DType },
    #[error("Cannot plot variable '{name}': it has no dimensions.")]
    Scalar { name: String },
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinePlot {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl LinePlot {
    /// `(x, y)` points in data order.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.x.iter().copied().zip(self.y.iter().copied()).collect()
    }

    pub fn x_bounds(&self) -> [f64; 2] {
        finite_bounds(&self.x)
    }

    pub fn y_bounds(&self) -> [f64; 2] {
        finite_bounds(&self.y)
    }
}

/// A matrix shown as a heatmap; row 0 is the first `y` coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapPlot {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub z: Array2<f64>,
    pub x_ticks: Vec<String>,
    pub y_ticks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlotModel {
    Line(LinePlot),
    Heatmap(HeatmapPlot),
}

impl PlotModel {
    /// Builds the plot for `var`, looking up coordinates in `group`.
    ///
    /// Variables with more than two dimensions are sliced with `selection`, or with the
    /// default selection when none is given.
    pub fn for_variable(
        group: &DataTree,
        var: &Variable,
        selection: Option<&SliceSelection>,
    ) -> Result<Self, PlotError> {
        if !var.dtype().is_numeric() {
            return Err(PlotError::NonNumeric { name: var.name().to_owned(), dtype: var.dtype() });
        }
        match var.ndim() {
            0 => Err(PlotError::Scalar { name: var.name().to_owned() }),
            1 => line_plot(group, var).map(Self::Line),
            2 => {
                let z = crate::analysis::numeric_values(var)?
                    .clone()
                    .into_dimensionality::<Ix2>()
                    .map_err(|_| PlotError::Scalar { name: var.name().to_owned() })?;
                let title = format!("2D Plot of {}", var.name());
                heatmap_plot(group, var, z, (0, 1), title).map(Self::Heatmap)
            }
            _ => {
                let default;
                let selection = match selection {
                    Some(selection) => selection,
                    None => {
                        default = SliceSelection::new(var)?;
                        &default
                    }
                };
                let z = selection.extract(var)?;
                let title = format!("{} ({})", var.name(), selection.slice_info());
                let axes = (selection.y_dim(), selection.x_dim());
                heatmap_plot(group, var, z, axes, title).map(Self::Heatmap)
            }
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Line(plot) => &plot.title,
            Self::Heatmap(plot) => &plot.title,
        }
    }
}

fn line_plot(group: &DataTree, var: &Variable) -> Result<LinePlot, PlotError> {
    let dim = var.dims()[0].as_str();
    let y = crate::analysis::numeric_values(var)?.iter().map(|v| nan_to_zero(*v)).collect();
    Ok(LinePlot {
        title: format!("1D Plot of {}", var.name()),
        x_label: dim_label(group, dim),
        y_label: var.name().to_owned(),
        x: coordinate_values(group, dim, var.shape()[0])?,
        y,
    })
}

fn heatmap_plot(
    group: &DataTree,
    var: &Variable,
    z: Array2<f64>,
    (y_dim, x_dim): (usize, usize),
    title: String,
) -> Result<HeatmapPlot, PlotError> {
    let y_name = var.dims()[y_dim].as_str();
    let x_name = var.dims()[x_dim].as_str();
    let ticks = |dim: &str, len: usize| -> Result<Vec<String>, PlotError> {
        Ok(coordinate_values(group, dim, len)?.iter().map(|v| format!("{v:.4}")).collect())
    };
    Ok(HeatmapPlot {
        title,
        x_label: dim_label(group, x_name),
        y_label: dim_label(group, y_name),
        x_ticks: ticks(x_name, z.ncols())?,
        y_ticks: ticks(y_name, z.nrows())?,
        z: z.mapv(nan_to_zero),
    })
}

fn dim_label(group: &DataTree, dim: &str) -> String {
    axis_label(dim, group.coord_for(dim).and_then(Variable::units))
}

/// Values of the coordinate named `dim`, or `0..len` when there is no numeric coordinate.
fn coordinate_values(group: &DataTree, dim: &str, len: usize) -> Result<Vec<f64>, PlotError> {
    let indices = || (0..len).map(|i| i as f64).collect();
    let Some(coord) = group.coord_for(dim).filter(|coord| coord.dtype().is_numeric()) else {
        return Ok(indices());
    };
    let values = coord.values()?.to_f64_vec().filter(|values| values.len() == len);
    Ok(values.unwrap_or_else(indices))
}

fn nan_to_zero(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

fn finite_bounds(values: &[f64]) -> [f64; 2] {
    let (lo, hi) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        [0.0, 1.0]
    } else if lo == hi {
        [lo - 0.5, hi + 0.5]
    } else {
        [lo, hi]
    }
}
