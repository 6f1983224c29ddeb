// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use ndarray::{Array2, Ix2};
use smol_str::SmolStr;

use super::{numeric_values, AnalysisError};
use crate::model::Variable;

/// Which two dimensions of an N-D variable are plotted and where the others are fixed.
///
/// `y_dim` and `x_dim` never coincide. Every non-plotted dimension has a position in
/// `[0, size - 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceSelection {
    dims: Vec<SmolStr>,
    sizes: Vec<usize>,
    y_dim: usize,
    x_dim: usize,
    positions: Vec<usize>,
    active: usize,
}

impl SliceSelection {
    pub fn new(var: &Variable) -> Result<Self, AnalysisError> {
        if var.ndim() < 2 {
            return Err(AnalysisError::TooFewDims { name: var.name().to_owned(), ndim: var.ndim() });
        }
        let sizes = var.shape().to_vec();
        let positions = sizes.iter().map(|size| size / 2).collect();
        let mut selection = Self {
            dims: var.dims().to_vec(),
            sizes,
            y_dim: 0,
            x_dim: 1,
            positions,
            active: 0,
        };
        let first_slice = selection.slice_dims().next().unwrap_or(0);
        selection.active = first_slice;
        Ok(selection)
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    pub fn dim_name(&self, dim: usize) -> Option<&str> {
        self.dims.get(dim).map(SmolStr::as_str)
    }

    pub fn y_dim(&self) -> usize {
        self.y_dim
    }

    pub fn x_dim(&self) -> usize {
        self.x_dim
    }

    pub fn position(&self, dim: usize) -> Option<usize> {
        self.positions.get(dim).copied()
    }

    pub fn size(&self, dim: usize) -> Option<usize> {
        self.sizes.get(dim).copied()
    }

    /// The slice dimension that position keys act on, if any.
    pub fn active_dim(&self) -> Option<usize> {
        self.is_slice_dim(self.active).then_some(self.active)
    }

    /// Indices of the dimensions that are fixed, in dimension order.
    pub fn slice_dims(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.ndim()).filter(|dim| self.is_slice_dim(*dim))
    }

    fn is_slice_dim(&self, dim: usize) -> bool {
        dim < self.ndim() && dim != self.y_dim && dim != self.x_dim
    }

    pub fn set_y_dim(&mut self, dim: usize) -> Result<(), AnalysisError> {
        self.check_dim(dim)?;
        let (old_y, old_x) = (self.y_dim, self.x_dim);
        if dim == self.x_dim {
            self.x_dim = self.y_dim;
        }
        self.y_dim = dim;
        self.after_axes_changed(old_y, old_x);
        Ok(())
    }

    pub fn set_x_dim(&mut self, dim: usize) -> Result<(), AnalysisError> {
        self.check_dim(dim)?;
        let (old_y, old_x) = (self.y_dim, self.x_dim);
        if dim == self.y_dim {
            self.y_dim = self.x_dim;
        }
        self.x_dim = dim;
        self.after_axes_changed(old_y, old_x);
        Ok(())
    }

    pub fn cycle_y_dim(&mut self) {
        let next = (self.y_dim + 1) % self.ndim();
        let _ = self.set_y_dim(next);
    }

    pub fn cycle_x_dim(&mut self) {
        let next = (self.x_dim + 1) % self.ndim();
        let _ = self.set_x_dim(next);
    }

    /// Moves the active marker to the next slice dimension, wrapping around.
    pub fn cycle_active(&mut self) {
        let slice_dims: Vec<usize> = self.slice_dims().collect();
        if slice_dims.is_empty() {
            return;
        }
        self.active = slice_dims
            .iter()
            .copied()
            .find(|dim| *dim > self.active)
            .unwrap_or(slice_dims[0]);
    }

    /// Moves the position of `dim` by `delta`, clamped to the dimension size.
    pub fn step_position(&mut self, dim: usize, delta: isize) -> Result<(), AnalysisError> {
        self.check_dim(dim)?;
        let max = self.sizes[dim].saturating_sub(1);
        let current = self.positions[dim];
        let next = if delta.is_negative() {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta.unsigned_abs())
        };
        self.positions[dim] = next.min(max);
        Ok(())
    }

    /// Steps the active slice dimension; a no-op for 2-D variables.
    pub fn step_active(&mut self, delta: isize) {
        if let Some(dim) = self.active_dim() {
            let _ = self.step_position(dim, delta);
        }
    }

    /// `(dim, index)` pairs fixing every non-plotted dimension.
    pub fn selection(&self) -> Vec<(&str, usize)> {
        self.slice_dims().map(|dim| (self.dims[dim].as_str(), self.positions[dim])).collect()
    }

    /// The plotted 2-D matrix: rows follow `y_dim`, columns follow `x_dim`.
    pub fn extract(&self, var: &Variable) -> Result<Array2<f64>, AnalysisError> {
        let sliced = var.isel(&self.selection())?;
        let matrix = numeric_values(&sliced)?
            .clone()
            .into_dimensionality::<Ix2>()
            .map_err(|_| AnalysisError::TooFewDims {
                name: var.name().to_owned(),
                ndim: sliced.ndim(),
            })?;
        Ok(if self.y_dim > self.x_dim { matrix.reversed_axes() } else { matrix })
    }

    /// `"dim=idx, ..."` for the fixed dimensions, in dimension order.
    pub fn slice_info(&self) -> String {
        self.selection()
            .into_iter()
            .map(|(dim, idx)| format!("{dim}={idx}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn check_dim(&self, dim: usize) -> Result<(), AnalysisError> {
        if dim < self.ndim() {
            Ok(())
        } else {
            Err(AnalysisError::NoSuchDim(dim))
        }
    }

    fn after_axes_changed(&mut self, old_y: usize, old_x: usize) {
        for dim in [old_y, old_x] {
            if self.is_slice_dim(dim) {
                self.positions[dim] = self.sizes[dim] / 2;
            }
        }
        if !self.is_slice_dim(self.active) {
            let first_slice = self.slice_dims().next().unwrap_or(0);
            self.active = first_slice;
        }
    }
}
