// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::sync::{Arc, OnceLock};

use smol_str::SmolStr;

use super::{ArrayValues, Attrs, DType};
use crate::backend::LoadError;

/// Produces the values of a variable on demand.
///
/// Implemented by each format reader; called at most once per variable.
pub trait ArrayLoader: Send + Sync {
    fn load(&self) -> Result<ArrayValues, LoadError>;
}

impl<F> ArrayLoader for F
where
    F: Fn() -> Result<ArrayValues, LoadError> + Send + Sync,
{
    fn load(&self) -> Result<ArrayValues, LoadError> {
        self()
    }
}

/// A named N-dimensional array with dimension names and attributes.
///
/// Metadata is always available; values are decoded on first access and cached.
#[derive(Clone)]
pub struct Variable {
    name: SmolStr,
    dims: Vec<SmolStr>,
    shape: Vec<usize>,
    dtype: DType,
    attrs: Attrs,
    loader: Option<Arc<dyn ArrayLoader>>,
    values: Arc<OnceLock<ArrayValues>>,
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("name", &self.name)
            .field("dims", &self.dims)
            .field("shape", &self.shape)
            .field("dtype", &self.dtype)
            .field("attrs", &self.attrs)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl Variable {
    /// Creates a variable whose values are read lazily through `loader`.
    pub fn lazy(
        name: impl Into<SmolStr>,
        dims: Vec<SmolStr>,
        shape: Vec<usize>,
        dtype: DType,
        loader: Arc<dyn ArrayLoader>,
    ) -> Self {
        debug_assert_eq!(dims.len(), shape.len());
        Self {
            name: name.into(),
            dims,
            shape,
            dtype,
            attrs: Attrs::new(),
            loader: Some(loader),
            values: Arc::new(OnceLock::new()),
        }
    }

    /// Creates a variable from values already in memory.
    pub fn in_memory(
        name: impl Into<SmolStr>,
        dims: Vec<SmolStr>,
        dtype: DType,
        values: ArrayValues,
    ) -> Self {
        let shape = values.shape().to_vec();
        debug_assert_eq!(dims.len(), shape.len());
        let cell = OnceLock::new();
        let _ = cell.set(values);
        Self {
            name: name.into(),
            dims,
            shape,
            dtype,
            attrs: Attrs::new(),
            loader: None,
            values: Arc::new(cell),
        }
    }

    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    /// Renames the dimensions; the rank must stay the same.
    pub(crate) fn with_dims(mut self, dims: Vec<SmolStr>) -> Self {
        debug_assert_eq!(dims.len(), self.shape.len());
        self.dims = dims;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dims(&self) -> &[SmolStr] {
        &self.dims
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.attrs
    }

    pub fn units(&self) -> Option<&str> {
        self.attrs.text("units")
    }

    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the decoded array in bytes, computed from metadata only.
    pub fn nbytes(&self) -> u64 {
        (self.len() as u64).saturating_mul(self.dtype.size_bytes() as u64)
    }

    pub fn dim_index(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|candidate| candidate.as_str() == dim)
    }

    pub fn dim_size(&self, dim: &str) -> Option<usize> {
        self.dim_index(dim).map(|idx| self.shape[idx])
    }

    pub fn is_loaded(&self) -> bool {
        self.values.get().is_some()
    }

    /// Returns the values, decoding them on first access.
    pub fn values(&self) -> Result<&ArrayValues, LoadError> {
        if let Some(values) = self.values.get() {
            return Ok(values);
        }

        let Some(loader) = &self.loader else {
            return Err(LoadError::Unsupported(format!(
                "variable '{}' has no data source",
                self.name
            )));
        };
        if !self.dtype.is_numeric() && !self.dtype.is_text() {
            return Err(LoadError::Unsupported(format!(
                "variable '{}' with dtype {} cannot be loaded",
                self.name, self.dtype
            )));
        }

        let loaded = loader.load()?;
        if loaded.shape() != self.shape.as_slice() {
            return Err(LoadError::ShapeMismatch {
                name: self.name.to_string(),
                expected: self.shape.clone(),
                found: loaded.shape().to_vec(),
            });
        }
        tracing::debug!(variable = %self.name, elements = loaded.len(), "loaded variable values");

        // Another thread may have raced us; either value is equivalent.
        let _ = self.values.set(loaded);
        self.values.get().ok_or_else(|| {
            LoadError::Unsupported(format!("variable '{}' failed to cache values", self.name))
        })
    }

    /// Selects one index along each listed dimension, dropping those dimensions.
    pub fn isel(&self, selection: &[(&str, usize)]) -> Result<Variable, LoadError> {
        let values = self.values()?;
        let mut dims = self.dims.clone();
        let mut shape = values.shape().to_vec();
        let mut picks = Vec::with_capacity(selection.len());

        for (dim, index) in selection {
            let Some(axis) = dims.iter().position(|candidate| candidate.as_str() == *dim) else {
                return Err(LoadError::UnknownDimension {
                    variable: self.name.to_string(),
                    dim: (*dim).to_owned(),
                });
            };
            let size = shape[axis];
            if *index >= size {
                return Err(LoadError::IndexOutOfRange {
                    dim: (*dim).to_owned(),
                    index: *index,
                    size,
                });
            }
            picks.push((axis, *index));
            shape.remove(axis);
            dims.remove(axis);
        }

        Ok(Variable::in_memory(self.name.clone(), dims, self.dtype, values.pick(&picks))
            .with_attrs(self.attrs.clone()))
    }
}
