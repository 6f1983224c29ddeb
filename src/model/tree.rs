// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use smol_str::SmolStr;
use thiserror::Error;

use super::{Attrs, Variable};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("dimension '{dim}' has size {existing} but variable '{variable}' uses size {found}")]
    DimensionConflict { dim: String, existing: usize, found: usize, variable: String },
    #[error("'{name}' already exists in group '{group}'")]
    Duplicate { group: String, name: String },
    #[error("invalid group name {0:?}")]
    InvalidName(String),
}

/// A hierarchical group of variables.
///
/// Each node owns its coordinates, data variables, and child groups, all kept in insertion
/// order. Dimension sizes are checked on insertion so every variable in a node agrees on the
/// length of each named dimension.
#[derive(Debug, Clone, Default)]
pub struct DataTree {
    name: SmolStr,
    attrs: Attrs,
    dims: Vec<(SmolStr, usize)>,
    coords: Vec<Variable>,
    data_vars: Vec<Variable>,
    children: Vec<DataTree>,
}

impl DataTree {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<SmolStr>) {
        self.name = name.into();
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.attrs
    }

    /// Dimension sizes in first-seen order (coordinates first, then data variables).
    pub fn dims(&self) -> &[(SmolStr, usize)] {
        &self.dims
    }

    pub fn dim_size(&self, dim: &str) -> Option<usize> {
        self.dims.iter().find(|(name, _)| name.as_str() == dim).map(|(_, size)| *size)
    }

    pub fn coords(&self) -> &[Variable] {
        &self.coords
    }

    pub fn data_vars(&self) -> &[Variable] {
        &self.data_vars
    }

    pub fn children(&self) -> &[DataTree] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty() && self.data_vars.is_empty() && self.children.is_empty()
    }

    fn contains_name(&self, name: &str) -> bool {
        self.coords.iter().any(|var| var.name() == name)
            || self.data_vars.iter().any(|var| var.name() == name)
            || self.children.iter().any(|child| child.name() == name)
    }

    fn register_dims(&mut self, var: &Variable) -> Result<(), TreeError> {
        for (dim, &size) in var.dims().iter().zip(var.shape()) {
            if let Some(existing) = self.dim_size(dim) {
                if existing != size {
                    return Err(TreeError::DimensionConflict {
                        dim: dim.to_string(),
                        existing,
                        found: size,
                        variable: var.name().to_owned(),
                    });
                }
            }
        }
        for (dim, &size) in var.dims().iter().zip(var.shape()) {
            if self.dim_size(dim).is_none() {
                self.dims.push((dim.clone(), size));
            }
        }
        Ok(())
    }

    fn check_new_name(&self, name: &str) -> Result<(), TreeError> {
        if self.contains_name(name) {
            return Err(TreeError::Duplicate {
                group: self.name.to_string(),
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    pub fn add_coord(&mut self, var: Variable) -> Result<(), TreeError> {
        self.check_new_name(var.name())?;
        self.register_dims(&var)?;
        self.coords.push(var);
        Ok(())
    }

    pub fn add_data_var(&mut self, var: Variable) -> Result<(), TreeError> {
        self.check_new_name(var.name())?;
        self.register_dims(&var)?;
        self.data_vars.push(var);
        Ok(())
    }

    pub fn add_child(&mut self, child: DataTree) -> Result<(), TreeError> {
        if child.name().is_empty() || child.name().contains('/') {
            return Err(TreeError::InvalidName(child.name().to_owned()));
        }
        self.check_new_name(child.name())?;
        self.children.push(child);
        Ok(())
    }

    pub fn child(&self, name: &str) -> Option<&DataTree> {
        self.children.iter().find(|child| child.name() == name)
    }

    /// Resolves a `/`-separated group path. An empty path (or `/`) is `self`.
    pub fn get(&self, path: &str) -> Option<&DataTree> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| node.child(segment))
    }

    /// Owned copy of the group at `path`, used to re-root a tree.
    pub fn subtree(&self, path: &str) -> Option<DataTree> {
        self.get(path).cloned()
    }

    /// Looks up a variable by name among coordinates and data variables.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.coords
            .iter()
            .chain(self.data_vars.iter())
            .find(|var| var.name() == name)
    }

    /// The 1-D coordinate labelling `dim`, if one exists.
    pub fn coord_for(&self, dim: &str) -> Option<&Variable> {
        self.coords
            .iter()
            .find(|var| var.name() == dim && var.ndim() == 1 && var.dims()[0].as_str() == dim)
    }

    /// Depth-first walk yielding `(path, node)`; the root has path `""`.
    pub fn walk(&self) -> Vec<(String, &DataTree)> {
        fn visit<'a>(node: &'a DataTree, path: String, out: &mut Vec<(String, &'a DataTree)>) {
            for child in node.children() {
                let child_path = if path.is_empty() {
                    child.name().to_owned()
                } else {
                    format!("{path}/{}", child.name())
                };
                out.push((child_path.clone(), child));
                visit(child, child_path, out);
            }
        }

        let mut out = vec![(String::new(), self)];
        visit(self, String::new(), &mut out);
        out
    }
}
