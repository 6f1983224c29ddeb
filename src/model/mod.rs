// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A dataset is a [`DataTree`] of groups; each group holds coordinates and data variables
//! ([`Variable`]) whose values load lazily through an [`ArrayLoader`].

pub mod attrs;
pub mod dtype;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod tree;
pub mod values;
pub mod variable;

pub use attrs::{AttrValue, Attrs};
pub use dtype::DType;
pub use tree::{DataTree, TreeError};
pub use values::ArrayValues;
pub use variable::{ArrayLoader, Variable};
