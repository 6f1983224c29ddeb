// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

/// Element type of a variable as stored on disk.
///
/// Numeric values are widened to `f64` once loaded; the stored type is kept for display and
/// for size accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Bool,
    /// Fixed-width byte string (`|S{n}`). A NetCDF char variable collapses its last dimension
    /// into the width.
    Bytes(u32),
    /// Variable-length or fixed-width string.
    Str,
    /// Object or region reference (HDF5). Never loadable.
    Reference,
}

impl DType {
    pub const fn size_bytes(self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 | Self::Bool => 1,
            Self::Bytes(width) => width as usize,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 | Self::Reference => 8,
            // Strings are accounted as pointers, the way numpy object arrays are.
            Self::Str => 8,
        }
    }

    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::Bytes(_) | Self::Str | Self::Reference)
    }

    pub const fn is_text(self) -> bool {
        matches!(self, Self::Bytes(_) | Self::Str)
    }

    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Bool => "bool",
            Self::Bytes(_) => "|S",
            Self::Str => "str",
            Self::Reference => "ref",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(width) => write!(f, "|S{width}"),
            other => f.write_str(other.name()),
        }
    }
}
