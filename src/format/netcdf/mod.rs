// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! NetCDF classic reader (CDF-1, 64-bit offset CDF-2, and CDF-5).
//!
//! The header is parsed eagerly; each variable gets a lazy loader that reads its bytes from the
//! [`ByteSource`] on first access. Files carrying the HDF5 signature (NetCDF-4) are handed to the
//! HDF5 reader when that feature is compiled in.

mod header;

use std::io;
use std::path::Path;
use std::sync::Arc;

use smol_str::SmolStr;
use thiserror::Error;
use tracing::{debug, info};

use self::header::{parse_header, Header, NcType, VarHeader};
use crate::backend::{file_stem, Backend, LoadContext, LoadError};
use crate::format::apply_cf_decoding;
use crate::model::{ArrayLoader, ArrayValues, Attrs, DType, DataTree, Variable};
use crate::model::values::nul_terminated;
use crate::store::{http, ByteSource, Location};

pub(crate) const HDF5_SIGNATURE: &[u8] = b"\x89HDF\r\n\x1a\n";

#[derive(Debug, Error)]
pub enum NetCdfError {
    #[error("not a NetCDF classic file (bad magic)")]
    BadMagic,
    #[error("unsupported NetCDF format version {0}")]
    UnsupportedVersion(u8),
    #[error("header ended unexpectedly")]
    UnexpectedEof,
    #[error("malformed header: expected tag {expected:#x}, found {found:#x}")]
    UnexpectedTag { expected: u32, found: u32 },
    #[error("unknown external type {0}")]
    UnknownType(u32),
    #[error("invalid name in header")]
    InvalidName,
    #[error("variable '{variable}' refers to missing dimension id {dim_id}")]
    BadDimension { variable: String, dim_id: u64 },
    #[error("variable '{variable}' uses the unlimited dimension in a position other than the first")]
    MisplacedRecordDim { variable: String },
    #[error("'{0}' is too large to address")]
    TooLarge(String),
    #[error("io: {0}")]
    Io(io::Error),
}

impl From<io::Error> for NetCdfError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::UnexpectedEof
        } else {
            Self::Io(err)
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NetCdfBackend;

impl Backend for NetCdfBackend {
    fn name(&self) -> &str {
        "netcdf"
    }

    fn patterns(&self) -> &[&str] {
        &["*.nc", "*.cdf", "*.nc3"]
    }

    fn sniff(&self, location: &Location) -> bool {
        let Some(path) = location.as_local() else {
            return false;
        };
        if !path.is_file() {
            return false;
        }
        ByteSource::File(path.to_path_buf())
            .read_at(0, 4)
            .map(|magic| magic.len() == 4 && &magic[..3] == b"CDF" && matches!(magic[3], 1 | 2 | 5))
            .unwrap_or(false)
    }

    fn open(&self, ctx: &LoadContext, location: &Location) -> Result<DataTree, LoadError> {
        let source = match location {
            Location::Local(path) => ByteSource::File(path.clone()),
            Location::Remote(url) => {
                let client = ctx.http_client()?;
                let bytes = http::fetch(&client, url)?
                    .ok_or_else(|| LoadError::NotFound(url.to_string()))?;
                ByteSource::Memory { name: url.to_string(), bytes: Arc::new(bytes) }
            }
        };

        let signature = source.read_at(0, HDF5_SIGNATURE.len())?;
        if signature == HDF5_SIGNATURE {
            return open_hdf5(location);
        }

        let name = location.file_name().map(|name| file_stem(Path::new(&name))).unwrap_or_default();
        let tree = read_tree(&source, &name)?;
        info!(
            source = %source.describe(),
            variables = tree.coords().len() + tree.data_vars().len(),
            "opened netcdf dataset"
        );
        Ok(tree)
    }
}

#[cfg(feature = "hdf5")]
fn open_hdf5(location: &Location) -> Result<DataTree, LoadError> {
    match location {
        Location::Local(path) => crate::format::hdf5::read_path(path),
        Location::Remote(url) => Err(LoadError::Unsupported(format!(
            "{url} is NetCDF-4/HDF5; only local files are supported"
        ))),
    }
}

#[cfg(not(feature = "hdf5"))]
fn open_hdf5(location: &Location) -> Result<DataTree, LoadError> {
    Err(LoadError::Unsupported(format!(
        "{location} is a NetCDF-4/HDF5 file; rebuild with `--features hdf5` to read it"
    )))
}

/// Parses the header of `source` and builds a single-group tree with lazy variables.
pub fn read_tree(source: &ByteSource, name: &str) -> Result<DataTree, LoadError> {
    let header = {
        let mut reader = source.reader()?;
        parse_header(&mut reader)?
    };
    debug!(
        source = %source.describe(),
        version = ?header.version,
        dims = header.dims.len(),
        vars = header.vars.len(),
        "parsed netcdf header"
    );

    let records = RecordInfo::compute(&header, source)?;
    let mut tree = DataTree::new(name);
    *tree.attrs_mut() = header.attrs.clone();

    for var in &header.vars {
        let variable = build_variable(&header, var, &records, source)?;
        let is_coord = variable.ndim() == 1 && variable.dims()[0] == var.name;
        if is_coord {
            tree.add_coord(variable)?;
        } else {
            tree.add_data_var(variable)?;
        }
    }
    Ok(tree)
}

/// Record count and stride shared by all record variables.
#[derive(Debug, Clone, Copy)]
struct RecordInfo {
    numrecs: u64,
    recsize: u64,
}

impl RecordInfo {
    fn compute(header: &Header, source: &ByteSource) -> Result<Self, LoadError> {
        let record_vars: Vec<&VarHeader> =
            header.vars.iter().filter(|var| is_record_var(header, var)).collect();

        let mut recsize = 0u64;
        for var in &record_vars {
            recsize = recsize
                .checked_add(padded(slab_bytes(header, var)?))
                .ok_or_else(|| NetCdfError::TooLarge(var.name.to_string()))?;
        }
        if let [only] = record_vars.as_slice() {
            recsize = slab_bytes(header, only)?;
        }

        let numrecs = match header.numrecs {
            Some(n) => n,
            None => {
                let first = record_vars.iter().map(|var| var.begin).min();
                match first {
                    Some(begin) if recsize > 0 => source.len()?.saturating_sub(begin) / recsize,
                    _ => 0,
                }
            }
        };
        Ok(Self { numrecs, recsize })
    }
}

fn is_record_var(header: &Header, var: &VarHeader) -> bool {
    var.dim_ids.first().is_some_and(|id| header.dims[*id].is_unlimited())
}

fn element_count(header: &Header, var: &VarHeader, skip_record: bool) -> Result<u64, NetCdfError> {
    let skip = usize::from(skip_record);
    var.dim_ids[skip..].iter().try_fold(1u64, |acc, id| {
        acc.checked_mul(header.dims[*id].len)
            .ok_or_else(|| NetCdfError::TooLarge(var.name.to_string()))
    })
}

/// Bytes of one record of `var` (or of the whole variable when it has no record dimension).
fn slab_bytes(header: &Header, var: &VarHeader) -> Result<u64, NetCdfError> {
    element_count(header, var, is_record_var(header, var))?
        .checked_mul(var.nc_type.size() as u64)
        .ok_or_else(|| NetCdfError::TooLarge(var.name.to_string()))
}

fn padded(len: u64) -> u64 {
    len.div_ceil(4) * 4
}

fn build_variable(
    header: &Header,
    var: &VarHeader,
    records: &RecordInfo,
    source: &ByteSource,
) -> Result<Variable, LoadError> {
    let record = is_record_var(header, var);
    if var.dim_ids.iter().skip(1).any(|id| header.dims[*id].is_unlimited()) {
        return Err(NetCdfError::MisplacedRecordDim { variable: var.name.to_string() }.into());
    }

    let mut dims: Vec<SmolStr> = Vec::with_capacity(var.dim_ids.len());
    let mut shape = Vec::with_capacity(var.dim_ids.len());
    for (pos, id) in var.dim_ids.iter().enumerate() {
        let dim = &header.dims[*id];
        let len = if record && pos == 0 { records.numrecs } else { dim.len };
        let len = usize::try_from(len).map_err(|_| NetCdfError::TooLarge(var.name.to_string()))?;
        dims.push(dim.name.clone());
        shape.push(len);
    }

    let slab = usize::try_from(slab_bytes(header, var)?)
        .map_err(|_| NetCdfError::TooLarge(var.name.to_string()))?;
    let extent = if record {
        Extent::Records {
            begin: var.begin,
            slab,
            stride: records.recsize,
            count: records.numrecs,
        }
    } else {
        Extent::Contiguous { begin: var.begin, len: slab }
    };

    let (dtype, loader_shape, collapse_chars) = if var.nc_type == NcType::Char && !dims.is_empty() {
        dims.pop();
        let width = shape.pop().unwrap_or(0);
        let width =
            u32::try_from(width).map_err(|_| NetCdfError::TooLarge(var.name.to_string()))?;
        (DType::Bytes(width), shape.clone(), true)
    } else {
        (var.nc_type.dtype(), shape.clone(), var.nc_type == NcType::Char)
    };

    let loader = NetCdfLoader {
        source: source.clone(),
        name: var.name.clone(),
        nc_type: var.nc_type,
        extent,
        shape: loader_shape,
        attrs: var.attrs.clone(),
        collapse_chars,
    };
    Ok(Variable::lazy(var.name.clone(), dims, shape, dtype, Arc::new(loader))
        .with_attrs(var.attrs.clone()))
}

/// Where a variable's bytes live. Record variables are expanded into one range per record only
/// when the data is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extent {
    Contiguous { begin: u64, len: usize },
    Records { begin: u64, slab: usize, stride: u64, count: u64 },
}

impl Extent {
    fn ranges(self, name: &str) -> Result<Vec<(u64, usize)>, NetCdfError> {
        let too_large = || NetCdfError::TooLarge(name.to_string());
        match self {
            Self::Contiguous { begin, len } => {
                let len64 = u64::try_from(len).map_err(|_| too_large())?;
                begin.checked_add(len64).ok_or_else(too_large)?;
                Ok(vec![(begin, len)])
            }
            Self::Records { begin, slab, stride, count } => (0..count)
                .map(|rec| {
                    rec.checked_mul(stride)
                        .and_then(|offset| begin.checked_add(offset))
                        .map(|start| (start, slab))
                        .ok_or_else(too_large)
                })
                .collect(),
        }
    }
}

struct NetCdfLoader {
    source: ByteSource,
    name: SmolStr,
    nc_type: NcType,
    extent: Extent,
    shape: Vec<usize>,
    attrs: Attrs,
    collapse_chars: bool,
}

impl ArrayLoader for NetCdfLoader {
    fn load(&self) -> Result<ArrayValues, LoadError> {
        let ranges = self.extent.ranges(&self.name)?;
        let bytes = self.source.read_ranges(&ranges)?;
        debug!(
            source = %self.source.describe(),
            bytes = bytes.len(),
            ranges = ranges.len(),
            "read netcdf variable"
        );

        let values = if self.collapse_chars {
            let count = self.shape.iter().product::<usize>().max(1);
            let width = bytes.len() / count;
            let strings = if width == 0 {
                vec![String::new(); count]
            } else {
                bytes
                    .chunks(width)
                    .map(nul_terminated)
                    .collect()
            };
            ArrayValues::text(&self.shape, strings)
        } else {
            let mut numbers = Vec::new();
            self.nc_type.decode_into(&bytes, &mut numbers);
            apply_cf_decoding(&mut numbers, &self.attrs);
            ArrayValues::numeric(&self.shape, numbers)
        };

        values.ok_or_else(|| {
            LoadError::Unsupported(format!(
                "{}: decoded element count does not match shape {:?}",
                self.source.describe(),
                self.shape
            ))
        })
    }
}

#[cfg(test)]
mod tests;
