// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! HDF5 reader (cargo feature `hdf5`, links libhdf5).
//!
//! Groups map to tree nodes and datasets to variables. HDF5 has no dimension names, so every
//! dataset gets `{name}_dim_{i}`; 1-D datasets are exposed as coordinates.

use std::path::Path;
use std::sync::Arc;

use hdf5::types::{FloatSize, IntSize, TypeDescriptor, VarLenAscii, VarLenUnicode};
use smol_str::SmolStr;
use tracing::{info, warn};

use super::netcdf::HDF5_SIGNATURE;
use crate::backend::{file_stem, Backend, LoadContext, LoadError};
use crate::format::apply_cf_decoding;
use crate::model::{ArrayValues, AttrValue, Attrs, DType, DataTree, Variable};
use crate::store::{ByteSource, Location};

#[derive(Debug, Default, Clone, Copy)]
pub struct Hdf5Backend;

impl Backend for Hdf5Backend {
    fn name(&self) -> &str {
        "hdf5"
    }

    fn patterns(&self) -> &[&str] {
        &["*.h5", "*.hdf5", "*.he5"]
    }

    fn sniff(&self, location: &Location) -> bool {
        location.as_local().filter(|path| path.is_file()).is_some_and(|path| {
            ByteSource::File(path.to_path_buf())
                .read_at(0, HDF5_SIGNATURE.len())
                .is_ok_and(|magic| magic == HDF5_SIGNATURE)
        })
    }

    fn open(&self, _ctx: &LoadContext, location: &Location) -> Result<DataTree, LoadError> {
        match location {
            Location::Local(path) => read_path(path),
            Location::Remote(url) => Err(LoadError::Unsupported(format!(
                "{url}: HDF5 can only be read from local files"
            ))),
        }
    }
}

/// Reads the whole group hierarchy of the file at `path`.
pub fn read_path(path: &Path) -> Result<DataTree, LoadError> {
    let file = hdf5::File::open(path)?;
    let tree = convert_group(&file, &file_stem(path), path)?;
    info!(path = %path.display(), groups = tree.walk().len(), "opened hdf5 file");
    Ok(tree)
}

fn convert_group(group: &hdf5::Group, name: &str, file: &Path) -> Result<DataTree, LoadError> {
    let mut tree = DataTree::new(name);
    *tree.attrs_mut() = read_attrs(group);

    for dataset in group.datasets()? {
        let var = convert_dataset(&dataset, file)?;
        if var.ndim() == 1 {
            tree.add_coord(var)?;
        } else {
            tree.add_data_var(var)?;
        }
    }
    for child in group.groups()? {
        let child_name = last_segment(&child.name()).to_owned();
        tree.add_child(convert_group(&child, &child_name, file)?)?;
    }
    Ok(tree)
}

fn convert_dataset(dataset: &hdf5::Dataset, file: &Path) -> Result<Variable, LoadError> {
    let full_name = dataset.name();
    let name = last_segment(&full_name).to_owned();
    let shape = dataset.shape();
    let dims: Vec<SmolStr> =
        (0..shape.len()).map(|i| SmolStr::from(format!("{name}_dim_{i}"))).collect();
    let dtype =
        dataset.dtype().and_then(|dt| dt.to_descriptor()).map_or(DType::Reference, map_dtype);
    let attrs = read_attrs(dataset);

    let file = file.to_path_buf();
    let loader_shape = shape.clone();
    let loader_attrs = attrs.clone();
    let loader = move || read_dataset(&file, &full_name, dtype, &loader_shape, &loader_attrs);
    Ok(Variable::lazy(name, dims, shape, dtype, Arc::new(loader)).with_attrs(attrs))
}

fn read_dataset(
    file: &Path,
    dataset: &str,
    dtype: DType,
    shape: &[usize],
    attrs: &Attrs,
) -> Result<ArrayValues, LoadError> {
    let handle = hdf5::File::open(file)?.dataset(dataset)?;
    let values = match dtype {
        DType::Str => {
            let strings = match handle.read_raw::<VarLenUnicode>() {
                Ok(values) => values.iter().map(|s| s.as_str().to_owned()).collect(),
                Err(_) => handle
                    .read_raw::<VarLenAscii>()?
                    .iter()
                    .map(|s| s.as_str().to_owned())
                    .collect(),
            };
            ArrayValues::text(shape, strings)
        }
        DType::Reference | DType::Bytes(_) => {
            return Err(LoadError::Unsupported(format!("dataset {dataset} has dtype {dtype}")))
        }
        _ => {
            let mut numbers = handle.read_raw::<f64>()?;
            apply_cf_decoding(&mut numbers, attrs);
            ArrayValues::numeric(shape, numbers)
        }
    };
    values.ok_or_else(|| LoadError::ShapeMismatch {
        name: dataset.to_owned(),
        expected: shape.to_vec(),
        found: Vec::new(),
    })
}

fn map_dtype(descriptor: TypeDescriptor) -> DType {
    match descriptor {
        TypeDescriptor::Integer(IntSize::U1) => DType::Int8,
        TypeDescriptor::Integer(IntSize::U2) => DType::Int16,
        TypeDescriptor::Integer(IntSize::U4) => DType::Int32,
        TypeDescriptor::Integer(IntSize::U8) => DType::Int64,
        TypeDescriptor::Unsigned(IntSize::U1) => DType::UInt8,
        TypeDescriptor::Unsigned(IntSize::U2) => DType::UInt16,
        TypeDescriptor::Unsigned(IntSize::U4) => DType::UInt32,
        TypeDescriptor::Unsigned(IntSize::U8) => DType::UInt64,
        TypeDescriptor::Float(FloatSize::U4) => DType::Float32,
        TypeDescriptor::Float(FloatSize::U8) => DType::Float64,
        TypeDescriptor::Boolean => DType::Bool,
        TypeDescriptor::VarLenAscii | TypeDescriptor::VarLenUnicode => DType::Str,
        TypeDescriptor::FixedAscii(width) | TypeDescriptor::FixedUnicode(width) => {
            u32::try_from(width).map_or(DType::Reference, DType::Bytes)
        }
        _ => DType::Reference,
    }
}

/// Reads numeric and string attributes; other types are skipped with a warning.
fn read_attrs(object: &hdf5::Location) -> Attrs {
    let mut attrs = Attrs::new();
    let Ok(names) = object.attr_names() else {
        return attrs;
    };
    for name in names {
        match read_attr(object, &name) {
            Ok(Some(value)) => attrs.insert(name, value),
            Ok(None) => warn!(attribute = %name, "skipping attribute of unsupported type"),
            Err(err) => warn!(attribute = %name, %err, "failed to read attribute"),
        }
    }
    attrs
}

fn read_attr(object: &hdf5::Location, name: &str) -> hdf5::Result<Option<AttrValue>> {
    let attr = object.attr(name)?;
    let value = match attr.dtype()?.to_descriptor()? {
        TypeDescriptor::Integer(_) | TypeDescriptor::Boolean => {
            AttrValue::Int(attr.read_raw::<i64>()?)
        }
        TypeDescriptor::Unsigned(_) => AttrValue::UInt(attr.read_raw::<u64>()?),
        TypeDescriptor::Float(_) => AttrValue::Float(attr.read_raw::<f64>()?),
        TypeDescriptor::VarLenUnicode => AttrValue::Text(join_text(
            attr.read_raw::<VarLenUnicode>()?.iter().map(|s| s.as_str()),
        )),
        TypeDescriptor::VarLenAscii => AttrValue::Text(join_text(
            attr.read_raw::<VarLenAscii>()?.iter().map(|s| s.as_str()),
        )),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn join_text<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.collect::<Vec<_>>().join(", ")
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').find(|segment| !segment.is_empty()).unwrap_or(path)
}
