// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Zarr v2 reader for local directory stores and HTTP(S) stores.
//!
//! Metadata comes from `.zmetadata` when the store is consolidated; otherwise local stores are
//! walked directory by directory. Chunks are fetched and decoded in parallel when a variable is
//! first loaded.

mod chunks;
mod metadata;

use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use smol_str::SmolStr;
use thiserror::Error;
use tracing::{debug, info};

use self::chunks::ChunkLoader;
use self::metadata::{array_dimensions, attrs_from_json, ArrayMeta};
use crate::backend::{file_stem, Backend, LoadContext, LoadError};
use crate::model::{DataTree, Variable};
use crate::store::{ByteStore, FsStore, HttpStore, Location};

#[derive(Debug, Error)]
pub enum ZarrError {
    #[error("invalid JSON in {key}: {source}")]
    Json { key: String, source: serde_json::Error },
    #[error("unsupported zarr_format {0}; only version 2 is readable")]
    UnsupportedFormat(u64),
    #[error("unsupported dtype {0}")]
    UnsupportedDType(String),
    #[error("unsupported compressor '{0}'")]
    UnsupportedCompressor(String),
    #[error("unsupported memory order '{0}'")]
    UnsupportedOrder(String),
    #[error("{0}: filters are not supported")]
    UnsupportedFilters(String),
    #[error("invalid metadata in {key}: {reason}")]
    InvalidMetadata { key: String, reason: String },
    #[error("failed to decompress chunk {key}: {source}")]
    Decompress { key: String, source: io::Error },
    #[error("chunk {key} holds {found} bytes, expected {expected}")]
    ChunkSize { key: String, expected: usize, found: usize },
    #[error("{0} has no consolidated metadata (.zmetadata); remote stores need it")]
    NoConsolidatedMetadata(String),
    #[error("{0} is not a zarr store")]
    NotAStore(String),
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ZarrBackend;

impl Backend for ZarrBackend {
    fn name(&self) -> &str {
        "zarr"
    }

    fn patterns(&self) -> &[&str] {
        &["*.zarr"]
    }

    fn sniff(&self, location: &Location) -> bool {
        location.as_local().is_some_and(|path| {
            path.is_dir()
                && [".zgroup", ".zarray", ".zmetadata"].iter().any(|key| path.join(key).is_file())
        })
    }

    fn open(&self, ctx: &LoadContext, location: &Location) -> Result<DataTree, LoadError> {
        let store: Arc<dyn ByteStore> = match location {
            Location::Local(path) => Arc::new(FsStore::new(path.clone())),
            Location::Remote(url) => Arc::new(HttpStore::new(url.clone(), ctx.http_client()?)),
        };
        let name = location.file_name().map(|name| file_stem(Path::new(&name))).unwrap_or_default();
        let tree = read_tree(store, &name)?;
        info!(
            %location,
            groups = tree.walk().len(),
            "opened zarr store"
        );
        Ok(tree)
    }
}

/// Where hierarchy metadata is read from.
enum MetaSource {
    Consolidated(BTreeMap<String, Value>),
    Listing,
}

struct Reader {
    store: Arc<dyn ByteStore>,
    meta: MetaSource,
}

/// Reads the hierarchy of `store` into a tree whose root is called `name`.
pub fn read_tree(store: Arc<dyn ByteStore>, name: &str) -> Result<DataTree, LoadError> {
    let meta = match store.get(".zmetadata")? {
        Some(bytes) => {
            let doc: Value = parse_json(".zmetadata", &bytes)?;
            let entries = match doc.get("metadata") {
                Some(Value::Object(map)) => {
                    map.iter().map(|(key, value)| (key.clone(), value.clone())).collect()
                }
                _ => {
                    return Err(ZarrError::InvalidMetadata {
                        key: ".zmetadata".into(),
                        reason: "missing 'metadata' object".into(),
                    }
                    .into())
                }
            };
            debug!(store = %store.describe(), "using consolidated metadata");
            MetaSource::Consolidated(entries)
        }
        None => {
            if store.list_dir("")?.is_none() {
                return Err(ZarrError::NoConsolidatedMetadata(store.describe()).into());
            }
            MetaSource::Listing
        }
    };

    let reader = Reader { store, meta };
    if let Some(array) = reader.json(".zarray")? {
        // The store root is a bare array.
        let mut tree = DataTree::new(name);
        let var = reader.variable(name, "", array)?;
        tree.add_data_var(var)?;
        return Ok(tree);
    }
    if reader.json(".zgroup")?.is_none() {
        return Err(ZarrError::NotAStore(reader.store.describe()).into());
    }
    reader.group(name, "")
}

impl Reader {
    fn json(&self, key: &str) -> Result<Option<Value>, LoadError> {
        match &self.meta {
            MetaSource::Consolidated(entries) => Ok(entries.get(key).cloned()),
            MetaSource::Listing => match self.store.get(key)? {
                Some(bytes) => Ok(Some(parse_json(key, &bytes)?)),
                None => Ok(None),
            },
        }
    }

    /// Names of arrays and groups directly under `prefix` (which is empty or ends in `/`).
    fn children(&self, prefix: &str) -> Result<Vec<String>, LoadError> {
        match &self.meta {
            MetaSource::Consolidated(entries) => {
                let mut names: Vec<String> = entries
                    .keys()
                    .filter_map(|key| key.strip_prefix(prefix))
                    .filter_map(|rest| {
                        let (child, leaf) = rest.split_once('/')?;
                        matches!(leaf, ".zarray" | ".zgroup").then(|| child.to_owned())
                    })
                    .collect();
                names.sort();
                names.dedup();
                Ok(names)
            }
            MetaSource::Listing => Ok(self.store.list_dir(prefix)?.unwrap_or_default()),
        }
    }

    fn group(&self, name: &str, prefix: &str) -> Result<DataTree, LoadError> {
        let mut tree = DataTree::new(name);
        if let Some(attrs) = self.json(&format!("{prefix}.zattrs"))? {
            *tree.attrs_mut() = attrs_from_json(&attrs);
        }

        let mut variables = Vec::new();
        for child in self.children(prefix)? {
            let child_prefix = format!("{prefix}{child}/");
            if let Some(array) = self.json(&format!("{child_prefix}.zarray"))? {
                variables.push(self.variable(&child, &child_prefix, array)?);
            } else if self.json(&format!("{child_prefix}.zgroup"))?.is_some() {
                let subgroup = self.group(&child, &child_prefix)?;
                tree.add_child(subgroup)?;
            }
        }

        // Coordinates first so data variables are validated against them.
        let (coords, data_vars): (Vec<_>, Vec<_>) = variables
            .into_iter()
            .partition(|var| var.ndim() == 1 && var.dims()[0].as_str() == var.name());
        for var in coords {
            tree.add_coord(var)?;
        }
        for var in data_vars {
            let var = rename_conflicting_dims(&tree, var);
            tree.add_data_var(var)?;
        }
        Ok(tree)
    }

    fn variable(&self, name: &str, prefix: &str, array: Value) -> Result<Variable, LoadError> {
        let meta = ArrayMeta::from_json(&format!("{prefix}.zarray"), array)?;
        let raw_attrs = self.json(&format!("{prefix}.zattrs"))?.unwrap_or(Value::Null);
        let attrs = attrs_from_json(&raw_attrs);
        let dims: Vec<SmolStr> = match array_dimensions(&raw_attrs, meta.shape.len()) {
            Some(names) => names.into_iter().map(SmolStr::from).collect(),
            None => (0..meta.shape.len()).map(|i| SmolStr::from(format!("dim_{i}"))).collect(),
        };

        let shape = meta.shape.clone();
        let dtype = meta.dtype.dtype();
        let loader = ChunkLoader::new(self.store.clone(), prefix.to_owned(), meta, attrs.clone());
        Ok(Variable::lazy(name, dims, shape, dtype, Arc::new(loader)).with_attrs(attrs))
    }
}

/// Default `dim_{i}` names are shared by unrelated arrays; prefix them with the array name
/// when the sizes disagree.
fn rename_conflicting_dims(tree: &DataTree, var: Variable) -> Variable {
    let conflicts = var.dims().iter().zip(var.shape()).any(|(dim, len)| {
        dim.starts_with("dim_") && tree.dim_size(dim).is_some_and(|existing| existing != *len)
    });
    if !conflicts {
        return var;
    }
    let dims = var
        .dims()
        .iter()
        .map(|dim| {
            if dim.starts_with("dim_") {
                SmolStr::from(format!("{}_{dim}", var.name()))
            } else {
                dim.clone()
            }
        })
        .collect();
    var.with_dims(dims)
}

fn parse_json(key: &str, bytes: &[u8]) -> Result<Value, ZarrError> {
    serde_json::from_slice(bytes).map_err(|source| ZarrError::Json { key: key.to_owned(), source })
}
