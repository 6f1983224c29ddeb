// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::io::Read;
use std::sync::Arc;
use std::time::Instant;

use flate2::read::{GzDecoder, ZlibDecoder};
use rayon::prelude::*;
use smallvec::{smallvec, SmallVec};
use tracing::debug;

use super::metadata::{ArrayMeta, Compressor};
use super::ZarrError;
use crate::backend::LoadError;
use crate::format::apply_cf_decoding;
use crate::model::{ArrayLoader, ArrayValues, Attrs};
use crate::store::ByteStore;

/// Loads one array by fetching and decoding every chunk of its grid.
pub(crate) struct ChunkLoader {
    store: Arc<dyn ByteStore>,
    prefix: String,
    meta: ArrayMeta,
    attrs: Attrs,
}

enum Decoded {
    Numeric(Vec<f64>),
    Text(Vec<String>),
    Missing,
}

impl ChunkLoader {
    pub(crate) fn new(
        store: Arc<dyn ByteStore>,
        prefix: String,
        meta: ArrayMeta,
        attrs: Attrs,
    ) -> Self {
        Self { store, prefix, meta, attrs }
    }

    fn fetch(&self, index: &[usize]) -> Result<Decoded, LoadError> {
        let key = format!("{}{}", self.prefix, self.meta.chunk_key(index));
        let Some(raw) = self.store.get(&key)? else {
            return Ok(Decoded::Missing);
        };
        let bytes = decompress(&key, self.meta.compressor, raw)?;

        let expected = self.meta.chunk_len() * self.meta.dtype.item_size();
        if bytes.len() != expected {
            return Err(ZarrError::ChunkSize { key, expected, found: bytes.len() }.into());
        }
        if self.meta.dtype.is_text() {
            let mut out = Vec::with_capacity(self.meta.chunk_len());
            self.meta.dtype.decode_text(&bytes, &mut out);
            Ok(Decoded::Text(out))
        } else {
            let mut out = Vec::with_capacity(self.meta.chunk_len());
            self.meta.dtype.decode_numeric(&bytes, &mut out);
            Ok(Decoded::Numeric(out))
        }
    }
}

impl ArrayLoader for ChunkLoader {
    fn load(&self) -> Result<ArrayValues, LoadError> {
        let started = Instant::now();
        let grid = self.meta.grid();
        let indices = grid_indices(&grid);

        let decoded = indices
            .par_iter()
            .map(|index| self.fetch(index).map(|chunk| (index, chunk)))
            .collect::<Result<Vec<_>, LoadError>>()?;

        let shape = &self.meta.shape;
        let total: usize = shape.iter().product();
        let values = if self.meta.dtype.is_text() {
            let mut out = vec![String::new(); total];
            for (index, chunk) in &decoded {
                if let Decoded::Text(chunk) = chunk {
                    copy_chunk(&mut out, shape, &self.meta.chunks, index, chunk);
                }
            }
            ArrayValues::text(shape, out)
        } else {
            let mut out = vec![self.meta.missing_value(); total];
            for (index, chunk) in &decoded {
                if let Decoded::Numeric(chunk) = chunk {
                    copy_chunk(&mut out, shape, &self.meta.chunks, index, chunk);
                }
            }
            apply_cf_decoding(&mut out, &self.attrs);
            ArrayValues::numeric(shape, out)
        };

        let missing = decoded.iter().filter(|(_, chunk)| matches!(chunk, Decoded::Missing)).count();
        debug!(
            store = %self.store.describe(),
            array = %self.prefix,
            chunks = decoded.len(),
            missing,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "decoded zarr array"
        );
        values.ok_or_else(|| {
            LoadError::Unsupported(format!(
                "{}: chunk grid does not cover the array shape",
                self.prefix
            ))
        })
    }
}

fn decompress(key: &str, compressor: Compressor, raw: Vec<u8>) -> Result<Vec<u8>, ZarrError> {
    match compressor {
        Compressor::None => Ok(raw),
        Compressor::Zlib => read_all(key, ZlibDecoder::new(raw.as_slice())),
        Compressor::Gzip => read_all(key, GzDecoder::new(raw.as_slice())),
    }
}

fn read_all<R: Read>(key: &str, mut reader: R) -> Result<Vec<u8>, ZarrError> {
    let mut out = Vec::new();
    reader
        .read_to_end(&mut out)
        .map_err(|source| ZarrError::Decompress { key: key.to_owned(), source })?;
    Ok(out)
}

/// Position of one chunk in the chunk grid.
type ChunkIndex = SmallVec<[usize; 4]>;

/// Every chunk index of `grid` in row-major order. A 0-d grid has one empty index.
fn grid_indices(grid: &[usize]) -> Vec<ChunkIndex> {
    let count: usize = grid.iter().product();
    let mut out = Vec::with_capacity(count);
    let mut index: ChunkIndex = smallvec![0usize; grid.len()];
    for _ in 0..count {
        out.push(index.clone());
        for axis in (0..grid.len()).rev() {
            index[axis] += 1;
            if index[axis] < grid[axis] {
                break;
            }
            index[axis] = 0;
        }
    }
    out
}

/// Copies the part of a full-size chunk that lies inside the array into the row-major `out`.
fn copy_chunk<T: Clone>(
    out: &mut [T],
    shape: &[usize],
    chunks: &[usize],
    index: &[usize],
    chunk: &[T],
) {
    let ndim = shape.len();
    if ndim == 0 {
        if let (Some(slot), Some(value)) = (out.first_mut(), chunk.first()) {
            *slot = value.clone();
        }
        return;
    }

    let origin: Vec<usize> = index.iter().zip(chunks).map(|(i, c)| i * c).collect();
    let extent: Vec<usize> =
        (0..ndim).map(|d| chunks[d].min(shape[d].saturating_sub(origin[d]))).collect();
    if extent.iter().any(|e| *e == 0) {
        return;
    }

    let strides = row_major_strides(shape);
    let chunk_strides = row_major_strides(chunks);
    let row = extent[ndim - 1];
    let mut local = vec![0usize; ndim];
    loop {
        let src: usize = (0..ndim).map(|d| local[d] * chunk_strides[d]).sum();
        let dst: usize = (0..ndim).map(|d| (origin[d] + local[d]) * strides[d]).sum();
        out[dst..dst + row].clone_from_slice(&chunk[src..src + row]);

        // Advance over every axis but the last.
        let mut axis = ndim - 1;
        loop {
            if axis == 0 {
                return;
            }
            axis -= 1;
            local[axis] += 1;
            if local[axis] < extent[axis] {
                break;
            }
            local[axis] = 0;
        }
    }
}

fn row_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; shape.len()];
    for d in (0..shape.len().saturating_sub(1)).rev() {
        strides[d] = strides[d + 1] * shape[d + 1];
    }
    strides
}
