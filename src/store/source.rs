// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::Arc;

use super::StoreError;

/// Random-access bytes for single-file formats.
///
/// Local files are read on demand; remote files are fetched once and held in memory.
#[derive(Debug, Clone)]
pub enum ByteSource {
    File(PathBuf),
    Memory { name: String, bytes: Arc<Vec<u8>> },
}

impl ByteSource {
    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Memory { name, .. } => name.clone(),
        }
    }

    pub fn len(&self) -> Result<u64, StoreError> {
        match self {
            Self::File(path) => std::fs::metadata(path)
                .map(|meta| meta.len())
                .map_err(|source| StoreError::Io { path: path.clone(), source }),
            Self::Memory { bytes, .. } => Ok(bytes.len() as u64),
        }
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Reads up to `len` bytes at `offset`; shorter only at end of input.
    pub fn read_at(&self, offset: u64, len: usize) -> Result<Vec<u8>, StoreError> {
        match self {
            Self::File(path) => {
                let io_err = |source: io::Error| StoreError::Io { path: path.clone(), source };
                let mut file = File::open(path).map_err(io_err)?;
                file.seek(SeekFrom::Start(offset)).map_err(io_err)?;
                let mut buf = Vec::with_capacity(len);
                file.take(len as u64).read_to_end(&mut buf).map_err(io_err)?;
                Ok(buf)
            }
            Self::Memory { bytes, .. } => {
                let start = usize::try_from(offset).unwrap_or(usize::MAX).min(bytes.len());
                let end = start.saturating_add(len).min(bytes.len());
                Ok(bytes[start..end].to_vec())
            }
        }
    }

    /// Reads exactly `len` bytes at `offset`.
    pub fn read_exact_at(&self, offset: u64, len: usize) -> Result<Vec<u8>, StoreError> {
        let buf = self.read_at(offset, len)?;
        if buf.len() != len {
            return Err(StoreError::Truncated {
                source_name: self.describe(),
                offset,
                wanted: len,
                got: buf.len(),
            });
        }
        Ok(buf)
    }

    /// Sequential reader from the start of the input, for header parsing.
    pub fn reader(&self) -> Result<Box<dyn Read + '_>, StoreError> {
        match self {
            Self::File(path) => {
                let file = File::open(path)
                    .map_err(|source| StoreError::Io { path: path.clone(), source })?;
                Ok(Box::new(io::BufReader::new(file)))
            }
            Self::Memory { bytes, .. } => Ok(Box::new(io::Cursor::new(bytes.as_slice()))),
        }
    }

    /// Reads every `(offset, len)` range exactly and concatenates them, opening the file once.
    pub fn read_ranges(&self, ranges: &[(u64, usize)]) -> Result<Vec<u8>, StoreError> {
        let total = ranges.iter().map(|(_, len)| *len).sum();
        let mut out = Vec::with_capacity(total);
        match self {
            Self::File(path) => {
                let io_err = |source: io::Error| StoreError::Io { path: path.clone(), source };
                let mut file = File::open(path).map_err(io_err)?;
                for &(offset, len) in ranges {
                    file.seek(SeekFrom::Start(offset)).map_err(io_err)?;
                    let before = out.len();
                    (&mut file).take(len as u64).read_to_end(&mut out).map_err(io_err)?;
                    self.check_range(offset, len, out.len() - before)?;
                }
            }
            Self::Memory { bytes, .. } => {
                for &(offset, len) in ranges {
                    let start = usize::try_from(offset).unwrap_or(usize::MAX).min(bytes.len());
                    let end = start.saturating_add(len).min(bytes.len());
                    self.check_range(offset, len, end - start)?;
                    out.extend_from_slice(&bytes[start..end]);
                }
            }
        }
        Ok(out)
    }

    fn check_range(&self, offset: u64, wanted: usize, got: usize) -> Result<(), StoreError> {
        if got == wanted {
            return Ok(());
        }
        Err(StoreError::Truncated { source_name: self.describe(), offset, wanted, got })
    }
}
