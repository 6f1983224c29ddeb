// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Classic NetCDF header grammar (CDF-1, CDF-2, CDF-5). All integers are big-endian.

use std::io::Read;

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use smol_str::SmolStr;

use super::NetCdfError;
use crate::model::{AttrValue, Attrs, DType};
use crate::model::values::nul_terminated;

const NC_DIMENSION: u32 = 0x0A;
const NC_VARIABLE: u32 = 0x0B;
const NC_ATTRIBUTE: u32 = 0x0C;

const STREAMING_32: u64 = 0xFFFF_FFFF;
const STREAMING_64: u64 = u64::MAX;

// Guards allocation against corrupt counts; real headers stay far below this.
const MAX_PREALLOC: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Version {
    /// CDF-1
    Classic,
    /// CDF-2
    Offset64,
    /// CDF-5
    Data64,
}

impl Version {
    fn from_byte(byte: u8) -> Result<Self, NetCdfError> {
        match byte {
            1 => Ok(Self::Classic),
            2 => Ok(Self::Offset64),
            5 => Ok(Self::Data64),
            other => Err(NetCdfError::UnsupportedVersion(other)),
        }
    }

    fn read_count<R: Read>(self, reader: &mut R) -> Result<u64, NetCdfError> {
        Ok(match self {
            Self::Data64 => reader.read_u64::<BigEndian>()?,
            Self::Classic | Self::Offset64 => u64::from(reader.read_u32::<BigEndian>()?),
        })
    }

    fn read_offset<R: Read>(self, reader: &mut R) -> Result<u64, NetCdfError> {
        Ok(match self {
            Self::Classic => u64::from(reader.read_u32::<BigEndian>()?),
            Self::Offset64 | Self::Data64 => reader.read_u64::<BigEndian>()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NcType {
    Byte,
    Char,
    Short,
    Int,
    Float,
    Double,
    UByte,
    UShort,
    UInt,
    Int64,
    UInt64,
}

impl NcType {
    fn from_code(code: u32, version: Version) -> Result<Self, NetCdfError> {
        let ty = match code {
            1 => Self::Byte,
            2 => Self::Char,
            3 => Self::Short,
            4 => Self::Int,
            5 => Self::Float,
            6 => Self::Double,
            7 => Self::UByte,
            8 => Self::UShort,
            9 => Self::UInt,
            10 => Self::Int64,
            11 => Self::UInt64,
            other => return Err(NetCdfError::UnknownType(other)),
        };
        if code > 6 && version != Version::Data64 {
            return Err(NetCdfError::UnknownType(code));
        }
        Ok(ty)
    }

    pub(crate) fn size(self) -> usize {
        match self {
            Self::Byte | Self::Char | Self::UByte => 1,
            Self::Short | Self::UShort => 2,
            Self::Int | Self::UInt | Self::Float => 4,
            Self::Double | Self::Int64 | Self::UInt64 => 8,
        }
    }

    pub(crate) fn dtype(self) -> DType {
        match self {
            Self::Byte => DType::Int8,
            Self::Char => DType::Bytes(1),
            Self::Short => DType::Int16,
            Self::Int => DType::Int32,
            Self::Float => DType::Float32,
            Self::Double => DType::Float64,
            Self::UByte => DType::UInt8,
            Self::UShort => DType::UInt16,
            Self::UInt => DType::UInt32,
            Self::Int64 => DType::Int64,
            Self::UInt64 => DType::UInt64,
        }
    }

    /// Appends `bytes` decoded as big-endian values of this type, widened to f64.
    pub(crate) fn decode_into(self, bytes: &[u8], out: &mut Vec<f64>) {
        let size = self.size();
        out.reserve(bytes.len() / size);
        let chunks = bytes.chunks_exact(size);
        match self {
            Self::Byte => out.extend(bytes.iter().map(|b| f64::from(*b as i8))),
            Self::Char | Self::UByte => out.extend(bytes.iter().map(|b| f64::from(*b))),
            Self::Short => out.extend(chunks.map(|c| f64::from(BigEndian::read_i16(c)))),
            Self::UShort => out.extend(chunks.map(|c| f64::from(BigEndian::read_u16(c)))),
            Self::Int => out.extend(chunks.map(|c| f64::from(BigEndian::read_i32(c)))),
            Self::UInt => out.extend(chunks.map(|c| f64::from(BigEndian::read_u32(c)))),
            Self::Float => out.extend(chunks.map(|c| f64::from(BigEndian::read_f32(c)))),
            Self::Double => out.extend(chunks.map(BigEndian::read_f64)),
            Self::Int64 => out.extend(chunks.map(|c| BigEndian::read_i64(c) as f64)),
            Self::UInt64 => out.extend(chunks.map(|c| BigEndian::read_u64(c) as f64)),
        }
    }

    fn decode_attr(self, bytes: &[u8]) -> AttrValue {
        let size = self.size();
        let chunks = bytes.chunks_exact(size);
        match self {
            Self::Char => AttrValue::Text(nul_terminated(bytes)),
            Self::Byte => AttrValue::Int(bytes.iter().map(|b| i64::from(*b as i8)).collect()),
            Self::Short => {
                AttrValue::Int(chunks.map(|c| i64::from(BigEndian::read_i16(c))).collect())
            }
            Self::Int => {
                AttrValue::Int(chunks.map(|c| i64::from(BigEndian::read_i32(c))).collect())
            }
            Self::Int64 => AttrValue::Int(chunks.map(BigEndian::read_i64).collect()),
            Self::UByte => AttrValue::UInt(bytes.iter().map(|b| u64::from(*b)).collect()),
            Self::UShort => {
                AttrValue::UInt(chunks.map(|c| u64::from(BigEndian::read_u16(c))).collect())
            }
            Self::UInt => {
                AttrValue::UInt(chunks.map(|c| u64::from(BigEndian::read_u32(c))).collect())
            }
            Self::UInt64 => AttrValue::UInt(chunks.map(BigEndian::read_u64).collect()),
            Self::Float | Self::Double => {
                let mut values = Vec::new();
                self.decode_into(bytes, &mut values);
                AttrValue::Float(values)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Dimension {
    pub(crate) name: SmolStr,
    /// Zero for the unlimited (record) dimension.
    pub(crate) len: u64,
}

impl Dimension {
    pub(crate) fn is_unlimited(&self) -> bool {
        self.len == 0
    }
}

#[derive(Debug, Clone)]
pub(crate) struct VarHeader {
    pub(crate) name: SmolStr,
    pub(crate) dim_ids: Vec<usize>,
    pub(crate) attrs: Attrs,
    pub(crate) nc_type: NcType,
    pub(crate) begin: u64,
}

#[derive(Debug, Clone)]
pub(crate) struct Header {
    pub(crate) version: Version,
    /// `None` when the writer left the record count as "streaming".
    pub(crate) numrecs: Option<u64>,
    pub(crate) dims: Vec<Dimension>,
    pub(crate) attrs: Attrs,
    pub(crate) vars: Vec<VarHeader>,
}

pub(crate) fn parse_header<R: Read>(reader: &mut R) -> Result<Header, NetCdfError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic[..3] != b"CDF" {
        return Err(NetCdfError::BadMagic);
    }
    let version = Version::from_byte(magic[3])?;

    let numrecs = version.read_count(reader)?;
    let numrecs = match (version, numrecs) {
        (Version::Data64, STREAMING_64) => None,
        (Version::Classic | Version::Offset64, STREAMING_32) => None,
        (_, n) => Some(n),
    };

    let dims = read_list(reader, version, NC_DIMENSION, |reader| {
        let name = read_name(reader, version)?;
        let len = version.read_count(reader)?;
        Ok(Dimension { name, len })
    })?;
    let attrs = read_attrs(reader, version)?;
    let vars =
        read_list(reader, version, NC_VARIABLE, |reader| read_var(reader, version, dims.len()))?;

    Ok(Header { version, numrecs, dims, attrs, vars })
}

fn read_list<R, T, F>(
    reader: &mut R,
    version: Version,
    expected: u32,
    mut item: F,
) -> Result<Vec<T>, NetCdfError>
where
    R: Read,
    F: FnMut(&mut R) -> Result<T, NetCdfError>,
{
    let tag = reader.read_u32::<BigEndian>()?;
    let count = version.read_count(reader)?;
    match tag {
        0 if count == 0 => return Ok(Vec::new()),
        tag if tag == expected => {}
        found => return Err(NetCdfError::UnexpectedTag { expected, found }),
    }
    let count = usize::try_from(count).map_err(|_| NetCdfError::TooLarge("list".into()))?;
    let mut items = Vec::with_capacity(count.min(MAX_PREALLOC));
    for _ in 0..count {
        items.push(item(reader)?);
    }
    Ok(items)
}

fn read_attrs<R: Read>(reader: &mut R, version: Version) -> Result<Attrs, NetCdfError> {
    let pairs = read_list(reader, version, NC_ATTRIBUTE, |reader| {
        let name = read_name(reader, version)?;
        let nc_type = NcType::from_code(reader.read_u32::<BigEndian>()?, version)?;
        let count = version.read_count(reader)?;
        let len = count
            .checked_mul(nc_type.size() as u64)
            .ok_or_else(|| NetCdfError::TooLarge(name.to_string()))?;
        let bytes = read_padded(reader, len)?;
        Ok((name, nc_type.decode_attr(&bytes)))
    })?;
    Ok(pairs.into_iter().collect())
}

fn read_var<R: Read>(
    reader: &mut R,
    version: Version,
    ndims: usize,
) -> Result<VarHeader, NetCdfError> {
    let name = read_name(reader, version)?;
    let rank = version.read_count(reader)?;
    let mut dim_ids = Vec::with_capacity((rank as usize).min(MAX_PREALLOC));
    for _ in 0..rank {
        let id = version.read_count(reader)?;
        let id = usize::try_from(id).ok().filter(|id| *id < ndims).ok_or_else(|| {
            NetCdfError::BadDimension { variable: name.to_string(), dim_id: id }
        })?;
        dim_ids.push(id);
    }
    let attrs = read_attrs(reader, version)?;
    let nc_type = NcType::from_code(reader.read_u32::<BigEndian>()?, version)?;
    // vsize is recomputed from the shape; the stored value saturates for large variables.
    let _vsize = version.read_count(reader)?;
    let begin = version.read_offset(reader)?;
    Ok(VarHeader { name, dim_ids, attrs, nc_type, begin })
}

fn read_name<R: Read>(reader: &mut R, version: Version) -> Result<SmolStr, NetCdfError> {
    let len = version.read_count(reader)?;
    let bytes = read_padded(reader, len)?;
    let name = String::from_utf8(bytes).map_err(|_| NetCdfError::InvalidName)?;
    if name.is_empty() {
        return Err(NetCdfError::InvalidName);
    }
    Ok(SmolStr::new(name))
}

/// Reads `len` bytes and skips the zero padding up to the next 4-byte boundary.
fn read_padded<R: Read>(reader: &mut R, len: u64) -> Result<Vec<u8>, NetCdfError> {
    let mut bytes = Vec::new();
    reader.by_ref().take(len).read_to_end(&mut bytes)?;
    if bytes.len() as u64 != len {
        return Err(NetCdfError::UnexpectedEof);
    }
    let mut pad = [0u8; 3];
    let pad_len = ((4 - len % 4) % 4) as usize;
    reader.read_exact(&mut pad[..pad_len])?;
    Ok(bytes)
}
