// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::Deserialize;
use serde_json::Value;

use super::ZarrError;
use crate::model::{AttrValue, Attrs, DType};
use crate::model::values::nul_terminated;

/// Attribute holding xarray's dimension names for an array.
pub(crate) const ARRAY_DIMENSIONS: &str = "_ARRAY_DIMENSIONS";

#[derive(Debug, Deserialize)]
struct RawArrayMeta {
    zarr_format: u64,
    shape: Vec<usize>,
    chunks: Vec<usize>,
    dtype: Value,
    compressor: Option<RawCompressor>,
    #[serde(default)]
    fill_value: Value,
    #[serde(default = "default_order")]
    order: String,
    #[serde(default)]
    filters: Option<Vec<Value>>,
    #[serde(default)]
    dimension_separator: Option<String>,
}

fn default_order() -> String {
    "C".to_owned()
}

#[derive(Debug, Deserialize)]
struct RawCompressor {
    id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Endian {
    Little,
    Big,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Int,
    UInt,
    Float,
    Bool,
    /// Fixed-width bytes (`S`).
    Bytes,
    /// Fixed-width UTF-32 (`U`), `size` counts characters.
    Unicode,
}

/// A numpy-style typestr such as `<f8` or `|S12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ZarrDType {
    pub(crate) endian: Endian,
    pub(crate) kind: Kind,
    pub(crate) size: usize,
}

impl ZarrDType {
    pub(crate) fn parse(raw: &str) -> Result<Self, ZarrError> {
        let unsupported = || ZarrError::UnsupportedDType(raw.to_owned());
        let mut chars = raw.chars();
        let endian = match chars.next() {
            Some('<') | Some('|') => Endian::Little,
            Some('>') => Endian::Big,
            _ => return Err(unsupported()),
        };
        let kind = match chars.next() {
            Some('i') => Kind::Int,
            Some('u') => Kind::UInt,
            Some('f') => Kind::Float,
            Some('b') => Kind::Bool,
            Some('S') => Kind::Bytes,
            Some('U') => Kind::Unicode,
            _ => return Err(unsupported()),
        };
        let size: usize = chars.as_str().parse().map_err(|_| unsupported())?;
        let valid = match kind {
            Kind::Int | Kind::UInt => matches!(size, 1 | 2 | 4 | 8),
            Kind::Float => matches!(size, 4 | 8),
            Kind::Bool => size == 1,
            Kind::Bytes | Kind::Unicode => size > 0,
        };
        if !valid {
            return Err(unsupported());
        }
        Ok(Self { endian, kind, size })
    }

    /// Bytes per element.
    pub(crate) fn item_size(self) -> usize {
        match self.kind {
            Kind::Unicode => self.size * 4,
            _ => self.size,
        }
    }

    pub(crate) fn is_text(self) -> bool {
        matches!(self.kind, Kind::Bytes | Kind::Unicode)
    }

    pub(crate) fn dtype(self) -> DType {
        match (self.kind, self.size) {
            (Kind::Int, 1) => DType::Int8,
            (Kind::Int, 2) => DType::Int16,
            (Kind::Int, 4) => DType::Int32,
            (Kind::Int, _) => DType::Int64,
            (Kind::UInt, 1) => DType::UInt8,
            (Kind::UInt, 2) => DType::UInt16,
            (Kind::UInt, 4) => DType::UInt32,
            (Kind::UInt, _) => DType::UInt64,
            (Kind::Float, 4) => DType::Float32,
            (Kind::Float, _) => DType::Float64,
            (Kind::Bool, _) => DType::Bool,
            (Kind::Bytes | Kind::Unicode, _) => DType::Str,
        }
    }

    pub(crate) fn decode_numeric(self, bytes: &[u8], out: &mut Vec<f64>) {
        match self.endian {
            Endian::Little => decode_with::<LittleEndian>(self, bytes, out),
            Endian::Big => decode_with::<BigEndian>(self, bytes, out),
        }
    }

    pub(crate) fn decode_text(self, bytes: &[u8], out: &mut Vec<String>) {
        let item = self.item_size();
        for chunk in bytes.chunks_exact(item) {
            let text = match self.kind {
                Kind::Unicode => chunk
                    .chunks_exact(4)
                    .map(|c| match self.endian {
                        Endian::Little => LittleEndian::read_u32(c),
                        Endian::Big => BigEndian::read_u32(c),
                    })
                    .take_while(|code| *code != 0)
                    .filter_map(char::from_u32)
                    .collect(),
                _ => nul_terminated(chunk),
            };
            out.push(text);
        }
    }
}

fn decode_with<B: ByteOrder>(dtype: ZarrDType, bytes: &[u8], out: &mut Vec<f64>) {
    let chunks = bytes.chunks_exact(dtype.size);
    out.reserve(bytes.len() / dtype.size.max(1));
    match (dtype.kind, dtype.size) {
        (Kind::Int, 1) => out.extend(bytes.iter().map(|b| f64::from(*b as i8))),
        (Kind::UInt | Kind::Bool, 1) => out.extend(bytes.iter().map(|b| f64::from(*b))),
        (Kind::Int, 2) => out.extend(chunks.map(|c| f64::from(B::read_i16(c)))),
        (Kind::Int, 4) => out.extend(chunks.map(|c| f64::from(B::read_i32(c)))),
        (Kind::Int, _) => out.extend(chunks.map(|c| B::read_i64(c) as f64)),
        (Kind::UInt, 2) => out.extend(chunks.map(|c| f64::from(B::read_u16(c)))),
        (Kind::UInt, 4) => out.extend(chunks.map(|c| f64::from(B::read_u32(c)))),
        (Kind::UInt, _) => out.extend(chunks.map(|c| B::read_u64(c) as f64)),
        (Kind::Float, 4) => out.extend(chunks.map(|c| f64::from(B::read_f32(c)))),
        (Kind::Float, _) => out.extend(chunks.map(B::read_f64)),
        (Kind::Bool | Kind::Bytes | Kind::Unicode, _) => {}
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Compressor {
    None,
    Zlib,
    Gzip,
}

/// Parsed `.zarray` document.
#[derive(Debug, Clone)]
pub(crate) struct ArrayMeta {
    pub(crate) shape: Vec<usize>,
    pub(crate) chunks: Vec<usize>,
    pub(crate) dtype: ZarrDType,
    pub(crate) compressor: Compressor,
    pub(crate) fill_value: Option<f64>,
    pub(crate) separator: char,
}

impl ArrayMeta {
    pub(crate) fn from_json(key: &str, value: Value) -> Result<Self, ZarrError> {
        let raw: RawArrayMeta = serde_json::from_value(value)
            .map_err(|source| ZarrError::Json { key: key.to_owned(), source })?;
        let invalid = |reason: &str| ZarrError::InvalidMetadata {
            key: key.to_owned(),
            reason: reason.to_owned(),
        };

        if raw.zarr_format != 2 {
            return Err(ZarrError::UnsupportedFormat(raw.zarr_format));
        }
        if raw.shape.len() != raw.chunks.len() {
            return Err(invalid("shape and chunks have different lengths"));
        }
        if raw.chunks.iter().any(|chunk| *chunk == 0) {
            return Err(invalid("chunk sizes must be positive"));
        }
        if raw.order != "C" {
            return Err(ZarrError::UnsupportedOrder(raw.order));
        }
        if raw.filters.as_ref().is_some_and(|filters| !filters.is_empty()) {
            return Err(ZarrError::UnsupportedFilters(key.to_owned()));
        }
        let dtype = match &raw.dtype {
            Value::String(typestr) => ZarrDType::parse(typestr)?,
            other => return Err(ZarrError::UnsupportedDType(other.to_string())),
        };
        let compressor = match raw.compressor.as_ref().map(|c| c.id.as_str()) {
            None => Compressor::None,
            Some("zlib") => Compressor::Zlib,
            Some("gzip") => Compressor::Gzip,
            Some(other) => return Err(ZarrError::UnsupportedCompressor(other.to_owned())),
        };
        let separator = match raw.dimension_separator.as_deref() {
            None | Some(".") => '.',
            Some("/") => '/',
            Some(_) => return Err(invalid("dimension_separator must be '.' or '/'")),
        };

        Ok(Self {
            shape: raw.shape,
            chunks: raw.chunks,
            dtype,
            compressor,
            fill_value: parse_fill_value(&raw.fill_value),
            separator,
        })
    }

    /// Value used for chunks that are not stored.
    pub(crate) fn missing_value(&self) -> f64 {
        match (self.fill_value, self.dtype.kind) {
            (Some(fill), _) => fill,
            (None, Kind::Float) => f64::NAN,
            (None, _) => 0.0,
        }
    }

    /// Number of chunks along each dimension.
    pub(crate) fn grid(&self) -> Vec<usize> {
        self.shape.iter().zip(&self.chunks).map(|(len, chunk)| len.div_ceil(*chunk)).collect()
    }

    pub(crate) fn chunk_len(&self) -> usize {
        self.chunks.iter().product()
    }

    pub(crate) fn chunk_key(&self, index: &[usize]) -> String {
        if index.is_empty() {
            return "0".to_owned();
        }
        let mut key = String::new();
        for (pos, i) in index.iter().enumerate() {
            if pos > 0 {
                key.push(self.separator);
            }
            key.push_str(itoa::Buffer::new().format(*i));
        }
        key
    }
}

fn parse_fill_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        Value::String(text) => match text.as_str() {
            "NaN" => Some(f64::NAN),
            "Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            _ => None,
        },
        _ => None,
    }
}

/// Converts a `.zattrs` document, dropping `_ARRAY_DIMENSIONS`.
pub(crate) fn attrs_from_json(value: &Value) -> Attrs {
    let Value::Object(map) = value else {
        return Attrs::new();
    };
    map.iter()
        .filter(|(name, _)| name.as_str() != ARRAY_DIMENSIONS)
        .map(|(name, value)| (name.as_str(), attr_value(value)))
        .collect()
}

fn attr_value(value: &Value) -> AttrValue {
    match value {
        Value::String(text) => AttrValue::Text(text.clone()),
        Value::Bool(flag) => AttrValue::Int(vec![i64::from(*flag)]),
        Value::Number(number) => number_attr(std::slice::from_ref(value)).unwrap_or_else(|| {
            AttrValue::Text(number.to_string())
        }),
        Value::Array(items) => number_attr(items).unwrap_or_else(|| {
            if items.iter().all(Value::is_string) {
                let joined: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                AttrValue::Text(joined.join(", "))
            } else {
                AttrValue::Text(value.to_string())
            }
        }),
        Value::Null | Value::Object(_) => AttrValue::Text(value.to_string()),
    }
}

fn number_attr(items: &[Value]) -> Option<AttrValue> {
    if items.is_empty() || !items.iter().all(Value::is_number) {
        return None;
    }
    if let Some(ints) = items.iter().map(Value::as_i64).collect::<Option<Vec<_>>>() {
        return Some(AttrValue::Int(ints));
    }
    if let Some(uints) = items.iter().map(Value::as_u64).collect::<Option<Vec<_>>>() {
        return Some(AttrValue::UInt(uints));
    }
    items.iter().map(Value::as_f64).collect::<Option<Vec<_>>>().map(AttrValue::Float)
}

/// Dimension names from `_ARRAY_DIMENSIONS`, if present and of the right rank.
pub(crate) fn array_dimensions(attrs: &Value, ndim: usize) -> Option<Vec<String>> {
    let names = attrs.get(ARRAY_DIMENSIONS)?.as_array()?;
    if names.len() != ndim {
        return None;
    }
    names.iter().map(|name| name.as_str().map(str::to_owned)).collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::{array_dimensions, attrs_from_json, ArrayMeta, Compressor, Endian, Kind, ZarrDType};
    use crate::format::zarr::ZarrError;
    use crate::model::{AttrValue, DType};

    #[rstest]
    #[case("<f8", Endian::Little, Kind::Float, 8, DType::Float64)]
    #[case(">f4", Endian::Big, Kind::Float, 4, DType::Float32)]
    #[case("|u1", Endian::Little, Kind::UInt, 1, DType::UInt8)]
    #[case("<i2", Endian::Little, Kind::Int, 2, DType::Int16)]
    #[case("|b1", Endian::Little, Kind::Bool, 1, DType::Bool)]
    #[case("|S12", Endian::Little, Kind::Bytes, 12, DType::Str)]
    fn typestr_parsing(
        #[case] raw: &str,
        #[case] endian: Endian,
        #[case] kind: Kind,
        #[case] size: usize,
        #[case] dtype: DType,
    ) {
        let parsed = ZarrDType::parse(raw).expect("dtype");
        assert_eq!(parsed, ZarrDType { endian, kind, size });
        assert_eq!(parsed.dtype(), dtype);
    }

    #[rstest]
    #[case("<f2")]
    #[case("<c16")]
    #[case("f8")]
    #[case("<M8[ns]")]
    fn unsupported_typestrs(#[case] raw: &str) {
        assert!(matches!(ZarrDType::parse(raw), Err(ZarrError::UnsupportedDType(_))));
    }

    #[test]
    fn big_endian_and_unicode_decode() {
        let mut numbers = Vec::new();
        ZarrDType::parse(">i4")
            .expect("dtype")
            .decode_numeric(&[0, 0, 1, 0, 255, 255, 255, 255], &mut numbers);
        assert_eq!(numbers, vec![256.0, -1.0]);

        let mut text = Vec::new();
        let bytes = [b'h', 0, 0, 0, b'i', 0, 0, 0, 0, 0, 0, 0];
        ZarrDType::parse("<U3").expect("dtype").decode_text(&bytes, &mut text);
        assert_eq!(text, vec!["hi".to_owned()]);
    }

    #[test]
    fn array_meta_reads_compressor_and_fill() {
        let meta = ArrayMeta::from_json(
            "t/.zarray",
            json!({
                "zarr_format": 2,
                "shape": [5, 4],
                "chunks": [2, 4],
                "dtype": "<f4",
                "compressor": {"id": "zlib", "level": 1},
                "fill_value": "NaN",
                "order": "C",
                "filters": null,
                "dimension_separator": "/"
            }),
        )
        .expect("meta");

        assert_eq!(meta.compressor, Compressor::Zlib);
        assert!(meta.missing_value().is_nan());
        assert_eq!(meta.grid(), vec![3, 1]);
        assert_eq!(meta.chunk_key(&[2, 0]), "2/0");
    }

    #[rstest]
    #[case(json!({"zarr_format": 3, "shape": [1], "chunks": [1], "dtype": "<f8", "compressor": null, "fill_value": 0, "order": "C", "filters": null}))]
    #[case(json!({"zarr_format": 2, "shape": [1], "chunks": [1], "dtype": "<f8", "compressor": null, "fill_value": 0, "order": "F", "filters": null}))]
    #[case(json!({"zarr_format": 2, "shape": [1], "chunks": [1], "dtype": "<f8", "compressor": {"id": "blosc"}, "fill_value": 0, "order": "C", "filters": null}))]
    #[case(json!({"zarr_format": 2, "shape": [1], "chunks": [1], "dtype": "<f8", "compressor": null, "fill_value": 0, "order": "C", "filters": [{"id": "delta"}]}))]
    fn array_meta_rejects_unsupported_layouts(#[case] value: serde_json::Value) {
        assert!(ArrayMeta::from_json(".zarray", value).is_err());
    }

    #[test]
    fn null_fill_defaults_by_kind() {
        let meta = |dtype: &str| {
            ArrayMeta::from_json(
                ".zarray",
                json!({"zarr_format": 2, "shape": [], "chunks": [], "dtype": dtype,
                       "compressor": null, "fill_value": null, "order": "C", "filters": null}),
            )
            .expect("meta")
        };
        assert!(meta("<f8").missing_value().is_nan());
        assert_eq!(meta("<i4").missing_value(), 0.0);
        assert_eq!(meta("<i4").chunk_key(&[]), "0");
    }

    #[test]
    fn attrs_drop_dimension_names() {
        let value = json!({
            "_ARRAY_DIMENSIONS": ["time", "lat"],
            "units": "K",
            "valid_range": [0, 400],
            "scale_factor": 0.01,
            "flags": ["a", "b"]
        });
        let attrs = attrs_from_json(&value);

        assert_eq!(attrs.len(), 4);
        assert_eq!(attrs.text("units"), Some("K"));
        assert_eq!(attrs.get("valid_range"), Some(&AttrValue::Int(vec![0, 400])));
        assert_eq!(attrs.get("scale_factor"), Some(&AttrValue::Float(vec![0.01])));
        assert_eq!(attrs.text("flags"), Some("a, b"));
        assert_eq!(array_dimensions(&value, 2), Some(vec!["time".to_owned(), "lat".to_owned()]));
        assert_eq!(array_dimensions(&value, 3), None);
    }
}
