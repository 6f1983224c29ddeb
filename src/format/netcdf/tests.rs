// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use byteorder::{BigEndian, WriteBytesExt};
use rstest::rstest;

use super::{read_tree, Extent, NetCdfBackend, NetCdfError, HDF5_SIGNATURE};
use crate::backend::{Backend, LoadContext, LoadError};
use crate::model::{AttrValue, DType};
use crate::store::{ByteSource, Location};
use crate::test_utils::TempDir;

const NC_CHAR: u32 = 2;
const NC_SHORT: u32 = 3;
const NC_INT: u32 = 4;
const NC_FLOAT: u32 = 5;
const NC_DOUBLE: u32 = 6;
const NC_UBYTE: u32 = 7;
const NC_UINT64: u32 = 11;

struct Var {
    name: &'static str,
    dims: Vec<u32>,
    nc_type: u32,
    attrs: Vec<(&'static str, u32, Vec<u8>)>,
    /// Encoded payload; for record variables one entry per record.
    data: Vec<Vec<u8>>,
}

/// Minimal classic writer for format `version` 1, 2 or 5: non-record data follows the header,
/// then interleaved records.
struct Cdf {
    version: u8,
    dims: Vec<(&'static str, u32)>,
    gatts: Vec<(&'static str, u32, Vec<u8>)>,
    vars: Vec<Var>,
    numrecs: u32,
}

fn encode(nc_type: u32, values: &[f64]) -> Vec<u8> {
    let mut out = Vec::new();
    for v in values {
        match nc_type {
            NC_SHORT => out.write_i16::<BigEndian>(*v as i16).expect("write"),
            NC_INT => out.write_i32::<BigEndian>(*v as i32).expect("write"),
            NC_FLOAT => out.write_f32::<BigEndian>(*v as f32).expect("write"),
            NC_DOUBLE => out.write_f64::<BigEndian>(*v).expect("write"),
            NC_UBYTE => out.write_u8(*v as u8).expect("write"),
            NC_UINT64 => out.write_u64::<BigEndian>(*v as u64).expect("write"),
            other => panic!("unsupported test type {other}"),
        }
    }
    out
}

fn pad(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

/// Counts and lengths widen to 64 bits in CDF-5.
fn put_count(out: &mut Vec<u8>, version: u8, n: u64) {
    if version == 5 {
        out.write_u64::<BigEndian>(n).expect("write");
    } else {
        out.write_u32::<BigEndian>(n as u32).expect("write");
    }
}

fn put_name(out: &mut Vec<u8>, version: u8, name: &str) {
    put_count(out, version, name.len() as u64);
    out.extend_from_slice(name.as_bytes());
    pad(out);
}

fn put_attrs(out: &mut Vec<u8>, version: u8, attrs: &[(&str, u32, Vec<u8>)]) {
    if attrs.is_empty() {
        out.write_u32::<BigEndian>(0).expect("write");
        put_count(out, version, 0);
        return;
    }
    out.write_u32::<BigEndian>(0x0C).expect("write");
    put_count(out, version, attrs.len() as u64);
    for (name, nc_type, bytes) in attrs {
        put_name(out, version, name);
        out.write_u32::<BigEndian>(*nc_type).expect("write");
        let size = match *nc_type {
            NC_CHAR | NC_UBYTE => 1,
            NC_SHORT => 2,
            NC_DOUBLE | NC_UINT64 => 8,
            _ => 4,
        };
        put_count(out, version, (bytes.len() / size) as u64);
        out.extend_from_slice(bytes);
        pad(out);
    }
}

impl Cdf {
    fn is_record(&self, var: &Var) -> bool {
        var.dims.first().is_some_and(|id| self.dims[*id as usize].1 == 0)
    }

    fn header(&self, begins: &[u64]) -> Vec<u8> {
        let version = self.version;
        let mut out = b"CDF".to_vec();
        out.push(version);
        put_count(&mut out, version, u64::from(self.numrecs));
        out.write_u32::<BigEndian>(0x0A).expect("write");
        put_count(&mut out, version, self.dims.len() as u64);
        for (name, len) in &self.dims {
            put_name(&mut out, version, name);
            put_count(&mut out, version, u64::from(*len));
        }
        put_attrs(&mut out, version, &self.gatts);
        out.write_u32::<BigEndian>(0x0B).expect("write");
        put_count(&mut out, version, self.vars.len() as u64);
        for (var, begin) in self.vars.iter().zip(begins) {
            put_name(&mut out, version, var.name);
            put_count(&mut out, version, var.dims.len() as u64);
            for id in &var.dims {
                put_count(&mut out, version, u64::from(*id));
            }
            put_attrs(&mut out, version, &var.attrs);
            out.write_u32::<BigEndian>(var.nc_type).expect("write");
            let vsize = var.data.first().map_or(0, |slab| slab.len().div_ceil(4) * 4);
            put_count(&mut out, version, vsize as u64);
            if version == 1 {
                out.write_u32::<BigEndian>(*begin as u32).expect("write");
            } else {
                out.write_u64::<BigEndian>(*begin).expect("write");
            }
        }
        out
    }

    fn build(&self) -> Vec<u8> {
        let header_len = self.header(&vec![0; self.vars.len()]).len();
        let record_count = self.vars.iter().filter(|var| self.is_record(var)).count();
        let slab_len = |var: &Var| {
            let len = var.data.first().map_or(0, Vec::len);
            if record_count == 1 {
                len
            } else {
                len.div_ceil(4) * 4
            }
        };

        let mut begins = vec![0u64; self.vars.len()];
        let mut offset = header_len;
        for (i, var) in self.vars.iter().enumerate() {
            if !self.is_record(var) {
                begins[i] = offset as u64;
                offset += var.data[0].len().div_ceil(4) * 4;
            }
        }
        for (i, var) in self.vars.iter().enumerate() {
            if self.is_record(var) {
                begins[i] = offset as u64;
                offset += slab_len(var);
            }
        }

        let mut out = self.header(&begins);
        for var in self.vars.iter().filter(|var| !self.is_record(var)) {
            out.extend_from_slice(&var.data[0]);
            pad(&mut out);
        }
        for rec in 0..self.numrecs as usize {
            for var in self.vars.iter().filter(|var| self.is_record(var)) {
                let slab = &var.data[rec];
                out.extend_from_slice(slab);
                out.resize(out.len() + slab_len(var) - slab.len(), 0);
            }
        }
        out
    }
}

/// time(unlimited, 3 records), lat(2), name_len(4); coordinates, a packed record variable, a
/// float grid, and a char variable.
fn sample() -> Cdf {
    Cdf {
        version: 1,
        dims: vec![("time", 0), ("lat", 2), ("name_len", 4)],
        gatts: vec![("title", NC_CHAR, b"sample run".to_vec())],
        vars: vec![
            Var {
                name: "lat",
                dims: vec![1],
                nc_type: NC_FLOAT,
                attrs: vec![("units", NC_CHAR, b"degrees_north".to_vec())],
                data: vec![encode(NC_FLOAT, &[-45.0, 45.0])],
            },
            Var {
                name: "site",
                dims: vec![1, 2],
                nc_type: NC_CHAR,
                attrs: vec![],
                data: vec![b"abc\0wxyz".to_vec()],
            },
            Var {
                name: "time",
                dims: vec![0],
                nc_type: NC_DOUBLE,
                attrs: vec![("units", NC_CHAR, b"days".to_vec())],
                data: vec![
                    encode(NC_DOUBLE, &[0.0]),
                    encode(NC_DOUBLE, &[1.0]),
                    encode(NC_DOUBLE, &[2.0]),
                ],
            },
            Var {
                name: "temp",
                dims: vec![0, 1],
                nc_type: NC_SHORT,
                attrs: vec![
                    ("scale_factor", NC_FLOAT, encode(NC_FLOAT, &[0.5])),
                    ("add_offset", NC_FLOAT, encode(NC_FLOAT, &[100.0])),
                    ("_FillValue", NC_SHORT, encode(NC_SHORT, &[-999.0])),
                ],
                data: vec![
                    encode(NC_SHORT, &[0.0, 2.0]),
                    encode(NC_SHORT, &[4.0, -999.0]),
                    encode(NC_SHORT, &[6.0, 8.0]),
                ],
            },
        ],
        numrecs: 3,
    }
}

fn memory(bytes: Vec<u8>) -> ByteSource {
    ByteSource::Memory { name: "sample.nc".into(), bytes: Arc::new(bytes) }
}

#[test]
fn header_maps_to_single_group() {
    let tree = read_tree(&memory(sample().build()), "sample").expect("tree");

    assert_eq!(tree.name(), "sample");
    assert_eq!(tree.attrs().text("title"), Some("sample run"));
    let coords: Vec<_> = tree.coords().iter().map(|v| v.name()).collect();
    assert_eq!(coords, vec!["lat", "time"]);
    let vars: Vec<_> = tree.data_vars().iter().map(|v| v.name()).collect();
    assert_eq!(vars, vec!["site", "temp"]);
    assert_eq!(tree.dim_size("time"), Some(3));
    assert_eq!(tree.dim_size("lat"), Some(2));

    let temp = tree.variable("temp").expect("temp");
    assert_eq!(temp.shape(), &[3, 2]);
    assert_eq!(temp.dtype(), DType::Int16);
    assert_eq!(temp.nbytes(), 12);
    assert!(!temp.is_loaded());
}

#[test]
fn record_variable_applies_cf_decoding() {
    let tree = read_tree(&memory(sample().build()), "sample").expect("tree");
    let temp = tree.variable("temp").expect("temp");
    let values = temp.values().expect("values").to_f64_vec().expect("numeric");

    assert_eq!(&values[..3], &[100.0, 101.0, 102.0]);
    assert!(values[3].is_nan());
    assert_eq!(&values[4..], &[103.0, 104.0]);

    let time = tree.variable("time").expect("time");
    assert_eq!(time.values().expect("time").to_f64_vec(), Some(vec![0.0, 1.0, 2.0]));
}

#[test]
fn char_variable_collapses_last_dimension() {
    let tree = read_tree(&memory(sample().build()), "sample").expect("tree");
    let site = tree.variable("site").expect("site");

    assert_eq!(site.dims().iter().map(|dim| dim.as_str()).collect::<Vec<_>>(), vec!["lat"]);
    assert_eq!(site.dtype(), DType::Bytes(4));
    assert_eq!(site.dtype().to_string(), "|S4");
    assert_eq!(site.nbytes(), 8);
    let crate::model::ArrayValues::Text(names) = site.values().expect("values") else {
        panic!("expected text values");
    };
    assert_eq!(names.iter().cloned().collect::<Vec<_>>(), vec!["abc", "wxyz"]);
}

#[test]
fn record_extent_expands_one_range_per_record() {
    let extent = Extent::Records { begin: 100, slab: 8, stride: 24, count: 3 };
    assert_eq!(extent.ranges("v").expect("ranges"), vec![(100, 8), (124, 8), (148, 8)]);

    let empty = Extent::Records { begin: 100, slab: 8, stride: 24, count: 0 };
    assert_eq!(empty.ranges("v").expect("ranges"), Vec::new());
}

#[rstest]
#[case(Extent::Records { begin: u64::MAX - 10, slab: 4, stride: 8, count: 3 })]
#[case(Extent::Records { begin: 0, slab: 4, stride: u64::MAX / 2, count: 4 })]
#[case(Extent::Contiguous { begin: u64::MAX - 2, len: 8 })]
fn overflowing_extent_is_too_large(#[case] extent: Extent) {
    let err = extent.ranges("v").expect_err("overflow");
    assert!(matches!(err, NetCdfError::TooLarge(ref name) if name == "v"), "{err}");
}

#[test]
fn corrupt_record_offset_fails_on_load() {
    let mut cdf = sample();
    cdf.version = 2;
    let mut bytes = cdf.build();
    // `temp` is the last variable; its 64-bit begin closes the header.
    let header_len = cdf.header(&[0; 4]).len();
    bytes[header_len - 8..header_len].copy_from_slice(&(u64::MAX - 4).to_be_bytes());

    let tree = read_tree(&memory(bytes), "sample").expect("tree");
    let temp = tree.variable("temp").expect("temp");
    assert!(temp.values().is_err());
}

#[test]
fn streaming_record_count_uses_file_size() {
    let mut bytes = sample().build();
    bytes[4..8].copy_from_slice(&[0xFF; 4]);

    let tree = read_tree(&memory(bytes), "sample").expect("tree");
    assert_eq!(tree.dim_size("time"), Some(3));
}

#[test]
fn single_record_variable_is_not_padded() {
    let cdf = Cdf {
        version: 1,
        dims: vec![("t", 0)],
        gatts: vec![],
        vars: vec![Var {
            name: "flag",
            dims: vec![0],
            nc_type: NC_SHORT,
            attrs: vec![],
            data: [1.0, 2.0, 3.0].iter().map(|v| encode(NC_SHORT, &[*v])).collect(),
        }],
        numrecs: 3,
    };
    let tree = read_tree(&memory(cdf.build()), "flags").expect("tree");
    let flag = tree.variable("flag").expect("flag");
    assert_eq!(flag.values().expect("values").to_f64_vec(), Some(vec![1.0, 2.0, 3.0]));
}

#[test]
fn integer_attributes_keep_their_kind() {
    let cdf = Cdf {
        version: 1,
        dims: vec![],
        gatts: vec![("valid_range", NC_INT, encode(NC_INT, &[0.0, 10.0]))],
        vars: vec![],
        numrecs: 0,
    };
    let tree = read_tree(&memory(cdf.build()), "attrs").expect("tree");
    assert_eq!(tree.attrs().get("valid_range"), Some(&AttrValue::Int(vec![0, 10])));
}

#[rstest]
#[case(1, NC_DOUBLE, DType::Float64)]
#[case(2, NC_DOUBLE, DType::Float64)]
#[case(5, NC_DOUBLE, DType::Float64)]
#[case(5, NC_UINT64, DType::UInt64)]
#[case(5, NC_UBYTE, DType::UInt8)]
fn every_format_version_decodes(#[case] version: u8, #[case] nc_type: u32, #[case] dtype: DType) {
    let cdf = Cdf {
        version,
        dims: vec![("x", 3)],
        gatts: vec![("title", NC_CHAR, b"versions".to_vec())],
        vars: vec![Var {
            name: "v",
            dims: vec![0],
            nc_type,
            attrs: vec![("units", NC_CHAR, b"1".to_vec())],
            data: vec![encode(nc_type, &[7.0, 8.0, 9.0])],
        }],
        numrecs: 0,
    };
    let tree = read_tree(&memory(cdf.build()), "versions").expect("tree");
    assert_eq!(tree.attrs().text("title"), Some("versions"));

    let v = tree.variable("v").expect("v");
    assert_eq!(v.dtype(), dtype);
    assert_eq!(v.units(), Some("1"));
    assert_eq!(v.values().expect("values").to_f64_vec(), Some(vec![7.0, 8.0, 9.0]));
}

#[rstest]
#[case(1)]
#[case(2)]
fn extended_types_need_cdf5(#[case] version: u8) {
    let cdf = Cdf {
        version,
        dims: vec![("x", 1)],
        gatts: vec![],
        vars: vec![Var {
            name: "v",
            dims: vec![0],
            nc_type: NC_UINT64,
            attrs: vec![],
            data: vec![encode(NC_UINT64, &[1.0])],
        }],
        numrecs: 0,
    };
    let err = read_tree(&memory(cdf.build()), "v").expect_err("uint64 in classic file");
    assert!(matches!(err, LoadError::NetCdf(NetCdfError::UnknownType(11))), "{err}");
}

#[test]
fn cdf2_record_variables_use_wide_offsets() {
    let mut cdf = sample();
    cdf.version = 2;
    let tree = read_tree(&memory(cdf.build()), "sample").expect("tree");
    let time = tree.variable("time").expect("time");
    assert_eq!(time.values().expect("time").to_f64_vec(), Some(vec![0.0, 1.0, 2.0]));
}

#[rstest]
#[case(b"XDF\x01\0\0\0\0".to_vec())]
#[case(b"CDF\x03\0\0\0\0".to_vec())]
#[case(b"CDF\x01\0\0".to_vec())]
fn malformed_headers_are_errors(#[case] bytes: Vec<u8>) {
    let err = read_tree(&memory(bytes), "bad").expect_err("malformed");
    assert!(matches!(
        err,
        LoadError::NetCdf(
            NetCdfError::BadMagic | NetCdfError::UnsupportedVersion(3) | NetCdfError::UnexpectedEof
        )
    ));
}

#[test]
fn backend_opens_local_file_and_sniffs_magic() {
    let tmp = TempDir::new("netcdf-open");
    let path = tmp.path().join("data.bin");
    std::fs::write(&path, sample().build()).expect("write");
    let location = Location::Local(path);

    assert!(NetCdfBackend.sniff(&location));
    let tree = NetCdfBackend.open(&LoadContext::default(), &location).expect("open");
    assert_eq!(tree.name(), "data");
    assert_eq!(tree.data_vars().len(), 2);
}

#[cfg(not(feature = "hdf5"))]
#[test]
fn hdf5_signature_is_reported_as_unsupported() {
    let tmp = TempDir::new("netcdf-hdf5");
    let path = tmp.path().join("nc4.nc");
    let mut bytes = HDF5_SIGNATURE.to_vec();
    bytes.extend_from_slice(&[0; 32]);
    std::fs::write(&path, bytes).expect("write");

    let err = NetCdfBackend
        .open(&LoadContext::default(), &Location::Local(path.clone()))
        .expect_err("hdf5");
    assert!(matches!(err, LoadError::Unsupported(_)));
    assert!(!NetCdfBackend.sniff(&Location::Local(path)));
}
