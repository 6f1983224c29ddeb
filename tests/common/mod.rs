// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! On-disk dataset writers shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use byteorder::{BigEndian, WriteBytesExt};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde_json::{json, Value};

const NC_CHAR: u32 = 2;
const NC_DOUBLE: u32 = 6;

pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let path =
            std::env::temp_dir().join(format!("xr-tui-it-{prefix}-{}-{n}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("create temp dir");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// A non-record `double` variable with text attributes.
pub struct NcVar<'a> {
    pub name: &'a str,
    pub dims: &'a [usize],
    pub attrs: &'a [(&'a str, &'a str)],
    pub values: &'a [f64],
}

fn pad(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

fn put_name(out: &mut Vec<u8>, name: &str) {
    out.write_u32::<BigEndian>(name.len() as u32).expect("write");
    out.extend_from_slice(name.as_bytes());
    pad(out);
}

fn put_text_attrs(out: &mut Vec<u8>, attrs: &[(&str, &str)]) {
    if attrs.is_empty() {
        out.extend_from_slice(&[0; 8]);
        return;
    }
    out.write_u32::<BigEndian>(0x0C).expect("write");
    out.write_u32::<BigEndian>(attrs.len() as u32).expect("write");
    for (name, value) in attrs {
        put_name(out, name);
        out.write_u32::<BigEndian>(NC_CHAR).expect("write");
        out.write_u32::<BigEndian>(value.len() as u32).expect("write");
        out.extend_from_slice(value.as_bytes());
        pad(out);
    }
}

fn cdf_header(
    dims: &[(&str, usize)],
    gatts: &[(&str, &str)],
    vars: &[NcVar<'_>],
    begins: &[u32],
) -> Vec<u8> {
    let mut out = b"CDF\x01".to_vec();
    out.write_u32::<BigEndian>(0).expect("write");
    if dims.is_empty() {
        out.extend_from_slice(&[0; 8]);
    } else {
        out.write_u32::<BigEndian>(0x0A).expect("write");
        out.write_u32::<BigEndian>(dims.len() as u32).expect("write");
        for (name, len) in dims {
            put_name(&mut out, name);
            out.write_u32::<BigEndian>(*len as u32).expect("write");
        }
    }
    put_text_attrs(&mut out, gatts);
    out.write_u32::<BigEndian>(0x0B).expect("write");
    out.write_u32::<BigEndian>(vars.len() as u32).expect("write");
    for (var, begin) in vars.iter().zip(begins) {
        put_name(&mut out, var.name);
        out.write_u32::<BigEndian>(var.dims.len() as u32).expect("write");
        for id in var.dims {
            out.write_u32::<BigEndian>(*id as u32).expect("write");
        }
        put_text_attrs(&mut out, var.attrs);
        out.write_u32::<BigEndian>(NC_DOUBLE).expect("write");
        out.write_u32::<BigEndian>((var.values.len() * 8) as u32).expect("write");
        out.write_u32::<BigEndian>(*begin).expect("write");
    }
    out
}

/// Encodes a classic (CDF-1) file without record variables.
pub fn cdf_bytes(dims: &[(&str, usize)], gatts: &[(&str, &str)], vars: &[NcVar<'_>]) -> Vec<u8> {
    let header_len = cdf_header(dims, gatts, vars, &vec![0; vars.len()]).len();
    let mut begins = Vec::with_capacity(vars.len());
    let mut offset = header_len;
    for var in vars {
        begins.push(offset as u32);
        offset += var.values.len() * 8;
    }

    let mut out = cdf_header(dims, gatts, vars, &begins);
    for var in vars {
        for value in var.values {
            out.write_f64::<BigEndian>(*value).expect("write");
        }
    }
    out
}

/// `lat(3)` and `lon(2)` coordinates plus `t2m(lat, lon) = offset + 0..6`.
pub fn write_surface_nc(path: &Path, title: &str, offset: f64) {
    let t2m: Vec<f64> = (0..6).map(|i| offset + i as f64).collect();
    let bytes = cdf_bytes(
        &[("lat", 3), ("lon", 2)],
        &[("title", title)],
        &[
            NcVar {
                name: "lat",
                dims: &[0],
                attrs: &[("units", "degrees_north")],
                values: &[-10.0, 0.0, 10.0],
            },
            NcVar {
                name: "lon",
                dims: &[1],
                attrs: &[("units", "degrees_east")],
                values: &[100.0, 110.0],
            },
            NcVar {
                name: "t2m",
                dims: &[0, 1],
                attrs: &[("units", "K"), ("long_name", "2 metre temperature")],
                values: &t2m,
            },
        ],
    );
    fs::write(path, bytes).expect("write netcdf");
}

fn put_json(root: &Path, key: &str, value: Value) {
    let path = root.join(key);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(path, serde_json::to_vec(&value).expect("json")).expect("write");
}

fn put_chunk(root: &Path, key: &str, bytes: &[u8]) {
    let path = root.join(key);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(path, bytes).expect("write chunk");
}

fn f64_le(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn zlib(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).expect("compress");
    encoder.finish().expect("finish")
}

fn zarray(shape: &[usize], chunks: &[usize], compressor: Value) -> Value {
    json!({
        "zarr_format": 2,
        "shape": shape,
        "chunks": chunks,
        "dtype": "<f8",
        "compressor": compressor,
        "fill_value": "NaN",
        "order": "C",
        "filters": null
    })
}

/// A Zarr v2 directory store:
/// `time(4)` coordinate, `air(time, level, x)` as a 0..24 ramp in zlib chunks of one time step,
/// and an `ocean` group holding `sst(x)`.
pub fn write_climate_zarr(root: &Path) {
    put_json(root, ".zgroup", json!({"zarr_format": 2}));
    put_json(root, ".zattrs", json!({"title": "climate run"}));

    put_json(root, "time/.zarray", zarray(&[4], &[4], Value::Null));
    put_json(root, "time/.zattrs", json!({"_ARRAY_DIMENSIONS": ["time"], "units": "hours"}));
    put_chunk(root, "time/0", &f64_le(&[0.0, 6.0, 12.0, 18.0]));

    let compressor = json!({"id": "zlib", "level": 1});
    put_json(root, "air/.zarray", zarray(&[4, 3, 2], &[1, 3, 2], compressor));
    put_json(
        root,
        "air/.zattrs",
        json!({"_ARRAY_DIMENSIONS": ["time", "level", "x"], "units": "K"}),
    );
    for t in 0..4 {
        let values: Vec<f64> = (0..6).map(|i| (t * 6 + i) as f64).collect();
        put_chunk(root, &format!("air/{t}.0.0"), &zlib(&f64_le(&values)));
    }

    put_json(root, "ocean/.zgroup", json!({"zarr_format": 2}));
    put_json(root, "ocean/sst/.zarray", zarray(&[2], &[2], Value::Null));
    put_json(root, "ocean/sst/.zattrs", json!({"_ARRAY_DIMENSIONS": ["x"], "units": "degC"}));
    put_chunk(root, "ocean/sst/0", &f64_le(&[14.5, 15.5]));
}
