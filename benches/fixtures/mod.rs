// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Deterministic benchmark datasets (no RNG).

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use byteorder::{BigEndian, WriteBytesExt};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use ndarray::{ArrayD, IxDyn};
use serde_json::json;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir()
            .join(format!("xr_tui_bench_{prefix}_{}_{nanos}_{counter}", std::process::id()));
        std::fs::create_dir_all(&path).expect("create temp dir");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Case {
    /// 24 x 90 x 180
    Small,
    /// 96 x 181 x 360
    Medium,
}

impl Case {
    pub fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
        }
    }

    pub fn shape(self) -> [usize; 3] {
        match self {
            Self::Small => [24, 90, 180],
            Self::Medium => [96, 181, 360],
        }
    }

    pub fn len(self) -> usize {
        self.shape().iter().product()
    }
}

/// Smooth field with a sprinkling of NaN and infinities so the non-finite paths are exercised.
pub fn field_value(i: usize) -> f64 {
    match i % 997 {
        0 => f64::NAN,
        500 => f64::INFINITY,
        _ => {
            let x = i as f64 * 0.001;
            250.0 + 30.0 * x.sin() + 5.0 * (x * 7.0).cos()
        }
    }
}

pub fn field(case: Case) -> ArrayD<f64> {
    let values = (0..case.len()).map(field_value).collect();
    ArrayD::from_shape_vec(IxDyn(&case.shape()), values).expect("shape")
}

fn f64_le(values: impl Iterator<Item = f64>) -> Vec<u8> {
    values.flat_map(f64::to_le_bytes).collect()
}

fn zlib(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(bytes).expect("compress");
    encoder.finish().expect("finish")
}

fn write_json(path: &Path, value: serde_json::Value) {
    std::fs::write(path, serde_json::to_vec(&value).expect("json")).expect("write json");
}

/// Writes `air(time, lat, lon)` as a Zarr v2 store chunked by time step.
pub fn write_zarr(root: &Path, case: Case) {
    let [nt, ny, nx] = case.shape();
    let air = root.join("air");
    std::fs::create_dir_all(&air).expect("mkdir");
    write_json(&root.join(".zgroup"), json!({"zarr_format": 2}));
    write_json(
        &air.join(".zarray"),
        json!({
            "zarr_format": 2,
            "shape": [nt, ny, nx],
            "chunks": [1, ny, nx],
            "dtype": "<f8",
            "compressor": {"id": "zlib", "level": 1},
            "fill_value": "NaN",
            "order": "C",
            "filters": null
        }),
    );
    write_json(
        &air.join(".zattrs"),
        json!({"_ARRAY_DIMENSIONS": ["time", "lat", "lon"], "units": "K"}),
    );

    let step = ny * nx;
    for t in 0..nt {
        let chunk = f64_le((t * step..(t + 1) * step).map(field_value));
        std::fs::write(air.join(format!("{t}.0.0")), zlib(&chunk)).expect("write chunk");
    }
}

fn put_name(out: &mut Vec<u8>, name: &str) {
    out.write_u32::<BigEndian>(name.len() as u32).expect("write");
    out.extend_from_slice(name.as_bytes());
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

/// Writes `air(time, lat, lon)` as a classic NetCDF file with one fixed-size double variable.
pub fn write_netcdf(path: &Path, case: Case) {
    let dims = ["time", "lat", "lon"];
    let shape = case.shape();

    let header = |begin: u32| {
        let mut out = b"CDF\x01".to_vec();
        out.write_u32::<BigEndian>(0).expect("write");
        out.write_u32::<BigEndian>(0x0A).expect("write");
        out.write_u32::<BigEndian>(dims.len() as u32).expect("write");
        for (name, len) in dims.iter().zip(shape) {
            put_name(&mut out, name);
            out.write_u32::<BigEndian>(len as u32).expect("write");
        }
        out.extend_from_slice(&[0; 8]);
        out.write_u32::<BigEndian>(0x0B).expect("write");
        out.write_u32::<BigEndian>(1).expect("write");
        put_name(&mut out, "air");
        out.write_u32::<BigEndian>(3).expect("write");
        for id in 0..3u32 {
            out.write_u32::<BigEndian>(id).expect("write");
        }
        out.extend_from_slice(&[0; 8]);
        out.write_u32::<BigEndian>(6).expect("write");
        out.write_u32::<BigEndian>((case.len() * 8) as u32).expect("write");
        out.write_u32::<BigEndian>(begin).expect("write");
        out
    };

    let begin = header(0).len() as u32;
    let mut out = header(begin);
    out.reserve(case.len() * 8);
    for i in 0..case.len() {
        out.write_f64::<BigEndian>(field_value(i)).expect("write");
    }
    std::fs::write(path, out).expect("write netcdf");
}
