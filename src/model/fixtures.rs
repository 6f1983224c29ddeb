// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Small in-memory trees shared by unit tests across modules.

use smol_str::SmolStr;

use super::{ArrayValues, Attrs, DType, DataTree, Variable};

pub(crate) fn dims(names: &[&str]) -> Vec<SmolStr> {
    names.iter().map(|name| SmolStr::new(name)).collect()
}

pub(crate) fn numeric_var(
    name: &str,
    dim_names: &[&str],
    shape: &[usize],
    values: Vec<f64>,
) -> Variable {
    let values = ArrayValues::numeric(shape, values).expect("fixture values match shape");
    Variable::in_memory(name, dims(dim_names), DType::Float64, values)
}

pub(crate) fn ramp_var(name: &str, dim_names: &[&str], shape: &[usize]) -> Variable {
    let len = shape.iter().product::<usize>();
    numeric_var(name, dim_names, shape, (0..len).map(|v| v as f64).collect())
}

/// A small climate-like tree:
///
/// ```text
/// root
/// ├── coords: time(4), lat(3), lon(2)
/// ├── data_vars: temperature(time, lat, lon), station(lat) [text]
/// └── surface
///     └── data_vars: pressure(lat, lon)
/// ```
pub(crate) fn climate_tree() -> DataTree {
    let mut root = DataTree::new("root");

    let time = numeric_var("time", &["time"], &[4], vec![0.0, 6.0, 12.0, 18.0])
        .with_attrs(Attrs::from_iter([("units", "hours")]));
    let lat = numeric_var("lat", &["lat"], &[3], vec![-10.0, 0.0, 10.0])
        .with_attrs(Attrs::from_iter([("units", "degrees_north")]));
    let lon = numeric_var("lon", &["lon"], &[2], vec![100.0, 110.0]);
    root.add_coord(time).expect("time");
    root.add_coord(lat).expect("lat");
    root.add_coord(lon).expect("lon");

    let temperature = ramp_var("temperature", &["time", "lat", "lon"], &[4, 3, 2]).with_attrs(
        Attrs::from_iter([("units", "K"), ("long_name", "air temperature")]),
    );
    root.add_data_var(temperature).expect("temperature");

    let names = ArrayValues::text(&[3], vec!["a".into(), "b".into(), "c".into()])
        .expect("station names");
    root.add_data_var(Variable::in_memory("station", dims(&["lat"]), DType::Str, names))
        .expect("station");

    let mut surface = DataTree::new("surface");
    surface
        .add_data_var(ramp_var("pressure", &["lat", "lon"], &[3, 2]))
        .expect("pressure");
    root.add_child(surface).expect("surface");

    root
}
