// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use ndarray::Array2;

/// Viridis sampled at nine evenly spaced stops.
const VIRIDIS: [(u8, u8, u8); 9] = [
    (68, 1, 84),
    (71, 44, 122),
    (59, 81, 139),
    (44, 113, 142),
    (33, 144, 141),
    (39, 173, 129),
    (92, 200, 99),
    (170, 220, 50),
    (253, 231, 37),
];

/// Colour for `t` in `[0, 1]`, linearly interpolated between viridis stops.
pub fn viridis(t: f64) -> (u8, u8, u8) {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let lo = scaled.floor() as usize;
    let hi = (lo + 1).min(VIRIDIS.len() - 1);
    let frac = scaled - lo as f64;
    let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * frac).round() as u8;
    let (a, b) = (VIRIDIS[lo], VIRIDIS[hi]);
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// A matrix resampled onto a terminal cell grid.
///
/// Row 0 is the top of the screen and shows the last matrix row, so the first `y` coordinate
/// sits at the bottom like a conventional plot. Cells hold values normalised to `[0, 1]`;
/// non-finite samples are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapGrid {
    pub width: usize,
    pub height: usize,
    pub min: f64,
    pub max: f64,
    cells: Vec<Option<f64>>,
}

impl HeatmapGrid {
    /// Nearest-sample resampling of `z` to `width` x `height` cells.
    pub fn resample(z: &Array2<f64>, width: usize, height: usize) -> Self {
        let (rows, cols) = z.dim();
        let (width, height) = if rows == 0 || cols == 0 { (0, 0) } else { (width, height) };

        let (min, max) = z
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let span = max - min;

        let mut cells = Vec::with_capacity(width * height);
        for row in 0..height {
            let src_row = rows - 1 - (row * rows / height);
            for col in 0..width {
                let src_col = col * cols / width;
                let value = z[[src_row, src_col]];
                cells.push(value.is_finite().then(|| {
                    if span > 0.0 {
                        (value - min) / span
                    } else {
                        0.5
                    }
                }));
            }
        }

        let (min, max) = if min > max { (f64::NAN, f64::NAN) } else { (min, max) };
        Self { width, height, min, max, cells }
    }

    pub fn get(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.cells[row * self.width + col]
    }
}
