// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use ndarray::ArrayD;

/// Summary statistics of a numeric array.
///
/// Value statistics ignore NaN; NaN and Inf counts are taken over every element and their
/// percentages are relative to the full array size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub range: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
    pub count: usize,
    pub nan_count: usize,
    pub nan_pct: f64,
    pub inf_count: usize,
    pub inf_pct: f64,
}

impl Statistics {
    pub fn compute(values: &ArrayD<f64>) -> Self {
        Self::summarize(values.iter().copied(), values.len())
    }

    pub fn from_values(values: &[f64]) -> Self {
        Self::summarize(values.iter().copied(), values.len())
    }

    fn summarize(values: impl Iterator<Item = f64>, total: usize) -> Self {
        let mut nan_count = 0usize;
        let mut inf_count = 0usize;
        let mut kept: Vec<f64> = Vec::with_capacity(total);
        for value in values {
            if value.is_nan() {
                nan_count += 1;
                continue;
            }
            if value.is_infinite() {
                inf_count += 1;
            }
            kept.push(value);
        }
        kept.sort_unstable_by(f64::total_cmp);

        let pct = |n: usize| if total == 0 { f64::NAN } else { n as f64 / total as f64 * 100.0 };
        let count = kept.len();
        let (mean, std_dev) = mean_and_std(&kept);
        let min = kept.first().copied().unwrap_or(f64::NAN);
        let max = kept.last().copied().unwrap_or(f64::NAN);
        let median = percentile(&kept, 50.0);

        Self {
            mean,
            median,
            std_dev,
            range: max - min,
            min,
            p25: percentile(&kept, 25.0),
            p50: median,
            p75: percentile(&kept, 75.0),
            max,
            count,
            nan_count,
            nan_pct: pct(nan_count),
            inf_count,
            inf_pct: pct(inf_count),
        }
    }

    /// `(label, value)` pairs in display order.
    pub fn rows(&self) -> [(&'static str, f64); 14] {
        [
            ("Mean", self.mean),
            ("Median", self.median),
            ("Standard Deviation", self.std_dev),
            ("Range", self.range),
            ("Minimum", self.min),
            ("25%", self.p25),
            ("50%", self.p50),
            ("75%", self.p75),
            ("Maximum", self.max),
            ("Count", self.count as f64),
            ("NaN Count", self.nan_count as f64),
            ("NaN %", self.nan_pct),
            ("Inf Count", self.inf_count as f64),
            ("Inf %", self.inf_pct),
        ]
    }

    /// Rows with values rendered to four decimals.
    pub fn formatted_rows(&self) -> Vec<(&'static str, String)> {
        self.rows().into_iter().map(|(label, value)| (label, format_value(value))).collect()
    }
}

pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "nan".to_owned()
    } else if value.is_infinite() {
        if value > 0.0 { "inf" } else { "-inf" }.to_owned()
    } else {
        format!("{value:.4}")
    }
}

/// Population mean and standard deviation (ddof = 0).
fn mean_and_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Percentile of sorted `values` with linear interpolation between closest ranks.
pub(crate) fn percentile(sorted: &[f64], q: f64) -> f64 {
    let Some(last) = sorted.len().checked_sub(1) else {
        return f64::NAN;
    };
    let pos = q / 100.0 * last as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    if lo == hi || frac == 0.0 {
        return sorted[lo];
    }
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
