// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::AnalysisError;

/// Equal-width histogram over the finite values of an array.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `bins + 1` ascending edges; the last bin is closed on the right.
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl Histogram {
    pub fn compute<'a>(
        values: impl IntoIterator<Item = &'a f64>,
        bins: usize,
    ) -> Result<Self, AnalysisError> {
        if bins == 0 {
            return Err(AnalysisError::NoBins);
        }
        let finite: Vec<f64> = values.into_iter().copied().filter(|v| v.is_finite()).collect();

        let (lo, hi) = match finite.iter().copied().fold(None, |acc: Option<(f64, f64)>, v| {
            Some(acc.map_or((v, v), |(lo, hi)| (lo.min(v), hi.max(v))))
        }) {
            None => (0.0, 1.0),
            Some((lo, hi)) if lo == hi => (lo - 0.5, hi + 0.5),
            Some(range) => range,
        };

        let width = (hi - lo) / bins as f64;
        let edges = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0u64; bins];
        for v in finite {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Ok(Self { edges, counts })
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Centre of each bin.
    pub fn centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|pair| (pair[0] + pair[1]) / 2.0).collect()
    }

    /// Sums adjacent bins so at most `max_bins` remain (for narrow terminals).
    pub fn regroup(&self, max_bins: usize) -> Histogram {
        if max_bins == 0 || self.bins() <= max_bins {
            return self.clone();
        }
        let group = self.bins().div_ceil(max_bins);
        let counts: Vec<u64> = self.counts.chunks(group).map(|chunk| chunk.iter().sum()).collect();
        let mut edges: Vec<f64> = self.edges.iter().step_by(group).copied().collect();
        if edges.len() == counts.len() {
            edges.push(self.edges[self.edges.len() - 1]);
        } else if let Some(last) = edges.last_mut() {
            *last = self.edges[self.edges.len() - 1];
        }
        Histogram { edges, counts }
    }
}
