// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::str::FromStr;
use std::time::Duration;

use criterion::Criterion;
use pprof::criterion::{Output, PProfProfiler};

/// Reads `name` from the environment, falling back to `default` and clamping to `range`.
fn env_or<T>(name: &str, default: T, range: std::ops::RangeInclusive<T>) -> T
where
    T: FromStr + PartialOrd + Copy,
{
    let value = std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<T>().ok())
        .unwrap_or(default);
    if value < *range.start() {
        *range.start()
    } else if value > *range.end() {
        *range.end()
    } else {
        value
    }
}

/// Criterion with a pprof flamegraph profiler attached (`cargo bench -- --profile-time 10`).
///
/// Array benches are heavier than the UI ones, so the defaults keep sample counts modest.
pub fn criterion() -> Criterion {
    let frequency = env_or("PROFILE_FREQ", 100i32, 1..=1000);
    let sample_size = env_or("BENCH_SAMPLE_SIZE", 30usize, 10..=200);
    let warmup = env_or("BENCH_WARMUP_SECS", 2u64, 1..=60);
    let measurement = env_or("BENCH_MEASUREMENT_SECS", 5u64, 1..=120);

    Criterion::default()
        .sample_size(sample_size)
        .warm_up_time(Duration::from_secs(warmup))
        .measurement_time(Duration::from_secs(measurement))
        .with_profiler(PProfProfiler::new(frequency, Output::Flamegraph(None)))
}
