// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Cuts `text` to at most `width` columns, marking the cut with `…`.
pub(crate) fn clip(text: &str, width: usize) -> String {
    match text.char_indices().nth(width) {
        None => text.to_owned(),
        Some(_) if width == 0 => String::new(),
        Some(_) => text.chars().take(width - 1).chain(std::iter::once('…')).collect(),
    }
}

/// Column count, one per char; labels here are never wide glyphs.
pub(crate) fn columns(text: &str) -> usize {
    text.chars().count()
}

/// Up to `max` indices spread evenly over `0..len`, always including both ends.
pub(crate) fn spread_indices(len: usize, max: usize) -> Vec<usize> {
    match (len, max) {
        (0, _) | (_, 0) => Vec::new(),
        (1, _) | (_, 1) => vec![0],
        _ if len <= max => (0..len).collect(),
        _ => {
            let mut out: Vec<usize> =
                (0..max).map(|i| i * (len - 1) / (max - 1)).collect();
            out.dedup();
            out
        }
    }
}
