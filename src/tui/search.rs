// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Incremental search over outline paths.
//!
//! `/` matches substrings, `\` matches subsequences. Results are ranked once per keystroke and
//! the first hit is handed back so the caller can move the cursor while the user types.

use std::cmp::Reverse;

use crossterm::event::KeyCode;

use super::tree::{NodeId, Outline};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SearchMode {
    Inactive,
    Editing,
    /// Query accepted with several hits; `n`/`N` cycle through them.
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SearchKind {
    Regular,
    Fuzzy,
}

impl SearchKind {
    pub(super) fn prefix(self) -> char {
        match self {
            Self::Regular => '/',
            Self::Fuzzy => '\\',
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    node: NodeId,
    path: String,
}

#[derive(Debug, Clone)]
pub(super) struct Search {
    pub(super) mode: SearchMode,
    pub(super) kind: SearchKind,
    pub(super) query: String,
    pub(super) results: Vec<NodeId>,
    current: usize,
    entries: Vec<Entry>,
}

impl Default for Search {
    fn default() -> Self {
        Self {
            mode: SearchMode::Inactive,
            kind: SearchKind::Regular,
            query: String::new(),
            results: Vec::new(),
            current: 0,
            entries: Vec::new(),
        }
    }
}

impl Search {
    pub(super) fn is_active(&self) -> bool {
        self.mode != SearchMode::Inactive
    }

    /// Snapshots the outline paths and starts reading a query.
    pub(super) fn begin(&mut self, kind: SearchKind, outline: &Outline) {
        self.clear();
        self.mode = SearchMode::Editing;
        self.kind = kind;
        self.entries = outline
            .searchable()
            .map(|(node, path)| Entry { node, path: path.to_lowercase() })
            .collect();
        self.entries.sort_by(|a, b| a.path.cmp(&b.path));
    }

    pub(super) fn clear(&mut self) {
        *self = Self { kind: self.kind, ..Self::default() };
    }

    /// Feeds one key while editing. Returns the node to select, if the hit list moved.
    pub(super) fn edit(&mut self, code: KeyCode) -> Option<NodeId> {
        match code {
            KeyCode::Esc => self.clear(),
            KeyCode::Enter => {
                self.mode =
                    if self.results.len() > 1 { SearchMode::Results } else { SearchMode::Inactive };
            }
            KeyCode::Backspace => {
                self.query.pop();
                return self.rerank();
            }
            KeyCode::Char(ch) => {
                self.query.push(ch);
                return self.rerank();
            }
            _ => {}
        }
        None
    }

    fn rerank(&mut self) -> Option<NodeId> {
        self.results = match self.kind {
            SearchKind::Regular => rank(&self.entries, &self.query, regular_score),
            SearchKind::Fuzzy => rank(&self.entries, &self.query, fuzzy_score),
        };
        self.current = 0;
        self.results.first().copied()
    }

    /// Moves to the next (or previous) hit, wrapping at either end.
    pub(super) fn step(&mut self, forward: bool) -> Option<NodeId> {
        let len = self.results.len();
        if len < 2 {
            return None;
        }
        self.current =
            if forward { (self.current + 1) % len } else { (self.current + len - 1) % len };
        self.results.get(self.current).copied()
    }

    /// `None` before anything is typed, `0` with no hits, `i/n` otherwise.
    pub(super) fn counter(&self) -> Option<String> {
        if self.query.is_empty() {
            return None;
        }
        Some(match self.results.len() {
            0 => "0".to_owned(),
            total => format!("{}/{total}", self.current + 1),
        })
    }
}

/// Orders matching entries best-first. Entries arrive sorted by path, and the sort is stable,
/// so equal scores fall back to path order.
fn rank<K: Ord>(entries: &[Entry], query: &str, score: fn(&str, &str) -> Option<K>) -> Vec<NodeId> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<(K, NodeId)> = entries
        .iter()
        .filter_map(|entry| score(&needle, &entry.path).map(|key| (key, entry.node)))
        .collect();
    hits.sort_by(|a, b| b.0.cmp(&a.0));
    hits.into_iter().map(|(_, node)| node).collect()
}

fn is_separator(ch: char) -> bool {
    matches!(ch, '/' | ':' | '-' | '_' | ' ')
}

fn follows_separator(haystack: &str, byte_idx: usize) -> bool {
    haystack[..byte_idx].chars().next_back().map_or(true, is_separator)
}

/// Exact hit, then prefix, then a hit right after a separator. Within a class an earlier
/// and more frequent match wins, then the shorter path.
type RegularKey = (bool, bool, bool, Reverse<usize>, usize, Reverse<usize>);

fn regular_score(needle: &str, haystack: &str) -> Option<RegularKey> {
    if needle.is_empty() {
        return None;
    }
    let first = haystack.find(needle)?;
    Some((
        haystack == needle,
        first == 0,
        follows_separator(haystack, first),
        Reverse(first),
        haystack.matches(needle).count(),
        Reverse(haystack.chars().count()),
    ))
}

/// Contiguous hits beat scattered ones; then boundary starts, similarity, adjacency and
/// tightness of the matched span.
type FuzzyKey = (bool, bool, u32, usize, Reverse<usize>, Reverse<usize>);

fn fuzzy_score(needle: &str, haystack: &str) -> Option<FuzzyKey> {
    if needle.is_empty() {
        return None;
    }
    let positions = subsequence(needle, haystack)?;
    let (&first, &last) = (positions.first()?, positions.last()?);
    let adjacent = positions.windows(2).filter(|pair| pair[1] == pair[0] + 1).count();
    let similarity = rapidfuzz::fuzz::ratio(needle.chars(), haystack.chars());
    let at_boundary = first == 0 || haystack.chars().nth(first - 1).is_some_and(is_separator);

    Some((
        haystack.contains(needle),
        at_boundary,
        (similarity * 1000.0).round() as u32,
        adjacent,
        Reverse(last - first + 1),
        Reverse(first),
    ))
}

/// Character positions of the greedy left-most subsequence match.
fn subsequence(needle: &str, haystack: &str) -> Option<Vec<usize>> {
    let mut wanted = needle.chars().peekable();
    let mut positions = Vec::with_capacity(needle.len());
    for (idx, ch) in haystack.chars().enumerate() {
        match wanted.peek() {
            Some(&want) if want == ch => {
                positions.push(idx);
                wanted.next();
            }
            Some(_) => {}
            None => break,
        }
    }
    wanted.peek().is_none().then_some(positions)
}
