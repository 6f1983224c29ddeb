// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use smol_str::SmolStr;

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Int(Vec<i64>),
    UInt(Vec<u64>),
    Float(Vec<f64>),
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// First element as `f64`, for attributes such as `scale_factor` or `_FillValue`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Text(_) => None,
            Self::Int(values) => values.first().map(|v| *v as f64),
            Self::UInt(values) => values.first().map(|v| *v as f64),
            Self::Float(values) => values.first().copied(),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(vec![value])
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(vec![value])
    }
}

fn write_list<T>(
    f: &mut fmt::Formatter<'_>,
    values: &[T],
    mut write_one: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    if values.len() == 1 {
        return write_one(f, &values[0]);
    }
    f.write_str("[")?;
    for (idx, value) in values.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write_one(f, value)?;
    }
    f.write_str("]")
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Int(values) => write_list(f, values, |f, v| {
                let mut buf = itoa::Buffer::new();
                f.write_str(buf.format(*v))
            }),
            Self::UInt(values) => write_list(f, values, |f, v| {
                let mut buf = itoa::Buffer::new();
                f.write_str(buf.format(*v))
            }),
            Self::Float(values) => write_list(f, values, |f, v| write!(f, "{v}")),
        }
    }
}

/// Attribute map that keeps insertion order, like the on-disk formats do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attrs {
    entries: Vec<(SmolStr, AttrValue)>,
}

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts or replaces `name`, keeping the original position on replace.
    pub fn insert(&mut self, name: impl Into<SmolStr>, value: impl Into<AttrValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries.iter().find(|(existing, _)| existing == name).map(|(_, value)| value)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttrValue::as_text)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<SmolStr>, V: Into<AttrValue>> FromIterator<(K, V)> for Attrs {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut attrs = Attrs::new();
        for (name, value) in iter {
            attrs.insert(name, value);
        }
        attrs
    }
}
