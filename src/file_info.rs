// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The "File Information" section shown above the dataset tree.

use std::fs::{self, Metadata};
use std::io;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::render::human_bytes;
use crate::store::Location;

/// `(label, value)` rows describing where a dataset came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    rows: Vec<(&'static str, String)>,
}

impl FileInfo {
    /// Collects size, type, permissions, and timestamps for local paths; remote locations only
    /// report their URL.
    pub fn collect(locations: &[Location]) -> io::Result<Self> {
        let mut rows = Vec::new();
        match locations {
            [Location::Remote(url)] => {
                rows.push(("URL", url.to_string()));
                rows.push(("File Type", "Remote".to_owned()));
            }
            [Location::Local(path)] => rows.extend(local_rows(path)?),
            many => {
                let mut total = 0u64;
                for location in many {
                    if let Some(path) = location.as_local() {
                        total += disk_usage(path)?;
                    }
                }
                rows.push(("Files", many.len().to_string()));
                rows.push(("File Size", human_bytes(total)));
                let file_type = many.first().map(file_type).unwrap_or_default();
                rows.push(("File Type", file_type));
            }
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[(&'static str, String)] {
        &self.rows
    }
}

fn local_rows(path: &Path) -> io::Result<Vec<(&'static str, String)>> {
    let metadata = fs::metadata(path)?;
    Ok(vec![
        ("File Size", human_bytes(disk_usage(path)?)),
        ("File Type", file_type(&Location::Local(path.to_path_buf()))),
        ("Permissions", permissions(&metadata)),
        ("Created Time", format_time(metadata.created())),
        ("Modified Time", format_time(metadata.modified())),
    ])
}

/// Lower-cased extension including the dot, e.g. `".nc"`; empty when there is none.
fn file_type(location: &Location) -> String {
    location
        .extension()
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Size of a file, or the summed size of every file below a directory.
pub fn disk_usage(path: &Path) -> io::Result<u64> {
    let metadata = fs::metadata(path)?;
    if !metadata.is_dir() {
        return Ok(metadata.len());
    }
    let mut total = 0;
    for entry in fs::read_dir(path)? {
        total += disk_usage(&entry?.path())?;
    }
    Ok(total)
}

#[cfg(unix)]
fn permissions(metadata: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    format!("{:03o}", metadata.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn permissions(metadata: &Metadata) -> String {
    if metadata.permissions().readonly() { "r--" } else { "rw-" }.to_owned()
}

/// `ctime`-style timestamp in local time, e.g. `Sun Oct 18 09:04:05 2026`.
fn format_time(time: io::Result<SystemTime>) -> String {
    match time {
        Ok(time) => DateTime::<Local>::from(time).format("%a %b %e %H:%M:%S %Y").to_string(),
        Err(_) => "unknown".to_owned(),
    }
}
