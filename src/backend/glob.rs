// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use regex::{Regex, RegexBuilder};

use super::RegistryError;

/// Compiles a file-name glob (`*`, `?`, `[abc]`, `[!abc]`) into an anchored,
/// case-insensitive regex. Wildcards never cross `/`.
pub(crate) fn compile_glob(pattern: &str) -> Result<Regex, RegistryError> {
    let invalid = |reason: &str| RegistryError::InvalidPattern {
        pattern: pattern.to_owned(),
        reason: reason.to_owned(),
    };
    if pattern.trim().is_empty() {
        return Err(invalid("empty pattern"));
    }

    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');
    let mut chars = pattern.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '[' => {
                let mut class = String::new();
                if chars.peek() == Some(&'!') {
                    chars.next();
                    class.push('^');
                }
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == ']' {
                        closed = true;
                        break;
                    }
                    if matches!(inner, '\\' | '[' | '^') {
                        class.push('\\');
                    }
                    class.push(inner);
                }
                if !closed {
                    return Err(invalid("unterminated character class"));
                }
                if class.is_empty() || class == "^" {
                    return Err(invalid("empty character class"));
                }
                out.push('[');
                out.push_str(&class);
                out.push(']');
            }
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
        }
    }
    out.push('$');

    RegexBuilder::new(&out)
        .case_insensitive(true)
        .build()
        .map_err(|err| invalid(&err.to_string()))
}
