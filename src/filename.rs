// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Composition of dated filenames from a base path and a date pattern.

use std::path::Path;
use std::path::PathBuf;

use jiff::civil::Date;
use jiff::fmt::strtime;

use crate::Error;

/// The date pattern used when none is configured.
pub const DEFAULT_DATE_PATTERN: &str = "_yyyy_MM_dd";

/// A validated date-format pattern.
///
/// Patterns use calendar tokens: `yyyy` (4-digit year), `yy` (2-digit year),
/// `MM` (2-digit month), and `dd` (2-digit day). Any other character is
/// emitted literally. Time-of-day tokens (`HH`, `mm`, `ss`) are recognized
/// but rejected at construction since rotation dates carry no time component.
#[derive(Debug, Clone)]
pub struct DatePattern {
    raw: String,
    strftime: String,
}

impl DatePattern {
    /// Translates and validates a pattern.
    pub fn new(pattern: impl Into<String>) -> Result<Self, Error> {
        let raw = pattern.into();
        let strftime = translate(&raw);

        // probe with an arbitrary date so render cannot fail later
        let probe = Date::constant(2000, 1, 1);
        strtime::format(&strftime, probe).map_err(|err| Error::Pattern {
            pattern: raw.clone(),
            source: err,
        })?;

        Ok(DatePattern { raw, strftime })
    }

    /// The pattern as originally written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub(crate) fn render(&self, date: Date) -> String {
        strtime::format(&self.strftime, date)
            .expect("date pattern was validated at construction; this is a bug in logroll")
    }
}

impl Default for DatePattern {
    fn default() -> Self {
        DatePattern::new(DEFAULT_DATE_PATTERN)
            .expect("the default date pattern is valid; this is a bug in logroll")
    }
}

fn translate(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    'scan: while !rest.is_empty() {
        for (token, spec) in [
            ("yyyy", "%Y"),
            ("yy", "%y"),
            ("MM", "%m"),
            ("dd", "%d"),
            ("HH", "%H"),
            ("mm", "%M"),
            ("ss", "%S"),
        ] {
            if let Some(r) = rest.strip_prefix(token) {
                out.push_str(spec);
                rest = r;
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        match chars.next() {
            Some('%') => out.push_str("%%"),
            Some(ch) => out.push(ch),
            None => break,
        }
        rest = chars.as_str();
    }
    out
}

/// Derives the dated filename for one rotation segment.
///
/// The base path is split into directory, stem, and extension; the formatted
/// date is inserted between stem and extension. A base path without an
/// extension yields no trailing dot.
///
/// Pure and deterministic for a given input triple.
pub fn compose(base_path: &Path, pattern: &DatePattern, date: Date) -> PathBuf {
    let dir = base_path.parent().unwrap_or(Path::new(""));
    let stem = base_path
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    let formatted = pattern.render(date);
    let filename = match base_path.extension() {
        Some(ext) => format!("{stem}{formatted}.{}", ext.to_string_lossy()),
        None => format!("{stem}{formatted}"),
    };
    dir.join(filename)
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn test_compose_default_pattern() {
        let pattern = DatePattern::default();
        let path = compose(Path::new("/var/log/app.log"), &pattern, date(2024, 5, 1));
        assert_eq!(path, Path::new("/var/log/app_2024_05_01.log"));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let pattern = DatePattern::new("-yyyy.MM.dd").unwrap();
        let first = compose(Path::new("logs/server.txt"), &pattern, date(2023, 12, 31));
        let second = compose(Path::new("logs/server.txt"), &pattern, date(2023, 12, 31));
        assert_eq!(first, second);
        assert_eq!(first, Path::new("logs/server-2023.12.31.txt"));
    }

    #[test]
    fn test_compose_without_extension() {
        let pattern = DatePattern::default();
        let path = compose(Path::new("/var/log/app"), &pattern, date(2024, 5, 1));
        assert_eq!(path, Path::new("/var/log/app_2024_05_01"));
    }

    #[test]
    fn test_two_digit_year_and_literals() {
        let pattern = DatePattern::new(".yy-MM-dd 100%").unwrap();
        assert_eq!(pattern.render(date(2024, 5, 1)), ".24-05-01 100%");
    }

    #[test]
    fn test_time_tokens_are_rejected() {
        let err = DatePattern::new("_yyyy_MM_dd_HH").unwrap_err();
        assert!(matches!(err, crate::Error::Pattern { .. }));
    }
}
