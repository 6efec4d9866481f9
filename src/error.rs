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

use std::io;
use std::path::PathBuf;

/// Errors surfaced by the rolling appender and its layouts.
///
/// Every variant is recoverable at the call site; none of them should
/// terminate the embedding process.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The sink could not be created or opened during activation.
    #[error("failed to open log file {path}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The new sink could not be opened during a rollover. The previous sink
    /// has already been released and the appender is closed; call
    /// [`activate`](crate::DailyFile::activate) to reopen it.
    #[error("failed to reopen log file during rollover {path}")]
    Rollover {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A layout failed to produce bytes for a record. Only the offending
    /// record is dropped; the appender remains open and usable.
    #[error("layout failed to encode record: {reason}")]
    Encoding { reason: String },
    /// The appender is closed, either because it has not been activated yet
    /// or because a rollover failed.
    #[error("appender is closed")]
    Closed,
    /// A severity level name could not be parsed.
    #[error("malformed level {0:?}")]
    Level(String),
    /// A date pattern could not be rendered with a calendar date.
    #[error("malformed date pattern {pattern:?}")]
    Pattern {
        pattern: String,
        #[source]
        source: jiff::Error,
    },
    /// Writing or flushing the current sink failed.
    #[error("failed to perform IO action")]
    Io(#[from] io::Error),
}
