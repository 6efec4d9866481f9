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

//! Logroll writes log records to a file whose name changes automatically at
//! calendar-day boundaries, encoding each record with a pluggable layout.
//!
//! # Overview
//!
//! A [`DailyFile`] appender owns one open sink at a time. On every append it
//! compares the current calendar date to the date of the open sink and, when
//! they differ, closes the old file (writing the layout footer) and opens a
//! dated successor (writing the layout header) before the record's bytes go
//! out. Rotation is lazy: an idle day boundary creates no file.
//!
//! Layouts encode records as text lines or raw bytes; see [`layout`].
//! Filtering, routing, and configuration syntax are the embedding system's
//! business; this crate only turns already-accepted records into durable
//! dated files.
//!
//! # Examples
//!
//! ```no_run
//! use logroll::DailyFileBuilder;
//! use logroll::record::Level;
//! use logroll::record::Record;
//!
//! # fn main() -> Result<(), logroll::Error> {
//! let appender = DailyFileBuilder::new("logs/app.log").build()?;
//! appender.activate()?;
//!
//! let record = Record::builder()
//!     .logger("server")
//!     .level(Level::Info)
//!     .payload("listening on :8080")
//!     .build();
//! appender.append(&record)?;
//! appender.close()?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod append;
pub mod layout;
pub mod record;
pub mod trap;

mod bridge;
mod error;
mod filename;

pub use append::DailyFile;
pub use append::DailyFileBuilder;
pub use error::Error;
pub use filename::DEFAULT_DATE_PATTERN;
pub use filename::DatePattern;
pub use filename::compose;
pub use layout::Layout;
