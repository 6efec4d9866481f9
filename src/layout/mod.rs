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

//! Layouts for encoding log records into bytes.

pub use binary::BinaryLayout;
pub use text::TextLayout;

mod binary;
mod text;

use crate::Error;
use crate::record::Record;

/// A pluggable strategy that turns one record into bytes.
///
/// Every layout may carry optional header and footer bytes. The appender
/// writes them at most once per sink lifetime: the header when a sink is
/// opened, the footer when it is closed. They are never written per record.
#[derive(Debug, Clone)]
pub enum Layout {
    Text(TextLayout),
    Binary(BinaryLayout),
}

impl Default for Layout {
    fn default() -> Self {
        Layout::Text(TextLayout::default())
    }
}

impl Layout {
    /// Encodes one record into bytes.
    ///
    /// Fails with [`Error::Encoding`] when the record's payload does not
    /// match what the layout expects.
    pub fn format(&self, record: &Record) -> Result<Vec<u8>, Error> {
        match self {
            Layout::Text(layout) => layout.format(record),
            Layout::Binary(layout) => layout.format(record),
        }
    }

    /// The bytes written when a sink is opened, if any.
    pub fn header(&self) -> Option<&[u8]> {
        match self {
            Layout::Text(layout) => layout.header.as_deref(),
            Layout::Binary(layout) => layout.header.as_deref(),
        }
    }

    /// The bytes written when a sink is closed, if any.
    pub fn footer(&self) -> Option<&[u8]> {
        match self {
            Layout::Text(layout) => layout.footer.as_deref(),
            Layout::Binary(layout) => layout.footer.as_deref(),
        }
    }

    /// A MIME-like descriptor of the produced bytes.
    pub fn content_type(&self) -> &'static str {
        match self {
            Layout::Text(_) => "text/plain",
            Layout::Binary(_) => "application/octet-stream",
        }
    }

    /// The layout's name, for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Layout::Text(_) => "TextLayout",
            Layout::Binary(_) => "BinaryLayout",
        }
    }
}
