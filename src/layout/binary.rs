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

use crate::Error;
use crate::layout::Layout;
use crate::record::Payload;
use crate::record::Record;

/// A layout that emits raw byte payloads.
///
/// Binary payloads pass through verbatim. Text payloads map to their UTF-8
/// bytes, so the output is deterministic for every record shape. No record
/// separator is appended; framing, if needed, belongs to the header and
/// footer or to the payloads themselves.
#[derive(Debug, Clone, Default)]
pub struct BinaryLayout {
    pub(crate) header: Option<Vec<u8>>,
    pub(crate) footer: Option<Vec<u8>>,
}

impl BinaryLayout {
    /// Set the bytes written once when a sink is opened.
    pub fn header(mut self, header: impl Into<Vec<u8>>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Set the bytes written once when a sink is closed.
    pub fn footer(mut self, footer: impl Into<Vec<u8>>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub(crate) fn format(&self, record: &Record) -> Result<Vec<u8>, Error> {
        match record.payload() {
            Payload::Binary(bytes) => Ok(bytes.clone()),
            Payload::Text(text) => Ok(text.clone().into_bytes()),
        }
    }
}

impl From<BinaryLayout> for Layout {
    fn from(layout: BinaryLayout) -> Self {
        Layout::Binary(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_passthrough() {
        let layout = BinaryLayout::default();
        let record = Record::builder().binary_payload([0x00, 0xff, 0x10]).build();
        assert_eq!(layout.format(&record).unwrap(), vec![0x00, 0xff, 0x10]);
    }

    #[test]
    fn test_text_maps_to_utf8_bytes() {
        let layout = BinaryLayout::default();
        let record = Record::builder().payload("abc").build();
        assert_eq!(layout.format(&record).unwrap(), b"abc".to_vec());
    }

    #[test]
    fn test_framing_bytes() {
        let layout: Layout = BinaryLayout::default().header(*b"MAGIC").footer(*b"END").into();
        assert_eq!(layout.header(), Some(&b"MAGIC"[..]));
        assert_eq!(layout.footer(), Some(&b"END"[..]));
        assert_eq!(layout.content_type(), "application/octet-stream");
    }
}
