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

use std::fmt::Write;
use std::str;

use jiff::tz::TimeZone;

use crate::Error;
use crate::layout::Layout;
use crate::record::Payload;
use crate::record::Record;

/// A layout that formats log records as text, one line per record.
///
/// Output format:
///
/// ```text
/// 2024-08-11T22:44:57.172105+08:00 ERROR server [worker-0] Hello error!
/// 2024-08-11T22:44:57.172219+08:00  WARN server [worker-0] Hello warn!
/// 2024-08-11T22:44:57.172276+08:00  INFO server [worker-0] Hello info!
/// ```
///
/// You can customize the timezone of the timestamp by setting the `tz` field
/// with a [`TimeZone`] instance. Otherwise, the record's own timezone is used.
///
/// A binary payload is rendered only if it holds valid UTF-8; otherwise the
/// record fails with [`Error::Encoding`].
#[derive(Debug, Clone, Default)]
pub struct TextLayout {
    pub(crate) tz: Option<TimeZone>,
    pub(crate) header: Option<Vec<u8>>,
    pub(crate) footer: Option<Vec<u8>>,
}

impl TextLayout {
    /// Set the timezone used to render timestamps.
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }

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
        let message = match record.payload() {
            Payload::Text(text) => text.as_str(),
            Payload::Binary(bytes) => str::from_utf8(bytes).map_err(|err| Error::Encoding {
                reason: format!("binary payload is not valid UTF-8: {err}"),
            })?,
        };

        let time = match self.tz.clone() {
            Some(tz) => record.time().with_time_zone(tz),
            None => record.time().clone(),
        };
        let time = time.strftime("%Y-%m-%dT%H:%M:%S.%6f%:z");
        let level = record.level();
        let logger = record.logger();
        let thread = record.thread();

        let mut text = String::new();
        writeln!(&mut text, "{time} {level:>5} {logger} [{thread}] {message}")
            .expect("the timestamp format is valid; this is a bug in logroll");

        Ok(text.into_bytes())
    }
}

impl From<TextLayout> for Layout {
    fn from(layout: TextLayout) -> Self {
        Layout::Text(layout)
    }
}
