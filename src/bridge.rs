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

//! Conversions from the `log` crate's types, so embedding systems built on
//! `log` can hand records to the appender directly.

use crate::record::Level;
use crate::record::Record;

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug => Self::Debug,
            log::Level::Trace => Self::Trace,
        }
    }
}

impl From<&log::Record<'_>> for Record {
    fn from(record: &log::Record<'_>) -> Self {
        Record::builder()
            .logger(record.target())
            .level(record.level().into())
            .payload(record.args().to_string())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Payload;

    #[test]
    fn test_log_record_conversion() {
        let record = Record::from(
            &log::Record::builder()
                .args(format_args!("service started"))
                .level(log::Level::Warn)
                .target("server::boot")
                .build(),
        );

        assert_eq!(record.level(), Level::Warn);
        assert_eq!(record.logger(), "server::boot");
        assert_eq!(
            record.payload(),
            &Payload::Text("service started".to_string())
        );
    }
}
