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

//! Log records and their metadata.

use std::fmt;
use std::str::FromStr;
use std::thread;

use jiff::Zoned;

use crate::Error;

/// One immutable unit of log data to be encoded and written.
///
/// Records are built once by the producer and passed by shared reference into
/// the appender; the appender never mutates them.
#[derive(Clone, Debug)]
pub struct Record {
    time: Zoned,
    logger: String,
    level: Level,
    thread: String,
    payload: Payload,
}

impl Record {
    /// Returns a new builder.
    pub fn builder() -> RecordBuilder {
        RecordBuilder::default()
    }

    /// The observed time.
    pub fn time(&self) -> &Zoned {
        &self.time
    }

    /// The name of the logger that produced this record.
    pub fn logger(&self) -> &str {
        &self.logger
    }

    /// The verbosity level of the record.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The name of the originating thread.
    pub fn thread(&self) -> &str {
        &self.thread
    }

    /// The record body.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

/// The body of a [`Record`].
///
/// Most records carry rendered text; records bound for a binary encoding
/// target carry an opaque byte payload instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    /// A rendered text message.
    Text(String),
    /// An opaque byte payload.
    Binary(Vec<u8>),
}

/// Builder for [`Record`].
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl Default for RecordBuilder {
    fn default() -> Self {
        RecordBuilder {
            record: Record {
                time: Zoned::now(),
                logger: String::new(),
                level: Level::Info,
                thread: thread::current().name().map(str::to_owned).unwrap_or_default(),
                payload: Payload::Text(String::new()),
            },
        }
    }
}

impl RecordBuilder {
    /// Set [`time`](Record::time).
    pub fn time(mut self, time: Zoned) -> Self {
        self.record.time = time;
        self
    }

    /// Set [`logger`](Record::logger).
    pub fn logger(mut self, logger: impl Into<String>) -> Self {
        self.record.logger = logger.into();
        self
    }

    /// Set [`level`](Record::level).
    pub fn level(mut self, level: Level) -> Self {
        self.record.level = level;
        self
    }

    /// Set [`thread`](Record::thread).
    ///
    /// Defaults to the name of the current thread.
    pub fn thread(mut self, thread: impl Into<String>) -> Self {
        self.record.thread = thread.into();
        self
    }

    /// Set a text [`payload`](Record::payload).
    pub fn payload(mut self, payload: impl Into<String>) -> Self {
        self.record.payload = Payload::Text(payload.into());
        self
    }

    /// Set a binary [`payload`](Record::payload).
    pub fn binary_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.record.payload = Payload::Binary(payload.into());
        self
    }

    /// Invoke the builder and return a `Record`.
    pub fn build(self) -> Record {
        self.record
    }
}

/// An enum representing the available verbosity levels of a record.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Designates very serious errors.
    Error,
    /// Designates hazardous situations.
    Warn,
    /// Designates useful information.
    Info,
    /// Designates lower priority information.
    Debug,
    /// Designates very low priority, often extremely verbose, information.
    Trace,
}

impl Level {
    /// Return the string representation of the `Level`.
    ///
    /// This returns the same string as the `fmt::Display` implementation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;
    fn from_str(s: &str) -> Result<Level, Self::Err> {
        for (name, level) in [
            ("error", Level::Error),
            ("warn", Level::Warn),
            ("info", Level::Info),
            ("debug", Level::Debug),
            ("trace", Level::Trace),
        ] {
            if s.eq_ignore_ascii_case(name) {
                return Ok(level);
            }
        }

        Err(Error::Level(s.to_string()))
    }
}

/// An enum representing the available verbosity level filters.
///
/// The appender stores the configured threshold for introspection; enforcing
/// it is the caller's responsibility.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum LevelFilter {
    /// Disables all levels.
    Off,
    /// Accepts `Error` only.
    Error,
    /// Accepts `Error` and `Warn`.
    Warn,
    /// Accepts `Error` through `Info`.
    Info,
    /// Accepts `Error` through `Debug`.
    Debug,
    /// Accepts all levels.
    Trace,
}

impl LevelFilter {
    /// Checks whether the given level satisfies the filter condition.
    ///
    /// # Examples
    ///
    /// ```
    /// use logroll::record::Level;
    /// use logroll::record::LevelFilter;
    ///
    /// let threshold = LevelFilter::Info;
    ///
    /// assert_eq!(threshold.test(Level::Error), true);
    /// assert_eq!(threshold.test(Level::Info), true);
    /// assert_eq!(threshold.test(Level::Debug), false);
    /// ```
    pub fn test(&self, level: Level) -> bool {
        (level as u8) < (*self as u8)
    }

    /// Return the string representation of the `LevelFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelFilter::Off => "OFF",
            LevelFilter::Error => "ERROR",
            LevelFilter::Warn => "WARN",
            LevelFilter::Info => "INFO",
            LevelFilter::Debug => "DEBUG",
            LevelFilter::Trace => "TRACE",
        }
    }
}

impl fmt::Display for LevelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter_ordering() {
        assert!(!LevelFilter::Off.test(Level::Error));
        assert!(LevelFilter::Error.test(Level::Error));
        assert!(!LevelFilter::Error.test(Level::Warn));
        assert!(LevelFilter::Trace.test(Level::Trace));
        assert!(LevelFilter::Debug.test(Level::Info));
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("warn".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!("ERROR".parse::<Level>().unwrap(), Level::Error);
        for level in [
            Level::Error,
            Level::Warn,
            Level::Info,
            Level::Debug,
            Level::Trace,
        ] {
            assert_eq!(level.as_str().parse::<Level>().unwrap(), level);
        }

        let err = "loud".parse::<Level>().unwrap_err();
        assert!(matches!(err, Error::Level(_)));
    }

    #[test]
    fn test_record_builder_defaults() {
        let record = Record::builder().payload("hello").build();
        assert_eq!(record.level(), Level::Info);
        assert_eq!(record.payload(), &Payload::Text("hello".to_string()));
        assert!(record.logger().is_empty());
    }
}
