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

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::BufWriter;
use std::io::Write;
use std::mem;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use jiff::civil::Date;

use crate::Error;
use crate::append::Clock;
use crate::filename;
use crate::filename::DatePattern;
use crate::layout::Layout;
use crate::record::LevelFilter;
use crate::record::Record;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

/// A builder to configure and create a [`DailyFile`] appender.
#[derive(Debug)]
pub struct DailyFileBuilder {
    base_path: PathBuf,
    date_pattern: String,
    append_mode: bool,
    buffered_io: bool,
    immediate_flush: bool,
    text_encoding: Option<String>,
    name: Option<String>,
    filter: Option<String>,
    threshold: LevelFilter,
    layout: Layout,
    clock: Clock,
    trap: Box<dyn Trap>,
}

impl DailyFileBuilder {
    /// Create a new builder writing around the given base path.
    ///
    /// The dated filenames of the rotation segments are derived from the
    /// base path, e.g. `logs/app.log` rolls to `logs/app_2024_05_01.log`.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            date_pattern: filename::DEFAULT_DATE_PATTERN.to_string(),
            append_mode: true,
            buffered_io: false,
            immediate_flush: true,
            text_encoding: None,
            name: None,
            filter: None,
            threshold: LevelFilter::Trace,
            layout: Layout::default(),
            clock: Clock::DefaultClock,
            trap: Box::new(DefaultTrap::default()),
        }
    }

    /// Set the date pattern inserted into rotated filenames.
    ///
    /// Default to [`DEFAULT_DATE_PATTERN`](crate::DEFAULT_DATE_PATTERN).
    #[must_use]
    pub fn date_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.date_pattern = pattern.into();
        self
    }

    /// Whether each sink is opened for appending (`true`, the default) or
    /// truncated on open (`false`). The mode applies on every open,
    /// activation and rotation alike.
    #[must_use]
    pub fn append_mode(mut self, append: bool) -> Self {
        self.append_mode = append;
        self
    }

    /// Wrap the sink in a buffered writer.
    #[must_use]
    pub fn buffered_io(mut self, buffered: bool) -> Self {
        self.buffered_io = buffered;
        self
    }

    /// Flush the sink after every record. Default to `true`.
    #[must_use]
    pub fn immediate_flush(mut self, flush: bool) -> Self {
        self.immediate_flush = flush;
        self
    }

    /// Record the name of the text encoding for diagnostics.
    ///
    /// File content is always written as the bytes the layout produced; text
    /// layouts produce UTF-8.
    #[must_use]
    pub fn text_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.text_encoding = Some(encoding.into());
        self
    }

    /// Set the appender name shown in diagnostics. Defaults to the base
    /// path's file name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Record the name of the filter attached by the embedding system, for
    /// diagnostics only.
    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Record the minimum severity the caller accepts. The appender stores
    /// it for diagnostics; enforcing it is the caller's responsibility.
    #[must_use]
    pub fn threshold(mut self, threshold: LevelFilter) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the layout encoding records into bytes.
    ///
    /// Default to [`TextLayout`](crate::layout::TextLayout).
    #[must_use]
    pub fn layout(mut self, layout: impl Into<Layout>) -> Self {
        self.layout = layout.into();
        self
    }

    /// Set the trap for errors raised where no `Result` can travel.
    ///
    /// Default to [`DefaultTrap`].
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    #[cfg(test)]
    pub(crate) fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Build the appender in the closed state. Call
    /// [`activate`](DailyFile::activate) to open the first sink.
    ///
    /// # Errors
    ///
    /// Returns an error if the date pattern is malformed.
    pub fn build(self) -> Result<DailyFile, Error> {
        let date_pattern = DatePattern::new(self.date_pattern)?;
        let name = self.name.unwrap_or_else(|| {
            self.base_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        let config = Config {
            base_path: self.base_path,
            date_pattern,
            append_mode: self.append_mode,
            buffered_io: self.buffered_io,
            immediate_flush: self.immediate_flush,
            text_encoding: self.text_encoding,
            name,
            filter: self.filter,
            threshold: self.threshold,
            layout: self.layout,
            clock: self.clock,
            trap: self.trap,
        };

        Ok(DailyFile {
            inner: Arc::new(Inner {
                config,
                state: Mutex::new(State::Closed),
            }),
        })
    }
}

/// An appender that writes encoded records to a file whose name changes at
/// calendar-day boundaries.
///
/// The date check happens on the write path, not on a background timer, so
/// rotation is lazy: a quiet period spanning a boundary produces no empty
/// intermediate file, and the first append after the boundary triggers
/// exactly one rollover.
///
/// One mutex guards the whole sequence of date comparison, rollover, encode,
/// and write, so concurrent appends on one appender are fully serialized and
/// layouts need not be thread-safe. Cloning returns another handle to the
/// same appender.
#[derive(Debug, Clone)]
pub struct DailyFile {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: Config,
    state: Mutex<State>,
}

#[derive(Debug)]
struct Config {
    base_path: PathBuf,
    date_pattern: DatePattern,
    append_mode: bool,
    buffered_io: bool,
    immediate_flush: bool,
    text_encoding: Option<String>,
    name: String,
    filter: Option<String>,
    threshold: LevelFilter,
    layout: Layout,
    clock: Clock,
    trap: Box<dyn Trap>,
}

// A sink exists iff the appender is open, and its path is always exactly
// compose(base_path, date_pattern, date).
#[derive(Debug)]
enum State {
    Closed,
    Open(Sink),
}

#[derive(Debug)]
struct Sink {
    writer: SinkWriter,
    path: PathBuf,
    date: Date,
}

#[derive(Debug)]
enum SinkWriter {
    Plain(File),
    Buffered(BufWriter<File>),
}

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            SinkWriter::Plain(file) => file.write(buf),
            SinkWriter::Buffered(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            SinkWriter::Plain(file) => file.flush(),
            SinkWriter::Buffered(writer) => writer.flush(),
        }
    }
}

impl DailyFile {
    fn state(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Open the sink for today's date, writing the layout header.
    ///
    /// If the appender is already open, the current sink is closed first,
    /// footer included.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileOpen`] if the sink cannot be created; the
    /// appender stays closed.
    pub fn activate(&self) -> Result<(), Error> {
        let mut state = self.state();
        if let State::Open(sink) = mem::replace(&mut *state, State::Closed) {
            self.release_sink(sink);
        }
        let sink = self.open_sink(self.inner.config.clock.today())?;
        *state = State::Open(sink);
        Ok(())
    }

    /// Encode one record and append its bytes to the current sink, rolling
    /// over first if the calendar date has changed since the sink was opened.
    ///
    /// # Errors
    ///
    /// * [`Error::Closed`] if the appender has not been activated, was
    ///   closed, or a previous rollover failed.
    /// * [`Error::Rollover`] if the new sink cannot be opened at a date
    ///   boundary. The appender ends closed and no bytes of this record are
    ///   written anywhere.
    /// * [`Error::Encoding`] if the layout cannot encode this record. Only
    ///   this record is dropped; the appender remains open.
    pub fn append(&self, record: &Record) -> Result<(), Error> {
        let config = &self.inner.config;
        let mut state = self.state();

        let date = match &*state {
            State::Closed => return Err(Error::Closed),
            State::Open(sink) => sink.date,
        };
        let today = config.clock.today();
        if date != today {
            self.rollover_locked(&mut state, today)?;
        }

        let bytes = config.layout.format(record)?;

        let State::Open(sink) = &mut *state else {
            return Err(Error::Closed);
        };
        sink.writer.write_all(&bytes)?;
        if config.immediate_flush {
            sink.writer.flush()?;
        }
        Ok(())
    }

    /// Force a rotation regardless of the calendar date.
    ///
    /// Same effect as the internal check on the write path: the current sink
    /// is closed with its footer and a new sink for today's date is opened
    /// with its header.
    pub fn rollover(&self) -> Result<(), Error> {
        let today = self.inner.config.clock.today();
        let mut state = self.state();
        self.rollover_locked(&mut state, today)
    }

    /// Write the footer if one is configured, flush, and release the sink.
    ///
    /// Safe to call multiple times; subsequent calls are no-ops. The
    /// appender ends closed even if writing the footer fails.
    pub fn close(&self) -> Result<(), Error> {
        let mut state = self.state();
        match mem::replace(&mut *state, State::Closed) {
            State::Closed => Ok(()),
            State::Open(mut sink) => {
                let mut result = Ok(());
                if let Some(footer) = self.inner.config.layout.footer() {
                    result = sink.writer.write_all(footer).map_err(Error::from);
                }
                let flushed = sink.writer.flush().map_err(Error::from);
                result.and(flushed)
            }
        }
    }

    /// Flush the current sink, if open.
    pub fn flush(&self) -> Result<(), Error> {
        match &mut *self.state() {
            State::Closed => Ok(()),
            State::Open(sink) => sink.writer.flush().map_err(Error::from),
        }
    }

    /// Whether the appender currently owns an open sink.
    pub fn is_open(&self) -> bool {
        matches!(&*self.state(), State::Open(_))
    }

    /// The path of the currently open rotation segment, if any.
    pub fn current_path(&self) -> Option<PathBuf> {
        match &*self.state() {
            State::Closed => None,
            State::Open(sink) => Some(sink.path.clone()),
        }
    }

    /// A human-readable dump of the appender state, for operational
    /// debugging only. Not meant for control flow.
    pub fn describe(&self) -> String {
        let config = &self.inner.config;
        let state = self.state();
        let (active, file) = match &*state {
            State::Closed => (false, None),
            State::Open(sink) => (true, Some(sink.path.display().to_string())),
        };
        let writer = match (active, config.buffered_io) {
            (false, _) => "none",
            (true, false) => "file",
            (true, true) => "buffered file",
        };
        format!(
            "DailyFile(name: {name}, append: {append}, buffered_io: {buffered}, \
             date_pattern: {pattern}, encoding: {encoding}, file: {file}, \
             filter: {filter}, immediate_flush: {flush}, active: {active}, \
             closed: {closed}, layout: {layout}, reference_count: {refs}, \
             threshold: {threshold}, writer: {writer})",
            name = config.name,
            append = config.append_mode,
            buffered = config.buffered_io,
            pattern = config.date_pattern.as_str(),
            encoding = config.text_encoding.as_deref().unwrap_or("utf-8"),
            file = file.as_deref().unwrap_or("none"),
            filter = config.filter.as_deref().unwrap_or("none"),
            flush = config.immediate_flush,
            active = active,
            closed = !active,
            layout = config.layout.name(),
            refs = Arc::strong_count(&self.inner),
            threshold = config.threshold,
            writer = writer,
        )
    }

    fn rollover_locked(&self, state: &mut State, today: Date) -> Result<(), Error> {
        match mem::replace(state, State::Closed) {
            State::Closed => Err(Error::Closed),
            State::Open(sink) => {
                self.release_sink(sink);
                match self.open_sink(today) {
                    Ok(sink) => {
                        *state = State::Open(sink);
                        Ok(())
                    }
                    // the previous sink is gone; fail fast until reactivated
                    Err(Error::FileOpen { path, source }) => Err(Error::Rollover { path, source }),
                    Err(err) => Err(err),
                }
            }
        }
    }

    // The dying sink cannot fail the records that follow it, so footer and
    // flush errors are reported through the trap instead of the caller.
    fn release_sink(&self, mut sink: Sink) {
        let config = &self.inner.config;
        if let Some(footer) = config.layout.footer()
            && let Err(err) = sink.writer.write_all(footer)
        {
            config.trap.trap(&Error::Io(err));
        }
        if let Err(err) = sink.writer.flush() {
            config.trap.trap(&Error::Io(err));
        }
    }

    fn open_sink(&self, date: Date) -> Result<Sink, Error> {
        let config = &self.inner.config;
        let path = filename::compose(&config.base_path, &config.date_pattern, date);

        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).map_err(|err| Error::FileOpen {
                path: path.clone(),
                source: err,
            })?;
        }

        let mut options = OpenOptions::new();
        if config.append_mode {
            options.create(true).append(true);
        } else {
            options.create(true).write(true).truncate(true);
        }
        let file = options.open(&path).map_err(|err| Error::FileOpen {
            path: path.clone(),
            source: err,
        })?;

        let writer = if config.buffered_io {
            SinkWriter::Buffered(BufWriter::new(file))
        } else {
            SinkWriter::Plain(file)
        };
        let mut sink = Sink { writer, path, date };

        if let Some(header) = config.layout.header() {
            sink.writer.write_all(header).map_err(|err| Error::FileOpen {
                path: sink.path.clone(),
                source: err,
            })?;
        }

        Ok(sink)
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        // dropping without close() flushes but does not write the footer
        let state = self.state.get_mut().unwrap_or_else(|e| e.into_inner());
        if let State::Open(sink) = state
            && let Err(err) = sink.writer.flush()
        {
            self.config.trap.trap(&Error::Io(err));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use jiff::civil::date;
    use tempfile::TempDir;

    use super::*;
    use crate::append::clock::ManualClock;
    use crate::layout::BinaryLayout;
    use crate::layout::TextLayout;

    fn binary_appender(base: impl Into<PathBuf>, clock: &ManualClock) -> DailyFile {
        DailyFileBuilder::new(base)
            .layout(BinaryLayout::default().header(*b"<H>").footer(*b"<F>"))
            .clock(Clock::ManualClock(clock.clone()))
            .build()
            .unwrap()
    }

    fn read(path: impl AsRef<std::path::Path>) -> String {
        String::from_utf8(fs::read(path).unwrap()).unwrap()
    }

    #[test]
    fn test_append_before_activate_fails() {
        let temp_dir = TempDir::new().unwrap();
        let clock = ManualClock::new(date(2024, 5, 1));
        let appender = binary_appender(temp_dir.path().join("app.log"), &clock);

        let record = Record::builder().payload("early").build();
        assert!(matches!(appender.append(&record), Err(Error::Closed)));
        assert!(!appender.is_open());
    }

    #[test]
    fn test_rollover_on_date_change() {
        let temp_dir = TempDir::new().unwrap();
        let clock = ManualClock::new(date(2024, 5, 1));
        let appender = binary_appender(temp_dir.path().join("app.log"), &clock);

        appender.activate().unwrap();
        assert_eq!(
            appender.current_path().unwrap(),
            temp_dir.path().join("app_2024_05_01.log")
        );

        appender
            .append(&Record::builder().payload("one").build())
            .unwrap();

        clock.set_today(date(2024, 5, 2));
        appender
            .append(&Record::builder().payload("two").build())
            .unwrap();
        appender.close().unwrap();

        // the old segment was closed with its footer before the new one
        // received the triggering record
        assert_eq!(read(temp_dir.path().join("app_2024_05_01.log")), "<H>one<F>");
        assert_eq!(read(temp_dir.path().join("app_2024_05_02.log")), "<H>two<F>");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_idle_boundary_is_lazy() {
        let temp_dir = TempDir::new().unwrap();
        let clock = ManualClock::new(date(2024, 5, 1));
        let appender = binary_appender(temp_dir.path().join("app.log"), &clock);

        appender.activate().unwrap();
        clock.set_today(date(2024, 5, 2));
        clock.set_today(date(2024, 5, 3));

        // no append, no rotation
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
        assert_eq!(
            appender.current_path().unwrap(),
            temp_dir.path().join("app_2024_05_01.log")
        );

        appender
            .append(&Record::builder().payload("late").build())
            .unwrap();
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 2);
        assert_eq!(
            appender.current_path().unwrap(),
            temp_dir.path().join("app_2024_05_03.log")
        );
    }

    #[test]
    fn test_forced_rollover_frames_each_segment() {
        let temp_dir = TempDir::new().unwrap();
        let clock = ManualClock::new(date(2024, 5, 1));
        let appender = binary_appender(temp_dir.path().join("app.log"), &clock);

        appender.activate().unwrap();
        appender
            .append(&Record::builder().payload("one").build())
            .unwrap();
        appender.rollover().unwrap();
        appender
            .append(&Record::builder().payload("two").build())
            .unwrap();
        appender.close().unwrap();

        // same date, so both segments land in the same appended file
        assert_eq!(
            read(temp_dir.path().join("app_2024_05_01.log")),
            "<H>one<F><H>two<F>"
        );
    }

    #[test]
    fn test_truncate_mode_restarts_segments() {
        let temp_dir = TempDir::new().unwrap();
        let clock = ManualClock::new(date(2024, 5, 1));
        let appender = DailyFileBuilder::new(temp_dir.path().join("app.log"))
            .layout(BinaryLayout::default().header(*b"<H>").footer(*b"<F>"))
            .append_mode(false)
            .clock(Clock::ManualClock(clock.clone()))
            .build()
            .unwrap();

        appender.activate().unwrap();
        appender
            .append(&Record::builder().payload("one").build())
            .unwrap();
        appender.close().unwrap();

        appender.activate().unwrap();
        appender
            .append(&Record::builder().payload("two").build())
            .unwrap();
        appender.close().unwrap();

        assert_eq!(read(temp_dir.path().join("app_2024_05_01.log")), "<H>two<F>");
    }

    #[test]
    fn test_rollover_failure_closes_appender() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("logs");
        let clock = ManualClock::new(date(2024, 5, 1));
        let appender = binary_appender(log_dir.join("app.log"), &clock);

        appender.activate().unwrap();
        appender
            .append(&Record::builder().payload("one").build())
            .unwrap();

        // make the log directory path unusable so the reopen must fail
        fs::remove_dir_all(&log_dir).unwrap();
        fs::write(&log_dir, b"not a directory").unwrap();

        clock.set_today(date(2024, 5, 2));
        let err = appender
            .append(&Record::builder().payload("lost").build())
            .unwrap_err();
        assert!(matches!(err, Error::Rollover { .. }));
        assert!(!appender.is_open());

        // no bytes of the triggering record were written anywhere
        assert_eq!(fs::read(&log_dir).unwrap(), b"not a directory");

        // subsequent appends fail fast until reactivated
        let err = appender
            .append(&Record::builder().payload("after").build())
            .unwrap_err();
        assert!(matches!(err, Error::Closed));

        fs::remove_file(&log_dir).unwrap();
        appender.activate().unwrap();
        appender
            .append(&Record::builder().payload("recovered").build())
            .unwrap();
        assert_eq!(read(log_dir.join("app_2024_05_02.log")), "<H>recovered");
    }

    #[test]
    fn test_encoding_error_drops_only_the_record() {
        let temp_dir = TempDir::new().unwrap();
        let clock = ManualClock::new(date(2024, 5, 1));
        let appender = DailyFileBuilder::new(temp_dir.path().join("app.log"))
            .layout(TextLayout::default())
            .clock(Clock::ManualClock(clock.clone()))
            .build()
            .unwrap();

        appender.activate().unwrap();

        let bad = Record::builder().binary_payload([0xff, 0xfe]).build();
        assert!(matches!(appender.append(&bad), Err(Error::Encoding { .. })));
        assert!(appender.is_open());

        let good = Record::builder().payload("still alive").build();
        appender.append(&good).unwrap();
        appender.close().unwrap();

        let content = read(temp_dir.path().join("app_2024_05_01.log"));
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("still alive"));
    }

    #[test]
    fn test_reactivate_closes_previous_sink() {
        let temp_dir = TempDir::new().unwrap();
        let clock = ManualClock::new(date(2024, 5, 1));
        let appender = binary_appender(temp_dir.path().join("app.log"), &clock);

        appender.activate().unwrap();
        appender
            .append(&Record::builder().payload("one").build())
            .unwrap();
        appender.activate().unwrap();
        appender.close().unwrap();

        // the footer of the first activation landed before the second header
        assert_eq!(
            read(temp_dir.path().join("app_2024_05_01.log")),
            "<H>one<F><H><F>"
        );
    }

    #[test]
    fn test_close_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let clock = ManualClock::new(date(2024, 5, 1));
        let appender = binary_appender(temp_dir.path().join("app.log"), &clock);

        appender.activate().unwrap();
        appender.close().unwrap();
        appender.close().unwrap();
        assert_eq!(read(temp_dir.path().join("app_2024_05_01.log")), "<H><F>");
    }

    #[test]
    fn test_describe_reports_state() {
        let temp_dir = TempDir::new().unwrap();
        let clock = ManualClock::new(date(2024, 5, 1));
        let appender = DailyFileBuilder::new(temp_dir.path().join("app.log"))
            .filter("deny-health-checks")
            .threshold(LevelFilter::Info)
            .clock(Clock::ManualClock(clock.clone()))
            .build()
            .unwrap();

        let closed = appender.describe();
        assert!(closed.contains("name: app.log"));
        assert!(closed.contains("active: false"));
        assert!(closed.contains("file: none"));

        appender.activate().unwrap();
        let shared = appender.clone();
        let open = shared.describe();
        assert!(open.contains("active: true"));
        assert!(open.contains("app_2024_05_01.log"));
        assert!(open.contains("date_pattern: _yyyy_MM_dd"));
        assert!(open.contains("filter: deny-health-checks"));
        assert!(open.contains("threshold: INFO"));
        assert!(open.contains("layout: TextLayout"));
        assert!(open.contains("reference_count: 2"));
    }
}
