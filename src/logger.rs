//! Logging infrastructure for fwdt
//!
//! This module provides logging via the `log` crate, forwarding each record to
//! a [`DiagnosticSink`] installed by the host (a serial port, a ring buffer,
//! the kernel log). Logging is best effort: with no sink installed every
//! record is dropped, and nothing in the bridge depends on it.

use core::fmt;

use log::{Level, LevelFilter, Metadata, Record};
use spin::Once;

/// Destination for diagnostic lines
pub trait DiagnosticSink: Sync {
    /// Write one formatted line; failures are swallowed
    fn write_line(&self, args: fmt::Arguments<'_>);
}

/// Logger that formats records and hands them to the installed sink
struct SinkLogger {
    sink: Once<&'static dyn DiagnosticSink>,
}

impl log::Log for SinkLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Some(sink) = self.sink.get() {
            let level_str = match record.level() {
                Level::Error => "ERROR",
                Level::Warn => "WARN ",
                Level::Info => "INFO ",
                Level::Debug => "DEBUG",
                Level::Trace => "TRACE",
            };

            // Format: [LEVEL] target: message
            sink.write_line(format_args!(
                "[{}] {}: {}",
                level_str,
                record.target(),
                record.args()
            ));
        }
    }

    fn flush(&self) {}
}

static LOGGER: SinkLogger = SinkLogger { sink: Once::new() };

/// Initialize the logging subsystem
///
/// Fails if another logger was already installed for this process.
pub fn init(
    sink: &'static dyn DiagnosticSink,
    level: LevelFilter,
) -> Result<(), log::SetLoggerError> {
    log::set_logger(&LOGGER)?;
    LOGGER.sink.call_once(|| sink);
    log::set_max_level(level);
    Ok(())
}

/// Set the maximum log level
pub fn set_level(level: LevelFilter) {
    log::set_max_level(level);
}
