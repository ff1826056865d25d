//! # alogger
//!
//! A high-throughput asynchronous logging engine: producers hand off
//! [`Record`]s through a lock-light ingress queue, a single background
//! worker formats and dispatches them in batches, and a configurable chain
//! of [`Filter`]s decides what each [`Sink`] actually writes.
//!
//! ## Architecture
//!
//! - [`level`]: the `Level` severity lattice and its string mapping.
//! - [`record`]: the `Record` entry and its fixed-size prefix buffers.
//! - [`filter`]: the six `Filter` variants and their shared `FilterCore`.
//! - [`sink`]: `Sink` destinations (stdout, stderr, file, syslog) and the
//!   shared `SinkCore` filter-chain/level/activity state.
//! - [`format`]: the three pure prefix formatters.
//! - [`queue`]: the MPSC ingress batch-swap hand-off.
//! - [`worker`]: the background thread that drains, formats, and flushes.
//! - [`line`]: the streaming `Line` builder and the severity macros.
//! - [`logger`]: `Logger`, the facade producers and operators drive.
//! - [`config`]: declarative, format-agnostic configuration binding.
//! - [`error`]: `LoggerError`, surfaced only at configuration/construction
//!   boundaries — never on the hot emission path.
//!
//! Emitting a line looks like:
//!
//! ```no_run
//! use alogger::Logger;
//!
//! let logger = Logger::global();
//! alogger::info!(logger) << "connected to " << "10.0.0.1" << ":5432";
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod format;
pub mod intern;
pub mod level;
pub mod line;
pub mod logger;
pub mod queue;
pub mod record;
pub mod sink;
pub mod thread_id;
pub mod time;
pub mod worker;

pub use config::{bind, BindOutcome, ConfigDoc, FilterSpec, SaverSpec};
pub use error::{LoggerError, Result};
pub use filter::{
    Check, ContentFilter, FileFilter, Filter as FilterTrait, FilterCore, FunctionFilter,
    LevelFilter, Mode, ModuleFilter, ThreadFilter,
};
pub use level::{level_from_string, level_to_string, round, Level};
pub use logger::Logger;
pub use record::{Record, RecordTransform};
pub use sink::{FileSink, Sink as SinkTrait, SinkCore, StderrSink, StdoutSink};
#[cfg(feature = "syslog")]
pub use sink::SyslogSink;

/// Stops the process-wide [`Logger::global`] singleton. A thin convenience
/// wrapper so callers need not reach for `Logger::global().stop()`
/// explicitly at shutdown — spec.md §6.
pub fn stop() {
    Logger::global().stop();
}
