//! Error types surfaced at the crate's external boundaries — configuration
//! binding and sink construction. Per spec.md §7, producer-side emission
//! never fails observably and worker-side failures never propagate to
//! producers; `LoggerError` only ever reaches a caller through
//! [`crate::config::bind`] or a `Sink` constructor such as
//! [`crate::sink::FileSink::new`].

use thiserror::Error;

/// Errors surfaced by configuration binding, filter construction, and sink
/// construction — spec.md §7's Configuration/SinkWrite/FilterConstruction
/// kinds. Worker-side write failures during `flush` are not representable
/// here; they are reported to the auxiliary panic log instead
/// (`sink::report_sink_failure`), never returned to a caller.
#[derive(Debug, Error)]
pub enum LoggerError {
    /// Malformed document, unknown filter/saver type, empty required field,
    /// or a saver referencing a filter name that does not exist.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Invalid level token, out-of-range line number, or other filter
    /// construction failure. The offending filter is skipped by the binder;
    /// this variant records why.
    #[error("filter construction error: {0}")]
    FilterConstruction(String),
    /// A sink could not be constructed (e.g. `FileSink::new` failed to open
    /// or truncate its target file).
    #[error("sink error: {0}")]
    SinkWrite(String),
}

impl From<std::io::Error> for LoggerError {
    fn from(err: std::io::Error) -> Self {
        LoggerError::SinkWrite(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LoggerError>;
