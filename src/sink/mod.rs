//! Sinks: the destinations a batch of formatted [`Record`]s is written to.
//!
//! Mirrors the source's `Saver` hierarchy: a shared base (name, active,
//! level, max line size, filter chain) plus a per-destination `flush`
//! implementation. `Saver`'s intrusive filter list becomes an `ArcSwap`
//! snapshot here — spec.md §4.3 "filter iteration inside flush is over a
//! snapshot taken under the lock".

mod file;
mod stdout;
#[cfg(feature = "syslog")]
mod syslog;

pub use file::FileSink;
pub use stdout::{StderrSink, StdoutSink};
#[cfg(feature = "syslog")]
pub use syslog::SyslogSink;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::filter::{skip_message, Filter};
use crate::level::Level;
use crate::record::Record;

/// Default cap on a written line's byte length — spec.md §4.3. `0` means
/// unbounded. Truncation is a raw byte copy: a multi-byte UTF-8 sequence can
/// be split. spec.md §9 accepts this as the source's current behavior.
pub const DEFAULT_MAX_LINE_SIZE: usize = 5000;

/// State and behavior common to every sink variant.
pub struct SinkCore {
    name: String,
    active: AtomicBool,
    level: Mutex<Level>,
    max_line_size: Mutex<usize>,
    filters: ArcSwap<Vec<Arc<dyn Filter>>>,
    filters_active: AtomicBool,
}

impl SinkCore {
    pub fn new(name: impl Into<String>, level: Level) -> Self {
        SinkCore {
            name: name.into(),
            active: AtomicBool::new(true),
            level: Mutex::new(level),
            max_line_size: Mutex::new(DEFAULT_MAX_LINE_SIZE),
            filters: ArcSwap::from_pointee(Vec::new()),
            filters_active: AtomicBool::new(true),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn set_active(&self, val: bool) {
        self.active.store(val, Ordering::Release);
    }

    pub fn level(&self) -> Level {
        *self.level.lock()
    }

    pub fn set_level(&self, val: Level) {
        *self.level.lock() = val;
    }

    pub fn max_line_size(&self) -> usize {
        *self.max_line_size.lock()
    }

    pub fn set_max_line_size(&self, val: usize) {
        *self.max_line_size.lock() = val;
    }

    pub fn set_filters_active(&self, val: bool) {
        self.filters_active.store(val, Ordering::Release);
    }

    /// Snapshot of the current filter chain, for use inside one `flush`.
    pub fn filters_snapshot(&self) -> Arc<Vec<Arc<dyn Filter>>> {
        self.filters.load_full()
    }

    /// Replaces any filter with the same name; locks the new one so it can
    /// no longer be reconfigured — spec.md §4.3.
    pub fn add_filter(&self, filter: Arc<dyn Filter>) {
        filter.lock();
        self.filters.rcu(move |current| {
            let mut next: Vec<Arc<dyn Filter>> =
                current.iter().filter(|f| f.name() != filter.name()).cloned().collect();
            next.push(filter.clone());
            next
        });
    }

    pub fn remove_filter(&self, name: &str) {
        self.filters.rcu(move |current| {
            current.iter().filter(|f| f.name() != name).cloned().collect::<Vec<_>>()
        });
    }

    pub fn clear_filters(&self) {
        self.filters.store(Arc::new(Vec::new()));
    }

    /// Evicts stale thread-context entries from every filter in the chain —
    /// spec.md §4.2 step 6, invoked once per flush.
    pub fn gc_filters(&self) {
        for filter in self.filters_snapshot().iter() {
            filter.core().gc_thread_context();
        }
    }

    /// spec.md §4.3 `skipMessage`: empty chain or a disabled chain both mean
    /// "keep".
    pub fn skip_message(&self, record: &Record) -> bool {
        if !self.filters_active.load(Ordering::Acquire) {
            return false;
        }
        let snapshot = self.filters_snapshot();
        skip_message(record, &snapshot)
    }

    /// Copies `body` into a fixed-size scratch buffer, truncated to
    /// `max_line_size` if set — matching `strncpy` in the source, which
    /// truncates at a raw byte offset. Here the offset is walked back to the
    /// nearest char boundary first: slicing a `str` at an arbitrary byte
    /// index panics, and spec.md §7 requires truncation to never raise an
    /// error.
    pub fn truncate_body<'a>(&self, body: &'a str) -> std::borrow::Cow<'a, str> {
        let mut cap = self.max_line_size();
        if cap == 0 || body.len() <= cap {
            return std::borrow::Cow::Borrowed(body);
        }
        while cap > 0 && !body.is_char_boundary(cap) {
            cap -= 1;
        }
        std::borrow::Cow::Owned(body[..cap].to_string())
    }
}

/// Writes a batch of records to one destination. `flush` is the only method
/// the worker calls; each implementation is responsible for its own
/// mid-batch flush cadence and for reporting write failures to the
/// auxiliary panic log rather than propagating them.
pub trait Sink: Send + Sync {
    fn core(&self) -> &SinkCore;

    fn name(&self) -> &str {
        self.core().name()
    }

    /// `Saver::flush`: a disabled sink, or one at `Level::None`, is a no-op
    /// — spec.md §4.3.
    fn flush(&self, batch: &[Record]) {
        if !self.core().active() {
            return;
        }
        if self.core().level() == Level::None {
            return;
        }
        self.flush_impl(batch);
    }

    fn flush_impl(&self, batch: &[Record]);
}

/// Appends one line to the well-known auxiliary panic-log file, ignoring any
/// further error — spec.md §4.5 "an exception in a sink's flush is caught,
/// logged to an auxiliary file... the batch continues". spec.md §6's
/// literal format: `Saver name: X; Error: Y`.
pub fn report_sink_failure(sink_name: &str, error: &dyn std::fmt::Display) {
    use std::io::Write;
    let path = std::env::temp_dir().join("alogger.log");
    if let Ok(mut f) = std::fs::OpenOptions::new().create(true).append(true).open(path) {
        let _ = writeln!(f, "Saver name: {sink_name}; Error: {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_core_skips_flush() {
        let core = SinkCore::new("x", Level::Info);
        core.set_active(false);
        assert!(!core.active());
    }

    #[test]
    fn truncate_body_respects_cap() {
        let core = SinkCore::new("x", Level::Info);
        core.set_max_line_size(4);
        assert_eq!(core.truncate_body("hello"), "hell");
        assert_eq!(core.truncate_body("hi"), "hi");
    }

    #[test]
    fn add_filter_replaces_same_name() {
        let core = SinkCore::new("x", Level::Info);
        let mut a = crate::filter::ModuleFilter::new("m", ["net"]);
        a.lock();
        core.add_filter(Arc::new(a));
        let mut b = crate::filter::ModuleFilter::new("m", ["db"]);
        b.lock();
        core.add_filter(Arc::new(b));
        assert_eq!(core.filters_snapshot().len(), 1);
    }
}
