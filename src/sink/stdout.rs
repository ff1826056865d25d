use std::io::Write;

use super::{report_sink_failure, Sink, SinkCore};
use crate::level::Level;
use crate::record::Record;

fn write_batch(
    core: &SinkCore,
    name: &str,
    short_messages: bool,
    out: &mut dyn Write,
    batch: &[Record],
) {
    core.gc_filters();
    let mut flush_count = 0usize;
    for record in batch {
        if record.level > core.level() {
            continue;
        }
        if core.skip_message(record) {
            continue;
        }
        if let Err(e) = write_one(core, short_messages, out, record) {
            report_sink_failure(name, &e);
            continue;
        }
        flush_count += 1;
        if flush_count % 50 == 0 {
            let _ = out.flush();
        }
    }
    let _ = out.flush();
}

fn write_one(
    core: &SinkCore,
    short_messages: bool,
    out: &mut dyn Write,
    record: &Record,
) -> std::io::Result<()> {
    if !short_messages {
        out.write_all(record.prefix1.as_str().as_bytes())?;
        if core.level() == Level::Debug2 {
            out.write_all(record.prefix2.as_str().as_bytes())?;
        }
        out.write_all(record.prefix3.as_str().as_bytes())?;
    }
    let body = record.body_for_write();
    let body = core.truncate_body(&body);
    out.write_all(body.as_bytes())?;
    out.write_all(b"\n")
}

/// Writes to the process's stdout stream. `short_messages` drops prefixes
/// entirely, for TTY-interactive output — spec.md §4.3.
pub struct StdoutSink {
    core: SinkCore,
    short_messages: bool,
}

impl StdoutSink {
    pub fn new(name: impl Into<String>, level: Level, short_messages: bool) -> Self {
        StdoutSink { core: SinkCore::new(name, level), short_messages }
    }
}

impl Sink for StdoutSink {
    fn core(&self) -> &SinkCore {
        &self.core
    }

    fn flush_impl(&self, batch: &[Record]) {
        if batch.is_empty() {
            return;
        }
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        write_batch(&self.core, self.name(), self.short_messages, &mut lock, batch);
    }
}

/// Writes to the process's stderr stream. Same contract as [`StdoutSink`].
pub struct StderrSink {
    core: SinkCore,
    short_messages: bool,
}

impl StderrSink {
    pub fn new(name: impl Into<String>, level: Level, short_messages: bool) -> Self {
        StderrSink { core: SinkCore::new(name, level), short_messages }
    }
}

impl Sink for StderrSink {
    fn core(&self) -> &SinkCore {
        &self.core
    }

    fn flush_impl(&self, batch: &[Record]) {
        if batch.is_empty() {
            return;
        }
        let stderr = std::io::stderr();
        let mut lock = stderr.lock();
        write_batch(&self.core, self.name(), self.short_messages, &mut lock, batch);
    }
}
