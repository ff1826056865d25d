use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use super::{report_sink_failure, Sink, SinkCore};
use crate::level::Level;
use crate::record::Record;

/// Writes to a file, opened append-only and closed on every flush —
/// spec.md §4.3. If `continue_existing == false` the file is truncated once
/// at construction time.
pub struct FileSink {
    core: SinkCore,
    path: PathBuf,
}

impl FileSink {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        level: Level,
        continue_existing: bool,
    ) -> std::io::Result<Self> {
        let path = path.into();
        if !continue_existing {
            OpenOptions::new().write(true).create(true).truncate(true).open(&path)?;
        }
        Ok(FileSink { core: SinkCore::new(name, level), path })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn write_batch(&self, batch: &[Record]) -> std::io::Result<()> {
        let mut f = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.core.gc_filters();
        let mut flush_count = 0usize;
        for record in batch {
            if record.level > self.core.level() {
                continue;
            }
            if self.core.skip_message(record) {
                continue;
            }
            f.write_all(record.prefix1.as_str().as_bytes())?;
            if self.core.level() == Level::Debug2 {
                f.write_all(record.prefix2.as_str().as_bytes())?;
            }
            f.write_all(record.prefix3.as_str().as_bytes())?;

            let body = record.body_for_write();
            let body = self.core.truncate_body(&body);
            f.write_all(body.as_bytes())?;
            f.write_all(b"\n")?;

            flush_count += 1;
            if flush_count % 500 == 0 {
                f.flush()?;
            }
        }
        f.flush()
    }
}

impl Sink for FileSink {
    fn core(&self) -> &SinkCore {
        &self.core
    }

    fn flush_impl(&self, batch: &[Record]) {
        if batch.is_empty() {
            return;
        }
        if let Err(e) = self.write_batch(batch) {
            report_sink_failure(self.name(), &e);
        }
    }
}
