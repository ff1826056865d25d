//! Emits to the OS syslog facility via `libc::syslog`. Unix-only, and off
//! by default behind the `syslog` Cargo feature: syslog(3) is an ambient
//! global resource a library should not open without being asked.

use std::ffi::CString;

use super::{Sink, SinkCore};
use crate::level::Level;
use crate::record::Record;

/// Internal level → syslog severity, per spec.md §4.3.
fn syslog_priority(level: Level) -> libc::c_int {
    match level {
        Level::None => libc::LOG_EMERG,
        Level::Error => libc::LOG_ERR,
        Level::Warning => libc::LOG_WARNING,
        Level::Info => libc::LOG_NOTICE,
        Level::Verbose => libc::LOG_INFO,
        Level::Debug | Level::Debug2 => libc::LOG_DEBUG,
    }
}

pub struct SyslogSink {
    core: SinkCore,
    ident: CString,
}

impl SyslogSink {
    /// `ident` identifies this process in syslog output; it is kept alive
    /// for the sink's lifetime since `openlog` stores the pointer, not a
    /// copy.
    pub fn new(name: impl Into<String>, level: Level, ident: &str) -> Self {
        let ident = CString::new(ident).unwrap_or_else(|_| CString::new("alogger").unwrap());
        unsafe {
            libc::openlog(ident.as_ptr(), libc::LOG_PID, libc::LOG_USER);
        }
        SyslogSink { core: SinkCore::new(name, level), ident }
    }
}

impl Drop for SyslogSink {
    fn drop(&mut self) {
        unsafe { libc::closelog() };
    }
}

impl Sink for SyslogSink {
    fn core(&self) -> &SinkCore {
        &self.core
    }

    fn flush_impl(&self, batch: &[Record]) {
        if batch.is_empty() {
            return;
        }
        self.core.gc_filters();
        for record in batch {
            if record.level > self.core.level() {
                continue;
            }
            if self.core.skip_message(record) {
                continue;
            }
            let body = record.body_for_write();
            let body = self.core.truncate_body(&body);
            let message = format!("{}{}", record.prefix3.as_str(), body);
            if let Ok(c_message) = CString::new(message) {
                unsafe {
                    libc::syslog(syslog_priority(record.level), c"%s".as_ptr(), c_message.as_ptr());
                }
            }
        }
    }
}
