//! The Line builder: the transient emission-site helper spec.md §4.6
//! describes, plus the six severity macros that construct it.
//!
//! A `Line` is produced by a macro bound to the call site's `file!()`,
//! function name, and `line!()`; streaming `<<` appends to an internal
//! buffer only while the Record would actually be observed, and on
//! destruction it hands a Record to the Logger's ingress queue.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::level::Level;
use crate::logger::Logger;
use crate::record::Record;

/// Resolves the enclosing function's name via the standard
/// `type_name_of_val`-on-a-local-fn trick, since Rust has no stable
/// `__func__` intrinsic — spec.md §9 Open Question, resolved in DESIGN.md.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        match name.strip_suffix("::f") {
            Some(stripped) => stripped,
            None => name,
        }
    }};
}

/// A move-only, transient log-line builder. Captures (logger, level, file,
/// function, line, module) eagerly but cheaply — interning happens only
/// when the line is actually active, so a rejected-by-level emission costs
/// one level comparison and nothing else (spec.md §8 property 1).
pub struct Line<'a> {
    logger: &'a Logger,
    level: Level,
    file: Option<&'static str>,
    function: Option<&'static str>,
    line: u32,
    module: Option<&'static str>,
    body: String,
    side_channel: Option<Arc<dyn crate::record::RecordTransform>>,
    active: bool,
}

impl<'a> Line<'a> {
    #[doc(hidden)]
    pub fn new(
        logger: &'a Logger,
        level: Level,
        file: &str,
        function: &str,
        line: u32,
        module: Option<&str>,
    ) -> Self {
        let active = logger.enabled() && !logger.is_shutting_down() && level <= logger.current_level();
        let (file, function, module) = if active {
            (
                Some(crate::intern::intern(file)),
                Some(crate::intern::intern(function)),
                module.map(crate::intern::intern),
            )
        } else {
            (None, None, None)
        };
        Line {
            logger,
            level,
            file,
            function,
            line,
            module,
            body: String::new(),
            side_channel: None,
            active,
        }
    }

    /// Attaches a redaction capability to the Record this line will emit —
    /// spec.md §3's "Something" side channel. A no-op on an inactive line.
    pub fn with_transform(mut self, transform: Arc<dyn crate::record::RecordTransform>) -> Self {
        if self.active {
            self.side_channel = Some(transform);
        }
        self
    }
}

/// Streaming append — the target-language rendering of the source's
/// `operator<<` chain. A no-op whenever the line is inactive, so an
/// emission below the logger's current level never touches the body buffer
/// at all.
impl<T: std::fmt::Display> std::ops::Shl<T> for Line<'_> {
    type Output = Self;

    fn shl(mut self, rhs: T) -> Self {
        if self.active {
            let _ = write!(self.body, "{rhs}");
        }
        self
    }
}

impl Drop for Line<'_> {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        if self.logger.is_shutting_down() || !self.logger.enabled() {
            return;
        }
        let record = Record {
            level: self.level,
            body: std::mem::take(&mut self.body),
            timestamp: crate::time::now(),
            thread_id: crate::thread_id::current(),
            file: self.file,
            function: self.function,
            line: self.line,
            module: self.module,
            prefix1: Default::default(),
            prefix2: Default::default(),
            prefix3: Default::default(),
            side_channel: self.side_channel.take(),
        };
        self.logger.emit(record);
    }
}

/// Shared expansion for the six severity macros below.
#[macro_export]
macro_rules! __alogger_line {
    ($logger:expr, $level:expr, module = $module:expr) => {
        $crate::line::Line::new(
            $logger,
            $level,
            file!(),
            $crate::function_name!(),
            line!(),
            Some($module),
        )
    };
    ($logger:expr, $level:expr) => {
        $crate::line::Line::new($logger, $level, file!(), $crate::function_name!(), line!(), None)
    };
}

/// Expands to a [`Line`] bound to this call site at `Level::Error`. Use
/// with `<<` to append content: `error!(logger) << "failed: " << err;`.
#[macro_export]
macro_rules! error {
    ($logger:expr) => {
        $crate::__alogger_line!($logger, $crate::level::Level::Error)
    };
    ($logger:expr, module = $module:expr) => {
        $crate::__alogger_line!($logger, $crate::level::Level::Error, module = $module)
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr) => {
        $crate::__alogger_line!($logger, $crate::level::Level::Warning)
    };
    ($logger:expr, module = $module:expr) => {
        $crate::__alogger_line!($logger, $crate::level::Level::Warning, module = $module)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr) => {
        $crate::__alogger_line!($logger, $crate::level::Level::Info)
    };
    ($logger:expr, module = $module:expr) => {
        $crate::__alogger_line!($logger, $crate::level::Level::Info, module = $module)
    };
}

#[macro_export]
macro_rules! verbose {
    ($logger:expr) => {
        $crate::__alogger_line!($logger, $crate::level::Level::Verbose)
    };
    ($logger:expr, module = $module:expr) => {
        $crate::__alogger_line!($logger, $crate::level::Level::Verbose, module = $module)
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr) => {
        $crate::__alogger_line!($logger, $crate::level::Level::Debug)
    };
    ($logger:expr, module = $module:expr) => {
        $crate::__alogger_line!($logger, $crate::level::Level::Debug, module = $module)
    };
}

#[macro_export]
macro_rules! debug2 {
    ($logger:expr) => {
        $crate::__alogger_line!($logger, $crate::level::Level::Debug2)
    };
    ($logger:expr, module = $module:expr) => {
        $crate::__alogger_line!($logger, $crate::level::Level::Debug2, module = $module)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{FileSink, Sink as _};

    #[test]
    fn inactive_line_never_allocates_body() {
        let logger = Logger::new();
        logger.add_sink(Arc::new(crate::sink::StdoutSink::new("stdout", Level::Warning, false)));
        {
            let line = Line::new(&logger, Level::Debug, "a.rs", "f", 1, None);
            assert!(!line.active);
            assert_eq!(line.body.capacity(), 0);
        }
        logger.stop();
    }

    #[test]
    fn active_line_emits_record_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");
        let logger = Logger::new();
        let sink = Arc::new(FileSink::new("f", &path, Level::Debug, false).unwrap());
        logger.add_sink(sink);
        {
            let line = info!(&logger);
            line << "hello " << 42;
        }
        logger.flush(1);
        logger.waiting_flush();
        logger.stop();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("hello 42"));
    }
}
