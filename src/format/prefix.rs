//! The three prefix formatters — spec.md §4.1. Each is a pure function of a
//! [`Record`]'s already-stamped fields, writing into that Record's own
//! fixed-size prefix buffer. No formatter allocates on its hot path except
//! the rare truncation-repair branch in [`format_prefix3`], which only runs
//! when a single record's prefix would overflow the 300-byte cap — in
//! practice never, given how short file/function/module tokens are.

use std::cell::RefCell;

use chrono::{Local, TimeZone};

use crate::level::Level;
use crate::record::{Record, PREFIX3_CAP};

thread_local! {
    /// Per-thread "last whole second formatted" cache. The worker and its
    /// helper threads (spec.md §4.5) each get their own cache, so the
    /// common case — a burst of records sharing one wall-clock second — is
    /// a string compare and copy, not a `localtime` call, per record.
    static PREFIX1_CACHE: RefCell<Option<(i64, String)>> = const { RefCell::new(None) };
}

/// `prefix1`: `DD.MM.YYYY HH:MM:SS`, local time. Caches the formatted string
/// per whole second on the calling thread.
pub fn format_prefix1(record: &mut Record) {
    let secs = record.timestamp.0;
    PREFIX1_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if let Some((cached_secs, s)) = cache.as_ref() {
            if *cached_secs == secs {
                record.prefix1.clear();
                record.prefix1.push_str(s);
                return;
            }
        }
        let formatted = match Local.timestamp_opt(secs, 0).single() {
            Some(dt) => dt.format("%d.%m.%Y %H:%M:%S").to_string(),
            None => String::from("00.00.0000 00:00:00"),
        };
        record.prefix1.clear();
        record.prefix1.push_str(&formatted);
        *cache = Some((secs, formatted));
    });
}

/// `prefix2`: `.NNNNNN` microseconds, fixed 7 characters. Only populated
/// when `highest_level == Debug2` — spec.md §4.1; otherwise left empty so
/// sinks below Debug2 never pay for it.
pub fn format_prefix2(record: &mut Record, highest_level: Level) {
    record.prefix2.clear();
    if highest_level == Level::Debug2 {
        let micros = record.timestamp.1 / 1_000;
        record.prefix2.push_fmt(format_args!(".{micros:06}"));
    }
}

/// `prefix3`: ` LEVEL LWP<tid> [file:line function] module `, degrading to
/// ` LEVEL LWP<tid> [module] ` when file is absent, and further to
/// ` LEVEL LWP<tid> ` when module is also absent — spec.md §4.1.
pub fn format_prefix3(record: &mut Record) {
    record.prefix3.clear();
    record.prefix3.push_str(" ");
    record.prefix3.push_str(record.level.as_tag());
    record.prefix3.push_fmt(format_args!(" LWP{} ", record.thread_id));

    match (record.file, record.module) {
        (Some(file), module) => {
            record.prefix3.push_fmt(format_args!(
                "[{file}:{line} {func}] ",
                line = record.line,
                func = record.function.unwrap_or(""),
            ));
            if let Some(m) = module {
                record.prefix3.push_str(m);
                record.prefix3.push_str(" ");
            }
        }
        (None, Some(m)) => {
            record.prefix3.push_fmt(format_args!("[{m}] "));
        }
        (None, None) => {}
    }

    repair_dangling_bracket(record);
}

/// Truncation in `PrefixBuf::push_str` only ever cuts at a UTF-8 char
/// boundary; it does not know about bracket structure. This repairs the one
/// case spec.md §4.1 calls out — a cut that lands inside an unterminated
/// `[...` — by dropping back to just before the open bracket, so the buffer
/// never ends in a dangling `[`.
fn repair_dangling_bracket(record: &mut Record) {
    let s = record.prefix3.as_str();
    if s.len() < PREFIX3_CAP {
        return;
    }
    if let Some(open_idx) = s.rfind('[') {
        if !s[open_idx..].contains(']') {
            let keep = s[..open_idx].to_string();
            record.prefix3.clear();
            record.prefix3.push_str(&keep);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(level: Level, file: Option<&'static str>, function: Option<&'static str>, module: Option<&'static str>) -> Record {
        Record {
            level,
            body: "x".into(),
            timestamp: (1_700_000_000, 123_456_000),
            thread_id: 7,
            file,
            function,
            line: 42,
            module,
            prefix1: Default::default(),
            prefix2: Default::default(),
            prefix3: Default::default(),
            side_channel: None,
        }
    }

    #[test]
    fn prefix1_matches_date_time_shape() {
        let mut r = record(Level::Info, None, None, None);
        format_prefix1(&mut r);
        let s = r.prefix1.as_str();
        assert_eq!(s.len(), 19);
        assert_eq!(s.as_bytes()[2], b'.');
        assert_eq!(s.as_bytes()[5], b'.');
    }

    #[test]
    fn prefix1_cache_reuses_same_second() {
        let mut a = record(Level::Info, None, None, None);
        let mut b = record(Level::Info, None, None, None);
        format_prefix1(&mut a);
        format_prefix1(&mut b);
        assert_eq!(a.prefix1.as_str(), b.prefix1.as_str());
    }

    #[test]
    fn prefix2_only_populated_at_debug2() {
        let mut r = record(Level::Debug, None, None, None);
        format_prefix2(&mut r, Level::Info);
        assert!(r.prefix2.is_empty());

        let mut r2 = record(Level::Debug2, None, None, None);
        format_prefix2(&mut r2, Level::Debug2);
        assert_eq!(r2.prefix2.as_str(), ".123456");
    }

    #[test]
    fn prefix3_full_form() {
        let mut r = record(Level::Info, Some("a.cpp"), Some("f"), None);
        format_prefix3(&mut r);
        assert_eq!(r.prefix3.as_str(), " INFO LWP7 [a.cpp:42 f] ");
    }

    #[test]
    fn prefix3_degrades_without_file() {
        let mut r = record(Level::Info, None, None, Some("net"));
        format_prefix3(&mut r);
        assert_eq!(r.prefix3.as_str(), " INFO LWP7 [net] ");
    }

    #[test]
    fn prefix3_degrades_without_file_or_module() {
        let mut r = record(Level::Info, None, None, None);
        format_prefix3(&mut r);
        assert_eq!(r.prefix3.as_str(), " INFO LWP7 ");
    }

    #[test]
    fn prefix3_with_module_after_file() {
        let mut r = record(Level::Info, Some("a.cpp"), Some("f"), Some("net"));
        format_prefix3(&mut r);
        assert_eq!(r.prefix3.as_str(), " INFO LWP7 [a.cpp:42 f] net ");
    }
}
