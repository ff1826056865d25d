//! The immutable-after-enqueue log entry and its prefix scratch buffers.

use std::sync::Arc;

use crate::level::Level;

/// `prefix1`: `DD.MM.YYYY HH:MM:SS ` — date/time, local time.
pub const PREFIX1_CAP: usize = 32;
/// `prefix2`: `.NNNNNN` — microseconds, only populated at Debug2.
pub const PREFIX2_CAP: usize = 8;
/// `prefix3`: ` LEVEL LWP<tid> [file:line function] module `.
pub const PREFIX3_CAP: usize = 300;

/// A fixed-capacity byte buffer written in place by the prefix formatter.
/// No heap allocation beyond the Record's body: carved inside Record at
/// construction time, per spec.md §4.1.
#[derive(Debug, Clone)]
pub struct PrefixBuf<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> Default for PrefixBuf<N> {
    fn default() -> Self {
        PrefixBuf { buf: [0u8; N], len: 0 }
    }
}

impl<const N: usize> PrefixBuf<N> {
    pub fn as_str(&self) -> &str {
        // Safety net: writers only ever push ASCII/UTF-8-safe content built
        // from `write_str`/`write_fmt` below, so this cannot panic in
        // practice; it degrades to empty rather than crash the worker if it
        // ever does, since a malformed prefix is not a reason to lose the
        // record.
        std::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends `s`, truncating at the buffer capacity. Truncation never
    /// splits a multi-byte UTF-8 sequence inside `s` in a way that would
    /// produce invalid UTF-8 for the parts we control (the 3-char level tag,
    /// digits, literal punctuation); user-controlled text never enters a
    /// prefix buffer, only the body does, so this limitation does not apply
    /// here (see `Sink::truncate_body` for the body case, which does accept
    /// the byte-boundary limitation spec.md §9 documents).
    pub fn push_str(&mut self, s: &str) {
        let room = N - self.len;
        if room == 0 {
            return;
        }
        let take = s.len().min(room);
        // Walk back to a char boundary so we never emit invalid UTF-8.
        let mut take = take;
        while take > 0 && !s.is_char_boundary(take) {
            take -= 1;
        }
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
    }

    pub fn push_fmt(&mut self, args: std::fmt::Arguments<'_>) {
        use std::fmt::Write;
        let mut tmp = arrayvec_string::ArrayString::<N>::new();
        let _ = tmp.write_fmt(args);
        self.push_str(tmp.as_str());
    }
}

/// Minimal stack string used only to format small numeric/text fragments
/// before copying them into a `PrefixBuf` — avoids a heap `String` per
/// prefix field on the formatter's hot path.
mod arrayvec_string {
    use std::fmt;

    pub struct ArrayString<const N: usize> {
        buf: [u8; N],
        len: usize,
    }

    impl<const N: usize> ArrayString<N> {
        pub fn new() -> Self {
            ArrayString { buf: [0u8; N], len: 0 }
        }

        pub fn as_str(&self) -> &str {
            std::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
        }
    }

    impl<const N: usize> fmt::Write for ArrayString<N> {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            let room = N - self.len;
            let take = s.len().min(room);
            self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
            self.len += take;
            Ok(())
        }
    }
}

/// A capability attached to a [`Record`] that can rewrite its body just
/// before a sink writes it — spec.md §3's "Something" side channel, used for
/// redacting sensitive content. Absent by default; bodies are written
/// verbatim when no transform is attached.
pub trait RecordTransform: Send + Sync {
    fn transform(&self, body: &str) -> String;
}

/// One log entry, from emission to final sink write. User fields are
/// immutable once enqueued; only the three prefix buffers are written, and
/// only by the worker thread (spec.md §3 invariant).
#[derive(Clone)]
pub struct Record {
    pub level: Level,
    pub body: String,
    /// (seconds, nanoseconds) captured with the best available wall clock
    /// at emit time.
    pub timestamp: (i64, u32),
    pub thread_id: u64,
    pub file: Option<&'static str>,
    pub function: Option<&'static str>,
    pub line: u32,
    pub module: Option<&'static str>,
    pub prefix1: PrefixBuf<{ PREFIX1_CAP }>,
    pub prefix2: PrefixBuf<{ PREFIX2_CAP }>,
    pub prefix3: PrefixBuf<{ PREFIX3_CAP }>,
    pub side_channel: Option<Arc<dyn RecordTransform>>,
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("level", &self.level)
            .field("body", &self.body)
            .field("timestamp", &self.timestamp)
            .field("thread_id", &self.thread_id)
            .field("file", &self.file)
            .field("function", &self.function)
            .field("line", &self.line)
            .field("module", &self.module)
            .field("has_side_channel", &self.side_channel.is_some())
            .finish()
    }
}

impl Record {
    pub fn body_for_write(&self) -> std::borrow::Cow<'_, str> {
        match &self.side_channel {
            Some(t) => std::borrow::Cow::Owned(t.transform(&self.body)),
            None => std::borrow::Cow::Borrowed(&self.body),
        }
    }
}
