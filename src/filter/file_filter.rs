use ahash::AHashMap;
use smallvec::SmallVec;

use super::{Filter, FilterCore, Mode};
use crate::record::Record;

/// Matches by source file basename, optionally narrowed to a set of line
/// numbers within that file — spec.md §4.2. `add_entry("foo.rs:42")` scopes
/// the match to that line; `add_entry("foo.rs")` matches the whole file.
#[derive(Debug)]
pub struct FileFilter {
    core: FilterCore,
    files: AHashMap<String, SmallVec<[u32; 4]>>,
}

impl FileFilter {
    pub fn new(name: impl Into<String>) -> Self {
        FileFilter { core: FilterCore::new(name), files: AHashMap::new() }
    }

    /// Accepts either `"file.rs"` (whole-file match) or `"file.rs:42"`
    /// (match restricted to that line). Repeated calls for the same file
    /// accumulate lines.
    pub fn add_entry(&mut self, entry: &str) {
        if self.core.locked() {
            return;
        }
        let (file, line) = match entry.rsplit_once(':') {
            Some((f, n)) if n.chars().all(|c| c.is_ascii_digit()) && !n.is_empty() => {
                (f.to_string(), n.parse::<u32>().ok())
            }
            _ => (entry.to_string(), None),
        };
        let lines = self.files.entry(file).or_default();
        if let Some(l) = line {
            lines.push(l);
        }
    }
}

impl Filter for FileFilter {
    fn core(&self) -> &FilterCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FilterCore {
        &mut self.core
    }

    fn matches(&self, record: &Record) -> bool {
        let res = match record.file.and_then(|f| self.files.get(f)) {
            Some(lines) if !lines.is_empty() => lines.contains(&record.line),
            Some(_) => true,
            None => false,
        };
        if self.core.mode() == Mode::Exclude { !res } else { res }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;

    fn record(file: Option<&'static str>, line: u32) -> Record {
        Record {
            level: Level::Info,
            body: "x".into(),
            timestamp: (0, 0),
            thread_id: 1,
            file,
            function: None,
            line,
            module: None,
            prefix1: Default::default(),
            prefix2: Default::default(),
            prefix3: Default::default(),
            side_channel: None,
        }
    }

    #[test]
    fn whole_file_match() {
        let mut f = FileFilter::new("f");
        f.add_entry("main.rs");
        f.lock();
        assert!(f.matches(&record(Some("main.rs"), 10)));
        assert!(!f.matches(&record(Some("other.rs"), 10)));
    }

    #[test]
    fn line_scoped_match() {
        let mut f = FileFilter::new("f");
        f.add_entry("main.rs:10");
        f.lock();
        assert!(f.matches(&record(Some("main.rs"), 10)));
        assert!(!f.matches(&record(Some("main.rs"), 11)));
    }
}
