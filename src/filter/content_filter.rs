use smallvec::SmallVec;

use super::{Filter, FilterCore, Mode};
use crate::record::Record;

/// Matches if the record's body contains any configured substring, byte-wise
/// — spec.md §4.2.
#[derive(Debug)]
pub struct ContentFilter {
    core: FilterCore,
    contents: SmallVec<[String; 4]>,
}

impl ContentFilter {
    pub fn new(name: impl Into<String>) -> Self {
        ContentFilter { core: FilterCore::new(name), contents: SmallVec::new() }
    }

    pub fn add_content(&mut self, needle: impl Into<String>) {
        if !self.core.locked() {
            let needle = needle.into();
            if !self.contents.iter().any(|c| *c == needle) {
                self.contents.push(needle);
            }
        }
    }
}

impl Filter for ContentFilter {
    fn core(&self) -> &FilterCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FilterCore {
        &mut self.core
    }

    fn matches(&self, record: &Record) -> bool {
        let res = self.contents.iter().any(|needle| record.body.contains(needle.as_str()));
        if self.core.mode() == Mode::Exclude { !res } else { res }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;

    fn record(body: &str) -> Record {
        Record {
            level: Level::Info,
            body: body.into(),
            timestamp: (0, 0),
            thread_id: 1,
            file: None,
            function: None,
            line: 0,
            module: None,
            prefix1: Default::default(),
            prefix2: Default::default(),
            prefix3: Default::default(),
            side_channel: None,
        }
    }

    #[test]
    fn include_matches_substring() {
        let mut f = ContentFilter::new("c");
        f.add_content("timeout");
        f.lock();
        assert!(f.matches(&record("connection timeout after 5s")));
        assert!(!f.matches(&record("connected ok")));
    }

    #[test]
    fn exclude_inverts() {
        let mut f = ContentFilter::new("c");
        f.add_content("timeout");
        f.core_mut().set_mode(Mode::Exclude);
        f.lock();
        assert!(!f.matches(&record("connection timeout after 5s")));
        assert!(f.matches(&record("connected ok")));
    }
}
