use smallvec::SmallVec;

use super::{Filter, FilterCore, Mode};
use crate::record::Record;

/// Matches by thread id — spec.md §4.2. This variant forces
/// `follow_thread_context = false`: following "the rest of this thread's
/// context" makes no sense for a filter whose entire criterion already is
/// the thread.
#[derive(Debug)]
pub struct ThreadFilter {
    core: FilterCore,
    threads: SmallVec<[u64; 4]>,
}

impl ThreadFilter {
    pub fn new(name: impl Into<String>) -> Self {
        ThreadFilter { core: FilterCore::new(name), threads: SmallVec::new() }
    }

    pub fn add_thread(&mut self, id: u64) {
        if !self.core.locked() {
            self.threads.push(id);
        }
    }
}

impl Filter for ThreadFilter {
    fn core(&self) -> &FilterCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FilterCore {
        &mut self.core
    }

    fn matches(&self, record: &Record) -> bool {
        let res = self.threads.contains(&record.thread_id);
        if self.core.mode() == Mode::Exclude { !res } else { res }
    }

    fn check(&self, record: &Record) -> super::Check {
        // Bypass FilterCore's follow_thread_context regardless of what was
        // set on it before locking — this variant never follows context.
        let core = self.core();
        if !core.locked() {
            return super::Check::NoLock;
        }
        if record.level == crate::level::Level::Error && !core.filter_errors() {
            return super::Check::MessError;
        }
        if self.matches(record) {
            super::Check::Success
        } else {
            super::Check::Fail
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(thread_id: u64) -> Record {
        Record {
            level: crate::level::Level::Info,
            body: "x".into(),
            timestamp: (0, 0),
            thread_id,
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
    fn include_matches_listed_thread() {
        let mut f = ThreadFilter::new("t");
        f.add_thread(7);
        f.lock();
        assert!(f.matches(&record(7)));
        assert!(!f.matches(&record(8)));
    }
}
