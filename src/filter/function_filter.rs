use smallvec::SmallVec;

use super::{Filter, FilterCore, Mode};
use crate::record::Record;

/// Matches by exact function name — spec.md §4.2.
#[derive(Debug)]
pub struct FunctionFilter {
    core: FilterCore,
    functions: SmallVec<[String; 4]>,
}

impl FunctionFilter {
    pub fn new(name: impl Into<String>) -> Self {
        FunctionFilter { core: FilterCore::new(name), functions: SmallVec::new() }
    }

    pub fn add_function(&mut self, name: impl Into<String>) {
        if !self.core.locked() {
            let name = name.into();
            if !self.functions.iter().any(|f| *f == name) {
                self.functions.push(name);
            }
        }
    }
}

impl Filter for FunctionFilter {
    fn core(&self) -> &FilterCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FilterCore {
        &mut self.core
    }

    fn matches(&self, record: &Record) -> bool {
        let res = match record.function {
            Some(f) => self.functions.iter().any(|cfg| cfg == f),
            None => false,
        };
        if self.core.mode() == Mode::Exclude { !res } else { res }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;

    fn record(function: Option<&'static str>) -> Record {
        Record {
            level: Level::Info,
            body: "x".into(),
            timestamp: (0, 0),
            thread_id: 1,
            file: None,
            function,
            line: 0,
            module: None,
            prefix1: Default::default(),
            prefix2: Default::default(),
            prefix3: Default::default(),
            side_channel: None,
        }
    }

    #[test]
    fn include_matches_listed_function() {
        let mut f = FunctionFilter::new("f");
        f.add_function("connect");
        f.lock();
        assert!(f.matches(&record(Some("connect"))));
        assert!(!f.matches(&record(Some("disconnect"))));
    }

    #[test]
    fn exclude_inverts() {
        let mut f = FunctionFilter::new("f");
        f.add_function("connect");
        f.core_mut().set_mode(super::Mode::Exclude);
        f.lock();
        assert!(!f.matches(&record(Some("connect"))));
        assert!(f.matches(&record(Some("disconnect"))));
    }
}
