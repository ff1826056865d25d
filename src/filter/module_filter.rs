use smallvec::SmallVec;

use super::{Filter, FilterCore, Mode};
use crate::record::Record;

/// Matches by module tag. A null module passes by default unless
/// `filtering_noname_modules` is set — spec.md §4.2. In `Exclude` mode the
/// membership test is inverted.
#[derive(Debug)]
pub struct ModuleFilter {
    core: FilterCore,
    modules: SmallVec<[String; 4]>,
    filtering_noname_modules: bool,
}

impl ModuleFilter {
    pub fn new(
        name: impl Into<String>,
        modules: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        ModuleFilter {
            core: FilterCore::new(name),
            modules: modules.into_iter().map(Into::into).collect(),
            filtering_noname_modules: false,
        }
    }

    pub fn add_module(&mut self, name: impl Into<String>) {
        if !self.core.locked() {
            self.modules.push(name.into());
        }
    }

    pub fn set_filtering_noname_modules(&mut self, val: bool) {
        if !self.core.locked() {
            self.filtering_noname_modules = val;
        }
    }

    pub fn modules(&self) -> &[String] {
        &self.modules
    }
}

impl Filter for ModuleFilter {
    fn core(&self) -> &FilterCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FilterCore {
        &mut self.core
    }

    fn matches(&self, record: &Record) -> bool {
        if record.module.is_none() && !self.filtering_noname_modules {
            return true;
        }
        let res = match record.module {
            Some(m) => self.modules.iter().any(|cfg| cfg == m),
            None => false,
        };
        if self.core.mode() == Mode::Exclude { !res } else { res }
    }
}
