//! Process-lifetime string interning for `Record::file`/`Record::function`.
//!
//! Producers never own these strings: the emission macros intern a `&str`
//! once per call site and hand Record a `&'static str` pointer. The table is
//! a lock-protected sorted/hashed list of leaked, owned strings — leaking is
//! deliberate (process-lifetime, per spec.md §3) but bounded: call sites are
//! a property of the binary's source, not of its input, so the set of
//! distinct strings is finite and small in practice.
//!
//! spec.md §9 flags the source's unbounded growth as a known limitation for
//! long-running processes with code-generated call sites; this
//! implementation keeps the same no-eviction policy but caps the table so a
//! pathological caller cannot exhaust memory — once the cap is hit, new
//! strings are still leaked and returned (correctness never regresses) but
//! are no longer cached, so repeated distinct call sites beyond the cap pay
//! one leak each rather than growing the lookup table forever.

use ahash::AHashMap;
use parking_lot::Mutex;
use once_cell::sync::Lazy;

const MAX_INTERNED: usize = 1 << 20;

static TABLE: Lazy<Mutex<AHashMap<&'static str, &'static str>>> =
    Lazy::new(|| Mutex::new(AHashMap::new()));

/// Interns `s`, returning a process-lifetime `&'static str`. Repeated calls
/// with an equal string return the same pointer once the table has room.
pub fn intern(s: &str) -> &'static str {
    let mut table = TABLE.lock();
    if let Some(found) = table.get(s) {
        return found;
    }
    let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
    if table.len() < MAX_INTERNED {
        table.insert(leaked, leaked);
    }
    leaked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_intern_returns_stable_pointer() {
        let a = intern("a.rs");
        let b = intern("a.rs");
        assert_eq!(a.as_ptr(), b.as_ptr());
    }

    #[test]
    fn distinct_strings_intern_independently() {
        let a = intern("a.rs");
        let b = intern("b.rs");
        assert_ne!(a, b);
    }
}
