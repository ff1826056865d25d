//! Best-available wall-clock timestamp capture — spec.md §3: a [`Record`]'s
//! `timestamp` field.

/// Captures `(seconds, nanoseconds)` since the Unix epoch using
/// `SystemTime`, the only wall-clock source `std` exposes. Clamped to zero
/// if the clock reports a time before the epoch (NTP step-back on a
/// misconfigured host) rather than panicking on the emission path.
pub fn now() -> (i64, u32) {
    use std::time::{SystemTime, UNIX_EPOCH};
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => (d.as_secs() as i64, d.subsec_nanos()),
        Err(_) => (0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_positive_and_recent() {
        let (secs, nanos) = now();
        assert!(secs > 1_700_000_000);
        assert!(nanos < 1_000_000_000);
    }
}
