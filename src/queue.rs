//! The ingress queue: a single multi-producer single-consumer batch-swap
//! hand-off from producer threads to the worker — spec.md §4.4.
//!
//! Producers take the lock only to push one Record; the worker takes it
//! only to swap the whole list out in O(1). Neither side ever holds it
//! across I/O. `parking_lot::Mutex` stands in for spec.md's "spin-lock",
//! per spec.md §9's explicit allowance that a short-critical-section mutex
//! is equivalent.

use parking_lot::Mutex;

use crate::record::Record;

pub struct IngressQueue {
    inner: Mutex<Vec<Record>>,
}

impl IngressQueue {
    pub fn new() -> Self {
        IngressQueue { inner: Mutex::new(Vec::new()) }
    }

    /// Appends one Record. Ordering within a single producer is preserved
    /// by construction; across producers it is lock-acquisition order.
    pub fn push(&self, record: Record) {
        self.inner.lock().push(record);
    }

    /// Swaps the entire pending list out, leaving an empty queue behind.
    /// O(1): `mem::take` just moves the `Vec`'s pointer/len/cap.
    pub fn swap_out(&self) -> Vec<Record> {
        let mut guard = self.inner.lock();
        std::mem::take(&mut *guard)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Default for IngressQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;

    fn record() -> Record {
        Record {
            level: Level::Info,
            body: "x".into(),
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
    fn swap_out_drains_and_leaves_queue_empty() {
        let q = IngressQueue::new();
        q.push(record());
        q.push(record());
        assert!(!q.is_empty());
        let batch = q.swap_out();
        assert_eq!(batch.len(), 2);
        assert!(q.is_empty());
    }

    #[test]
    fn preserves_push_order() {
        let q = IngressQueue::new();
        for i in 0..5u32 {
            let mut r = record();
            r.line = i;
            q.push(r);
        }
        let batch = q.swap_out();
        let lines: Vec<u32> = batch.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![0, 1, 2, 3, 4]);
    }
}
