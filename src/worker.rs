//! The worker loop: drains the ingress queue, formats prefixes (fanning out
//! to helper threads for large batches), and dispatches to sinks — spec.md
//! §4.5.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::format::{format_prefix1, format_prefix2, format_prefix3};
use crate::logger::Logger;
use crate::record::Record;

/// The worker sleeps this long when there is nothing to do — spec.md §4.5
/// step 1.
const IDLE_SLEEP: Duration = Duration::from_millis(20);

/// Batch-size thresholds at which the worker fans prefix formatting out to
/// helper threads — spec.md §4.5 step 3.
const HELPER_THRESHOLDS: [usize; 3] = [50_000, 100_000, 150_000];

pub fn spawn(logger: Arc<Logger>) -> JoinHandle<()> {
    std::thread::Builder::new()
        .name("alogger-worker".to_string())
        .spawn(move || run(logger))
        .expect("failed to spawn alogger worker thread")
}

fn run(logger: Arc<Logger>) {
    let mut pending: Vec<Record> = Vec::new();
    let mut last_flush = Instant::now();

    loop {
        let shutting_down = logger.is_shutting_down();

        // Step 1: nothing to do, and no reason to wake early.
        if !shutting_down && logger.queue_is_empty() && logger.flush_requested() == 0 {
            std::thread::sleep(IDLE_SLEEP);
            continue;
        }

        // Step 2: swap the queue into `incoming`.
        let mut incoming = logger.swap_queue();
        if incoming.is_empty() && pending.is_empty() {
            if shutting_down {
                break;
            }
            // Nothing arrived and nothing is pending: an explicit flush()
            // request with no content to flush is satisfied immediately.
            logger.clear_flush_requested();
            continue;
        }

        // Step 3: format prefixes, parallelizing large batches.
        let highest_level = logger.current_level();
        format_batch(&mut incoming, highest_level);

        // Step 4: low-latency path — stdout/stderr see every pass.
        logger.flush_immediate_sinks(&incoming);

        // Step 5: fold into the pending batch for custom sinks.
        pending.append(&mut incoming);

        // Step 6: custom sinks run on their own cadence.
        let elapsed_ms = last_flush.elapsed().as_millis() as u64;
        let should_flush = shutting_down
            || logger.flush_requested() > 0
            || elapsed_ms >= logger.flush_time_ms()
            || pending.len() > logger.flush_size();

        if should_flush {
            logger.flush_custom_sinks(&pending);
            pending.clear();
            last_flush = Instant::now();
            logger.decrement_flush_requested();
        }

        // Step 7: shutdown completes after one full pass.
        if shutting_down {
            break;
        }
    }
}

/// Fills `prefix1/2/3` for every Record in `batch`. Above 50,000 records one
/// helper joins in, two above 100,000, three above 150,000 — each handling a
/// contiguous index range, with the calling (worker) thread always taking
/// the last range itself — spec.md §4.5 step 3. Helpers run on rayon's
/// global pool via `rayon::scope` rather than raw `thread::scope`, matching
/// the teacher's own choice of rayon for exactly this "parallelize a batch
/// across worker tasks" shape.
fn format_batch(batch: &mut [Record], highest_level: crate::level::Level) {
    let helpers = HELPER_THRESHOLDS.iter().filter(|&&t| batch.len() > t).count();
    if helpers == 0 {
        format_range(batch, highest_level);
        return;
    }

    let parts = helpers + 1;
    let chunk = batch.len().div_ceil(parts);

    rayon::scope(|scope| {
        let mut rest = batch;
        for _ in 0..helpers {
            let take = chunk.min(rest.len());
            let (head, tail) = rest.split_at_mut(take);
            rest = tail;
            scope.spawn(move |_| format_range(head, highest_level));
        }
        // The worker itself handles the remaining (last) range.
        format_range(rest, highest_level);
    });
}

fn format_range(records: &mut [Record], highest_level: crate::level::Level) {
    for record in records.iter_mut() {
        format_prefix1(record);
        format_prefix2(record, highest_level);
        format_prefix3(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;

    fn record(line: u32) -> Record {
        Record {
            level: Level::Info,
            body: "x".into(),
            timestamp: (1_700_000_000, 0),
            thread_id: 1,
            file: None,
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
    fn small_batch_formats_without_helpers() {
        let mut batch: Vec<Record> = (0..10).map(record).collect();
        format_batch(&mut batch, Level::Info);
        for r in &batch {
            assert!(!r.prefix1.is_empty());
            assert!(!r.prefix3.is_empty());
        }
    }

    #[test]
    fn large_batch_formats_every_record_via_helpers() {
        let mut batch: Vec<Record> = (0..60_000u32).map(record).collect();
        format_batch(&mut batch, Level::Info);
        assert!(batch.iter().all(|r| !r.prefix1.is_empty()));
        assert!(batch.iter().all(|r| !r.prefix3.is_empty()));
    }
}
