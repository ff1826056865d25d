//! The Logger: owns the ingress queue, the three sink roles (stdout,
//! stderr, custom[]), the worker thread, and the aggregate `current_level`
//! producers consult to short-circuit — spec.md §3, §4.7.
//!
//! A process-wide singleton is available via [`Logger::global`], alongside
//! [`Logger::new`] for tests that need independent instances — spec.md §9's
//! "opt-in constructor for tests so multiple Logger instances can coexist".

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use arc_swap::ArcSwap;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::level::Level;
use crate::queue::IngressQueue;
use crate::record::Record;
use crate::sink::Sink;
use crate::worker;

const DEFAULT_FLUSH_TIME_MS: u64 = 1000;
const DEFAULT_FLUSH_SIZE: usize = 1000;

pub struct Logger {
    pub(crate) queue: IngressQueue,
    stdout: Mutex<Option<Arc<dyn Sink>>>,
    stderr: Mutex<Option<Arc<dyn Sink>>>,
    custom: ArcSwap<Vec<Arc<dyn Sink>>>,
    current_level: AtomicU8,
    enabled: AtomicBool,
    flush_time_ms: AtomicU64,
    flush_size: AtomicUsize,
    flush_requested: AtomicUsize,
    shutdown: AtomicBool,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Logger {
    /// Constructs a standalone Logger with its own worker thread. Tests use
    /// this directly so several Loggers can coexist; production code
    /// normally wants [`Logger::global`].
    pub fn new() -> Arc<Logger> {
        let logger = Arc::new(Logger {
            queue: IngressQueue::new(),
            stdout: Mutex::new(None),
            stderr: Mutex::new(None),
            custom: ArcSwap::from_pointee(Vec::new()),
            current_level: AtomicU8::new(Level::None as u8),
            enabled: AtomicBool::new(true),
            flush_time_ms: AtomicU64::new(DEFAULT_FLUSH_TIME_MS),
            flush_size: AtomicUsize::new(DEFAULT_FLUSH_SIZE),
            flush_requested: AtomicUsize::new(0),
            shutdown: AtomicBool::new(false),
            worker: Mutex::new(None),
        });
        let handle = worker::spawn(Arc::clone(&logger));
        *logger.worker.lock() = Some(handle);
        logger
    }

    /// The process-wide singleton, lazily constructed on first use.
    pub fn global() -> &'static Arc<Logger> {
        static INSTANCE: OnceCell<Arc<Logger>> = OnceCell::new();
        INSTANCE.get_or_init(Logger::new)
    }

    // -- aggregate level -----------------------------------------------

    /// The cheap atomic read producers consult to short-circuit — spec.md
    /// §4.7, §6.
    pub fn current_level(&self) -> Level {
        Level::from_u8(self.current_level.load(Ordering::Acquire))
    }

    /// Recomputes `current_level` as the max level of every active sink, or
    /// `None` if the logger is disabled or no sink is active — spec.md
    /// §4.7. Called after every mutation that could change the answer.
    fn recompute_level(&self) {
        if !self.enabled() {
            self.current_level.store(Level::None as u8, Ordering::Release);
            return;
        }
        let mut max = Level::None;
        if let Some(s) = self.stdout.lock().as_ref() {
            if s.core().active() {
                max = max.max(s.core().level());
            }
        }
        if let Some(s) = self.stderr.lock().as_ref() {
            if s.core().active() {
                max = max.max(s.core().level());
            }
        }
        for s in self.custom.load().iter() {
            if s.core().active() {
                max = max.max(s.core().level());
            }
        }
        self.current_level.store(max as u8, Ordering::Release);
    }

    // -- enable / disable ------------------------------------------------

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn on(&self) {
        self.enabled.store(true, Ordering::Release);
        self.recompute_level();
    }

    pub fn off(&self) {
        self.enabled.store(false, Ordering::Release);
        self.recompute_level();
    }

    // -- sink management -------------------------------------------------

    /// Adds a sink, routed to the `stdout`/`stderr` role by name or
    /// appended to the custom list otherwise. Replaces any existing sink of
    /// the same name, matching the filter-chain's add-by-name-replace
    /// semantics (spec.md §4.3).
    pub fn add_sink(&self, sink: Arc<dyn Sink>) {
        match sink.name() {
            "stdout" => *self.stdout.lock() = Some(sink),
            "stderr" => *self.stderr.lock() = Some(sink),
            name => {
                let name = name.to_string();
                self.custom.rcu(move |current| {
                    let mut next: Vec<Arc<dyn Sink>> =
                        current.iter().filter(|s| s.name() != name).cloned().collect();
                    next.push(sink.clone());
                    next
                });
            }
        }
        self.recompute_level();
    }

    pub fn remove_sink(&self, name: &str) {
        match name {
            "stdout" => *self.stdout.lock() = None,
            "stderr" => *self.stderr.lock() = None,
            name => {
                self.custom.rcu(|current| {
                    current.iter().filter(|s| s.name() != name).cloned().collect::<Vec<_>>()
                });
            }
        }
        self.recompute_level();
    }

    pub fn find_sink(&self, name: &str) -> Option<Arc<dyn Sink>> {
        match name {
            "stdout" => self.stdout.lock().clone(),
            "stderr" => self.stderr.lock().clone(),
            name => self.custom.load().iter().find(|s| s.name() == name).cloned(),
        }
    }

    pub fn clear_sinks(&self) {
        *self.stdout.lock() = None;
        *self.stderr.lock() = None;
        self.custom.store(Arc::new(Vec::new()));
        self.recompute_level();
    }

    /// Snapshot of every configured sink — spec.md §6 `savers()`.
    pub fn savers(&self) -> Vec<Arc<dyn Sink>> {
        let mut out = Vec::new();
        if let Some(s) = self.stdout.lock().clone() {
            out.push(s);
        }
        if let Some(s) = self.stderr.lock().clone() {
            out.push(s);
        }
        out.extend(self.custom.load().iter().cloned());
        out
    }

    /// Changes a sink's level and recomputes `current_level` — spec.md
    /// §4.3's "a Sink's level change triggers Logger's maximum-level
    /// recompute". Mutating a `Sink`'s `SinkCore` directly (e.g. through a
    /// handle returned by `find_sink`) does not trigger this; callers that
    /// need the recompute should go through this method rather than the
    /// sink directly.
    pub fn set_sink_level(&self, name: &str, level: Level) {
        if let Some(sink) = self.find_sink(name) {
            sink.core().set_level(level);
            self.recompute_level();
        }
    }

    pub fn set_sink_active(&self, name: &str, active: bool) {
        if let Some(sink) = self.find_sink(name) {
            sink.core().set_active(active);
            self.recompute_level();
        }
    }

    // -- flush cadence ----------------------------------------------------

    pub fn set_flush_time(&self, ms: u64) {
        self.flush_time_ms.store(ms, Ordering::Release);
    }

    pub fn set_flush_size(&self, n: usize) {
        self.flush_size.store(n, Ordering::Release);
    }

    /// Requests at least `loops` forced flush cycles — spec.md §4.5/§6.
    pub fn flush(&self, loops: usize) {
        self.flush_requested.store(loops.max(1), Ordering::Release);
    }

    /// Spin-waits until the flush counter returns to zero. A caller must
    /// not hold any sink lock while calling this — spec.md §4.5 warns this
    /// deadlocks.
    pub fn waiting_flush(&self) {
        while self.flush_requested.load(Ordering::Acquire) > 0 {
            std::thread::yield_now();
        }
    }

    // -- worker-internal accessors (pub(crate): driven only by `worker`) --

    pub(crate) fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub(crate) fn swap_queue(&self) -> Vec<Record> {
        self.queue.swap_out()
    }

    pub(crate) fn flush_time_ms(&self) -> u64 {
        self.flush_time_ms.load(Ordering::Acquire)
    }

    pub(crate) fn flush_size(&self) -> usize {
        self.flush_size.load(Ordering::Acquire)
    }

    pub(crate) fn flush_requested(&self) -> usize {
        self.flush_requested.load(Ordering::Acquire)
    }

    pub(crate) fn clear_flush_requested(&self) {
        self.flush_requested.store(0, Ordering::Release);
    }

    pub(crate) fn decrement_flush_requested(&self) {
        let mut v = self.flush_requested.load(Ordering::Acquire);
        while v > 0 {
            match self.flush_requested.compare_exchange_weak(
                v,
                v - 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => v = actual,
            }
        }
    }

    pub(crate) fn flush_immediate_sinks(&self, batch: &[Record]) {
        if let Some(s) = self.stdout.lock().clone() {
            s.flush(batch);
        }
        if let Some(s) = self.stderr.lock().clone() {
            s.flush(batch);
        }
    }

    pub(crate) fn flush_custom_sinks(&self, batch: &[Record]) {
        for s in self.custom.load().iter() {
            s.flush(batch);
        }
    }

    pub(crate) fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    // -- lifecycle ----------------------------------------------------

    /// Submits a Record to the ingress queue unless the logger is disabled
    /// or shutting down, in which case it is silently dropped — spec.md §7
    /// "the worst case is a dropped record (only during shutdown)". An
    /// Error-level Record induces an implicit `flush(1)` so it reaches
    /// persistent sinks promptly — spec.md §5.
    pub fn emit(&self, record: Record) {
        if self.is_shutting_down() || !self.enabled() {
            return;
        }
        let is_error = record.level == Level::Error;
        self.queue.push(record);
        if is_error {
            self.flush(1);
        }
    }

    /// Cooperative shutdown: the worker completes one more full pass before
    /// exiting — spec.md §4.5. Safe to call more than once; only the first
    /// call joins the thread.
    pub fn stop(&self) {
        if self.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(handle) = self.worker.lock().take() {
            let _ = handle.join();
        }
    }
}
