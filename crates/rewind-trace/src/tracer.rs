//! Per-tick execution-order tracing.

use rewind_core::hash::order_hash;
use rewind_core::Tick;
use smallvec::SmallVec;

/// One system execution within a tick, in schedule order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobTraceEntry {
    /// Name of the system that executed.
    pub system: String,
}

/// The sealed record of one tick's system schedule.
///
/// `order_hash` is computed purely from the system names in execution
/// order — never from timing — so two traces with equal hashes certify
/// identical scheduling regardless of how long each system took.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobTrace {
    /// The tick this trace covers.
    pub tick: Tick,
    /// Systems in the order they started.
    pub entries: Vec<JobTraceEntry>,
    /// Order hash over the entry names (see [`rewind_core::hash::order_hash`]).
    pub order_hash: u64,
}

/// Records, per tick, the ordered sequence of systems that executed.
///
/// The tick boundary drives the lifecycle: [`begin_tick`](JobTracer::begin_tick)
/// opens a trace, the scheduler reports each system via
/// [`record_system_start`](JobTracer::record_system_start) /
/// [`record_system_end`](JobTracer::record_system_end), and
/// [`end_tick`](JobTracer::end_tick) seals the trace into the history.
///
/// Recording calls with no open tick are ignored (logged at debug) —
/// tracing is an observer and must never take down the simulation.
///
/// # Examples
///
/// ```
/// use rewind_trace::JobTracer;
/// use rewind_core::Tick;
///
/// let mut tracer = JobTracer::new();
/// tracer.begin_tick(Tick(1));
/// tracer.record_system_start("physics");
/// tracer.record_system_end();
/// tracer.record_system_start("ai");
/// tracer.record_system_end();
/// let hash = tracer.end_tick();
///
/// let trace = tracer.trace_at_tick(Tick(1)).unwrap();
/// assert_eq!(trace.entries.len(), 2);
/// assert_eq!(trace.order_hash, hash);
/// ```
#[derive(Debug, Default)]
pub struct JobTracer {
    history: Vec<JobTrace>,
    open: Option<OpenTrace>,
    retention: Option<usize>,
}

/// A trace under construction between `begin_tick` and `end_tick`.
#[derive(Debug)]
struct OpenTrace {
    tick: Tick,
    entries: Vec<JobTraceEntry>,
    /// Indices into `entries` for systems started but not yet ended.
    /// Inline capacity 8 covers realistic nesting depth without allocating.
    open_stack: SmallVec<[usize; 8]>,
}

impl JobTracer {
    /// Create a tracer with unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracer that retains only the most recent `keep` traces.
    pub fn with_retention(keep: usize) -> Self {
        Self {
            history: Vec::new(),
            open: None,
            retention: Some(keep),
        }
    }

    /// Open a new trace buffer for `tick`.
    ///
    /// # Panics
    ///
    /// Panics if a trace is already open. Begin/end pairing is driven by
    /// the tick loop itself, so a double-begin is a programmer error in
    /// the host, not a runtime condition to tolerate.
    pub fn begin_tick(&mut self, tick: Tick) {
        assert!(
            self.open.is_none(),
            "JobTracer::begin_tick({tick}) called while a trace is already open"
        );
        self.open = Some(OpenTrace {
            tick,
            entries: Vec::new(),
            open_stack: SmallVec::new(),
        });
    }

    /// Record that a system started executing.
    ///
    /// Ignored (with a debug log) when no tick is open.
    pub fn record_system_start(&mut self, name: &str) {
        match self.open.as_mut() {
            Some(open) => {
                let idx = open.entries.len();
                open.entries.push(JobTraceEntry {
                    system: name.to_string(),
                });
                open.open_stack.push(idx);
            }
            None => {
                log::debug!("record_system_start({name}) with no open tick; ignored");
            }
        }
    }

    /// Record that the most recently started system finished.
    ///
    /// An unmatched end (no open tick, or more ends than starts) is a
    /// no-op, logged at debug.
    pub fn record_system_end(&mut self) {
        match self.open.as_mut() {
            Some(open) => {
                if open.open_stack.pop().is_none() {
                    log::debug!(
                        "record_system_end at tick {} with no matching start; ignored",
                        open.tick
                    );
                }
            }
            None => {
                log::debug!("record_system_end with no open tick; ignored");
            }
        }
    }

    /// Seal the open trace, append it to history, and return its order hash.
    ///
    /// Ignored (returning 0, logged at debug) when no tick is open.
    pub fn end_tick(&mut self) -> u64 {
        let Some(open) = self.open.take() else {
            log::debug!("end_tick with no open tick; ignored");
            return 0;
        };
        if !open.open_stack.is_empty() {
            log::debug!(
                "end_tick at tick {}: {} system(s) started but never ended",
                open.tick,
                open.open_stack.len()
            );
        }
        let hash = order_hash(open.entries.iter().map(|e| e.system.as_str()));
        self.history.push(JobTrace {
            tick: open.tick,
            entries: open.entries,
            order_hash: hash,
        });
        if let Some(keep) = self.retention {
            if self.history.len() > keep {
                let excess = self.history.len() - keep;
                self.history.drain(..excess);
            }
        }
        hash
    }

    /// The full tick-ordered trace history.
    pub fn history(&self) -> &[JobTrace] {
        &self.history
    }

    /// Look up the trace for an exact tick.
    ///
    /// History is tick-sorted because ticks are monotonic, so this is a
    /// binary search. Returns `None` if the tick was never traced (or has
    /// been truncated by the retention policy).
    pub fn trace_at_tick(&self, tick: Tick) -> Option<&JobTrace> {
        self.history
            .binary_search_by_key(&tick, |t| t.tick)
            .ok()
            .map(|idx| &self.history[idx])
    }

    /// Drop every trace with tick strictly greater than `tick`.
    ///
    /// Used when a rollback abandons the traced future.
    pub fn truncate_after(&mut self, tick: Tick) {
        let keep = self.history.partition_point(|t| t.tick <= tick);
        self.history.truncate(keep);
    }

    /// Whether a trace is currently open.
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Clear all history and any open trace.
    pub fn clear(&mut self) {
        self.history.clear();
        self.open = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn traced(tick: u64, names: &[&str]) -> JobTracer {
        let mut tracer = JobTracer::new();
        tracer.begin_tick(Tick(tick));
        for name in names {
            tracer.record_system_start(name);
            tracer.record_system_end();
        }
        tracer.end_tick();
        tracer
    }

    #[test]
    fn order_hash_differs_for_swapped_systems() {
        let ab = traced(1, &["a", "b"]);
        let ba = traced(1, &["b", "a"]);
        assert_ne!(
            ab.trace_at_tick(Tick(1)).unwrap().order_hash,
            ba.trace_at_tick(Tick(1)).unwrap().order_hash,
        );
    }

    #[test]
    fn order_hash_identical_for_identical_schedules() {
        let first = traced(1, &["a", "b"]);
        let second = traced(1, &["a", "b"]);
        assert_eq!(
            first.trace_at_tick(Tick(1)).unwrap().order_hash,
            second.trace_at_tick(Tick(1)).unwrap().order_hash,
        );
    }

    #[test]
    fn entries_preserve_execution_order() {
        let tracer = traced(3, &["input", "physics", "render"]);
        let trace = tracer.trace_at_tick(Tick(3)).unwrap();
        let names: Vec<_> = trace.entries.iter().map(|e| e.system.as_str()).collect();
        assert_eq!(names, ["input", "physics", "render"]);
    }

    #[test]
    fn nested_systems_are_ordered_by_start() {
        let mut tracer = JobTracer::new();
        tracer.begin_tick(Tick(1));
        tracer.record_system_start("outer");
        tracer.record_system_start("inner");
        tracer.record_system_end();
        tracer.record_system_end();
        tracer.end_tick();

        let trace = tracer.trace_at_tick(Tick(1)).unwrap();
        let names: Vec<_> = trace.entries.iter().map(|e| e.system.as_str()).collect();
        assert_eq!(names, ["outer", "inner"]);
    }

    #[test]
    fn recording_without_open_tick_is_ignored() {
        let mut tracer = JobTracer::new();
        tracer.record_system_start("stray");
        tracer.record_system_end();
        assert_eq!(tracer.end_tick(), 0);
        assert!(tracer.history().is_empty());
    }

    #[test]
    fn unmatched_end_is_a_noop() {
        let mut tracer = JobTracer::new();
        tracer.begin_tick(Tick(1));
        tracer.record_system_start("a");
        tracer.record_system_end();
        tracer.record_system_end(); // extra
        tracer.end_tick();
        assert_eq!(tracer.trace_at_tick(Tick(1)).unwrap().entries.len(), 1);
    }

    #[test]
    #[should_panic(expected = "already open")]
    fn double_begin_panics() {
        let mut tracer = JobTracer::new();
        tracer.begin_tick(Tick(1));
        tracer.begin_tick(Tick(2));
    }

    #[test]
    fn trace_at_tick_absent_returns_none() {
        let tracer = traced(5, &["a"]);
        assert!(tracer.trace_at_tick(Tick(4)).is_none());
        assert!(tracer.trace_at_tick(Tick(6)).is_none());
    }

    #[test]
    fn history_is_append_only_and_tick_sorted() {
        let mut tracer = JobTracer::new();
        for tick in 1..=10u64 {
            tracer.begin_tick(Tick(tick));
            tracer.record_system_start("sys");
            tracer.record_system_end();
            tracer.end_tick();
        }
        let ticks: Vec<_> = tracer.history().iter().map(|t| t.tick.0).collect();
        assert_eq!(ticks, (1..=10).collect::<Vec<_>>());
        assert!(tracer.trace_at_tick(Tick(7)).is_some());
    }

    #[test]
    fn retention_truncates_oldest() {
        let mut tracer = JobTracer::with_retention(3);
        for tick in 1..=5u64 {
            tracer.begin_tick(Tick(tick));
            tracer.end_tick();
        }
        let ticks: Vec<_> = tracer.history().iter().map(|t| t.tick.0).collect();
        assert_eq!(ticks, [3, 4, 5]);
        assert!(tracer.trace_at_tick(Tick(1)).is_none());
    }

    #[test]
    fn truncate_after_drops_later_traces() {
        let mut tracer = JobTracer::new();
        for tick in 1..=5u64 {
            tracer.begin_tick(Tick(tick));
            tracer.end_tick();
        }
        tracer.truncate_after(Tick(3));
        assert_eq!(tracer.history().len(), 3);
        assert!(tracer.trace_at_tick(Tick(3)).is_some());
        assert!(tracer.trace_at_tick(Tick(4)).is_none());
    }

    #[test]
    fn empty_tick_still_seals_a_trace() {
        let mut tracer = JobTracer::new();
        tracer.begin_tick(Tick(1));
        let hash = tracer.end_tick();
        let trace = tracer.trace_at_tick(Tick(1)).unwrap();
        assert!(trace.entries.is_empty());
        assert_eq!(trace.order_hash, hash);
    }
}
