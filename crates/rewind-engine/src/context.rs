//! The world step seam: [`Simulation`] and [`TickContext`].

use rewind_core::{Tick, WorldState};
use rewind_trace::JobTracer;

/// A world the engine can drive tick-by-tick.
///
/// Extends [`WorldState`] with the update function. The determinism
/// contract: `step` must be a pure function of (current state, tick,
/// input bytes). Wall-clock time, unseeded RNG, and iteration over
/// unordered containers all break it — and are exactly what the
/// verification algorithms exist to catch.
pub trait Simulation: WorldState {
    /// Advance the world by one fixed step.
    fn step(&mut self, ctx: &mut TickContext<'_>);
}

/// Per-tick context handed to [`Simulation::step`].
///
/// Carries the tick, the fixed timestep, the tick's input bytes, and the
/// execution-order recording hooks. A scheduler reports each system it
/// runs through [`begin_system`](TickContext::begin_system) /
/// [`end_system`](TickContext::end_system) (or the scoped
/// [`system`](TickContext::system) helper), which is what feeds the
/// order-hash channel.
pub struct TickContext<'a> {
    tick: Tick,
    dt: f64,
    input: &'a [u8],
    tracer: &'a mut JobTracer,
}

impl<'a> TickContext<'a> {
    pub(crate) fn new(tick: Tick, dt: f64, input: &'a [u8], tracer: &'a mut JobTracer) -> Self {
        Self {
            tick,
            dt,
            input,
            tracer,
        }
    }

    /// The tick being executed.
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// The fixed timestep in seconds.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Input bytes applied this tick.
    pub fn input(&self) -> &[u8] {
        self.input
    }

    /// Report that a named system started executing.
    pub fn begin_system(&mut self, name: &str) {
        self.tracer.record_system_start(name);
    }

    /// Report that the most recently started system finished.
    pub fn end_system(&mut self) {
        self.tracer.record_system_end();
    }

    /// Run `f` inside a begin/end system scope.
    pub fn system<R>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.begin_system(name);
        let result = f(self);
        self.end_system();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_exposes_tick_dt_input() {
        let mut tracer = JobTracer::new();
        tracer.begin_tick(Tick(3));
        let input = [1u8, 2];
        let ctx = TickContext::new(Tick(3), 0.25, &input, &mut tracer);
        assert_eq!(ctx.tick(), Tick(3));
        assert_eq!(ctx.dt(), 0.25);
        assert_eq!(ctx.input(), &[1, 2]);
    }

    #[test]
    fn system_scope_records_start_and_end() {
        let mut tracer = JobTracer::new();
        tracer.begin_tick(Tick(1));
        {
            let mut ctx = TickContext::new(Tick(1), 0.1, &[], &mut tracer);
            let out = ctx.system("physics", |ctx| {
                ctx.system("collide", |_| 7)
            });
            assert_eq!(out, 7);
        }
        tracer.end_tick();

        let trace = tracer.trace_at_tick(Tick(1)).unwrap();
        let names: Vec<_> = trace.entries.iter().map(|e| e.system.as_str()).collect();
        assert_eq!(names, ["physics", "collide"]);
    }
}
