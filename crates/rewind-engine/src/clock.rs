//! The fixed-step tick clock.

use std::time::Duration;

use rewind_core::Tick;

/// Advances a monotonic tick counter at a fixed rate.
///
/// When pacing is enabled, [`advance`](TickClock::advance) sleeps for one
/// tick period before incrementing, approximating real-time playback.
/// Verification runs disable pacing and tick as fast as possible — they
/// exist for automated checking, not user-observed playback.
#[derive(Clone, Debug)]
pub struct TickClock {
    current: Tick,
    tick_rate: u32,
    pacing: bool,
}

impl TickClock {
    /// Create a clock at tick 0.
    pub fn new(tick_rate: u32, pacing: bool) -> Self {
        Self {
            current: Tick(0),
            tick_rate,
            pacing,
        }
    }

    /// Advance one tick, sleeping for one tick period if pacing is on.
    pub fn advance(&mut self) -> Tick {
        if self.pacing {
            std::thread::sleep(Duration::from_secs_f64(self.dt()));
        }
        self.current = self.current.next();
        self.current
    }

    /// Force the counter to `tick` (rollback / save restore).
    pub fn set_tick(&mut self, tick: Tick) {
        self.current = tick;
    }

    /// The current tick.
    pub fn current(&self) -> Tick {
        self.current
    }

    /// The fixed timestep in seconds.
    pub fn dt(&self) -> f64 {
        1.0 / self.tick_rate as f64
    }

    /// Ticks per second.
    pub fn tick_rate(&self) -> u32 {
        self.tick_rate
    }

    /// Whether real-time pacing is enabled.
    pub fn pacing(&self) -> bool {
        self.pacing
    }

    /// Enable or disable real-time pacing.
    pub fn set_pacing(&mut self, pacing: bool) {
        self.pacing = pacing;
    }
}
