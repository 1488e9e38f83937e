//! Test utilities and mock worlds for Rewind development.
//!
//! Provides a deterministic reference world ([`CounterWorld`]), a
//! deliberately nondeterministic variant ([`NoisyWorld`]) for must-fail
//! verification tests, and a seeded input generator ([`seeded_inputs`])
//! for varied but reproducible test traffic.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use rewind_core::WorldState;
use rewind_engine::{Simulation, TickContext};

/// splitmix64 finalizer — a cheap, well-distributed 64-bit mix.
fn mix64(mut x: u64) -> u64 {
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d049bb133111eb);
    x ^ (x >> 31)
}

/// A deterministic world: four u64 registers updated as a pure function
/// of (state, tick, input).
///
/// Serialization is the 32 little-endian register bytes, so byte-identical
/// state always means identical future ticks — the reference fixture for
/// every determinism check that must pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CounterWorld {
    regs: [u64; 4],
}

impl CounterWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current register values, for direct assertions.
    pub fn regs(&self) -> [u64; 4] {
        self.regs
    }
}

impl WorldState for CounterWorld {
    fn serialize(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(32);
        for reg in self.regs {
            bytes.extend_from_slice(&reg.to_le_bytes());
        }
        bytes
    }

    fn deserialize(&mut self, bytes: &[u8]) -> bool {
        if bytes.len() != 32 {
            return false;
        }
        for (i, chunk) in bytes.chunks_exact(8).enumerate() {
            self.regs[i] = u64::from_le_bytes(chunk.try_into().unwrap());
        }
        true
    }
}

impl Simulation for CounterWorld {
    fn step(&mut self, ctx: &mut TickContext<'_>) {
        let tick = ctx.tick().0;

        ctx.begin_system("integrate");
        self.regs[0] = mix64(self.regs[0] ^ tick);
        self.regs[1] = self.regs[1].wrapping_add(mix64(tick));
        ctx.end_system();

        ctx.begin_system("apply_input");
        for (i, &b) in ctx.input().iter().enumerate() {
            self.regs[2] = mix64(self.regs[2] ^ ((b as u64) << ((i % 8) * 8)));
        }
        ctx.end_system();

        ctx.begin_system("settle");
        self.regs[3] = mix64(self.regs[0] ^ self.regs[1] ^ self.regs[2]);
        ctx.end_system();
    }
}

/// A [`CounterWorld`] with an unseeded random perturbation each tick —
/// the hidden nondeterminism every verification algorithm must catch.
#[derive(Clone, Debug, Default)]
pub struct NoisyWorld {
    base: CounterWorld,
}

impl NoisyWorld {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WorldState for NoisyWorld {
    fn serialize(&self) -> Vec<u8> {
        self.base.serialize()
    }

    fn deserialize(&mut self, bytes: &[u8]) -> bool {
        self.base.deserialize(bytes)
    }
}

impl Simulation for NoisyWorld {
    fn step(&mut self, ctx: &mut TickContext<'_>) {
        self.base.step(ctx);
        ctx.begin_system("glitch");
        self.base.regs[3] ^= rand::random::<u64>();
        ctx.end_system();
    }
}

/// Generate `ticks` reproducible input buffers of up to `max_len` bytes.
///
/// Seeded ChaCha8, so the same seed always yields the same traffic.
pub fn seeded_inputs(seed: u64, ticks: usize, max_len: usize) -> Vec<Vec<u8>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..ticks)
        .map(|_| {
            let len = (rng.next_u64() as usize) % (max_len + 1);
            let mut buf = vec![0u8; len];
            rng.fill_bytes(&mut buf);
            buf
        })
        .collect()
}
