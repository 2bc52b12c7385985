#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Resolves variant tags on freshly spawned pairs into behavior commands.

use std::time::Duration;

use gauntlet_core::{Command, Event, Oscillation, PairId, Playfield, SpawnRequest, Tint, Variant};
use gauntlet_system_spawning::roll_gap_center;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Tuning for the behavior each variant applies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantTuning {
    /// Peak vertical displacement of oscillating pairs.
    pub oscillation_amplitude: f32,
    /// Duration of one leg of the oscillation.
    pub oscillation_period_ms: u64,
    /// Tint applied to decorated pairs.
    pub decorated_tint: Tint,
    /// Horizontal distance between a double pair and its follower.
    pub double_offset: f32,
}

impl Default for VariantTuning {
    fn default() -> Self {
        Self {
            oscillation_amplitude: 40.0,
            oscillation_period_ms: 1_800,
            decorated_tint: Tint::from_rgb(0xff, 0x8a, 0x3d),
            double_offset: 320.0,
        }
    }
}

/// Pure system that turns spawn events into variant behavior commands.
#[derive(Debug)]
pub struct Variants {
    tuning: VariantTuning,
    playfield: Playfield,
    rng: ChaCha8Rng,
}

impl Variants {
    /// Creates a resolver; the seed drives the follower gap of double pairs.
    #[must_use]
    pub fn new(tuning: VariantTuning, playfield: Playfield, rng_seed: u64) -> Self {
        Self {
            tuning,
            playfield,
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
        }
    }

    /// Consumes spawn events and emits the commands their variants require.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            if let Event::PairSpawned { pair, request } = event {
                self.apply(*pair, request, out);
            }
        }
    }

    /// Emits the behavior commands for a single spawned pair.
    pub fn apply(&mut self, pair: PairId, request: &SpawnRequest, out: &mut Vec<Command>) {
        match request.variant {
            Variant::Static | Variant::Narrow => {}
            Variant::Oscillating => out.push(Command::OscillatePair {
                pair,
                oscillation: Oscillation::new(
                    self.tuning.oscillation_amplitude,
                    Duration::from_millis(self.tuning.oscillation_period_ms),
                ),
            }),
            Variant::Decorated => out.push(Command::TintPair {
                pair,
                tint: self.tuning.decorated_tint,
            }),
            Variant::Double => {
                let gap_center = roll_gap_center(&self.playfield, request.gap, &mut self.rng);
                out.push(Command::SpawnPair(SpawnRequest {
                    x: request.x + self.tuning.double_offset,
                    gap_center,
                    gap: request.gap,
                    speed: request.speed,
                    variant: Variant::Static,
                }));
            }
        }
    }
}
