#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting obstacle pair spawns.

use std::time::Duration;

use gauntlet_core::{Command, Event, Playfield, SpawnRequest, Variant, VariantSet};
use gauntlet_system_difficulty::DifficultyCurve;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    rng_seed: u64,
    playfield: Playfield,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadence, seed and geometry.
    #[must_use]
    pub const fn new(spawn_interval: Duration, rng_seed: u64, playfield: Playfield) -> Self {
        Self {
            spawn_interval,
            rng_seed,
            playfield,
        }
    }
}

/// Gate state of the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnState {
    /// Less than one interval elapsed since the last spawn.
    Waiting,
    /// A spawn will be emitted on the next observed tick.
    Ready,
}

/// Pure system that deterministically emits spawn commands once per interval.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: Duration,
    elapsed: Duration,
    enabled: bool,
    playfield: Playfield,
    curve: DifficultyCurve,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration and curve.
    #[must_use]
    pub fn new(config: Config, curve: DifficultyCurve) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            elapsed: Duration::ZERO,
            enabled: true,
            playfield: config.playfield,
            curve,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Reports whether the interval gate is open.
    #[must_use]
    pub fn state(&self) -> SpawnState {
        if self.elapsed >= self.spawn_interval {
            SpawnState::Ready
        } else {
            SpawnState::Waiting
        }
    }

    /// Reports whether spawning is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Time accumulated since the last spawn.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Difficulty curve consulted for each spawn.
    #[must_use]
    pub fn curve(&self) -> &DifficultyCurve {
        &self.curve
    }

    /// Consumes tick events and emits at most one spawn command.
    ///
    /// Returns `true` when a spawn command was pushed to `out`.
    pub fn handle(&mut self, events: &[Event], score: u32, out: &mut Vec<Command>) -> bool {
        if !self.enabled {
            return false;
        }

        let mut observed_tick = false;
        for event in events {
            if let Event::TimeAdvanced { dt, .. } = event {
                self.elapsed = self.elapsed.saturating_add(*dt);
                observed_tick = true;
            }
        }

        if !observed_tick || self.state() == SpawnState::Waiting {
            return false;
        }

        self.spawn(score, None, out);
        true
    }

    /// Emits a spawn immediately, bypassing the interval gate.
    ///
    /// `forced_variant` overrides the random selection from the allowed set.
    pub fn force_spawn(
        &mut self,
        score: u32,
        forced_variant: Option<Variant>,
        out: &mut Vec<Command>,
    ) {
        self.spawn(score, forced_variant, out);
    }

    /// Halts spawning until [`Spawning::resume`] or [`Spawning::reset`].
    pub fn stop(&mut self) {
        self.enabled = false;
    }

    /// Re-enables spawning without touching the elapsed clock.
    pub fn resume(&mut self) {
        self.enabled = true;
    }

    /// Clears the elapsed clock and re-enables spawning.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.enabled = true;
    }

    fn spawn(&mut self, score: u32, forced_variant: Option<Variant>, out: &mut Vec<Command>) {
        let settings = self.curve.settings(score);
        let gap_center = roll_gap_center(&self.playfield, settings.gap, &mut self.rng);
        let variant = forced_variant
            .unwrap_or_else(|| select_variant(&settings.allowed_variants, &mut self.rng));

        out.push(Command::SpawnPair(SpawnRequest {
            x: self.playfield.spawn_x(),
            gap_center,
            gap: settings.gap,
            speed: settings.speed,
            variant,
        }));
        self.elapsed = Duration::ZERO;
    }
}

/// Draws a gap center uniformly from the range that keeps the gap on screen.
///
/// Falls back to the midpoint of the vertical bounds when the gap does not fit.
pub fn roll_gap_center<R: Rng>(playfield: &Playfield, gap: f32, rng: &mut R) -> f32 {
    match playfield.gap_center_range(gap) {
        Some((low, high)) => rng.gen_range(low..=high),
        None => {
            log::warn!(
                target: "gauntlet::spawn",
                "gap {gap} does not fit between {} and {}; centering",
                playfield.gap_min_y,
                playfield.gap_max_y
            );
            playfield.gap_midpoint()
        }
    }
}

/// Picks a variant uniformly from the set, or static when it is empty.
pub fn select_variant<R: Rng>(allowed: &VariantSet, rng: &mut R) -> Variant {
    let candidates: Vec<Variant> = allowed.iter().collect();
    candidates
        .choose(rng)
        .copied()
        .unwrap_or(Variant::Static)
}
