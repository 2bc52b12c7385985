#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session orchestrator that drives the world and systems one tick at a time.
//!
//! A [`Session`] owns the world, every system and the score keeper. Each call to
//! [`Session::tick`] runs the same fixed sequence: flap input, world update and
//! expiry, spawning with variant resolution, scoring, collision, the game over
//! transition and finally telemetry. Scoring runs before collision so a tick
//! that both passes and hits a pair still awards the pass.

pub mod config;
pub mod effects;
pub mod score;

use std::time::Duration;

use gauntlet_core::{Command, DeathCause, Event, PairId, TelemetryEvent, Variant};
use gauntlet_system_difficulty::DifficultyCurve;
use gauntlet_system_evaluation::Evaluation;
use gauntlet_system_spawning::{Config as SpawnConfig, Spawning};
use gauntlet_system_telemetry::Telemetry;
use gauntlet_system_variants::Variants;
use gauntlet_world::{self as world, query, World};

pub use self::{
    config::{ConfigError, SessionConfig, SpawnTuning},
    effects::{Effects, NoEffects},
    score::{PassAward, ScoreKeeper, ScoringTuning},
};

const VARIANT_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// Lifecycle of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the first flap; nothing spawns.
    Ready,
    /// The run is live.
    Playing,
    /// The player died; obstacles and spawning are halted.
    GameOver,
}

/// Player input sampled for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Whether the player flaps this tick.
    pub flap: bool,
}

/// What happened during one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    /// Phase after the tick.
    pub phase: Phase,
    /// Pairs that entered play, including double followers.
    pub spawned: Vec<PairId>,
    /// Award for the pair passed this tick, if any.
    pub pass: Option<PassAward>,
    /// Whether the player hit an obstacle this tick.
    pub collided: bool,
    /// Cause of death when the run ended this tick.
    pub died: Option<DeathCause>,
    /// Every world event emitted during the tick, in order.
    pub events: Vec<Event>,
}

/// One game session with its world, systems and score.
#[derive(Debug)]
pub struct Session<E: Effects = NoEffects> {
    world: World,
    spawning: Spawning,
    variants: Variants,
    evaluation: Evaluation,
    telemetry: Telemetry,
    score: ScoreKeeper,
    phase: Phase,
    effects: E,
}

impl Session<NoEffects> {
    /// Creates a session without presentation hooks.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_effects(config, NoEffects)
    }
}

impl<E: Effects> Session<E> {
    /// Creates a session that reports gameplay moments to `effects`.
    #[must_use]
    pub fn with_effects(config: &SessionConfig, effects: E) -> Self {
        let curve = DifficultyCurve::new(config.difficulty.clone());
        let spawning = Spawning::new(
            SpawnConfig::new(config.spawning.interval(), config.seed, config.playfield),
            curve,
        );
        let variants = Variants::new(
            config.variants,
            config.playfield,
            config.seed ^ VARIANT_STREAM,
        );

        log::info!(
            target: "gauntlet::session",
            "session created with seed {:#x}",
            config.seed
        );

        Self {
            world: World::with_config(config.world()),
            spawning,
            variants,
            evaluation: Evaluation,
            telemetry: Telemetry::new(),
            score: ScoreKeeper::new(config.scoring),
            phase: Phase::Ready,
            effects,
        }
    }

    /// Advances the session by `dt`.
    pub fn tick(&mut self, dt: Duration, input: TickInput) -> TickReport {
        let mut events = Vec::new();
        let mut report = TickReport {
            phase: self.phase,
            spawned: Vec::new(),
            pass: None,
            collided: false,
            died: None,
            events: Vec::new(),
        };

        if self.phase == Phase::GameOver {
            world::apply(&mut self.world, Command::Tick { dt }, &mut events);
            report.events = events;
            return report;
        }

        if input.flap {
            self.apply(Command::Flap, &mut events);
            if events.contains(&Event::PlayerFlapped) {
                self.effects.flapped();
                if self.phase == Phase::Ready {
                    log::info!(target: "gauntlet::session", "first flap; run started");
                    self.phase = Phase::Playing;
                }
            }
        }

        let tick_start = events.len();
        self.apply(Command::Tick { dt }, &mut events);

        if self.phase == Phase::Playing {
            let mut commands = Vec::new();
            let _ = self
                .spawning
                .handle(&events[tick_start..], self.score.score(), &mut commands);
            self.pump(commands, &mut events);
        }

        report.pass = self.evaluate_scoring(&mut events);
        report.collided = self.evaluate_collision(&mut events);

        let died = events.iter().find_map(|event| match event {
            Event::PlayerDied { cause } => Some(*cause),
            _ => None,
        });
        if let Some(cause) = died {
            self.end_run(cause, &mut events);
        }
        report.died = died;

        self.telemetry.handle(&events, query::clock(&self.world));

        report.phase = self.phase;
        report.spawned = spawned_pairs(&events);
        report.events = events;
        report
    }

    /// Spawns a pair immediately, optionally forcing its variant.
    ///
    /// Returns the identifier of the new pair, or `None` when the pool refused it.
    pub fn force_spawn(&mut self, variant: Option<Variant>) -> Option<PairId> {
        let mut commands = Vec::new();
        self.spawning
            .force_spawn(self.score.score(), variant, &mut commands);
        let mut events = Vec::new();
        self.pump(commands, &mut events);
        self.telemetry.handle(&events, query::clock(&self.world));
        spawned_pairs(&events).first().copied()
    }

    /// Halts spawning and freezes every active pair in place.
    pub fn stop(&mut self) {
        self.spawning.stop();
        let mut events = Vec::new();
        self.apply(Command::StopObstacles, &mut events);
    }

    /// Returns every pair to the pool and starts a fresh run.
    ///
    /// Telemetry and the best points are kept.
    pub fn reset(&mut self) {
        let mut events = Vec::new();
        self.apply(Command::ResetObstacles, &mut events);
        self.apply(Command::ResetPlayer, &mut events);
        self.spawning.reset();
        self.score.reset();
        self.phase = Phase::Ready;
        log::info!(target: "gauntlet::session", "session reset");
    }

    /// Owned copy of the telemetry stream.
    #[must_use]
    pub fn telemetry(&self) -> Vec<TelemetryEvent> {
        self.telemetry.snapshot()
    }

    /// Telemetry sink, for summaries and digests.
    #[must_use]
    pub fn telemetry_sink(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Empties the telemetry stream.
    pub fn clear_telemetry(&mut self) {
        self.telemetry.clear();
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Score keeper of the current run.
    #[must_use]
    pub fn score(&self) -> &ScoreKeeper {
        &self.score
    }

    /// Read-only world, for use with [`gauntlet_world::query`].
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Presentation hooks.
    #[must_use]
    pub fn effects(&self) -> &E {
        &self.effects
    }

    fn apply(&mut self, command: Command, events: &mut Vec<Event>) {
        world::apply(&mut self.world, command, events);
    }

    /// Applies commands and resolves variant behavior until nothing new is requested.
    fn pump(&mut self, mut commands: Vec<Command>, events: &mut Vec<Event>) {
        while !commands.is_empty() {
            let mut generated = Vec::new();
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut generated);
            }
            for event in &generated {
                if let Event::PairSpawned { request, .. } = event {
                    self.effects.pair_spawned(request.variant);
                }
            }
            self.variants.handle(&generated, &mut commands);
            events.extend(generated);
        }
    }

    fn evaluate_scoring(&mut self, events: &mut Vec<Event>) -> Option<PassAward> {
        let pairs = query::pair_view(&self.world);
        let player = query::player(&self.world);
        let mut commands = Vec::new();
        if !self.evaluation.check_scoring(&pairs, &player, &mut commands) {
            return None;
        }

        let mut award = None;
        for command in commands {
            let Command::MarkPairScored { pair } = command else {
                continue;
            };
            let Some(snapshot) = pairs.get(pair) else {
                continue;
            };
            let start = events.len();
            self.apply(command, events);
            if !events[start..]
                .iter()
                .any(|event| matches!(event, Event::PairPassed { .. }))
            {
                continue;
            }

            let gap_center = (snapshot.top_y + snapshot.bottom_y) * 0.5;
            let passed = self
                .score
                .record_pass(player.position.y - gap_center, snapshot.gap);
            log::debug!(
                target: "gauntlet::session",
                "pair {} passed for {} points (x{})",
                pair.get(),
                passed.points,
                passed.multiplier
            );
            self.effects.scored(passed.points, passed.multiplier);
            award = Some(passed);
        }
        award
    }

    fn evaluate_collision(&mut self, events: &mut Vec<Event>) -> bool {
        let pairs = query::pair_view(&self.world);
        let player = query::player(&self.world);
        let mut commands = Vec::new();
        if !self.evaluation.check_collisions(&pairs, &player, &mut commands) {
            return false;
        }

        let start = events.len();
        for command in commands {
            self.apply(command, events);
        }
        let collided = events[start..]
            .iter()
            .any(|event| matches!(event, Event::PlayerCollided { .. }));
        if collided {
            self.effects.collided();
        }
        collided
    }

    fn end_run(&mut self, cause: DeathCause, events: &mut Vec<Event>) {
        self.phase = Phase::GameOver;
        self.spawning.stop();
        self.apply(Command::StopObstacles, events);
        log::info!(
            target: "gauntlet::session",
            "game over ({cause:?}) with score {} and {} points",
            self.score.score(),
            self.score.points()
        );
        self.effects.game_over(self.score.score());
    }
}

fn spawned_pairs(events: &[Event]) -> Vec<PairId> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::PairSpawned { pair, .. } => Some(*pair),
            _ => None,
        })
        .collect()
}
