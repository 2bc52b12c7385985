#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the Gauntlet simulation.
//!
//! The world owns the obstacle pool, the active pair set, the player entity
//! and the simulation clock. It changes only through [`apply`], which turns a
//! [`Command`] into state changes and [`Event`] notifications.

pub mod player;
pub mod pool;

use std::time::Duration;

use gauntlet_core::{
    Command, DeathCause, Event, ObstacleHalf, PairId, PairSnapshot, Playfield, SlotId,
    SpawnRequest, Variant, WELCOME_BANNER,
};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use self::{
    player::{Player, PlayerTuning},
    pool::{ObstaclePool, PoolConfig},
};

/// Construction parameters for a [`World`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Geometry of the visible area and obstacles.
    pub playfield: Playfield,
    /// Sizing of the obstacle pool.
    pub pool: PoolConfig,
    /// Physical tuning of the player.
    pub player: PlayerTuning,
}

#[derive(Clone, Copy, Debug)]
struct ObstaclePair {
    id: PairId,
    top: SlotId,
    bottom: SlotId,
    variant: Variant,
    gap_center: f32,
    gap: f32,
    speed: f32,
    scored: bool,
}

/// Represents the authoritative Gauntlet world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    playfield: Playfield,
    pool: ObstaclePool,
    pairs: Vec<ObstaclePair>,
    next_pair_id: u32,
    player: Player,
    clock: Duration,
    tick_index: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates a world using the default playfield, pool and player tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates a world from explicit configuration.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            banner: WELCOME_BANNER,
            playfield: config.playfield,
            pool: ObstaclePool::new(config.pool),
            pairs: Vec::new(),
            next_pair_id: 0,
            player: Player::new(config.player),
            clock: Duration::ZERO,
            tick_index: 0,
        }
    }

    fn pair_mut(&mut self, pair: PairId) -> Option<&mut ObstaclePair> {
        self.pairs.iter_mut().find(|entry| entry.id == pair)
    }

    fn pair_slots(&self, pair: PairId) -> Option<[SlotId; 2]> {
        self.pairs
            .iter()
            .find(|entry| entry.id == pair)
            .map(|entry| [entry.top, entry.bottom])
    }

    fn spawn_pair(&mut self, request: SpawnRequest, out_events: &mut Vec<Event>) {
        let Some(top) = self.acquire_slot(out_events) else {
            return;
        };
        let Some(bottom) = self.acquire_slot(out_events) else {
            if let Err(error) = self.pool.release(top) {
                log::error!(target: "gauntlet::pool", "failed to return slot {top}: {error}");
            }
            return;
        };

        let half_gap = request.gap * 0.5;
        let velocity = Vec2::new(request.speed, 0.0);
        let placements = [
            (
                top,
                ObstacleHalf::Top,
                Vec2::new(request.x, request.gap_center - half_gap),
            ),
            (
                bottom,
                ObstacleHalf::Bottom,
                Vec2::new(request.x, request.gap_center + half_gap),
            ),
        ];
        for (slot, half, position) in placements {
            if let Some(entry) = self.pool.slot_mut(slot) {
                entry.place(half, position, velocity);
            }
        }

        let id = PairId::new(self.next_pair_id);
        self.next_pair_id = self.next_pair_id.saturating_add(1);
        self.pairs.push(ObstaclePair {
            id,
            top,
            bottom,
            variant: request.variant,
            gap_center: request.gap_center,
            gap: request.gap,
            speed: request.speed,
            scored: false,
        });
        out_events.push(Event::PairSpawned { pair: id, request });
    }

    fn acquire_slot(&mut self, out_events: &mut Vec<Event>) -> Option<SlotId> {
        match self.pool.acquire() {
            Ok(acquired) => {
                if acquired.grew {
                    out_events.push(Event::PoolGrew {
                        capacity: self.pool.capacity(),
                    });
                }
                Some(acquired.slot)
            }
            Err(reason) => {
                log::warn!(target: "gauntlet::spawn", "spawn skipped: {reason}");
                out_events.push(Event::SpawnRejected { reason });
                None
            }
        }
    }

    fn advance_obstacles(&mut self, dt: Duration) {
        let now = self.clock;
        for slot in self.pool.active_slots_mut() {
            slot.advance(dt, now);
        }
    }

    fn expire_pairs(&mut self, out_events: &mut Vec<Event>) {
        let threshold = self.playfield.expiry_x();
        let pool = &self.pool;
        let (expired, remaining): (Vec<ObstaclePair>, Vec<ObstaclePair>) =
            self.pairs.iter().copied().partition(|pair| {
                pool.slot(pair.top)
                    .map_or(true, |slot| slot.position().x < threshold)
            });
        if expired.is_empty() {
            return;
        }

        self.pairs = remaining;
        for pair in expired {
            self.release_pair(&pair);
            out_events.push(Event::PairExpired { pair: pair.id });
        }
    }

    fn release_pair(&mut self, pair: &ObstaclePair) {
        for slot in [pair.top, pair.bottom] {
            if let Err(error) = self.pool.release(slot) {
                log::error!(
                    target: "gauntlet::pool",
                    "failed to release slot {slot} of pair {}: {error}",
                    pair.id.get()
                );
            }
        }
    }

    fn with_pair_slots(&mut self, pair: PairId, context: &str, mut f: impl FnMut(&mut pool::Slot)) {
        let Some(slots) = self.pair_slots(pair) else {
            log::warn!(
                target: "gauntlet::variant",
                "{context} ignored: pair {} is not active",
                pair.get()
            );
            return;
        };
        for slot in slots {
            if let Some(entry) = self.pool.slot_mut(slot) {
                f(entry);
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced {
                dt,
                now: world.clock,
            });

            if world.player.integrate(dt, world.playfield.height) {
                out_events.push(Event::PlayerDied {
                    cause: DeathCause::Ground,
                });
            }
            world.advance_obstacles(dt);
            world.expire_pairs(out_events);
        }
        Command::Flap => {
            if world.player.flap() {
                out_events.push(Event::PlayerFlapped);
            }
        }
        Command::SpawnPair(request) => world.spawn_pair(request, out_events),
        Command::OscillatePair { pair, oscillation } => {
            let now = world.clock;
            world.with_pair_slots(pair, "oscillation", |slot| {
                slot.attach_motion(oscillation, now);
            });
        }
        Command::TintPair { pair, tint } => {
            world.with_pair_slots(pair, "tint", |slot| slot.set_tint(tint));
        }
        Command::MarkPairScored { pair } => {
            let Some(entry) = world.pair_mut(pair) else {
                log::warn!(
                    target: "gauntlet::evaluation",
                    "score ignored: pair {} is not active",
                    pair.get()
                );
                return;
            };
            if entry.scored {
                return;
            }
            entry.scored = true;
            out_events.push(Event::PairPassed {
                pair,
                variant: entry.variant,
                gap_center: entry.gap_center,
                gap: entry.gap,
                speed: entry.speed,
            });
        }
        Command::ReportCollision { pair } => {
            let Some(entry) = world.pairs.iter().find(|entry| entry.id == pair).copied() else {
                log::warn!(
                    target: "gauntlet::evaluation",
                    "collision ignored: pair {} is not active",
                    pair.get()
                );
                return;
            };
            if !world.player.kill() {
                return;
            }
            out_events.push(Event::PlayerCollided {
                pair,
                variant: entry.variant,
                gap: entry.gap,
                speed: entry.speed,
            });
            out_events.push(Event::PlayerDied {
                cause: DeathCause::Obstacle,
            });
        }
        Command::StopObstacles => {
            for slot in world.pool.active_slots_mut() {
                slot.halt();
            }
            out_events.push(Event::ObstaclesStopped);
        }
        Command::ResetObstacles => {
            let pairs = std::mem::take(&mut world.pairs);
            for pair in &pairs {
                world.release_pair(pair);
            }
            world.next_pair_id = 0;
            out_events.push(Event::ObstaclesReset);
        }
        Command::ResetPlayer => world.player.reset(),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use gauntlet_core::{Aabb, PairId, PairSnapshot, PairView, PlayerSnapshot, Playfield};

    use super::{pool::ObstaclePool, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the playfield geometry.
    #[must_use]
    pub fn playfield(world: &World) -> &Playfield {
        &world.playfield
    }

    /// Provides read-only access to the obstacle pool.
    #[must_use]
    pub fn pool(world: &World) -> &ObstaclePool {
        &world.pool
    }

    /// Simulation clock accumulated from every tick.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Number of ticks applied so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Identifier the next spawned pair will receive.
    #[must_use]
    pub fn next_pair_id(world: &World) -> PairId {
        PairId::new(world.next_pair_id)
    }

    /// Number of pairs currently in play.
    #[must_use]
    pub fn active_pair_count(world: &World) -> usize {
        world.pairs.len()
    }

    /// Captures the player's current state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player.snapshot()
    }

    /// Captures a read-only view of the pairs in play.
    #[must_use]
    pub fn pair_view(world: &World) -> PairView {
        let snapshots = world
            .pairs
            .iter()
            .filter_map(|pair| world.snapshot_pair(pair))
            .collect();
        PairView::from_snapshots(snapshots)
    }

    /// Captures a single pair, if it is in play.
    #[must_use]
    pub fn pair(world: &World, pair: PairId) -> Option<PairSnapshot> {
        world
            .pairs
            .iter()
            .find(|entry| entry.id == pair)
            .and_then(|entry| world.snapshot_pair(entry))
    }

    pub(super) fn half_bounds(x: f32, top: f32, bottom: f32, half_width: f32) -> Aabb {
        Aabb::new(
            glam::Vec2::new(x - half_width, top),
            glam::Vec2::new(x + half_width, bottom),
        )
    }
}

impl World {
    fn snapshot_pair(&self, pair: &ObstaclePair) -> Option<PairSnapshot> {
        let top = self.pool.slot(pair.top)?;
        let bottom = self.pool.slot(pair.bottom)?;
        let half_width = self.playfield.obstacle_width * 0.5;
        let height = self.playfield.obstacle_height;
        let x = top.position().x;
        let top_y = top.position().y;
        let bottom_y = bottom.position().y;
        let top_bounds = query::half_bounds(x, top_y - height, top_y, half_width);
        let bottom_bounds = query::half_bounds(
            bottom.position().x,
            bottom_y,
            bottom_y + height,
            half_width,
        );
        Some(PairSnapshot {
            id: pair.id,
            variant: pair.variant,
            top_slot: pair.top,
            bottom_slot: pair.bottom,
            x,
            top_y,
            bottom_y,
            gap_center: pair.gap_center,
            gap: pair.gap,
            speed: pair.speed,
            velocity_x: top.velocity().x,
            scored: pair.scored,
            tint: top.tint(),
            oscillating: top.is_oscillating(),
            top: top_bounds,
            bottom: bottom_bounds,
        })
    }
}
