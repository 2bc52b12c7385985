//! Reusable obstacle halves backing every spawned pair.
//!
//! Slots are created up front and recycled forever. A free slot is invisible,
//! parked off view and motionless, so nothing that scans the playfield can
//! mistake it for an obstacle in play.

use std::time::Duration;

use gauntlet_core::{ObstacleHalf, Oscillation, PoolError, SlotId, Tint};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Position assigned to every free slot.
pub const OFF_VIEW: Vec2 = Vec2::new(-10_000.0, -10_000.0);

const DEFAULT_INITIAL_SLOTS: usize = 12;
const DEFAULT_MAX_SLOTS: usize = 64;

/// Sizing parameters for the obstacle pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Slots created when the pool is constructed.
    pub initial_slots: usize,
    /// Upper bound on growth; `None` lets the pool grow without limit.
    ///
    /// Configuration files spell `None` as `max_slots = 0`.
    #[serde(with = "zero_is_unbounded")]
    pub max_slots: Option<usize>,
}

mod zero_is_unbounded {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        max_slots: &Option<usize>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(max_slots.map_or(0, |max| max as u64))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<usize>, D::Error> {
        let max = usize::deserialize(deserializer)?;
        Ok((max != 0).then_some(max))
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_slots: DEFAULT_INITIAL_SLOTS,
            max_slots: Some(DEFAULT_MAX_SLOTS),
        }
    }
}

/// Outcome of a successful [`ObstaclePool::acquire`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Acquired {
    /// Slot handed to the caller.
    pub slot: SlotId,
    /// Whether the slot was appended because no free slot existed.
    pub grew: bool,
}

/// Lifecycle state of a pool slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    /// Parked off view, available to `acquire`.
    Free,
    /// Visible and in play.
    Active,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SlotMotion {
    pub(crate) oscillation: Oscillation,
    pub(crate) base_y: f32,
    pub(crate) started: Duration,
}

/// One reusable obstacle half.
#[derive(Clone, Debug, PartialEq)]
pub struct Slot {
    state: SlotState,
    half: ObstacleHalf,
    position: Vec2,
    velocity: Vec2,
    immovable: bool,
    tint: Option<Tint>,
    motion: Option<SlotMotion>,
}

impl Slot {
    fn parked() -> Self {
        Self {
            state: SlotState::Free,
            half: ObstacleHalf::Top,
            position: OFF_VIEW,
            velocity: Vec2::ZERO,
            immovable: false,
            tint: None,
            motion: None,
        }
    }

    /// Lifecycle state of the slot.
    #[must_use]
    pub fn state(&self) -> SlotState {
        self.state
    }

    /// Reports whether the slot is in play.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == SlotState::Active
    }

    /// Reports whether the slot should be drawn.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.is_active()
    }

    /// Side of the gap the slot was last placed on.
    #[must_use]
    pub fn half(&self) -> ObstacleHalf {
        self.half
    }

    /// Horizontal center and gap-facing edge of the half.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Velocity in pixels per second.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Reports whether external forces such as gravity are ignored.
    #[must_use]
    pub fn is_immovable(&self) -> bool {
        self.immovable
    }

    /// Tint applied to the half, if any.
    #[must_use]
    pub fn tint(&self) -> Option<Tint> {
        self.tint
    }

    /// Reports whether the half carries an oscillating motion.
    #[must_use]
    pub fn is_oscillating(&self) -> bool {
        self.motion.is_some()
    }

    pub(crate) fn place(&mut self, half: ObstacleHalf, position: Vec2, velocity: Vec2) {
        self.half = half;
        self.position = position;
        self.velocity = velocity;
        self.immovable = true;
    }

    pub(crate) fn set_tint(&mut self, tint: Tint) {
        self.tint = Some(tint);
    }

    pub(crate) fn attach_motion(&mut self, oscillation: Oscillation, now: Duration) {
        self.motion = Some(SlotMotion {
            oscillation,
            base_y: self.position.y,
            started: now,
        });
    }

    pub(crate) fn halt(&mut self) {
        self.velocity = Vec2::ZERO;
        self.motion = None;
    }

    pub(crate) fn advance(&mut self, dt: Duration, now: Duration) {
        self.position.x += self.velocity.x * dt.as_secs_f32();
        if let Some(motion) = self.motion {
            let elapsed = now.saturating_sub(motion.started);
            self.position.y = motion.base_y + motion.oscillation.offset_at(elapsed);
        }
    }

    #[cfg(test)]
    pub(crate) fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }
}

/// Free list of reusable obstacle halves.
#[derive(Clone, Debug)]
pub struct ObstaclePool {
    slots: Vec<Slot>,
    max_slots: Option<usize>,
}

impl Default for ObstaclePool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl ObstaclePool {
    /// Creates a pool pre-warmed with `initial_slots` parked slots.
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        let initial = match config.max_slots {
            Some(max) => config.initial_slots.min(max),
            None => config.initial_slots,
        };
        Self {
            slots: vec![Slot::parked(); initial],
            max_slots: config.max_slots,
        }
    }

    /// Hands out the lowest-index free slot, growing by one when none is free.
    pub fn acquire(&mut self) -> Result<Acquired, PoolError> {
        if let Some(index) = self.slots.iter().position(|slot| !slot.is_active()) {
            self.slots[index].state = SlotState::Active;
            return Ok(Acquired {
                slot: slot_id(index),
                grew: false,
            });
        }

        let capacity = self.slots.len();
        if self.max_slots.is_some_and(|max| capacity >= max) {
            log::warn!(target: "gauntlet::pool", "pool exhausted at {capacity} slots");
            return Err(PoolError::Exhausted { capacity });
        }

        let mut slot = Slot::parked();
        slot.state = SlotState::Active;
        self.slots.push(slot);
        log::info!(
            target: "gauntlet::pool",
            "no free slot; pool grew to {} slots",
            self.slots.len()
        );
        Ok(Acquired {
            slot: slot_id(capacity),
            grew: true,
        })
    }

    /// Parks the slot off view with zero motion so it can be acquired again.
    pub fn release(&mut self, slot: SlotId) -> Result<(), PoolError> {
        let entry = self
            .slots
            .get_mut(slot.get() as usize)
            .ok_or(PoolError::UnknownSlot(slot))?;
        if !entry.is_active() {
            return Err(PoolError::SlotAlreadyFree(slot));
        }
        *entry = Slot::parked();
        Ok(())
    }

    /// Retrieves the slot with the provided identifier.
    #[must_use]
    pub fn slot(&self, slot: SlotId) -> Option<&Slot> {
        self.slots.get(slot.get() as usize)
    }

    /// Total number of slots, free or active.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots currently in play.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_active()).count()
    }

    /// Number of slots available without growth.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.capacity() - self.active_count()
    }

    pub(crate) fn slot_mut(&mut self, slot: SlotId) -> Option<&mut Slot> {
        self.slots.get_mut(slot.get() as usize)
    }

    pub(crate) fn active_slots_mut(&mut self) -> impl Iterator<Item = &mut Slot> {
        self.slots.iter_mut().filter(|slot| slot.is_active())
    }
}

fn slot_id(index: usize) -> SlotId {
    SlotId::new(u32::try_from(index).unwrap_or(u32::MAX))
}
