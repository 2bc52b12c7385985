#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Gauntlet simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots such as [`PairView`] and [`PlayerSnapshot`], and respond
//! exclusively with new command batches.

use std::{fmt, str::FromStr, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to the Gauntlet.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the player perform a flap.
    Flap,
    /// Requests that the world acquire pool slots and place a new obstacle pair.
    SpawnPair(SpawnRequest),
    /// Attaches a continuous yoyo motion to both halves of a pair.
    OscillatePair {
        /// Pair receiving the motion.
        pair: PairId,
        /// Amplitude and period of the motion.
        oscillation: Oscillation,
    },
    /// Applies a visual tint to both halves of a pair.
    TintPair {
        /// Pair receiving the tint.
        pair: PairId,
        /// Tint applied to both halves.
        tint: Tint,
    },
    /// Marks a pair as passed by the player.
    MarkPairScored {
        /// Pair the player advanced beyond.
        pair: PairId,
    },
    /// Reports that the player overlapped a pair.
    ReportCollision {
        /// Pair the player collided with.
        pair: PairId,
    },
    /// Zeroes the motion of every active obstacle.
    StopObstacles,
    /// Returns every active pair to the pool and restarts pair numbering.
    ResetObstacles,
    /// Restores the player to its starting state.
    ResetPlayer,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Simulation clock after the tick was applied.
        now: Duration,
    },
    /// Confirms that the player flapped.
    PlayerFlapped,
    /// Confirms that a pair entered the active set.
    PairSpawned {
        /// Identifier assigned to the pair.
        pair: PairId,
        /// Placement that was executed.
        request: SpawnRequest,
    },
    /// Reports that a pair left the playfield and was returned to the pool.
    PairExpired {
        /// Identifier of the expired pair.
        pair: PairId,
    },
    /// Confirms that the player passed a pair for the first time.
    PairPassed {
        /// Identifier of the passed pair.
        pair: PairId,
        /// Variant the pair was spawned with.
        variant: Variant,
        /// Gap center assigned at spawn time.
        gap_center: f32,
        /// Gap assigned at spawn time.
        gap: f32,
        /// Horizontal speed assigned at spawn time.
        speed: f32,
    },
    /// Confirms that the player collided with a pair.
    PlayerCollided {
        /// Identifier of the pair the player hit.
        pair: PairId,
        /// Variant the pair was spawned with.
        variant: Variant,
        /// Gap assigned at spawn time.
        gap: f32,
        /// Horizontal speed assigned at spawn time.
        speed: f32,
    },
    /// Announces that the player transitioned into the dead state.
    PlayerDied {
        /// What ended the run.
        cause: DeathCause,
    },
    /// Reports that the pool appended a slot because no free slot existed.
    PoolGrew {
        /// Slot count after growth.
        capacity: usize,
    },
    /// Reports that a spawn could not be executed.
    SpawnRejected {
        /// Reason the pool refused the request.
        reason: PoolError,
    },
    /// Confirms that every active obstacle stopped moving.
    ObstaclesStopped,
    /// Confirms that every pair returned to the pool.
    ObstaclesReset,
}

/// Placement parameters for a new obstacle pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnRequest {
    /// Horizontal center of both halves.
    pub x: f32,
    /// Vertical center of the gap between the halves.
    pub gap_center: f32,
    /// Vertical distance between the halves.
    pub gap: f32,
    /// Horizontal velocity in pixels per second (negative travels left).
    pub speed: f32,
    /// Behavior modifier applied after placement.
    pub variant: Variant,
}

/// Reasons a player run can end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    /// The player overlapped an obstacle half.
    Obstacle,
    /// The player touched the floor of the playfield.
    Ground,
}

/// Failures raised by the obstacle pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PoolError {
    /// The slot identifier does not belong to the pool.
    #[error("slot {0} does not exist")]
    UnknownSlot(SlotId),
    /// The slot was released while already free.
    #[error("slot {0} is already free")]
    SlotAlreadyFree(SlotId),
    /// No free slot exists and the growth cap was reached.
    #[error("pool exhausted at {capacity} slots")]
    Exhausted {
        /// Slot count at which growth stopped.
        capacity: usize,
    },
}

/// Unique identifier assigned to an obstacle pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairId(u32);

impl PairId {
    /// Creates a new pair identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Index of a reusable obstacle half inside the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u32);

impl SlotId {
    /// Creates a new slot identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Behavior modifiers that can be applied to a spawned pair.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub enum Variant {
    /// Plain pair without modification.
    Static,
    /// Both halves bob vertically in a repeating yoyo.
    Oscillating,
    /// Marker for pairs spawned at a tight gap.
    Narrow,
    /// Both halves carry a distinct tint.
    Decorated,
    /// An extra pair follows immediately behind.
    Double,
}

impl Variant {
    /// Every variant in canonical order.
    pub const ALL: [Variant; 5] = [
        Variant::Static,
        Variant::Oscillating,
        Variant::Narrow,
        Variant::Decorated,
        Variant::Double,
    ];

    /// Lowercase tag used in configuration files and telemetry.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Oscillating => "oscillating",
            Self::Narrow => "narrow",
            Self::Decorated => "decorated",
            Self::Double => "double",
        }
    }

    /// Resolves a tag, falling back to [`Variant::Static`] when it is not recognised.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or_else(|error: UnknownVariant| {
            log::warn!(target: "gauntlet::variant", "{error}; using static");
            Self::Static
        })
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Static => 1,
            Self::Oscillating => 1 << 1,
            Self::Narrow => 1 << 2,
            Self::Decorated => 1 << 3,
            Self::Double => 1 << 4,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Error produced when parsing an unrecognised variant tag.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown variant `{0}`")]
pub struct UnknownVariant(pub String);

impl FromStr for Variant {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Variant::ALL
            .into_iter()
            .find(|variant| variant.tag() == normalized)
            .ok_or_else(|| UnknownVariant(value.to_owned()))
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Self::from_tag(&value)
    }
}

impl From<Variant> for String {
    fn from(value: Variant) -> Self {
        value.tag().to_owned()
    }
}

/// Compact set of variants iterated in canonical order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct VariantSet(u8);

impl VariantSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Creates a set holding a single variant.
    #[must_use]
    pub const fn only(variant: Variant) -> Self {
        Self(variant.bit())
    }

    /// Returns a copy of the set with the provided variant added.
    #[must_use]
    pub const fn with(self, variant: Variant) -> Self {
        Self(self.0 | variant.bit())
    }

    /// Adds a variant to the set.
    pub fn insert(&mut self, variant: Variant) {
        self.0 |= variant.bit();
    }

    /// Reports whether the variant belongs to the set.
    #[must_use]
    pub const fn contains(&self, variant: Variant) -> bool {
        self.0 & variant.bit() != 0
    }

    /// Number of variants in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Reports whether the set holds no variants.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Reports whether every variant in `self` is also in `other`.
    #[must_use]
    pub const fn is_subset(&self, other: &VariantSet) -> bool {
        self.0 & !other.0 == 0
    }

    /// Iterator over the contained variants in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Variant> + '_ {
        Variant::ALL
            .into_iter()
            .filter(move |variant| self.contains(*variant))
    }
}

impl FromIterator<Variant> for VariantSet {
    fn from_iter<I: IntoIterator<Item = Variant>>(iter: I) -> Self {
        let mut set = Self::empty();
        for variant in iter {
            set.insert(variant);
        }
        set
    }
}

/// Parameters derived from the cumulative score for a spawn decision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultySettings {
    /// Horizontal velocity in pixels per second; more negative is harder.
    pub speed: f32,
    /// Vertical gap between obstacle halves in pixels.
    pub gap: f32,
    /// Variants eligible for selection at this score.
    pub allowed_variants: VariantSet,
}

/// Visual tint applied to an obstacle half.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tint {
    red: u8,
    green: u8,
    blue: u8,
}

impl Tint {
    /// Creates a new tint from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the tint.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the tint.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the tint.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Infinite yoyo motion along the vertical axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Oscillation {
    amplitude: f32,
    period: Duration,
}

impl Oscillation {
    /// Creates a motion of the provided amplitude whose one-way leg lasts `period`.
    #[must_use]
    pub const fn new(amplitude: f32, period: Duration) -> Self {
        Self { amplitude, period }
    }

    /// Peak displacement in pixels.
    #[must_use]
    pub const fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Duration of one leg of the yoyo.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Displacement after `elapsed` time, eased with a sine in-out curve.
    ///
    /// The value starts at zero, reaches `amplitude` after one period and
    /// returns to zero after two, repeating forever.
    #[must_use]
    pub fn offset_at(&self, elapsed: Duration) -> f32 {
        let period = self.period.as_secs_f32();
        if period <= 0.0 {
            return 0.0;
        }
        let phase = elapsed.as_secs_f32() / period;
        self.amplitude * (1.0 - (std::f32::consts::PI * phase).cos()) * 0.5
    }
}

/// Which side of the gap an obstacle half occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObstacleHalf {
    /// Hangs from the ceiling; its y marks its bottom edge.
    Top,
    /// Rises from the floor; its y marks its top edge.
    Bottom,
}

/// Axis-aligned bounding box in playfield pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Upper-left corner.
    pub min: Vec2,
    /// Lower-right corner.
    pub max: Vec2,
}

impl Aabb {
    /// Creates a box from its corners.
    #[must_use]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Creates a box centered on `center` extending `half_extents` each way.
    #[must_use]
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Reports whether the interiors of both boxes intersect.
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// Geometry of the visible playfield and obstacle dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Playfield {
    /// Visible width in pixels.
    pub width: f32,
    /// Visible height in pixels; the floor sits at this y.
    pub height: f32,
    /// Horizontal size of an obstacle half.
    pub obstacle_width: f32,
    /// Vertical size of an obstacle half.
    pub obstacle_height: f32,
    /// Highest y the gap may reach.
    pub gap_min_y: f32,
    /// Lowest y the gap may reach.
    pub gap_max_y: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            obstacle_width: 80.0,
            obstacle_height: 600.0,
            gap_min_y: 100.0,
            gap_max_y: 500.0,
        }
    }
}

impl Playfield {
    /// Horizontal position where new pairs enter, just beyond the right edge.
    #[must_use]
    pub fn spawn_x(&self) -> f32 {
        self.width + self.obstacle_width
    }

    /// Horizontal position past which a pair is considered expired.
    #[must_use]
    pub fn expiry_x(&self) -> f32 {
        -self.obstacle_width
    }

    /// Inclusive range of gap centers that keep the whole gap on screen.
    ///
    /// Returns `None` when the gap does not fit between the bounds.
    #[must_use]
    pub fn gap_center_range(&self, gap: f32) -> Option<(f32, f32)> {
        let low = self.gap_min_y + gap * 0.5;
        let high = self.gap_max_y - gap * 0.5;
        (low <= high).then_some((low, high))
    }

    /// Midpoint of the configured vertical gap bounds.
    #[must_use]
    pub fn gap_midpoint(&self) -> f32 {
        (self.gap_min_y + self.gap_max_y) * 0.5
    }
}

/// Animation states of the player entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerAnimation {
    /// Hovering before the first flap; gravity does not apply.
    Idle,
    /// Briefly after a flap.
    Flapping,
    /// Falling or rising without a recent flap.
    Gliding,
    /// The run has ended.
    Dead,
}

/// Immutable representation of the player used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Center of the player in playfield pixels.
    pub position: Vec2,
    /// Half the size of the hit region.
    pub half_extents: Vec2,
    /// Vertical velocity in pixels per second (positive falls).
    pub velocity_y: f32,
    /// Current animation state.
    pub animation: PlayerAnimation,
}

impl PlayerSnapshot {
    /// Reports whether the player can still collide or score.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.animation != PlayerAnimation::Dead
    }

    /// Region tested against obstacle halves.
    #[must_use]
    pub fn hit_region(&self) -> Aabb {
        Aabb::from_center(self.position, self.half_extents)
    }
}

/// Immutable representation of an active pair used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairSnapshot {
    /// Identifier assigned to the pair.
    pub id: PairId,
    /// Variant applied at spawn time.
    pub variant: Variant,
    /// Slot holding the top half.
    pub top_slot: SlotId,
    /// Slot holding the bottom half.
    pub bottom_slot: SlotId,
    /// Current horizontal center of both halves.
    pub x: f32,
    /// Current y of the top half's bottom edge.
    pub top_y: f32,
    /// Current y of the bottom half's top edge.
    pub bottom_y: f32,
    /// Gap center assigned at spawn time.
    pub gap_center: f32,
    /// Gap assigned at spawn time.
    pub gap: f32,
    /// Speed assigned at spawn time.
    pub speed: f32,
    /// Current horizontal velocity of the halves.
    pub velocity_x: f32,
    /// Whether the player already scored this pair.
    pub scored: bool,
    /// Tint applied to both halves, if any.
    pub tint: Option<Tint>,
    /// Whether the halves carry an oscillating motion.
    pub oscillating: bool,
    /// Bounds of the top half.
    pub top: Aabb,
    /// Bounds of the bottom half.
    pub bottom: Aabb,
}

/// Read-only snapshot describing all active pairs.
#[derive(Clone, Debug, Default)]
pub struct PairView {
    snapshots: Vec<PairSnapshot>,
}

impl PairView {
    /// Creates a new pair view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<PairSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured pair snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &PairSnapshot> {
        self.snapshots.iter()
    }

    /// Finds the snapshot of the provided pair.
    #[must_use]
    pub fn get(&self, pair: PairId) -> Option<&PairSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == pair)
    }

    /// Number of active pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no pair is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<PairSnapshot> {
        self.snapshots
    }
}

/// Category of a telemetry record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelemetryKind {
    /// A pair entered the active set.
    Spawn,
    /// The player passed a pair.
    Pass,
    /// The player hit a pair.
    Collision,
}

/// Append-only record used for offline balance analysis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    /// Simulation clock in milliseconds when the record was captured.
    pub timestamp_ms: u64,
    /// Category of the record.
    pub kind: TelemetryKind,
    /// Variant of the pair involved.
    #[serde(default)]
    pub variant: Option<Variant>,
    /// Gap of the pair involved.
    #[serde(default)]
    pub gap: Option<f32>,
    /// Speed of the pair involved.
    #[serde(default)]
    pub speed: Option<f32>,
}
