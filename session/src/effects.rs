//! Hooks for presentation layers that want to react to gameplay moments.

use gauntlet_core::Variant;

/// Receives gameplay moments. Every method defaults to doing nothing.
pub trait Effects {
    /// The player flapped.
    fn flapped(&mut self) {}

    /// A pass was scored.
    fn scored(&mut self, _points: u32, _multiplier: u32) {}

    /// The player hit an obstacle.
    fn collided(&mut self) {}

    /// A pair entered play.
    fn pair_spawned(&mut self, _variant: Variant) {}

    /// The run ended with the given score.
    fn game_over(&mut self, _score: u32) {}
}

/// Effects sink for sessions without a presentation layer.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEffects;

impl Effects for NoEffects {}
