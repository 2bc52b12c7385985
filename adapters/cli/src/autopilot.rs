//! Scripted pilot that flies through the gap ahead.

use gauntlet_core::PlayerAnimation;
use gauntlet_session::TickInput;
use gauntlet_world::{query, World};

/// Flaps whenever the player sinks below the next gap's center.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Autopilot {
    /// Distance below the target before a flap is issued.
    margin: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self { margin: 15.0 }
    }
}

impl Autopilot {
    /// Picks the input for the next tick.
    pub(crate) fn decide(&self, world: &World) -> TickInput {
        let player = query::player(world);
        if player.animation == PlayerAnimation::Idle {
            return TickInput { flap: true };
        }

        let leading_edge = player.position.x - player.half_extents.x;
        let target = query::pair_view(world)
            .iter()
            .find(|pair| pair.top.max.x >= leading_edge)
            .map_or_else(
                || query::playfield(world).gap_midpoint(),
                |pair| (pair.top_y + pair.bottom_y) * 0.5,
            );

        TickInput {
            flap: player.position.y > target + self.margin && player.velocity_y >= 0.0,
        }
    }
}
