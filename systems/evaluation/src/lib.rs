#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pass and collision checks between the player and the active pairs.

use gauntlet_core::{Command, PairSnapshot, PairView, PlayerSnapshot};

/// Stateless evaluator that reads pair snapshots and requests score or collision commands.
#[derive(Debug, Default)]
pub struct Evaluation;

impl Evaluation {
    /// Reports whether the player overlaps any active pair.
    ///
    /// Stops at the first hit and pushes [`Command::ReportCollision`] for it.
    /// A dead player never collides.
    pub fn check_collisions(
        &self,
        pairs: &PairView,
        player: &PlayerSnapshot,
        out: &mut Vec<Command>,
    ) -> bool {
        if !player.is_alive() {
            return false;
        }

        let region = player.hit_region();
        let Some(hit) = pairs
            .iter()
            .find(|pair| pair.top.overlaps(&region) || pair.bottom.overlaps(&region))
        else {
            return false;
        };

        log::debug!(
            target: "gauntlet::evaluation",
            "player hit pair {} at x {:.1}",
            hit.id.get(),
            hit.x
        );
        out.push(Command::ReportCollision { pair: hit.id });
        true
    }

    /// Reports whether the player just passed an unscored pair.
    ///
    /// At most one pair is scored per call, the earliest spawned one.
    pub fn check_scoring(
        &self,
        pairs: &PairView,
        player: &PlayerSnapshot,
        out: &mut Vec<Command>,
    ) -> bool {
        if !player.is_alive() {
            return false;
        }

        let Some(passed) = pairs
            .iter()
            .find(|pair| !pair.scored && has_passed(pair, player))
        else {
            return false;
        };

        out.push(Command::MarkPairScored { pair: passed.id });
        true
    }
}

fn has_passed(pair: &PairSnapshot, player: &PlayerSnapshot) -> bool {
    player.position.x > pair.top.max.x
}
