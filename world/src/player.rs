//! Plain-data player entity driven by gravity and flap impulses.

use std::time::Duration;

use gauntlet_core::{PlayerAnimation, PlayerSnapshot};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Physical tuning of the player entity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Horizontal center the player holds for the whole run.
    pub start_x: f32,
    /// Vertical center at the start of a run.
    pub start_y: f32,
    /// Half the width of the hit region.
    pub half_width: f32,
    /// Half the height of the hit region.
    pub half_height: f32,
    /// Downward acceleration in pixels per second squared.
    pub gravity: f32,
    /// Vertical velocity assigned by a flap (negative rises).
    pub flap_velocity: f32,
    /// Fastest downward velocity reachable through gravity.
    pub terminal_velocity: f32,
    /// How long the flapping animation lasts after each flap.
    pub flap_animation_ms: u64,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            start_x: 200.0,
            start_y: 300.0,
            half_width: 17.0,
            half_height: 12.0,
            gravity: 1_400.0,
            flap_velocity: -420.0,
            terminal_velocity: 700.0,
            flap_animation_ms: 120,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Player {
    tuning: PlayerTuning,
    position: Vec2,
    velocity_y: f32,
    animation: PlayerAnimation,
    flap_remaining: Duration,
}

impl Player {
    pub(crate) fn new(tuning: PlayerTuning) -> Self {
        Self {
            tuning,
            position: Vec2::new(tuning.start_x, tuning.start_y),
            velocity_y: 0.0,
            animation: PlayerAnimation::Idle,
            flap_remaining: Duration::ZERO,
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new(self.tuning);
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.animation != PlayerAnimation::Dead
    }

    /// Returns `false` when the player is dead and the flap was ignored.
    pub(crate) fn flap(&mut self) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.velocity_y = self.tuning.flap_velocity;
        self.animation = PlayerAnimation::Flapping;
        self.flap_remaining = Duration::from_millis(self.tuning.flap_animation_ms);
        true
    }

    pub(crate) fn kill(&mut self) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.animation = PlayerAnimation::Dead;
        self.velocity_y = 0.0;
        true
    }

    /// Integrates one step and reports whether the player touched the floor.
    pub(crate) fn integrate(&mut self, dt: Duration, floor_y: f32) -> bool {
        if matches!(self.animation, PlayerAnimation::Idle | PlayerAnimation::Dead) {
            return false;
        }

        let seconds = dt.as_secs_f32();
        self.velocity_y =
            (self.velocity_y + self.tuning.gravity * seconds).min(self.tuning.terminal_velocity);
        self.position.y += self.velocity_y * seconds;

        if self.position.y - self.tuning.half_height < 0.0 {
            self.position.y = self.tuning.half_height;
            self.velocity_y = 0.0;
        }

        if self.animation == PlayerAnimation::Flapping {
            self.flap_remaining = self.flap_remaining.saturating_sub(dt);
            if self.flap_remaining.is_zero() {
                self.animation = PlayerAnimation::Gliding;
            }
        }

        if self.position.y + self.tuning.half_height >= floor_y {
            self.position.y = floor_y - self.tuning.half_height;
            return self.kill();
        }
        false
    }

    pub(crate) fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.position,
            half_extents: Vec2::new(self.tuning.half_width, self.tuning.half_height),
            velocity_y: self.velocity_y,
            animation: self.animation,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Player, PlayerTuning};
    use gauntlet_core::PlayerAnimation;

    const FRAME: Duration = Duration::from_millis(16);

    #[test]
    fn idle_player_ignores_gravity() {
        let mut player = Player::new(PlayerTuning::default());
        for _ in 0..60 {
            assert!(!player.integrate(FRAME, 600.0));
        }
        assert_eq!(player.snapshot().position.y, 300.0);
        assert_eq!(player.snapshot().animation, PlayerAnimation::Idle);
    }

    #[test]
    fn flap_rises_then_settles_into_glide() {
        let mut player = Player::new(PlayerTuning::default());
        assert!(player.flap());
        let _ = player.integrate(FRAME, 600.0);
        let snapshot = player.snapshot();
        assert!(snapshot.position.y < 300.0);
        assert_eq!(snapshot.animation, PlayerAnimation::Flapping);

        for _ in 0..10 {
            let _ = player.integrate(FRAME, 600.0);
        }
        assert_eq!(player.snapshot().animation, PlayerAnimation::Gliding);
    }

    #[test]
    fn falling_to_the_floor_kills_once() {
        let mut player = Player::new(PlayerTuning::default());
        assert!(player.flap());
        let mut deaths = 0;
        for _ in 0..400 {
            if player.integrate(FRAME, 600.0) {
                deaths += 1;
            }
        }
        assert_eq!(deaths, 1);
        assert!(!player.is_alive());
        assert!(!player.flap(), "dead players cannot flap");
        assert!(player.snapshot().velocity_y.abs() < f32::EPSILON);
    }

    #[test]
    fn terminal_velocity_caps_fall() {
        let tuning = PlayerTuning {
            terminal_velocity: 300.0,
            ..PlayerTuning::default()
        };
        let mut player = Player::new(tuning);
        let _ = player.flap();
        for _ in 0..30 {
            let _ = player.integrate(FRAME, 10_000.0);
        }
        assert!(player.snapshot().velocity_y <= 300.0);
    }

    #[test]
    fn reset_restores_start_state() {
        let mut player = Player::new(PlayerTuning::default());
        let _ = player.flap();
        let _ = player.kill();
        player.reset();
        let snapshot = player.snapshot();
        assert!(snapshot.is_alive());
        assert_eq!(snapshot.animation, PlayerAnimation::Idle);
        assert_eq!(snapshot.position.y, 300.0);
    }
}
