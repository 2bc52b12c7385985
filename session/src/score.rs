//! Cumulative score, points and the centered-pass streak.

use serde::{Deserialize, Serialize};

/// Points and streak rules.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    /// Points awarded per pass before the multiplier.
    pub points_per_pass: u32,
    /// Fraction of the gap around its center that counts as a centered pass.
    pub centered_tolerance: f32,
    /// Consecutive centered passes needed to raise the multiplier by one.
    pub streak_step: u32,
    /// Upper bound on the multiplier.
    pub max_multiplier: u32,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            points_per_pass: 1,
            centered_tolerance: 0.25,
            streak_step: 5,
            max_multiplier: 4,
        }
    }
}

/// Outcome of a single pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassAward {
    /// Points added by this pass.
    pub points: u32,
    /// Multiplier applied.
    pub multiplier: u32,
    /// Whether the pass went through the middle of the gap.
    pub centered: bool,
}

/// Tracks the score of the current run and the best points of the session.
#[derive(Clone, Debug)]
pub struct ScoreKeeper {
    tuning: ScoringTuning,
    score: u32,
    points: u32,
    streak: u32,
    best_points: u32,
}

impl ScoreKeeper {
    /// Creates a keeper with everything at zero.
    #[must_use]
    pub fn new(tuning: ScoringTuning) -> Self {
        Self {
            tuning,
            score: 0,
            points: 0,
            streak: 0,
            best_points: 0,
        }
    }

    /// Number of pairs passed; drives the difficulty curve.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Points earned this run.
    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    /// Consecutive centered passes.
    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Highest points reached by any run since construction.
    #[must_use]
    pub fn best_points(&self) -> u32 {
        self.best_points
    }

    /// Multiplier the current streak earns.
    #[must_use]
    pub fn multiplier(&self) -> u32 {
        let step = self.tuning.streak_step.max(1);
        (1 + self.streak / step).min(self.tuning.max_multiplier.max(1))
    }

    /// Records a pass made `offset` pixels away from the gap center.
    pub fn record_pass(&mut self, offset: f32, gap: f32) -> PassAward {
        let centered = offset.abs() <= self.tuning.centered_tolerance * gap;
        self.streak = if centered {
            self.streak.saturating_add(1)
        } else {
            0
        };

        let multiplier = self.multiplier();
        let points = self.tuning.points_per_pass.saturating_mul(multiplier);
        self.score = self.score.saturating_add(1);
        self.points = self.points.saturating_add(points);
        self.best_points = self.best_points.max(self.points);

        PassAward {
            points,
            multiplier,
            centered,
        }
    }

    /// Starts a new run, keeping the best points.
    pub fn reset(&mut self) {
        self.score = 0;
        self.points = 0;
        self.streak = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::{ScoreKeeper, ScoringTuning};

    #[test]
    fn multiplier_rises_every_five_centered_passes() {
        let mut keeper = ScoreKeeper::new(ScoringTuning::default());
        let multipliers: Vec<_> = (0..12)
            .map(|_| keeper.record_pass(0.0, 160.0).multiplier)
            .collect();
        assert_eq!(multipliers, vec![1, 1, 1, 1, 2, 2, 2, 2, 2, 3, 3, 3]);
        assert_eq!(keeper.score(), 12);
        assert_eq!(keeper.points(), 4 + 2 * 5 + 3 * 3);
    }

    #[test]
    fn multiplier_is_capped() {
        let mut keeper = ScoreKeeper::new(ScoringTuning::default());
        for _ in 0..40 {
            let _ = keeper.record_pass(0.0, 160.0);
        }
        assert_eq!(keeper.multiplier(), 4);
    }

    #[test]
    fn off_center_pass_breaks_the_streak() {
        let mut keeper = ScoreKeeper::new(ScoringTuning::default());
        for _ in 0..6 {
            let _ = keeper.record_pass(10.0, 160.0);
        }
        assert_eq!(keeper.multiplier(), 2);

        let award = keeper.record_pass(41.0, 160.0);
        assert!(!award.centered);
        assert_eq!(award.multiplier, 1);
        assert_eq!(keeper.streak(), 0);
    }

    #[test]
    fn tolerance_boundary_counts_as_centered() {
        let mut keeper = ScoreKeeper::new(ScoringTuning::default());
        assert!(keeper.record_pass(-40.0, 160.0).centered);
    }

    #[test]
    fn reset_keeps_best_points() {
        let mut keeper = ScoreKeeper::new(ScoringTuning::default());
        for _ in 0..3 {
            let _ = keeper.record_pass(0.0, 160.0);
        }
        keeper.reset();
        assert_eq!(keeper.score(), 0);
        assert_eq!(keeper.points(), 0);
        assert_eq!(keeper.best_points(), 3);
    }
}
