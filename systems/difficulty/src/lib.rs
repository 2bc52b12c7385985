#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Score-driven difficulty curve.
//!
//! Maps the cumulative score to the speed, gap and variant set used for the
//! next spawn. The mapping is a pure function: the same score always yields
//! the same [`DifficultySettings`].

use gauntlet_core::{DifficultySettings, Variant, VariantSet};
use serde::{Deserialize, Serialize};

/// Score at which a variant becomes eligible for selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariantUnlock {
    /// Variant unlocked by the threshold. Unknown tags resolve to static.
    pub variant: Variant,
    /// Minimum cumulative score required.
    pub score: u32,
}

impl VariantUnlock {
    /// Creates an unlock entry.
    #[must_use]
    pub const fn new(variant: Variant, score: u32) -> Self {
        Self { variant, score }
    }
}

/// Tuning knobs for the difficulty curve.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    /// Speed at score zero; negative travels left.
    pub base_speed: f32,
    /// Speed once the curve saturates.
    pub max_speed: f32,
    /// Gap at score zero.
    pub base_gap: f32,
    /// Smallest gap the curve may produce.
    pub min_gap: f32,
    /// Score beyond which the curve stops getting harder.
    pub saturation_score: u32,
    /// Fraction of the gap reduction applied at saturation.
    pub gap_reduction_scale: f32,
    /// Thresholds unlocking additional variants.
    pub unlocks: Vec<VariantUnlock>,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            base_speed: -200.0,
            max_speed: -380.0,
            base_gap: 180.0,
            min_gap: 120.0,
            saturation_score: 30,
            gap_reduction_scale: 0.9,
            unlocks: vec![
                VariantUnlock::new(Variant::Oscillating, 5),
                VariantUnlock::new(Variant::Narrow, 10),
                VariantUnlock::new(Variant::Decorated, 15),
                VariantUnlock::new(Variant::Double, 20),
            ],
        }
    }
}

/// Pure mapping from cumulative score to spawn parameters.
#[derive(Clone, Debug)]
pub struct DifficultyCurve {
    tuning: DifficultyTuning,
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        Self::new(DifficultyTuning::default())
    }
}

impl DifficultyCurve {
    /// Creates a curve, repairing bounds that would make it easier over time.
    #[must_use]
    pub fn new(mut tuning: DifficultyTuning) -> Self {
        if tuning.max_speed > tuning.base_speed {
            log::warn!(
                target: "gauntlet::difficulty",
                "max_speed {} is slower than base_speed {}; clamping",
                tuning.max_speed,
                tuning.base_speed
            );
            tuning.max_speed = tuning.base_speed;
        }
        if tuning.min_gap > tuning.base_gap {
            log::warn!(
                target: "gauntlet::difficulty",
                "min_gap {} exceeds base_gap {}; clamping",
                tuning.min_gap,
                tuning.base_gap
            );
            tuning.min_gap = tuning.base_gap;
        }
        tuning.gap_reduction_scale = tuning.gap_reduction_scale.clamp(0.0, 1.0);
        Self { tuning }
    }

    /// Tuning the curve was built from, after repair.
    #[must_use]
    pub fn tuning(&self) -> &DifficultyTuning {
        &self.tuning
    }

    /// Spawn parameters for the provided cumulative score.
    #[must_use]
    pub fn settings(&self, score: u32) -> DifficultySettings {
        let tuning = &self.tuning;
        let eased = ease_out_cubic(self.progress(score));

        let speed = tuning.base_speed + (tuning.max_speed - tuning.base_speed) * eased;
        let reduction = (tuning.base_gap - tuning.min_gap) * eased * tuning.gap_reduction_scale;
        let gap = (tuning.base_gap - reduction).max(tuning.min_gap);

        DifficultySettings {
            speed,
            gap,
            allowed_variants: self.allowed_variants(score),
        }
    }

    /// Variants eligible at the provided score; static is always included.
    #[must_use]
    pub fn allowed_variants(&self, score: u32) -> VariantSet {
        self.tuning
            .unlocks
            .iter()
            .filter(|unlock| score >= unlock.score)
            .fold(VariantSet::only(Variant::Static), |set, unlock| {
                set.with(unlock.variant)
            })
    }

    fn progress(&self, score: u32) -> f32 {
        let saturation = self.tuning.saturation_score;
        if saturation == 0 {
            return 1.0;
        }
        score.min(saturation) as f32 / saturation as f32
    }
}

fn ease_out_cubic(t: f32) -> f32 {
    let inverse = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inverse * inverse * inverse
}

#[cfg(test)]
mod tests {
    use super::{ease_out_cubic, DifficultyCurve, DifficultyTuning};

    #[test]
    fn ease_out_hits_endpoints_and_front_loads() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!(ease_out_cubic(0.5) > 0.5);
        assert_eq!(ease_out_cubic(2.0), 1.0);
    }

    #[test]
    fn zero_saturation_is_immediately_saturated() {
        let curve = DifficultyCurve::new(DifficultyTuning {
            saturation_score: 0,
            ..DifficultyTuning::default()
        });
        assert!((curve.settings(0).speed - -380.0).abs() < 1e-3);
    }

    #[test]
    fn inverted_tuning_is_repaired() {
        let curve = DifficultyCurve::new(DifficultyTuning {
            base_speed: -200.0,
            max_speed: -100.0,
            base_gap: 150.0,
            min_gap: 200.0,
            ..DifficultyTuning::default()
        });
        assert_eq!(curve.tuning().max_speed, -200.0);
        assert_eq!(curve.tuning().min_gap, 150.0);
        assert_eq!(curve.settings(30).gap, 150.0);
    }
}
