//! Level-indexed difficulty curve.
//!
//! One canonical curve; its breakpoints live in [`CurveTuning`] so variants are
//! configuration rather than code.

use serde::{Deserialize, Serialize};

/// Bumped whenever the default tuning changes shape.
pub const CURVE_VERSION: u32 = 1;

pub const RATING_MIN: f64 = 0.9;
pub const RATING_MAX: f64 = 1.1;

const OPTION_COUNT_FLOOR: usize = 2;
const OPTION_COUNT_CEILING: usize = 10;
const SIMILARITY_CEILING: f64 = 0.99;

/// Parameters for one round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundParameters {
    pub option_count: usize,
    pub similarity: f64,
    pub view_time_secs: u32,
    pub selection_time_secs: u32,
}

/// Per-level similarity increment applied up to and including `through_level`.
/// The last band should leave `through_level` unset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityBand {
    #[serde(default)]
    pub through_level: Option<u32>,
    pub step: f64,
}

/// Curve breakpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveTuning {
    #[serde(default = "default_base_option_count")]
    pub base_option_count: usize,

    /// Levels per extra option.
    #[serde(default = "default_option_step_levels")]
    pub option_step_levels: u32,

    #[serde(default = "default_max_option_count")]
    pub max_option_count: usize,

    #[serde(default = "default_base_similarity")]
    pub base_similarity: f64,

    #[serde(default = "default_similarity_bands")]
    pub similarity_bands: Vec<SimilarityBand>,

    /// Must stay below 1.0 or rounds become unsolvable.
    #[serde(default = "default_max_similarity")]
    pub max_similarity: f64,

    #[serde(default = "default_view_time_secs")]
    pub view_time_secs: u32,

    #[serde(default = "default_base_selection_secs")]
    pub base_selection_secs: u32,

    /// Levels per one-second reduction of the selection window.
    #[serde(default = "default_selection_step_levels")]
    pub selection_step_levels: u32,

    #[serde(default = "default_min_selection_secs")]
    pub min_selection_secs: u32,

    /// Levels per challenge cycle; the last level of each cycle is a boss level.
    #[serde(default = "default_cycle_length")]
    pub cycle_length: u32,
}

impl Default for CurveTuning {
    fn default() -> Self {
        Self {
            base_option_count: default_base_option_count(),
            option_step_levels: default_option_step_levels(),
            max_option_count: default_max_option_count(),
            base_similarity: default_base_similarity(),
            similarity_bands: default_similarity_bands(),
            max_similarity: default_max_similarity(),
            view_time_secs: default_view_time_secs(),
            base_selection_secs: default_base_selection_secs(),
            selection_step_levels: default_selection_step_levels(),
            min_selection_secs: default_min_selection_secs(),
            cycle_length: default_cycle_length(),
        }
    }
}

fn default_base_option_count() -> usize {
    3
}

fn default_option_step_levels() -> u32 {
    10
}

fn default_max_option_count() -> usize {
    10
}

fn default_base_similarity() -> f64 {
    0.70
}

fn default_similarity_bands() -> Vec<SimilarityBand> {
    vec![
        SimilarityBand {
            through_level: Some(10),
            step: 0.010,
        },
        SimilarityBand {
            through_level: Some(25),
            step: 0.006,
        },
        SimilarityBand {
            through_level: Some(50),
            step: 0.003,
        },
        SimilarityBand {
            through_level: None,
            step: 0.0005,
        },
    ]
}

fn default_max_similarity() -> f64 {
    0.97
}

fn default_view_time_secs() -> u32 {
    3
}

fn default_base_selection_secs() -> u32 {
    15
}

fn default_selection_step_levels() -> u32 {
    5
}

fn default_min_selection_secs() -> u32 {
    2
}

fn default_cycle_length() -> u32 {
    10
}

/// Maps a level (and optional performance rating) to round parameters.
#[derive(Debug, Clone, Default)]
pub struct DifficultyCurve {
    tuning: CurveTuning,
}

impl DifficultyCurve {
    pub fn new(tuning: CurveTuning) -> Self {
        Self { tuning }
    }

    pub fn tuning(&self) -> &CurveTuning {
        &self.tuning
    }

    /// Parameters for `level` at a neutral rating.
    pub fn params_for(&self, level: u32) -> RoundParameters {
        let level = level.max(1);
        RoundParameters {
            option_count: self.option_count(level),
            similarity: self.similarity(level),
            view_time_secs: self.tuning.view_time_secs.max(1),
            selection_time_secs: self.selection_secs(level),
        }
    }

    /// Parameters for `level` scaled by a performance rating.
    ///
    /// A rating above 1.0 tightens similarity and shortens the selection
    /// window; below 1.0 relaxes both.
    pub fn params_for_rated(&self, level: u32, rating: f64) -> RoundParameters {
        let rating = clamp_rating(rating);
        let mut params = self.params_for(level);
        params.similarity = (params.similarity * rating).clamp(0.0, self.similarity_cap());
        params.selection_time_secs = ((params.selection_time_secs as f64 / rating).round() as u32)
            .max(self.tuning.min_selection_secs.max(1));
        params
    }

    pub fn is_boss_level(&self, level: u32) -> bool {
        level > 0 && level % self.cycle_length() == 0
    }

    /// Zero-based challenge cycle containing `level`.
    pub fn cycle_index(&self, level: u32) -> u32 {
        level.max(1).saturating_sub(1) / self.cycle_length()
    }

    fn cycle_length(&self) -> u32 {
        self.tuning.cycle_length.max(1)
    }

    fn similarity_cap(&self) -> f64 {
        self.tuning.max_similarity.clamp(0.0, SIMILARITY_CEILING)
    }

    fn option_count(&self, level: u32) -> usize {
        let step = self.tuning.option_step_levels.max(1);
        let extra = ((level - 1) / step) as usize;
        let cap = self
            .tuning
            .max_option_count
            .clamp(OPTION_COUNT_FLOOR, OPTION_COUNT_CEILING);
        (self.tuning.base_option_count + extra).clamp(OPTION_COUNT_FLOOR, cap)
    }

    fn similarity(&self, level: u32) -> f64 {
        let mut similarity = self.tuning.base_similarity;
        let mut reached = 1u32;
        for band in &self.tuning.similarity_bands {
            if reached >= level {
                break;
            }
            let end = band.through_level.unwrap_or(u32::MAX).min(level);
            if end > reached {
                similarity += (end - reached) as f64 * band.step.max(0.0);
                reached = end;
            }
        }
        similarity.clamp(0.0, self.similarity_cap())
    }

    fn selection_secs(&self, level: u32) -> u32 {
        let step = self.tuning.selection_step_levels.max(1);
        let reduction = (level - 1) / step;
        self.tuning
            .base_selection_secs
            .saturating_sub(reduction)
            .max(self.tuning.min_selection_secs.max(1))
    }
}

pub fn clamp_rating(rating: f64) -> f64 {
    if rating.is_finite() {
        rating.clamp(RATING_MIN, RATING_MAX)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_one_defaults() {
        let curve = DifficultyCurve::default();
        let params = curve.params_for(1);
        assert_eq!(params.option_count, 3);
        assert!((params.similarity - 0.70).abs() < 1e-9);
        assert_eq!(params.view_time_secs, 3);
        assert_eq!(params.selection_time_secs, 15);
    }

    #[test]
    fn test_breakpoints() {
        let curve = DifficultyCurve::default();
        assert!((curve.params_for(10).similarity - 0.79).abs() < 1e-9);
        assert!((curve.params_for(25).similarity - 0.88).abs() < 1e-9);
        assert!((curve.params_for(50).similarity - 0.955).abs() < 1e-9);
        assert!((curve.params_for(500).similarity - 0.97).abs() < 1e-9);

        assert_eq!(curve.params_for(10).option_count, 3);
        assert_eq!(curve.params_for(11).option_count, 4);
        assert_eq!(curve.params_for(71).option_count, 10);
        assert_eq!(curve.params_for(1000).option_count, 10);

        assert_eq!(curve.params_for(5).selection_time_secs, 15);
        assert_eq!(curve.params_for(6).selection_time_secs, 14);
        assert_eq!(curve.params_for(1000).selection_time_secs, 2);
    }

    #[test]
    fn test_curve_is_monotonic_over_first_hundred_levels() {
        let curve = DifficultyCurve::default();
        let mut prev = curve.params_for(1);
        for level in 2..=100 {
            let params = curve.params_for(level);
            assert!(params.similarity >= prev.similarity, "level {level}");
            assert!(params.selection_time_secs <= prev.selection_time_secs, "level {level}");
            assert!(params.option_count >= prev.option_count, "level {level}");
            assert_eq!(params.view_time_secs, prev.view_time_secs);
            assert!(params.similarity < 1.0);
            assert!((2..=10).contains(&params.option_count));
            prev = params;
        }
    }

    #[test]
    fn test_increments_flatten_with_level() {
        let curve = DifficultyCurve::default();
        let gain = |from: u32, to: u32| curve.params_for(to).similarity - curve.params_for(from).similarity;
        assert!(gain(1, 10) > gain(51, 60));
        assert!(gain(11, 20) > gain(51, 60));
    }

    #[test]
    fn test_rating_scales_and_clamps() {
        let curve = DifficultyCurve::default();
        let neutral = curve.params_for(20);
        let hot = curve.params_for_rated(20, 5.0);
        let cold = curve.params_for_rated(20, 0.1);

        assert!((hot.similarity - neutral.similarity * RATING_MAX).abs() < 1e-9);
        assert!((cold.similarity - neutral.similarity * RATING_MIN).abs() < 1e-9);
        assert!(hot.selection_time_secs <= neutral.selection_time_secs);
        assert!(cold.selection_time_secs >= neutral.selection_time_secs);

        let capped = curve.params_for_rated(100, RATING_MAX);
        assert!(capped.similarity <= 0.97);
        assert_eq!(curve.params_for_rated(20, f64::NAN), neutral);
    }

    #[test]
    fn test_boss_levels_and_cycles() {
        let curve = DifficultyCurve::default();
        assert!(curve.is_boss_level(10));
        assert!(curve.is_boss_level(40));
        assert!(!curve.is_boss_level(1));
        assert!(!curve.is_boss_level(11));

        assert_eq!(curve.cycle_index(1), 0);
        assert_eq!(curve.cycle_index(10), 0);
        assert_eq!(curve.cycle_index(11), 1);
    }

    #[test]
    fn test_pathological_tuning_is_sanitized() {
        let curve = DifficultyCurve::new(CurveTuning {
            base_option_count: 0,
            max_option_count: 50,
            max_similarity: 1.5,
            min_selection_secs: 0,
            view_time_secs: 0,
            cycle_length: 0,
            option_step_levels: 0,
            selection_step_levels: 0,
            ..CurveTuning::default()
        });
        let params = curve.params_for(400);
        assert!((2..=10).contains(&params.option_count));
        assert!(params.similarity < 1.0);
        assert!(params.selection_time_secs >= 1);
        assert!(params.view_time_secs >= 1);
        assert!(curve.is_boss_level(3));
    }
}
