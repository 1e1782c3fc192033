//! Target + distractor generation.
//!
//! Distractors are HSL perturbations of the target whose perceptual distance
//! falls inside a window derived from the round's similarity. Every search is
//! bounded; when the budget runs out the closest candidate is used instead so a
//! round is never blocked on generation.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::color::{distance, Color, Hsl};

const MAX_SIMILARITY: f64 = 0.999;

/// One round's colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSet {
    pub target: Color,
    pub options: Vec<Color>,
}

impl ColorSet {
    pub fn distractors(&self) -> impl Iterator<Item = &Color> {
        self.options.iter().filter(move |c| **c != self.target)
    }

    /// Target present exactly once and no duplicates.
    pub fn is_well_formed(&self) -> bool {
        let unique: HashSet<&Color> = self.options.iter().collect();
        unique.len() == self.options.len()
            && self.options.iter().filter(|c| **c == self.target).count() == 1
    }
}

/// The retry budget ran out before every distractor met its constraints.
#[derive(Error, Debug, Clone)]
#[error("Color generation exhausted its retry budget with {unmet} distractor(s) outside constraints")]
pub struct GenerationExhausted {
    pub unmet: usize,
    pub best_effort: ColorSet,
}

/// Generation constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorTuning {
    /// Acceptable lightness band (percent) for targets and distractors.
    #[serde(default = "default_min_lightness")]
    pub min_lightness: f64,

    #[serde(default = "default_max_lightness")]
    pub max_lightness: f64,

    /// Candidates tried per distractor before settling for the best one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Distractors closer than this would read as a duplicate of the target.
    #[serde(default = "default_min_distance")]
    pub min_distance: f64,

    /// `max_distance = base + scale * (1 - similarity)`
    #[serde(default = "default_max_distance_base")]
    pub max_distance_base: f64,

    #[serde(default = "default_max_distance_scale")]
    pub max_distance_scale: f64,
}

impl Default for GeneratorTuning {
    fn default() -> Self {
        Self {
            min_lightness: default_min_lightness(),
            max_lightness: default_max_lightness(),
            max_attempts: default_max_attempts(),
            min_distance: default_min_distance(),
            max_distance_base: default_max_distance_base(),
            max_distance_scale: default_max_distance_scale(),
        }
    }
}

fn default_min_lightness() -> f64 {
    25.0
}

fn default_max_lightness() -> f64 {
    75.0
}

fn default_max_attempts() -> u32 {
    64
}

fn default_min_distance() -> f64 {
    2.0
}

fn default_max_distance_base() -> f64 {
    5.0
}

fn default_max_distance_scale() -> f64 {
    60.0
}

#[derive(Debug, Clone, Default)]
pub struct ColorSetGenerator {
    tuning: GeneratorTuning,
}

impl ColorSetGenerator {
    pub fn new(tuning: GeneratorTuning) -> Self {
        Self { tuning }
    }

    pub fn tuning(&self) -> &GeneratorTuning {
        &self.tuning
    }

    /// Acceptable distractor distance range for a similarity.
    pub fn distance_window(&self, similarity: f64) -> (f64, f64) {
        let similarity = similarity.clamp(0.0, MAX_SIMILARITY);
        let min = self.tuning.min_distance.max(0.0);
        let max = self.tuning.max_distance_base + self.tuning.max_distance_scale * (1.0 - similarity);
        (min, max.max(min))
    }

    /// Generate a set, falling back to the best candidates found if the retry
    /// budget runs out.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        option_count: usize,
        similarity: f64,
        rng: &mut R,
    ) -> ColorSet {
        match self.try_generate(option_count, similarity, rng) {
            Ok(set) => set,
            Err(exhausted) => {
                warn!(
                    unmet = exhausted.unmet,
                    option_count, similarity, "{exhausted}; using best-effort colors"
                );
                exhausted.best_effort
            }
        }
    }

    pub fn try_generate<R: Rng + ?Sized>(
        &self,
        option_count: usize,
        similarity: f64,
        rng: &mut R,
    ) -> Result<ColorSet, GenerationExhausted> {
        let option_count = option_count.clamp(2, 10);
        let similarity = if similarity.is_finite() {
            similarity.clamp(0.0, MAX_SIMILARITY)
        } else {
            0.0
        };
        let (min_distance, max_distance) = self.distance_window(similarity);

        let target = self.random_target(rng);
        let target_hsl = target.to_hsl();

        let mut taken: HashSet<Color> = HashSet::from([target]);
        let mut options = vec![target];
        let mut unmet = 0;

        while options.len() < option_count {
            let mut best: Option<(Color, f64)> = None;
            let mut accepted = None;

            for _ in 0..self.tuning.max_attempts.max(1) {
                let candidate = self.perturb(target_hsl, similarity, rng);
                if taken.contains(&candidate) {
                    continue;
                }
                let d = distance(target, candidate);
                let violation = window_violation(d, min_distance, max_distance)
                    + self.lightness_violation(candidate);
                if violation == 0.0 {
                    accepted = Some(candidate);
                    break;
                }
                if best.map_or(true, |(_, v)| violation < v) {
                    best = Some((candidate, violation));
                }
            }

            let chosen = match (accepted, best) {
                (Some(color), _) => color,
                (None, Some((color, _))) => {
                    unmet += 1;
                    color
                }
                (None, None) => {
                    unmet += 1;
                    self.walk_to_unique(target, &taken, min_distance)
                }
            };
            taken.insert(chosen);
            options.push(chosen);
        }

        options.shuffle(rng);
        let set = ColorSet { target, options };
        debug!(color = %target, option_count, similarity, unmet, "generated color set");

        if unmet > 0 {
            Err(GenerationExhausted {
                unmet,
                best_effort: set,
            })
        } else {
            Ok(set)
        }
    }

    /// A random color inside the lightness band.
    pub fn random_target<R: Rng + ?Sized>(&self, rng: &mut R) -> Color {
        let (low, high) = self.lightness_band();
        for _ in 0..self.tuning.max_attempts.max(1) {
            let candidate = Color::from_hsl(Hsl::new(
                rng.gen_range(0.0..360.0),
                rng.gen_range(30.0..=100.0),
                rng.gen_range(30.0..=70.0),
            ));
            let l = candidate.to_hsl().l;
            if (low..=high).contains(&l) {
                return candidate;
            }
        }
        Color::from_hsl(Hsl::new(rng.gen_range(0.0..360.0), 60.0, (low + high) / 2.0))
    }

    fn perturb<R: Rng + ?Sized>(&self, base: Hsl, similarity: f64, rng: &mut R) -> Color {
        let spread = 1.0 - similarity;
        let hue_range = 360.0 * spread;
        let saturation_range = 30.0 * spread;
        let lightness_range = 20.0 * spread;

        let h = base.h + rng.gen_range(-1.0..=1.0) * hue_range;
        let s = (base.s + rng.gen_range(-1.0..=1.0) * saturation_range).clamp(20.0, 100.0);
        let l = (base.l + rng.gen_range(-1.0..=1.0) * lightness_range).clamp(20.0, 80.0);
        Color::from_hsl(Hsl::new(h, s, l))
    }

    fn lightness_band(&self) -> (f64, f64) {
        let low = self.tuning.min_lightness.clamp(0.0, 100.0);
        let high = self.tuning.max_lightness.clamp(low, 100.0);
        (low, high)
    }

    fn lightness_violation(&self, color: Color) -> f64 {
        let (low, high) = self.lightness_band();
        let l = color.to_hsl().l;
        if l < low {
            low - l
        } else if l > high {
            l - high
        } else {
            0.0
        }
    }

    /// Deterministic walk outward from the target in RGB until an unused color
    /// turns up, preferring one at least `min_distance` away.
    fn walk_to_unique(&self, target: Color, taken: &HashSet<Color>, min_distance: f64) -> Color {
        let neighbours = |k: u8| {
            [
                Color::new(target.r.saturating_add(k), target.g, target.b),
                Color::new(target.r.saturating_sub(k), target.g, target.b),
                Color::new(target.r, target.g.saturating_add(k), target.b),
                Color::new(target.r, target.g.saturating_sub(k), target.b),
                Color::new(target.r, target.g, target.b.saturating_add(k)),
                Color::new(target.r, target.g, target.b.saturating_sub(k)),
            ]
        };

        for require_distance in [true, false] {
            for k in 1..=u8::MAX {
                if let Some(found) = neighbours(k).into_iter().find(|c| {
                    !taken.contains(c) && (!require_distance || distance(target, *c) >= min_distance)
                }) {
                    return found;
                }
            }
        }

        (0u32..=0x00ff_ffff)
            .map(|v| Color::new((v >> 16) as u8, (v >> 8) as u8, v as u8))
            .find(|c| !taken.contains(c))
            .unwrap_or(Color::BLACK)
    }
}

fn window_violation(d: f64, min: f64, max: f64) -> f64 {
    if d < min {
        min - d
    } else if d > max {
        d - max
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sets_are_well_formed_across_parameter_space() {
        let generator = ColorSetGenerator::default();
        for seed in 0..8u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            for option_count in 2..=10 {
                for similarity in [0.0, 0.3, 0.7, 0.9, 0.97, 0.999] {
                    let set = generator.generate(option_count, similarity, &mut rng);
                    assert_eq!(set.options.len(), option_count);
                    assert!(set.is_well_formed(), "{set:?}");
                }
            }
        }
    }

    #[test]
    fn test_moderate_similarity_meets_constraints() {
        let generator = ColorSetGenerator::default();
        for seed in 0..10u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            for similarity in [0.5, 0.7] {
                let set = generator
                    .try_generate(6, similarity, &mut rng)
                    .expect("constraints should be satisfiable");
                let (min, max) = generator.distance_window(similarity);
                for d in set.distractors().map(|c| distance(set.target, *c)) {
                    assert!(d >= min && d <= max, "distance {d} outside [{min}, {max}]");
                }
            }
        }
    }

    #[test]
    fn test_target_lightness_in_band() {
        let generator = ColorSetGenerator::default();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let l = generator.random_target(&mut rng).to_hsl().l;
            assert!((25.0..=75.0).contains(&l), "lightness {l}");
        }
    }

    #[test]
    fn test_higher_similarity_narrows_window() {
        let generator = ColorSetGenerator::default();
        let (_, loose) = generator.distance_window(0.7);
        let (_, tight) = generator.distance_window(0.95);
        assert!(tight < loose);
        let (min, max) = generator.distance_window(1.0);
        assert!(max >= min);
    }

    #[test]
    fn test_exhausted_budget_still_returns_full_set() {
        // One attempt per distractor and an impossible window forces the
        // best-effort path every time.
        let generator = ColorSetGenerator::new(GeneratorTuning {
            max_attempts: 1,
            min_distance: 500.0,
            ..GeneratorTuning::default()
        });
        let mut rng = StdRng::seed_from_u64(7);
        let err = generator.try_generate(5, 0.9, &mut rng).unwrap_err();
        assert_eq!(err.unmet, 4);
        assert_eq!(err.best_effort.options.len(), 5);
        assert!(err.best_effort.is_well_formed());

        let set = generator.generate(5, 0.9, &mut rng);
        assert!(set.is_well_formed());
    }

    #[test]
    fn test_walk_finds_unused_neighbour() {
        let generator = ColorSetGenerator::default();
        let target = Color::new(10, 200, 30);
        let taken = HashSet::from([target, Color::new(11, 200, 30)]);
        let found = generator.walk_to_unique(target, &taken, 0.0);
        assert!(!taken.contains(&found));
    }

    #[test]
    fn test_target_position_is_shuffled() {
        let generator = ColorSetGenerator::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut positions = HashSet::new();
        for _ in 0..60 {
            let set = generator.generate(4, 0.7, &mut rng);
            let idx = set.options.iter().position(|c| *c == set.target).unwrap();
            positions.insert(idx);
        }
        assert_eq!(positions.len(), 4);
    }
}
