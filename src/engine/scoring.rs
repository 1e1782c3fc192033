//! Selection classification and point math.

use serde::{Deserialize, Serialize};

/// How a pick compares to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Exact,
    Close,
    Mismatch,
}

impl Verdict {
    pub fn classify(distance: f64, exact_epsilon: f64, close_tolerance: f64) -> Self {
        if distance < exact_epsilon {
            Verdict::Exact
        } else if distance < close_tolerance {
            Verdict::Close
        } else {
            Verdict::Mismatch
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Points {
    pub accuracy: u32,
    pub speed: u32,
    pub total: u64,
}

/// `accuracy = max(0, 100 - round(distance * accuracy_scale))`
pub fn accuracy_points(distance: f64, accuracy_scale: f64) -> u32 {
    (100.0 - (distance * accuracy_scale).round()).max(0.0) as u32
}

/// `speed = round(time_left / selection_time * max_speed_points)`
pub fn speed_points(time_left: u32, selection_time: u32, max_speed_points: f64) -> u32 {
    if selection_time == 0 {
        return 0;
    }
    let ratio = (time_left as f64 / selection_time as f64).clamp(0.0, 1.0);
    (ratio * max_speed_points).round().max(0.0) as u32
}

pub fn score_selection(
    distance: f64,
    time_left: u32,
    selection_time: u32,
    combo_multiplier: f64,
    accuracy_scale: f64,
    max_speed_points: f64,
) -> Points {
    let accuracy = accuracy_points(distance, accuracy_scale);
    let speed = speed_points(time_left, selection_time, max_speed_points);
    let total = ((accuracy + speed) as f64 * combo_multiplier).round().max(0.0) as u64;
    Points {
        accuracy,
        speed,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_pick_with_full_time() {
        let points = score_selection(0.0, 15, 15, 1.5, 10.0, 50.0);
        assert_eq!(points.accuracy, 100);
        assert_eq!(points.speed, 50);
        assert_eq!(points.total, 225);
    }

    #[test]
    fn test_accuracy_floors_at_zero() {
        assert_eq!(accuracy_points(2.44, 10.0), 76);
        assert_eq!(accuracy_points(55.0, 10.0), 0);
    }

    #[test]
    fn test_speed_points_rounding() {
        assert_eq!(speed_points(7, 15, 50.0), 23);
        assert_eq!(speed_points(0, 15, 50.0), 0);
        assert_eq!(speed_points(3, 0, 50.0), 0);
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(Verdict::classify(0.0, 1.0, 7.0), Verdict::Exact);
        assert_eq!(Verdict::classify(1.0, 1.0, 7.0), Verdict::Close);
        assert_eq!(Verdict::classify(6.99, 1.0, 7.0), Verdict::Close);
        assert_eq!(Verdict::classify(7.0, 1.0, 7.0), Verdict::Mismatch);
    }
}
