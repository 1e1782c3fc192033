//! CIEDE2000 color difference (ΔE00).
//!
//! Rough reading of the scale:
//! - below 1.0: not perceptible
//! - 1.0 to 2.0: perceptible on close inspection
//! - 2.0 to 10.0: perceptible at a glance
//! - above 50: close to opposite colors
//!
//! Gameplay thresholds (exact-match epsilon, close-match tolerance, distractor
//! window) are calibrated against this scale.

#![allow(clippy::many_single_char_names)]

use std::f64::consts::PI;

use super::space::Lab;
use super::Color;

// 25^7
const POW25_7: f64 = 6_103_515_625.0;

/// Perceptual distance between two colors.
///
/// The pair is put into a canonical order first so the result is bit-for-bit
/// symmetric.
pub fn distance(a: Color, b: Color) -> f64 {
    if a == b {
        return 0.0;
    }
    let (first, second) = if (a.r, a.g, a.b) <= (b.r, b.g, b.b) {
        (a, b)
    } else {
        (b, a)
    };
    ciede2000(first.to_lab(), second.to_lab())
}

/// Full CIEDE2000 with kL = kC = kH = 1.
pub fn ciede2000(lab1: Lab, lab2: Lab) -> f64 {
    let (l1, a1, b1) = (lab1.l, lab1.a, lab1.b);
    let (l2, a2, b2) = (lab2.l, lab2.a, lab2.b);

    let c1_ab = a1.hypot(b1);
    let c2_ab = a2.hypot(b2);
    let c_ab_mean_pow7 = ((c1_ab + c2_ab) / 2.0).powi(7);
    let g = 0.5 * (1.0 - (c_ab_mean_pow7 / (c_ab_mean_pow7 + POW25_7)).sqrt());

    let a1_prime = a1 * (1.0 + g);
    let a2_prime = a2 * (1.0 + g);
    let c1_prime = a1_prime.hypot(b1);
    let c2_prime = a2_prime.hypot(b2);
    let h1_prime = hue_angle(a1_prime, b1);
    let h2_prime = hue_angle(a2_prime, b2);

    let chroma_product = c1_prime * c2_prime;

    let delta_l_prime = l2 - l1;
    let delta_c_prime = c2_prime - c1_prime;
    let delta_h_prime = if chroma_product == 0.0 {
        0.0
    } else {
        let dh = h2_prime - h1_prime;
        if dh > 180.0 {
            dh - 360.0
        } else if dh < -180.0 {
            dh + 360.0
        } else {
            dh
        }
    };
    let delta_big_h_prime = 2.0 * chroma_product.sqrt() * (delta_h_prime.to_radians() / 2.0).sin();

    let l_prime_mean = (l1 + l2) / 2.0;
    let c_prime_mean = (c1_prime + c2_prime) / 2.0;
    let h_prime_mean = if chroma_product == 0.0 {
        h1_prime + h2_prime
    } else if (h1_prime - h2_prime).abs() <= 180.0 {
        (h1_prime + h2_prime) / 2.0
    } else if h1_prime + h2_prime < 360.0 {
        (h1_prime + h2_prime + 360.0) / 2.0
    } else {
        (h1_prime + h2_prime - 360.0) / 2.0
    };

    let t = 1.0 - 0.17 * (h_prime_mean - 30.0).to_radians().cos()
        + 0.24 * (2.0 * h_prime_mean).to_radians().cos()
        + 0.32 * (3.0 * h_prime_mean + 6.0).to_radians().cos()
        - 0.20 * (4.0 * h_prime_mean - 63.0).to_radians().cos();

    let l_offset_sq = (l_prime_mean - 50.0).powi(2);
    let sl = 1.0 + (0.015 * l_offset_sq) / (20.0 + l_offset_sq).sqrt();
    let sc = 1.0 + 0.045 * c_prime_mean;
    let sh = 1.0 + 0.015 * c_prime_mean * t;

    let delta_theta = 30.0 * (-((h_prime_mean - 275.0) / 25.0).powi(2)).exp();
    let c_prime_mean_pow7 = c_prime_mean.powi(7);
    let rc = 2.0 * (c_prime_mean_pow7 / (c_prime_mean_pow7 + POW25_7)).sqrt();
    let rt = -(2.0 * delta_theta * PI / 180.0).sin() * rc;

    let term_l = delta_l_prime / sl;
    let term_c = delta_c_prime / sc;
    let term_h = delta_big_h_prime / sh;

    (term_l * term_l + term_c * term_c + term_h * term_h + rt * term_c * term_h)
        .max(0.0)
        .sqrt()
}

fn hue_angle(a: f64, b: f64) -> f64 {
    if a == 0.0 && b == 0.0 {
        return 0.0;
    }
    let h = b.atan2(a).to_degrees();
    if h < 0.0 {
        h + 360.0
    } else {
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_pairs() {
        // (L1, a1, b1, L2, a2, b2, ΔE00) from Sharma, Wu & Dalal (2005).
        let cases = [
            (50.0, 2.6772, -79.7751, 50.0, 0.0, -82.7485, 2.0425),
            (50.0, 0.0, 0.0, 50.0, -1.0, 2.0, 2.3669),
            (50.0, 2.49, -0.001, 50.0, -2.49, 0.0009, 7.1792),
            (50.0, -0.001, 2.49, 50.0, 0.0009, -2.49, 4.8045),
            (50.0, 2.5, 0.0, 50.0, 0.0, -2.5, 4.3065),
            (50.0, 2.5, 0.0, 73.0, 25.0, -18.0, 27.1492),
            (50.0, 2.5, 0.0, 56.0, -27.0, -3.0, 31.9030),
            (60.2574, -34.0099, 36.2677, 60.4626, -34.1751, 39.4387, 1.2644),
            (22.7233, 20.0904, -46.6940, 23.0331, 14.9730, -42.5619, 2.0373),
            (90.9257, -0.5406, -0.9208, 88.6381, -0.8985, -0.7239, 1.5381),
        ];

        for (l1, a1, b1, l2, a2, b2, expected) in cases {
            let de = ciede2000(Lab::new(l1, a1, b1), Lab::new(l2, a2, b2));
            assert!(
                (de - expected).abs() < 1e-4,
                "({l1}, {a1}, {b1}) vs ({l2}, {a2}, {b2}): {de} != {expected}"
            );
        }
    }

    #[test]
    fn test_identical_colors_have_zero_distance() {
        for hex in ["#000000", "#ffffff", "#3a7bd5", "#ff0000"] {
            let c = Color::parse(hex).unwrap();
            assert_eq!(distance(c, c), 0.0);
        }
    }

    #[test]
    fn test_distance_is_symmetric_and_positive() {
        let colors = ["#ff0000", "#00ff00", "#0000ff", "#3a7bd5", "#3a7bd6", "#808080"]
            .map(|h| Color::parse(h).unwrap());
        for &a in &colors {
            for &b in &colors {
                assert_eq!(distance(a, b), distance(b, a));
                if a != b {
                    assert!(distance(a, b) > 0.0);
                }
            }
        }
    }

    #[test]
    fn test_scale_orders_sensibly() {
        let base = Color::parse("#3a7bd5").unwrap();
        let near = Color::parse("#3b7bd5").unwrap();
        let far = Color::parse("#d5703a").unwrap();
        assert!(distance(base, near) < 1.0);
        assert!(distance(base, far) > 30.0);
    }
}
