//! Conversions between hex RGB, HSL and CIE Lab.

use serde::{Deserialize, Serialize};

use super::Color;
use crate::error::EngineResult;

// D65 reference white
const D65_XN: f64 = 0.95047;
const D65_YN: f64 = 1.00000;
const D65_ZN: f64 = 1.08883;

/// Hue in degrees `[0, 360)`, saturation and lightness in percent `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    /// Wraps hue and clamps saturation/lightness.
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self {
            h: h.rem_euclid(360.0),
            s: s.clamp(0.0, 100.0),
            l: l.clamp(0.0, 100.0),
        }
    }
}

/// CIE L*a*b* coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Lab {
    pub const fn new(l: f64, a: f64, b: f64) -> Self {
        Self { l, a, b }
    }
}

pub fn hex_to_hsl(hex: &str) -> EngineResult<Hsl> {
    Ok(Color::parse(hex)?.to_hsl())
}

pub fn hsl_to_hex(h: f64, s: f64, l: f64) -> String {
    hsl_to_rgb(Hsl::new(h, s, l)).to_hex()
}

pub fn hex_to_lab(hex: &str) -> EngineResult<Lab> {
    Ok(Color::parse(hex)?.to_lab())
}

pub(crate) fn rgb_to_hsl(color: Color) -> Hsl {
    let r = color.r as f64 / 255.0;
    let g = color.g as f64 / 255.0;
    let b = color.b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return Hsl::new(0.0, 0.0, l * 100.0);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    Hsl::new(h * 60.0, s * 100.0, l * 100.0)
}

pub(crate) fn hsl_to_rgb(hsl: Hsl) -> Color {
    let l = hsl.l / 100.0;
    let a = hsl.s * l.min(1.0 - l) / 100.0;
    let channel = |n: f64| -> u8 {
        let k = (n + hsl.h / 30.0) % 12.0;
        let value = l - a * (k - 3.0).min(9.0 - k).min(1.0).max(-1.0);
        (255.0 * value).round().clamp(0.0, 255.0) as u8
    };
    Color::new(channel(0.0), channel(8.0), channel(4.0))
}

pub(crate) fn rgb_to_lab(color: Color) -> Lab {
    let r = srgb_to_linear(color.r as f64 / 255.0);
    let g = srgb_to_linear(color.g as f64 / 255.0);
    let b = srgb_to_linear(color.b as f64 / 255.0);

    let x = r * 0.4124564 + g * 0.3575761 + b * 0.1804375;
    let y = r * 0.2126729 + g * 0.7151522 + b * 0.0721750;
    let z = r * 0.0193339 + g * 0.1191920 + b * 0.9503041;

    let fx = lab_f(x / D65_XN);
    let fy = lab_f(y / D65_YN);
    let fz = lab_f(z / D65_ZN);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_f(t: f64) -> f64 {
    const DELTA: f64 = 6.0 / 29.0;
    const DELTA_CUBE: f64 = DELTA * DELTA * DELTA;

    if t > DELTA_CUBE {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() <= tol, "{a} vs {b}");
    }

    #[test]
    fn test_primary_hsl_values() {
        let red = hex_to_hsl("#ff0000").unwrap();
        assert_close(red.h, 0.0, 1e-9);
        assert_close(red.s, 100.0, 1e-9);
        assert_close(red.l, 50.0, 1e-9);

        let blue = hex_to_hsl("#0000FF").unwrap();
        assert_close(blue.h, 240.0, 1e-9);

        let gray = hex_to_hsl("#808080").unwrap();
        assert_close(gray.s, 0.0, 1e-9);
        assert_close(gray.l, 50.2, 0.01);
    }

    #[test]
    fn test_hsl_to_hex_wraps_and_clamps() {
        assert_eq!(hsl_to_hex(360.0, 100.0, 50.0), "#ff0000");
        assert_eq!(hsl_to_hex(-120.0, 100.0, 50.0), "#0000ff");
        assert_eq!(hsl_to_hex(120.0, 150.0, 50.0), "#00ff00");
        assert_eq!(hsl_to_hex(0.0, 0.0, 120.0), "#ffffff");
        assert_eq!(hsl_to_hex(0.0, 0.0, -5.0), "#000000");
    }

    #[test]
    fn test_hex_hsl_round_trip_within_one_unit() {
        // Sweep a lattice across the cube, including the edges.
        let steps = [0u8, 1, 17, 63, 64, 127, 128, 191, 200, 254, 255];
        for &r in &steps {
            for &g in &steps {
                for &b in &steps {
                    let original = Color::new(r, g, b);
                    let hsl = hex_to_hsl(&original.to_hex()).unwrap();
                    let back = Color::parse(&hsl_to_hex(hsl.h, hsl.s, hsl.l)).unwrap();
                    assert!(
                        (original.r as i16 - back.r as i16).abs() <= 1
                            && (original.g as i16 - back.g as i16).abs() <= 1
                            && (original.b as i16 - back.b as i16).abs() <= 1,
                        "{original} -> {back}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_lab_reference_points() {
        let white = hex_to_lab("#ffffff").unwrap();
        assert_close(white.l, 100.0, 0.01);
        assert_close(white.a, 0.0, 0.01);
        assert_close(white.b, 0.0, 0.01);

        let black = hex_to_lab("#000000").unwrap();
        assert_close(black.l, 0.0, 1e-9);

        let red = hex_to_lab("#ff0000").unwrap();
        assert_close(red.l, 53.24, 0.05);
        assert_close(red.a, 80.09, 0.1);
        assert_close(red.b, 67.20, 0.1);
    }

    #[test]
    fn test_malformed_hex_is_an_error() {
        assert!(hex_to_hsl("#zzzzzz").is_err());
        assert!(hex_to_lab("#abc").is_err());
    }
}
