//! TUI color theme.

use ratatui::style::Color;

use chroma_recall::engine::{EndReason, Verdict};

#[derive(Clone, Copy)]
pub(crate) struct Theme {
    // Primary palette
    pub oracle: Color,
    pub optimal: Color,
    pub caution: Color,
    pub critical: Color,
    pub boss: Color,

    // UI chrome
    pub border: Color,
    pub muted: Color,
    pub text: Color,
    pub text_dim: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            oracle: Color::Rgb(0, 212, 255),
            optimal: Color::Rgb(163, 230, 53),
            caution: Color::Rgb(251, 191, 36),
            critical: Color::Rgb(255, 68, 85),
            boss: Color::Rgb(192, 132, 252),
            border: Color::Gray,
            muted: Color::DarkGray,
            text: Color::White,
            text_dim: Color::Gray,
        }
    }
}

impl Theme {
    /// Terminal color for a game color.
    pub fn swatch(color: chroma_recall::Color) -> Color {
        Color::Rgb(color.r, color.g, color.b)
    }

    /// Readable text on top of a swatch.
    pub fn swatch_text(color: chroma_recall::Color) -> Color {
        Self::swatch(color.contrast_text())
    }

    pub fn time_color(&self, time_left: u32, total: u32) -> Color {
        if total == 0 {
            return self.muted;
        }
        let ratio = time_left as f64 / total as f64;
        if ratio > 0.5 {
            self.optimal
        } else if ratio > 0.25 {
            self.caution
        } else {
            self.critical
        }
    }

    pub fn verdict_color(&self, verdict: Verdict, boss_level: bool) -> Color {
        match verdict {
            Verdict::Exact => self.optimal,
            Verdict::Close if boss_level => self.boss,
            Verdict::Close => self.caution,
            Verdict::Mismatch => self.critical,
        }
    }

    pub fn end_color(&self, reason: Option<EndReason>) -> Color {
        match reason {
            Some(EndReason::Completed) => self.optimal,
            Some(EndReason::Timeout) => self.caution,
            _ => self.critical,
        }
    }
}
