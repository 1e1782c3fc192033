//! TUI animation helpers (end-of-game art, countdown pulse).

/// Shown when every level has been cleared.
pub(crate) const SUCCESS_CHECKMARK: &[&str] = &["    ██╗", "   ██╔╝", "  ██╔╝ ", "  ╚═╝  "];

/// Shown on any other ending.
pub(crate) const GAME_OVER_CROSS: &[&str] = &["██╗  ██╗", "╚██╗██╔╝", "██╔╝██╗ ", "╚═╝ ╚═╝ "];

/// Blink the countdown during its last seconds. `tick` advances once per frame.
pub(crate) fn urgent_blink(tick: u64, time_left: u32) -> bool {
    time_left <= 3 && (tick / 15) % 2 == 0
}
