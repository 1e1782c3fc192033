//! TUI screen drawing functions.

pub(crate) mod game_over;
pub(crate) mod home;
pub(crate) mod leaderboard;
pub(crate) mod modal;
pub(crate) mod play;
