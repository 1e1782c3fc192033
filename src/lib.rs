//! Chroma Recall - timed color memory game engine
//!
//! A target color is shown briefly, hidden, and the player picks it back out
//! of a set of perceptually similar distractors. Difficulty climbs with the
//! level; picks are judged by CIEDE2000 distance.
//!
//! The engine itself is pure and synchronous. Persistence, caching and
//! presentation live in the host-side modules.

pub mod color;
pub mod config;
pub mod difficulty;
pub mod engine;
pub mod error;
pub mod generator;
pub mod leaderboard;
pub mod notify;
pub mod storage;

pub use color::{distance, Color};
pub use difficulty::{DifficultyCurve, RoundParameters};
pub use engine::shared::{RoundTimer, SharedEngine};
pub use engine::worker::GenerationWorker;
pub use engine::{
    EndReason, GameEngine, GameState, GameStateSnapshot, Phase, Rules, SelectionOutcome,
};
pub use error::{EngineError, EngineResult};
pub use generator::{ColorSet, ColorSetGenerator};
