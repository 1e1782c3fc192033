//! Engine error taxonomy.
//!
//! Gameplay failures (timeouts, wrong picks, too many close matches) are not
//! errors; they end the session as ordinary data. The variants here indicate
//! malformed input or host misuse.

use thiserror::Error;

use crate::engine::Phase;

/// Engine errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid color format: {0:?} (expected #rrggbb)")]
    InvalidColorFormat(String),

    #[error("Invalid transition: cannot {action} while {phase}")]
    InvalidTransition { action: &'static str, phase: Phase },
}

pub type EngineResult<T> = Result<T, EngineError>;
