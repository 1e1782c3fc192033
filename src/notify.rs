//! Messages for the host's notification sink.

use serde::{Deserialize, Serialize};

use crate::engine::{GameStateSnapshot, SelectionOutcome};
use crate::storage::SaveOutcome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Points summary for a pick that kept the game going. Terminal picks
    /// are reported by [`Notification::game_over`] instead.
    pub fn from_outcome(outcome: &SelectionOutcome) -> Option<Self> {
        if outcome.game_over && outcome.points_awarded == 0 {
            return None;
        }

        let mut description = format!(
            "You earned {} points! (Accuracy: {}, Speed: {}",
            outcome.points_awarded, outcome.accuracy_points, outcome.speed_points
        );
        if outcome.combo_multiplier_after > 1.0 {
            description.push_str(&format!(", Combo: {:.1}x", outcome.combo_multiplier_after));
        }
        description.push(')');

        Some(Self::new(outcome.feedback.clone(), description))
    }

    pub fn game_over(snapshot: &GameStateSnapshot) -> Self {
        let reason = snapshot
            .end_reason
            .map(|reason| reason.describe())
            .unwrap_or("Game over");
        Self::new(
            "Game Over",
            format!(
                "{reason}. Final score {} at level {}.",
                snapshot.score, snapshot.level
            ),
        )
    }

    pub fn new_high_score(score: u64, saved: Option<SaveOutcome>) -> Self {
        let mut description =
            format!("Congratulations! You've set a new high score of {score} points!");
        if let Some(saved) = saved {
            description.push_str(&format!(" Leaderboard rank #{}.", saved.rank));
        }
        Self::new("New High Score!", description)
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::{engine, FAR, TARGET};
    use crate::engine::{EndReason, Phase};

    fn reveal(engine: &mut crate::engine::GameEngine) {
        while engine.snapshot().phase == Phase::ShowingTarget {
            engine.tick().unwrap();
        }
    }

    #[test]
    fn test_exact_pick_summary() {
        let mut engine = engine();
        engine.start_game().unwrap();
        reveal(&mut engine);
        let outcome = engine.select(TARGET).unwrap();

        let note = Notification::from_outcome(&outcome).unwrap();
        assert_eq!(note.title, "Perfect match!");
        assert_eq!(
            note.description,
            "You earned 225 points! (Accuracy: 100, Speed: 50, Combo: 1.5x)"
        );
    }

    #[test]
    fn test_terminal_pick_has_no_summary() {
        let mut engine = engine();
        engine.start_game().unwrap();
        reveal(&mut engine);
        let outcome = engine.select(FAR).unwrap();
        assert!(Notification::from_outcome(&outcome).is_none());

        let note = Notification::game_over(&outcome.snapshot);
        assert_eq!(outcome.snapshot.end_reason, Some(EndReason::Mismatch));
        assert_eq!(note.title, "Game Over");
        assert_eq!(note.description, "Wrong color. Final score 0 at level 1.");
    }

    #[test]
    fn test_high_score_mentions_rank() {
        let note = Notification::new_high_score(
            1200,
            Some(SaveOutcome {
                rank: 3,
                is_top_ten: true,
            }),
        );
        assert!(note.description.contains("1200 points"));
        assert!(note.description.ends_with("rank #3."));
        assert_eq!(
            Notification::new_high_score(5, None).to_string(),
            "New High Score!: Congratulations! You've set a new high score of 5 points!"
        );
    }
}
