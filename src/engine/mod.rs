//! Round state machine.
//!
//! `Idle → ShowingTarget → AwaitingSelection → (ShowingTarget | Ended)`
//!
//! The engine is advanced only by [`GameEngine::start_game`],
//! [`GameEngine::tick`] and [`GameEngine::select_color`]. Each transition
//! builds the next [`GameState`] and swaps it in whole; callers only ever see
//! cloned snapshots.

pub mod scoring;
pub mod shared;
pub mod worker;

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::color::{distance, Color};
use crate::difficulty::{clamp_rating, DifficultyCurve, RoundParameters};
use crate::error::{EngineError, EngineResult};
use crate::generator::{ColorSet, ColorSetGenerator};

pub use scoring::Verdict;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    ShowingTarget,
    AwaitingSelection,
    Ended,
}

impl Phase {
    /// A round is in progress and the clock matters.
    pub fn is_active(self) -> bool {
        matches!(self, Phase::ShowingTarget | Phase::AwaitingSelection)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Idle => "idle",
            Phase::ShowingTarget => "showing the target",
            Phase::AwaitingSelection => "awaiting a selection",
            Phase::Ended => "ended",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Timeout,
    CloseMatchBudgetExceeded,
    Mismatch,
    Completed,
}

impl EndReason {
    pub fn describe(self) -> &'static str {
        match self {
            EndReason::Timeout => "Time ran out",
            EndReason::CloseMatchBudgetExceeded => "Too many close matches this cycle",
            EndReason::Mismatch => "Wrong color",
            EndReason::Completed => "Every level cleared",
        }
    }
}

/// Session state. Only the engine writes it; everyone else gets clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: Phase,
    pub level: u32,
    pub score: u64,
    pub time_left: u32,
    pub target_color: Option<Color>,
    pub options: Vec<Color>,
    pub combo_multiplier: f64,
    pub close_matches: u32,
    pub high_score: u64,
    pub performance_rating: f64,
    pub params: Option<RoundParameters>,
    pub boss_level: bool,
    /// Increments on every start/reset; ticks carrying an older value are ignored.
    pub session: u64,
    /// Increments whenever a new round is loaded within the session.
    pub round: u64,
    pub end_reason: Option<EndReason>,
}

pub type GameStateSnapshot = GameState;

impl GameState {
    fn idle(high_score: u64, session: u64) -> Self {
        Self {
            phase: Phase::Idle,
            level: 1,
            score: 0,
            time_left: 0,
            target_color: None,
            options: Vec::new(),
            combo_multiplier: 1.0,
            close_matches: 0,
            high_score,
            performance_rating: 1.0,
            params: None,
            boss_level: false,
            session,
            round: 0,
            end_reason: None,
        }
    }

    /// The target, but only while the player is allowed to see it.
    pub fn visible_target(&self) -> Option<Color> {
        match self.phase {
            Phase::ShowingTarget | Phase::Ended => self.target_color,
            Phase::Idle | Phase::AwaitingSelection => None,
        }
    }

    /// Length of the current phase's countdown.
    pub fn phase_duration(&self) -> u32 {
        match (self.phase, self.params) {
            (Phase::ShowingTarget, Some(p)) => p.view_time_secs,
            (Phase::AwaitingSelection, Some(p)) => p.selection_time_secs,
            _ => 0,
        }
    }
}

/// Result of one pick. Consumed by the host; never stored by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionOutcome {
    pub is_exact_match: bool,
    pub is_close_match: bool,
    pub game_over: bool,
    pub points_awarded: u64,
    pub combo_multiplier_after: f64,
    pub verdict: Verdict,
    pub distance: f64,
    pub accuracy_points: u32,
    pub speed_points: u32,
    pub feedback: String,
    pub snapshot: GameStateSnapshot,
}

/// Gameplay rules and scoring constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    /// Picks closer than this count as the target itself.
    #[serde(default = "default_exact_epsilon")]
    pub exact_epsilon: f64,

    /// `tolerance = base + scale * (1 - similarity)`
    #[serde(default = "default_close_tolerance_base")]
    pub close_tolerance_base: f64,

    #[serde(default = "default_close_tolerance_scale")]
    pub close_tolerance_scale: f64,

    /// Close matches tolerated per challenge cycle.
    #[serde(default = "default_close_match_budget")]
    pub close_match_budget: u32,

    #[serde(default)]
    pub boss_close_match_budget: u32,

    #[serde(default = "default_combo_step")]
    pub combo_step: f64,

    #[serde(default = "default_combo_cap")]
    pub combo_cap: f64,

    #[serde(default = "default_accuracy_scale")]
    pub accuracy_scale: f64,

    #[serde(default = "default_max_speed_points")]
    pub max_speed_points: f64,

    #[serde(default = "default_rating_exact_step")]
    pub rating_exact_step: f64,

    #[serde(default = "default_rating_close_step")]
    pub rating_close_step: f64,

    /// Finishing this level ends the session as a win. Zero disables the cap.
    #[serde(default = "default_max_level")]
    pub max_level: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            exact_epsilon: default_exact_epsilon(),
            close_tolerance_base: default_close_tolerance_base(),
            close_tolerance_scale: default_close_tolerance_scale(),
            close_match_budget: default_close_match_budget(),
            boss_close_match_budget: 0,
            combo_step: default_combo_step(),
            combo_cap: default_combo_cap(),
            accuracy_scale: default_accuracy_scale(),
            max_speed_points: default_max_speed_points(),
            rating_exact_step: default_rating_exact_step(),
            rating_close_step: default_rating_close_step(),
            max_level: default_max_level(),
        }
    }
}

impl Rules {
    pub fn close_tolerance(&self, similarity: f64) -> f64 {
        let tolerance =
            self.close_tolerance_base + self.close_tolerance_scale * (1.0 - similarity.clamp(0.0, 1.0));
        tolerance.max(self.exact_epsilon)
    }
}

fn default_exact_epsilon() -> f64 {
    1.0
}

fn default_close_tolerance_base() -> f64 {
    2.5
}

fn default_close_tolerance_scale() -> f64 {
    15.0
}

fn default_close_match_budget() -> u32 {
    3
}

fn default_combo_step() -> f64 {
    0.5
}

fn default_combo_cap() -> f64 {
    5.0
}

fn default_accuracy_scale() -> f64 {
    10.0
}

fn default_max_speed_points() -> f64 {
    50.0
}

fn default_rating_exact_step() -> f64 {
    0.02
}

fn default_rating_close_step() -> f64 {
    0.03
}

fn default_max_level() -> u32 {
    100
}

/// Supplies the colors for each round.
pub trait ColorSource: Send {
    fn next_set(&mut self, params: &RoundParameters) -> ColorSet;
}

/// Random colors from a [`ColorSetGenerator`].
pub struct RandomSource<R> {
    generator: ColorSetGenerator,
    rng: R,
}

impl<R: Rng + Send> RandomSource<R> {
    pub fn new(generator: ColorSetGenerator, rng: R) -> Self {
        Self { generator, rng }
    }
}

impl RandomSource<StdRng> {
    pub fn from_entropy(generator: ColorSetGenerator) -> Self {
        Self::new(generator, StdRng::from_entropy())
    }
}

impl<R: Rng + Send> ColorSource for RandomSource<R> {
    fn next_set(&mut self, params: &RoundParameters) -> ColorSet {
        self.generator
            .generate(params.option_count, params.similarity, &mut self.rng)
    }
}

pub struct GameEngine {
    rules: Rules,
    curve: DifficultyCurve,
    source: Box<dyn ColorSource>,
    state: GameState,
}

impl GameEngine {
    pub fn new(rules: Rules, curve: DifficultyCurve, source: Box<dyn ColorSource>) -> Self {
        Self {
            rules,
            curve,
            source,
            state: GameState::idle(0, 0),
        }
    }

    /// Seed the high score carried across sessions (e.g. a stored personal best).
    pub fn with_high_score(mut self, high_score: u64) -> Self {
        self.state.high_score = high_score;
        self
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn curve(&self) -> &DifficultyCurve {
        &self.curve
    }

    pub fn snapshot(&self) -> GameStateSnapshot {
        self.state.clone()
    }

    /// Begin a new session. Valid from `Idle` or `Ended`.
    pub fn start_game(&mut self) -> EngineResult<GameStateSnapshot> {
        self.ensure_phase("start a game", &[Phase::Idle, Phase::Ended])?;

        let mut next = GameState::idle(self.state.high_score, self.state.session + 1);
        self.load_round(&mut next, 1);

        info!(session = next.session, "game started");
        self.state = next;
        Ok(self.snapshot())
    }

    /// Abandon whatever is in progress and return to `Idle`.
    pub fn reset(&mut self) -> GameStateSnapshot {
        debug!(session = self.state.session, phase = %self.state.phase, "engine reset");
        self.state = GameState::idle(self.state.high_score, self.state.session + 1);
        self.snapshot()
    }

    /// Advance the clock by one second.
    pub fn tick(&mut self) -> EngineResult<GameStateSnapshot> {
        self.ensure_phase("tick", &[Phase::ShowingTarget, Phase::AwaitingSelection])?;

        let mut next = self.state.clone();
        next.time_left = next.time_left.saturating_sub(1);

        if next.time_left == 0 {
            match next.phase {
                Phase::ShowingTarget => {
                    next.phase = Phase::AwaitingSelection;
                    next.time_left = next.phase_duration();
                    debug!(level = next.level, time_left = next.time_left, "target hidden");
                }
                Phase::AwaitingSelection => Self::finish(&mut next, EndReason::Timeout),
                Phase::Idle | Phase::Ended => {}
            }
        }

        self.state = next;
        Ok(self.snapshot())
    }

    /// Tick on behalf of the timer that was started for `session` and `round`.
    /// A tick aimed at a superseded session or round leaves the state untouched.
    pub fn tick_for(&mut self, session: u64, round: u64) -> EngineResult<GameStateSnapshot> {
        if session != self.state.session || round != self.state.round {
            debug!(
                stale_session = session,
                stale_round = round,
                session = self.state.session,
                round = self.state.round,
                "ignoring stale tick"
            );
            return Ok(self.snapshot());
        }
        self.tick()
    }

    pub fn select_color(&mut self, hex: &str) -> EngineResult<SelectionOutcome> {
        self.ensure_phase("select a color", &[Phase::AwaitingSelection])?;
        let color = Color::parse(hex)?;
        self.select(color)
    }

    pub fn select(&mut self, color: Color) -> EngineResult<SelectionOutcome> {
        self.ensure_phase("select a color", &[Phase::AwaitingSelection])?;

        let mut next = self.state.clone();
        let (target, params) = match (next.target_color, next.params) {
            (Some(target), Some(params)) => (target, params),
            _ => {
                return Err(EngineError::InvalidTransition {
                    action: "select a color",
                    phase: next.phase,
                })
            }
        };

        let d = distance(target, color);
        let verdict = Verdict::classify(
            d,
            self.rules.exact_epsilon,
            self.rules.close_tolerance(params.similarity),
        );

        let mut accuracy_points = 0;
        let mut speed_points = 0;
        let mut points_awarded = 0;

        let feedback = match verdict {
            Verdict::Mismatch => {
                Self::finish(&mut next, EndReason::Mismatch);
                "Wrong color.".to_string()
            }
            Verdict::Close if next.close_matches + 1 > self.close_budget(next.boss_level) => {
                next.close_matches += 1;
                next.combo_multiplier = 1.0;
                Self::finish(&mut next, EndReason::CloseMatchBudgetExceeded);
                if next.boss_level {
                    "Close, but challenge levels need an exact match.".to_string()
                } else {
                    "Too many close matches this cycle.".to_string()
                }
            }
            Verdict::Exact | Verdict::Close => {
                let message = if verdict == Verdict::Exact {
                    next.combo_multiplier =
                        (next.combo_multiplier + self.rules.combo_step).min(self.rules.combo_cap);
                    next.performance_rating =
                        clamp_rating(next.performance_rating + self.rules.rating_exact_step);
                    if next.boss_level {
                        "Chromatic challenge cleared!".to_string()
                    } else {
                        "Perfect match!".to_string()
                    }
                } else {
                    next.close_matches += 1;
                    next.combo_multiplier = 1.0;
                    next.performance_rating =
                        clamp_rating(next.performance_rating - self.rules.rating_close_step);
                    let left = self.close_budget(next.boss_level) - next.close_matches;
                    format!("Close match! {left} left this cycle.")
                };

                let points = scoring::score_selection(
                    d,
                    next.time_left,
                    params.selection_time_secs,
                    next.combo_multiplier,
                    self.rules.accuracy_scale,
                    self.rules.max_speed_points,
                );
                accuracy_points = points.accuracy;
                speed_points = points.speed;
                points_awarded = points.total;
                next.score += points.total;

                self.advance(&mut next);
                if next.end_reason == Some(EndReason::Completed) {
                    "Every level cleared!".to_string()
                } else {
                    message
                }
            }
        };

        debug!(
            verdict = ?verdict,
            distance = d,
            points = points_awarded,
            level = next.level,
            "selection resolved"
        );

        let outcome = SelectionOutcome {
            is_exact_match: verdict == Verdict::Exact,
            is_close_match: verdict == Verdict::Close,
            game_over: next.phase == Phase::Ended,
            points_awarded,
            combo_multiplier_after: next.combo_multiplier,
            verdict,
            distance: d,
            accuracy_points,
            speed_points,
            feedback,
            snapshot: next.clone(),
        };
        self.state = next;
        Ok(outcome)
    }

    fn close_budget(&self, boss_level: bool) -> u32 {
        if boss_level {
            self.rules.boss_close_match_budget
        } else {
            self.rules.close_match_budget
        }
    }

    fn advance(&mut self, next: &mut GameState) {
        let finished = next.level;
        if self.rules.max_level > 0 && finished >= self.rules.max_level {
            Self::finish(next, EndReason::Completed);
            return;
        }

        let level = finished + 1;
        if self.curve.cycle_index(level) != self.curve.cycle_index(finished) {
            next.close_matches = 0;
        }
        self.load_round(next, level);
    }

    fn load_round(&mut self, next: &mut GameState, level: u32) {
        let params = self.curve.params_for_rated(level, next.performance_rating);
        let set = self.source.next_set(&params);

        next.phase = Phase::ShowingTarget;
        next.round += 1;
        next.level = level;
        next.params = Some(params);
        next.time_left = params.view_time_secs;
        next.target_color = Some(set.target);
        next.options = set.options;
        next.boss_level = self.curve.is_boss_level(level);
        debug!(
            level,
            options = params.option_count,
            similarity = params.similarity,
            boss = next.boss_level,
            "round loaded"
        );
    }

    fn finish(next: &mut GameState, reason: EndReason) {
        next.phase = Phase::Ended;
        next.time_left = 0;
        next.end_reason = Some(reason);
        next.high_score = next.high_score.max(next.score);
        info!(
            reason = ?reason,
            score = next.score,
            level = next.level,
            "game ended"
        );
    }

    fn ensure_phase(&self, action: &'static str, allowed: &[Phase]) -> EngineResult<()> {
        if allowed.contains(&self.state.phase) {
            Ok(())
        } else {
            Err(EngineError::InvalidTransition {
                action,
                phase: self.state.phase,
            })
        }
    }
}
