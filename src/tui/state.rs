//! TUI application state types.

use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, warn};

use chroma_recall::config::Config;
use chroma_recall::engine::shared::{RoundTimer, SharedEngine};
use chroma_recall::engine::{GameStateSnapshot, Phase, SelectionOutcome};
use chroma_recall::leaderboard::LeaderboardCache;
use chroma_recall::notify::Notification;
use chroma_recall::storage::{LocalStorage, SaveOutcome, ScoreRecord};
use chroma_recall::Color;

const TOAST_TIME: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Home,
    Play,
    GameOver,
    Leaderboard,
    ErrorModal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HomeChoice {
    Play,
    Leaderboard,
    Quit,
}

impl HomeChoice {
    pub const ALL: [HomeChoice; 3] = [HomeChoice::Play, HomeChoice::Leaderboard, HomeChoice::Quit];

    pub fn next(self) -> Self {
        match self {
            HomeChoice::Play => HomeChoice::Leaderboard,
            HomeChoice::Leaderboard => HomeChoice::Quit,
            HomeChoice::Quit => HomeChoice::Play,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            HomeChoice::Play => HomeChoice::Quit,
            HomeChoice::Leaderboard => HomeChoice::Play,
            HomeChoice::Quit => HomeChoice::Leaderboard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ModalKind {
    Error,
    Info,
}

#[derive(Debug, Clone)]
pub(crate) struct ErrorModalState {
    pub title: String,
    pub message: String,
    pub kind: ModalKind,
}

#[derive(Debug, Clone)]
pub(crate) struct Toast {
    pub notification: Notification,
    pub shown_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TuiExit {
    Quit,
}

pub(crate) struct AnimationState {
    pub tick: u64,
}

impl AnimationState {
    pub fn new() -> Self {
        Self { tick: 0 }
    }

    pub fn advance(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn spinner_char(&self) -> char {
        const FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
        FRAMES[(self.tick as usize / 6) % FRAMES.len()]
    }
}

pub(crate) struct App {
    pub screen: Screen,
    pub home_choice: HomeChoice,
    pub username: String,
    pub engine: SharedEngine,
    pub timer: RoundTimer,
    pub snapshot: GameStateSnapshot,
    pub cursor: usize,
    pub last_outcome: Option<SelectionOutcome>,
    pub last_pick: Option<Color>,
    pub leaderboard: Option<LeaderboardCache<LocalStorage>>,
    pub leaderboard_rows: Vec<ScoreRecord>,
    pub leaderboard_capacity: usize,
    pub close_budget: u32,
    pub boss_close_budget: u32,
    pub personal_best: u64,
    pub last_save: Option<SaveOutcome>,
    pub new_personal_best: bool,
    pub recorded_session: Option<u64>,
    pub toast: Option<Toast>,
    pub error_modal: Option<ErrorModalState>,
    pub error_return_screen: Screen,
    pub exit: Option<TuiExit>,
    pub last_tick: Instant,
    pub animation: AnimationState,
}

impl App {
    pub fn new(rt: &tokio::runtime::Runtime, cfg: &Config, username: String) -> Self {
        let (leaderboard, storage_error) = match LocalStorage::new() {
            Ok(storage) => (
                Some(LeaderboardCache::new(
                    storage,
                    cfg.leaderboard.cache_ttl(),
                    cfg.leaderboard.capacity,
                )),
                None,
            ),
            Err(err) => (None, Some(err)),
        };

        let personal_best = leaderboard
            .as_ref()
            .and_then(|cache| cache.store().personal_best(&username).ok().flatten())
            .unwrap_or(0);

        let engine = SharedEngine::new(cfg.build_engine().with_high_score(personal_best));
        let snapshot = engine.snapshot();

        let mut app = Self {
            screen: Screen::Home,
            home_choice: HomeChoice::Play,
            username,
            engine,
            timer: RoundTimer::new(rt.handle().clone()),
            snapshot,
            cursor: 0,
            last_outcome: None,
            last_pick: None,
            leaderboard,
            leaderboard_rows: Vec::new(),
            leaderboard_capacity: cfg.leaderboard.capacity,
            close_budget: cfg.rules.close_match_budget,
            boss_close_budget: cfg.rules.boss_close_match_budget,
            personal_best,
            last_save: None,
            new_personal_best: false,
            recorded_session: None,
            toast: None,
            error_modal: None,
            error_return_screen: Screen::Home,
            exit: None,
            last_tick: Instant::now(),
            animation: AnimationState::new(),
        };

        if let Some(err) = storage_error {
            warn!("score storage unavailable: {err:#}");
            app.set_error(
                "Scores unavailable",
                format!("Scores will not be saved this session.\n\n{err:#}"),
            );
        }
        app
    }

    pub fn start_game(&mut self) {
        match self.engine.start_game() {
            Ok(snapshot) => {
                self.timer.restart(&self.engine, snapshot.session, snapshot.round);
                self.snapshot = snapshot;
                self.cursor = 0;
                self.last_outcome = None;
                self.last_pick = None;
                self.last_save = None;
                self.new_personal_best = false;
                self.toast = None;
                self.screen = Screen::Play;
            }
            Err(err) => self.set_error("Could not start", err.to_string()),
        }
    }

    pub fn abandon_game(&mut self) {
        self.timer.cancel();
        self.snapshot = self.engine.reset();
        self.last_outcome = None;
        self.screen = Screen::Home;
    }

    /// Pick option `index` of the current round.
    pub fn select_option(&mut self, index: usize) {
        if self.snapshot.phase != Phase::AwaitingSelection {
            return;
        }
        let Some(color) = self.snapshot.options.get(index).copied() else {
            return;
        };
        self.cursor = index;

        match self.engine.try_select(color) {
            Some(Ok(outcome)) => {
                if let Some(note) = Notification::from_outcome(&outcome) {
                    self.show_toast(note);
                }
                if outcome.snapshot.phase.is_active() {
                    // Realign the clock with the new round.
                    self.timer.restart(
                        &self.engine,
                        outcome.snapshot.session,
                        outcome.snapshot.round,
                    );
                } else {
                    self.timer.cancel();
                }
                self.snapshot = outcome.snapshot.clone();
                self.last_outcome = Some(outcome);
                self.last_pick = Some(color);
                self.refresh();
            }
            Some(Err(err)) => debug!("selection rejected: {err}"),
            None => debug!("selection dropped"),
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let count = self.snapshot.options.len();
        if count == 0 {
            return;
        }
        let next = (self.cursor as isize + delta).rem_euclid(count as isize);
        self.cursor = next as usize;
    }

    /// Pull the latest engine state and react to phase changes the timer made.
    pub fn refresh(&mut self) {
        let previous = self.snapshot.phase;
        self.snapshot = self.engine.snapshot();

        if previous != Phase::AwaitingSelection && self.snapshot.phase == Phase::AwaitingSelection
        {
            self.cursor = 0;
        }

        if self.snapshot.phase == Phase::Ended
            && self.recorded_session != Some(self.snapshot.session)
        {
            self.finish_game();
        }

        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.shown_at.elapsed() >= TOAST_TIME)
        {
            self.toast = None;
        }
    }

    fn finish_game(&mut self) {
        self.timer.cancel();
        self.recorded_session = Some(self.snapshot.session);
        if self.screen == Screen::ErrorModal {
            self.error_return_screen = Screen::GameOver;
        } else {
            self.screen = Screen::GameOver;
        }

        let score = self.snapshot.score;
        if score == 0 || score <= self.personal_best {
            self.show_toast(Notification::game_over(&self.snapshot));
            return;
        }

        self.personal_best = score;
        self.new_personal_best = true;
        match self.save_score(score, self.snapshot.level) {
            Ok(saved) => {
                self.last_save = saved;
                self.show_toast(Notification::new_high_score(score, saved));
            }
            Err(err) => {
                warn!("failed to save score: {err:#}");
                self.set_error("Score not saved", format!("{err:#}"));
            }
        }
    }

    fn save_score(&mut self, score: u64, level: u32) -> Result<Option<SaveOutcome>> {
        match self.leaderboard.as_mut() {
            Some(cache) => Ok(Some(cache.save_score(&self.username, score, level)?)),
            None => Ok(None),
        }
    }

    pub fn open_leaderboard(&mut self, force: bool) {
        let capacity = self.leaderboard_capacity;
        let Some(cache) = self.leaderboard.as_mut() else {
            self.set_info("Leaderboard", "Score storage is unavailable this session.");
            return;
        };
        if force {
            cache.invalidate();
        }
        match cache.top(capacity) {
            Ok(rows) => {
                self.leaderboard_rows = rows;
                self.screen = Screen::Leaderboard;
            }
            Err(err) => self.set_error("Leaderboard unavailable", format!("{err:#}")),
        }
    }

    pub fn show_toast(&mut self, notification: Notification) {
        self.toast = Some(Toast {
            notification,
            shown_at: Instant::now(),
        });
    }

    pub fn set_error(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.open_modal(title.into(), message.into(), ModalKind::Error);
    }

    pub fn set_info(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.open_modal(title.into(), message.into(), ModalKind::Info);
    }

    fn open_modal(&mut self, title: String, message: String, kind: ModalKind) {
        if self.screen != Screen::ErrorModal {
            self.error_return_screen = self.screen;
        }
        self.error_modal = Some(ErrorModalState {
            title,
            message,
            kind,
        });
        self.screen = Screen::ErrorModal;
    }

    pub fn close_modal(&mut self) {
        self.error_modal = None;
        self.screen = self.error_return_screen;
    }
}
