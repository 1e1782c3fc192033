//! Cross-task access to one engine plus the once-per-second round clock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use super::{GameEngine, GameStateSnapshot, SelectionOutcome};
use crate::color::Color;
use crate::error::EngineResult;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Clonable handle to a single [`GameEngine`].
///
/// Ticks and selections are serialized by the mutex. A selection that arrives
/// while another is still being resolved is dropped rather than queued.
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<GameEngine>>,
    selecting: Arc<AtomicBool>,
}

struct SelectingGuard<'a>(&'a AtomicBool);

impl Drop for SelectingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SharedEngine {
    pub fn new(engine: GameEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
            selecting: Arc::new(AtomicBool::new(false)),
        }
    }

    // A panic mid-transition never leaves a half-written state behind, so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, GameEngine> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> GameStateSnapshot {
        self.lock().snapshot()
    }

    pub fn start_game(&self) -> EngineResult<GameStateSnapshot> {
        self.lock().start_game()
    }

    pub fn reset(&self) -> GameStateSnapshot {
        self.lock().reset()
    }

    pub fn tick_for(&self, session: u64, round: u64) -> EngineResult<GameStateSnapshot> {
        self.lock().tick_for(session, round)
    }

    /// `None` when another selection is already in flight.
    pub fn try_select_color(&self, hex: &str) -> Option<EngineResult<SelectionOutcome>> {
        let _guard = self.begin_selection()?;
        Some(self.lock().select_color(hex))
    }

    /// `None` when another selection is already in flight.
    pub fn try_select(&self, color: Color) -> Option<EngineResult<SelectionOutcome>> {
        let _guard = self.begin_selection()?;
        Some(self.lock().select(color))
    }

    fn begin_selection(&self) -> Option<SelectingGuard<'_>> {
        if self
            .selecting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("selection already in flight, dropping");
            return None;
        }
        Some(SelectingGuard(&self.selecting))
    }
}

/// Drives `tick_for` on a tokio task. At most one task runs per timer, and it
/// stops by itself once its round is superseded or leaves an active phase.
pub struct RoundTimer {
    runtime: Handle,
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl RoundTimer {
    pub fn new(runtime: Handle) -> Self {
        Self::with_period(runtime, TICK_PERIOD)
    }

    pub fn with_period(runtime: Handle, period: Duration) -> Self {
        Self {
            runtime,
            period,
            task: None,
        }
    }

    /// Cancel any running clock and start a fresh one for `round` of `session`.
    pub fn restart(&mut self, engine: &SharedEngine, session: u64, round: u64) {
        self.cancel();

        let engine = engine.clone();
        let period = self.period;
        let task = self.runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match engine.tick_for(session, round) {
                    Ok(snap)
                        if snap.session == session
                            && snap.round == round
                            && snap.phase.is_active() => {}
                    Ok(snap) => {
                        debug!(session, round, phase = %snap.phase, "round clock stopped");
                        break;
                    }
                    Err(err) => {
                        debug!(session, "round clock stopped: {err}");
                        break;
                    }
                }
            }
        });
        self.task = Some(task);
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for RoundTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::{engine, TARGET};
    use crate::engine::{EndReason, Phase};

    const FAST: Duration = Duration::from_millis(10);

    async fn wait_for(shared: &SharedEngine, phase: Phase) -> GameStateSnapshot {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let snap = shared.snapshot();
            if snap.phase == phase || Instant::now() > deadline {
                return snap;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn test_timer_runs_round_to_timeout() {
        let shared = SharedEngine::new(engine());
        let snap = shared.start_game().unwrap();
        let mut timer = RoundTimer::with_period(Handle::current(), FAST);
        timer.restart(&shared, snap.session, snap.round);

        let snap = wait_for(&shared, Phase::AwaitingSelection).await;
        assert_eq!(snap.phase, Phase::AwaitingSelection);

        let snap = wait_for(&shared, Phase::Ended).await;
        assert_eq!(snap.phase, Phase::Ended);
        assert_eq!(snap.end_reason, Some(EndReason::Timeout));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!timer.is_running());
    }

    #[tokio::test]
    async fn test_cancelled_timer_stops_ticking() {
        let shared = SharedEngine::new(engine());
        let snap = shared.start_game().unwrap();
        let mut timer = RoundTimer::with_period(Handle::current(), FAST);
        timer.restart(&shared, snap.session, snap.round);
        timer.cancel();

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(shared.snapshot().time_left, 3);
        assert!(!timer.is_running());
    }

    #[tokio::test]
    async fn test_timer_from_old_session_does_not_touch_new_one() {
        let shared = SharedEngine::new(engine());
        let started = shared.start_game().unwrap();
        let old = started.session;
        let mut timer = RoundTimer::with_period(Handle::current(), FAST);
        timer.restart(&shared, old, started.round);

        shared.reset();
        let fresh = shared.start_game().unwrap();
        assert_ne!(fresh.session, old);

        tokio::time::sleep(Duration::from_millis(60)).await;
        let snap = shared.snapshot();
        assert_eq!(snap.session, fresh.session);
        assert_eq!(snap.time_left, 3);
        assert!(!timer.is_running());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_tick_queued_behind_selection_leaves_new_round_alone() {
        let shared = SharedEngine::new(engine());
        let started = shared.start_game().unwrap();
        let (session, round) = (started.session, started.round);
        for _ in 0..3 {
            shared.tick_for(session, round).unwrap();
        }

        let mut held = shared.lock();
        let ticker = shared.clone();
        let queued = tokio::task::spawn_blocking(move || ticker.tick_for(session, round));
        std::thread::sleep(Duration::from_millis(20));
        let outcome = held.select(TARGET).unwrap();
        drop(held);

        let snap = queued.await.unwrap().unwrap();
        assert_eq!(outcome.snapshot.level, 2);
        assert_eq!(snap.round, outcome.snapshot.round);
        assert_eq!(snap.phase, Phase::ShowingTarget);
        assert_eq!(snap.time_left, 3);
    }

    #[tokio::test]
    async fn test_timer_stops_once_its_round_is_replaced() {
        let shared = SharedEngine::new(engine());
        let started = shared.start_game().unwrap();
        for _ in 0..3 {
            shared.tick_for(started.session, started.round).unwrap();
        }

        let mut timer = RoundTimer::with_period(Handle::current(), FAST);
        timer.restart(&shared, started.session, started.round);
        let outcome = shared.try_select(TARGET).unwrap().unwrap();
        assert_ne!(outcome.snapshot.round, started.round);

        tokio::time::sleep(Duration::from_millis(60)).await;
        let snap = shared.snapshot();
        assert_eq!(snap.round, outcome.snapshot.round);
        assert_eq!(snap.time_left, 3);
        assert!(!timer.is_running());
    }

    #[tokio::test]
    async fn test_selection_while_one_is_in_flight_is_dropped() {
        let shared = SharedEngine::new(engine());
        let session = shared.start_game().unwrap().session;
        for _ in 0..3 {
            shared.tick_for(session, 1).unwrap();
        }

        shared.selecting.store(true, Ordering::Release);
        assert!(shared.try_select(TARGET).is_none());
        assert_eq!(shared.snapshot().phase, Phase::AwaitingSelection);

        shared.selecting.store(false, Ordering::Release);
        let outcome = shared.try_select(TARGET).unwrap().unwrap();
        assert!(outcome.is_exact_match);
        assert!(!shared.selecting.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn test_selection_and_ticks_from_many_tasks() {
        let shared = SharedEngine::new(engine());
        let session = shared.start_game().unwrap().session;
        for _ in 0..3 {
            shared.tick_for(session, 1).unwrap();
        }

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let shared = shared.clone();
            tasks.push(tokio::spawn(async move { shared.try_select(TARGET) }));
        }
        let mut resolved = 0;
        for task in tasks {
            if let Some(Ok(outcome)) = task.await.unwrap() {
                assert!(outcome.is_exact_match);
                resolved += 1;
            }
        }

        // Only one selection can land while the phase is AwaitingSelection;
        // the rest are dropped or rejected against the next round's phase.
        assert_eq!(resolved, 1);
        assert_eq!(shared.snapshot().level, 2);
    }
}
