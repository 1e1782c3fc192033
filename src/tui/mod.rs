//! Fullscreen terminal UI (TUI).
//!
//! The engine is driven through a [`SharedEngine`](chroma_recall::SharedEngine)
//! whose round clock runs on the tokio runtime; the draw loop only reads
//! snapshots and forwards key presses.

pub(crate) mod animation;
pub(crate) mod input;
pub(crate) mod screens;
pub(crate) mod state;
pub(crate) mod theme;
pub(crate) mod widgets;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Terminal;

use chroma_recall::config::Config;

use state::*;
use theme::Theme;

const FRAME_TIME: Duration = Duration::from_millis(16);

pub(crate) use state::TuiExit;

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

pub(crate) fn run_tui(
    rt: &tokio::runtime::Runtime,
    config: &Config,
    username: String,
) -> Result<TuiExit> {
    let mut app = App::new(rt, config, username);

    let _guard = TerminalGuard::enter()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    loop {
        app.refresh();
        terminal.draw(|f| draw(f.area(), f, &app))?;

        let timeout = FRAME_TIME.saturating_sub(app.last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if input::handle_key(&mut app, key)? {
                    break;
                }
            }
        }

        if app.last_tick.elapsed() >= FRAME_TIME {
            app.last_tick = std::time::Instant::now();
            app.animation.advance();
        }
    }

    app.timer.cancel();
    Ok(app.exit.unwrap_or(TuiExit::Quit))
}

fn draw(area: Rect, f: &mut ratatui::Frame, app: &App) {
    let theme = Theme::default();

    let outer_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // header
            Constraint::Min(0),    // content
        ])
        .split(area);

    let screen = if app.screen == Screen::ErrorModal {
        app.error_return_screen
    } else {
        app.screen
    };

    let context = match screen {
        Screen::Home | Screen::ErrorModal => None,
        Screen::Play if app.snapshot.boss_level => {
            Some(format!("LEVEL {}  CHALLENGE", app.snapshot.level))
        }
        Screen::Play => Some(format!("LEVEL {}", app.snapshot.level)),
        Screen::GameOver => Some("GAME OVER".to_string()),
        Screen::Leaderboard => Some("LEADERBOARD".to_string()),
    };
    widgets::header::draw_header(
        outer_layout[0],
        f,
        &theme,
        context.as_deref(),
        &app.username,
    );

    let inner = outer_layout[1];
    match screen {
        Screen::Home | Screen::ErrorModal => screens::home::draw_home(inner, f, app, theme),
        Screen::Play => screens::play::draw_play(inner, f, app, theme),
        Screen::GameOver => screens::game_over::draw_game_over(inner, f, app, theme),
        Screen::Leaderboard => screens::leaderboard::draw_leaderboard(inner, f, app, theme),
    }

    if app.screen == Screen::ErrorModal {
        screens::modal::draw_modal(inner, f, app, theme);
    }
}
