//! TUI keyboard input handling.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use chroma_recall::engine::Phase;

use super::state::*;

pub(crate) fn handle_key(app: &mut App, key: KeyEvent) -> Result<bool> {
    if key.kind == KeyEventKind::Release {
        return Ok(false);
    }
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.timer.cancel();
        app.exit = Some(TuiExit::Quit);
        return Ok(true);
    }

    match app.screen {
        Screen::Home => handle_home_key(app, key),
        Screen::Play => handle_play_key(app, key),
        Screen::GameOver => handle_game_over_key(app, key),
        Screen::Leaderboard => handle_leaderboard_key(app, key),
        Screen::ErrorModal => handle_error_modal_key(app, key),
    }
}

fn handle_home_key(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.exit = Some(TuiExit::Quit);
            return Ok(true);
        }
        KeyCode::Up => app.home_choice = app.home_choice.prev(),
        KeyCode::Down | KeyCode::Tab => app.home_choice = app.home_choice.next(),
        KeyCode::Enter => match app.home_choice {
            HomeChoice::Play => app.start_game(),
            HomeChoice::Leaderboard => app.open_leaderboard(false),
            HomeChoice::Quit => {
                app.exit = Some(TuiExit::Quit);
                return Ok(true);
            }
        },
        KeyCode::Char('p') | KeyCode::Char('P') => app.start_game(),
        KeyCode::Char('l') | KeyCode::Char('L') => app.open_leaderboard(false),
        _ => {}
    }
    Ok(false)
}

fn handle_play_key(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => app.abandon_game(),
        KeyCode::Char(ch) => {
            if let Some(index) = option_index(ch) {
                app.select_option(index);
            }
        }
        _ if app.snapshot.phase != Phase::AwaitingSelection => {}
        KeyCode::Left | KeyCode::Up | KeyCode::BackTab => app.move_cursor(-1),
        KeyCode::Right | KeyCode::Down | KeyCode::Tab => app.move_cursor(1),
        KeyCode::Enter => app.select_option(app.cursor),
        _ => {}
    }
    Ok(false)
}

fn handle_game_over_key(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Enter | KeyCode::Char('r') | KeyCode::Char('R') => app.start_game(),
        KeyCode::Char('l') | KeyCode::Char('L') => app.open_leaderboard(false),
        KeyCode::Esc => {
            app.snapshot = app.engine.reset();
            app.screen = Screen::Home;
        }
        _ => {}
    }
    Ok(false)
}

fn handle_leaderboard_key(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('r') | KeyCode::Char('R') => app.open_leaderboard(true),
        KeyCode::Esc | KeyCode::Enter => {
            app.screen = if app.snapshot.phase == Phase::Ended {
                Screen::GameOver
            } else {
                Screen::Home
            };
        }
        _ => {}
    }
    Ok(false)
}

fn handle_error_modal_key(app: &mut App, key: KeyEvent) -> Result<bool> {
    if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
        app.close_modal();
    }
    Ok(false)
}

/// `1`-`9` pick the first nine options, `0` the tenth.
pub(crate) fn option_index(ch: char) -> Option<usize> {
    match ch.to_digit(10)? {
        0 => Some(9),
        d => Some(d as usize - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_keys_map_to_options() {
        assert_eq!(option_index('1'), Some(0));
        assert_eq!(option_index('9'), Some(8));
        assert_eq!(option_index('0'), Some(9));
        assert_eq!(option_index('x'), None);
    }
}
