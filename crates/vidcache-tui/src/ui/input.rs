//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use vidcache_core::ViewState;

use crate::app::{App, AppState, Direction, Focus};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::ConfirmingDelete => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
                _ => {}
            }
            return Ok(false);
        }
        AppState::Quitting => return Ok(true),
        AppState::Normal => {}
    }

    // Full-page error: only retry, help and quit make sense
    if app.collection.state() == ViewState::ErrorEmpty {
        match key.code {
            KeyCode::Char('r') => app.reload(),
            KeyCode::Char('?') => app.state = AppState::ShowingHelp,
            KeyCode::Char('q') | KeyCode::Esc => app.state = AppState::ConfirmingQuit,
            _ => {}
        }
        return Ok(false);
    }

    match app.focus {
        Focus::Form => handle_form_input(app, key),
        Focus::Grid => handle_grid_input(app, key),
    }
    Ok(false)
}

fn handle_form_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_form(),
        KeyCode::Tab => app.focus = Focus::Grid,
        KeyCode::Down => app.form_field = app.form_field.next(),
        KeyCode::Up | KeyCode::BackTab => app.form_field = app.form_field.prev(),
        KeyCode::Enter => app.submit_form(),
        KeyCode::Backspace => app.pop_char(),
        KeyCode::Char(c) => app.push_char(c),
        _ => {}
    }
}

fn handle_grid_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Tab => app.focus = Focus::Form,
        KeyCode::Left | KeyCode::Char('h') => app.move_selection(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') => app.move_selection(Direction::Right),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(Direction::Down),
        KeyCode::Char('n') => app.start_new(),
        KeyCode::Char('e') | KeyCode::Enter => app.start_edit_selected(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('x') => app.collection.dismiss_error(),
        KeyCode::Char('r') => app.reload(),
        KeyCode::Esc => {
            if app.collection.editing().is_some() {
                app.collection.cancel_edit();
            }
        }
        _ => {}
    }
}
