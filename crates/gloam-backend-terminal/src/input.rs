//! Keyboard input

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use gloam_api::{Action, Input};
use gloam_sprite::Direction;
use std::io;
use std::time::Duration;

/// Drain pending key presses without blocking
pub fn poll_keys() -> io::Result<Vec<KeyEvent>> {
    let mut keys = Vec::new();
    while event::poll(Duration::ZERO)? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                keys.push(key);
            }
        }
    }
    Ok(keys)
}

fn is_quit(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Game keys: w/a/s/d move, Enter fires, q quits
pub fn game_input(key: &KeyEvent) -> Option<Input> {
    if is_quit(key) {
        return Some(Input::Quit);
    }

    let action = match key.code {
        KeyCode::Char('w') => Action::Up,
        KeyCode::Char('s') => Action::Down,
        KeyCode::Char('a') => Action::Left,
        KeyCode::Char('d') => Action::Right,
        KeyCode::Enter => Action::Fire,
        _ => return None,
    };
    Some(Input::Action(action))
}

/// Sprite editor commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    NextState,
    Direction(Direction),
    Quit,
}

/// Editor keys: space cycles states, w/a/s/d pick a direction, q quits
pub fn editor_input(key: &KeyEvent) -> Option<EditorCommand> {
    if is_quit(key) {
        return Some(EditorCommand::Quit);
    }

    match key.code {
        KeyCode::Char(' ') => Some(EditorCommand::NextState),
        KeyCode::Char('w') => Some(EditorCommand::Direction(Direction::Up)),
        KeyCode::Char('s') => Some(EditorCommand::Direction(Direction::Down)),
        KeyCode::Char('a') => Some(EditorCommand::Direction(Direction::Left)),
        KeyCode::Char('d') => Some(EditorCommand::Direction(Direction::Right)),
        _ => None,
    }
}
