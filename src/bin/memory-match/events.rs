//! Keyboard handling for the board.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use memory_match::{Command, Phase};

use crate::app::App;

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    Send(Command),
}

/// Handle a terminal event
pub fn handle_event(app: &mut App, event: Event) -> EventResult {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key_event(app, key),
        _ => EventResult::Continue,
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) -> EventResult {
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => EventResult::Quit,

        KeyCode::Char('s') if app.snapshot.phase == Phase::NotStarted => {
            EventResult::Send(Command::Start)
        }
        KeyCode::Enter if app.snapshot.phase == Phase::NotStarted => {
            EventResult::Send(Command::Start)
        }
        KeyCode::Char('r') => EventResult::Send(Command::Restart),

        KeyCode::Left | KeyCode::Char('h') => move_cursor(app, -1, 0),
        KeyCode::Right | KeyCode::Char('l') => move_cursor(app, 1, 0),
        KeyCode::Up | KeyCode::Char('k') => move_cursor(app, 0, -1),
        KeyCode::Down | KeyCode::Char('j') => move_cursor(app, 0, 1),

        KeyCode::Enter | KeyCode::Char(' ') if app.snapshot.can_flip(app.selected()) => {
            EventResult::Send(Command::Flip(app.selected()))
        }

        _ => EventResult::Continue,
    }
}

fn move_cursor(app: &mut App, dx: isize, dy: isize) -> EventResult {
    app.move_cursor(dx, dy);
    EventResult::Continue
}
