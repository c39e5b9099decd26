use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::snake::Direction;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Turn(Direction),
    /// Enter: start from Ready, restart after a game over.
    Confirm,
    Restart,
    TogglePause,
    Quit,
    None,
}

/// On-screen controls in the bottom bar.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Button {
    Turn(Direction),
    Start,
    Restart,
}

pub fn map_key(key: &KeyEvent) -> KeyAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyAction::Quit;
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => KeyAction::Turn(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => KeyAction::Turn(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => KeyAction::Turn(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => KeyAction::Turn(Direction::Right),
        KeyCode::Enter => KeyAction::Confirm,
        KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Restart,
        KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Char(' ') => KeyAction::TogglePause,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
        _ => KeyAction::None,
    }
}

/// Classifies a drag from `start` to `end` (in pixels) along its dominant
/// axis. Ties go to the vertical axis; a drag with no movement gives nothing.
pub fn classify_swipe(start: (i32, i32), end: (i32, i32)) -> Option<Direction> {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;

    if dx.abs() > dy.abs() {
        Some(if dx > 0 { Direction::Right } else { Direction::Left })
    } else if dy > 0 {
        Some(Direction::Down)
    } else if dy < 0 {
        Some(Direction::Up)
    } else {
        None
    }
}

/// Single-slot intent queue between the input adapters and the tick.
///
/// A new intent overwrites an older one. Reversals are judged against the
/// direction in effect when the intent arrives, not against whatever is
/// already queued.
#[derive(Debug, Default)]
pub struct InputQueue {
    pending: Option<Direction>,
}

impl InputQueue {
    pub fn new() -> Self {
        InputQueue { pending: None }
    }

    /// Returns whether the intent was accepted.
    pub fn offer(&mut self, wanted: Direction, current: Direction) -> bool {
        if wanted.is_reverse_of(current) {
            return false;
        }
        self.pending = Some(wanted);
        true
    }

    pub fn take(&mut self) -> Option<Direction> {
        self.pending.take()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}
