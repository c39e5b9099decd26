use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{Event, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use tracing::{debug, info, warn};

use crate::canvas::PixelCanvas;
use crate::config::GameConfig;
use crate::input::{classify_swipe, map_key, Button, KeyAction};
use crate::render::Renderer;
use crate::session::{Phase, Session};
use crate::snake::Direction;
use crate::term::TermManager;

/// Upper bound on how long the loop blocks for input when no tick is due.
const IDLE_WAIT: Duration = Duration::from_millis(250);

pub struct SnakeGame {
    term: TermManager,
    controller: Controller,
    renderer: Renderer,
    canvas: PixelCanvas,
}

impl SnakeGame {
    pub fn new(config: &GameConfig) -> Result<Self> {
        let term = TermManager::new().context("Failed to read terminal size")?;
        let (w, h) = term.canvas_size();
        let (cols, rows) = term.get_terminal_size();
        info!(cols, rows, grid_size = config.grid_size, "terminal ready");

        Ok(SnakeGame {
            term,
            controller: Controller::new(Session::new(config.grid_size, config.seed)),
            renderer: Renderer::new(config.theme),
            canvas: PixelCanvas::new(w, h),
        })
    }

    /// Runs until the player quits. The terminal is restored on every exit
    /// path, including a panic unwinding through here.
    pub fn play(&mut self) -> Result<()> {
        self.term.setup().context("Failed to set up terminal")?;
        let result = self.main_loop();
        let restored = self.term.restore().context("Failed to restore terminal");
        result.and(restored)
    }

    fn main_loop(&mut self) -> Result<()> {
        self.term.clear().context("Failed to clear terminal")?;
        self.repaint()?;

        while !self.controller.quit {
            let wait = self.controller.session.ticker().time_until(Instant::now()).map_or(IDLE_WAIT, |d| d.min(IDLE_WAIT));
            let events = self.term.read_events(wait).context("Failed to read terminal events")?;

            let mut dirty = false;
            for event in events {
                dirty |= self.handle_event(event)?;
            }

            if self.controller.session.poll_tick(Instant::now()).is_some() {
                dirty = true;
            }

            if dirty && !self.controller.quit {
                self.repaint()?;
            }
        }

        info!(score = self.controller.session.state().score, "quit");
        Ok(())
    }

    /// Applies one terminal event. Returns whether the screen needs a repaint.
    fn handle_event(&mut self, event: Event) -> Result<bool> {
        let now = Instant::now();

        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(self.controller.handle_key(&key, now)),
            Event::Mouse(mouse) => Ok(self.controller.handle_mouse(mouse, &self.term, now)),
            Event::Resize(cols, rows) => {
                debug!(cols, rows, "resize");
                self.term.resize(cols, rows);
                let (w, h) = self.term.canvas_size();
                self.canvas.resize(w, h);
                self.term.clear().context("Failed to clear terminal")?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn repaint(&mut self) -> Result<()> {
        let session = &self.controller.session;
        let state = session.state();
        self.renderer.render(&mut self.canvas, state);

        let score = format!("Score: {} ", state.score);
        let lifecycle = match session.phase() {
            Phase::Ready => Button::Start,
            _ => Button::Restart,
        };

        self.term.draw_header(" SNAKE", &score).context("Failed to draw header")?;
        self.term.present(&self.canvas).context("Failed to draw board")?;
        self.term.draw_controls(lifecycle).context("Failed to draw controls")?;

        let final_score = format!("Score: {}", state.score);
        let message: Option<Vec<&str>> = match session.phase() {
            Phase::Ready => Some(vec![
                "Arrow keys, WASD or swipe to steer",
                "P or Space to pause, Q to quit",
                "",
                "Press Enter or click Start",
            ]),
            Phase::Running { paused: true } => Some(vec!["Paused", "", "Press P or Space to resume"]),
            Phase::Running { paused: false } => None,
            Phase::GameOver { board_filled } => Some(vec![
                if board_filled { "Board cleared!" } else { "Game over!" },
                final_score.as_str(),
                "",
                "Press Enter or R to play again,",
                "or Q to quit.",
            ]),
        };
        if let Some(lines) = message {
            self.term.show_message(&lines).context("Failed to draw message")?;
        }

        if let Err(err) = self.term.flush() {
            warn!(%err, "flush failed");
            return Err(err).context("Failed to flush terminal");
        }
        Ok(())
    }
}

/// Turns key presses, clicks and drags into session operations. Knows the
/// screen only through the hit-testing of a `TermManager`.
struct Controller {
    session: Session,
    swipe_start: Option<(i32, i32)>,
    quit: bool,
}

impl Controller {
    fn new(session: Session) -> Self {
        Controller { session, swipe_start: None, quit: false }
    }

    fn handle_key(&mut self, key: &KeyEvent, now: Instant) -> bool {
        match map_key(key) {
            KeyAction::Turn(direction) => {
                self.turn(direction);
                false
            }
            KeyAction::Confirm => self.confirm(now),
            KeyAction::Restart => {
                self.session.restart(now);
                true
            }
            KeyAction::TogglePause => {
                self.session.toggle_pause(now);
                true
            }
            KeyAction::Quit => {
                self.quit = true;
                false
            }
            KeyAction::None => false,
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, term: &TermManager, now: Instant) -> bool {
        let pos = (mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(button) = term.button_at(pos) {
                    self.swipe_start = None;
                    return self.press(button, now);
                }
                self.swipe_start = term.pixel_at(pos);
                false
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let Some(start) = self.swipe_start.take() else {
                    return false;
                };
                // The release may land outside the canvas and still count.
                if let Some(direction) = classify_swipe(start, term.cell_to_pixel(pos)) {
                    self.turn(direction);
                }
                false
            }
            _ => false,
        }
    }

    fn press(&mut self, button: Button, now: Instant) -> bool {
        match button {
            Button::Turn(direction) => {
                self.turn(direction);
                false
            }
            Button::Start => {
                self.session.start(now);
                true
            }
            Button::Restart => {
                self.session.restart(now);
                true
            }
        }
    }

    fn confirm(&mut self, now: Instant) -> bool {
        match self.session.phase() {
            Phase::Ready => self.session.start(now),
            Phase::GameOver { .. } => self.session.restart(now),
            Phase::Running { .. } => return false,
        }
        true
    }

    fn turn(&mut self, direction: Direction) {
        if !self.session.turn(direction) && self.session.is_running() {
            debug!(?direction, current = ?self.session.state().direction, "turn rejected");
        }
    }
}
