use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::input::InputQueue;
use crate::scheduler::Ticker;
use crate::snake::Direction;
use crate::state::{GameState, TickOutcome, INITIAL_TICK};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Ready,
    Running { paused: bool },
    GameOver { board_filled: bool },
}

/// Sole owner of the mutable game. Every tick and every input goes through
/// `&mut self`, so ticks cannot overlap each other or an input update.
pub struct Session {
    phase: Phase,
    state: GameState,
    queue: InputQueue,
    ticker: Ticker,
    rng: StdRng,
    grid_size: u16,
}

impl Session {
    pub fn new(grid_size: u16, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = GameState::new(grid_size, &mut rng);

        Session {
            phase: Phase::Ready,
            state,
            queue: InputQueue::new(),
            ticker: Ticker::new(INITIAL_TICK),
            rng,
            grid_size,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    /// Ready → Running. Does nothing in any other phase.
    pub fn start(&mut self, now: Instant) {
        if self.phase != Phase::Ready {
            return;
        }
        info!(grid_size = self.grid_size, "game started");
        self.phase = Phase::Running { paused: false };
        self.ticker.restart(self.state.tick, now);
    }

    /// Throws the current game away and starts a fresh one.
    pub fn restart(&mut self, now: Instant) {
        info!(previous_score = self.state.score, "game restarted");
        self.state = GameState::new(self.grid_size, &mut self.rng);
        self.queue.clear();
        self.ticker.stop();
        self.phase = Phase::Ready;
        self.start(now);
    }

    pub fn toggle_pause(&mut self, now: Instant) {
        if let Phase::Running { paused } = self.phase {
            if paused {
                self.ticker.start(now);
            } else {
                self.ticker.stop();
            }
            self.phase = Phase::Running { paused: !paused };
            debug!(paused = !paused, "pause toggled");
        }
    }

    /// Queues a turn. Ignored unless the game is running and unpaused.
    pub fn turn(&mut self, direction: Direction) -> bool {
        if self.phase != (Phase::Running { paused: false }) {
            return false;
        }
        self.queue.offer(direction, self.state.direction)
    }

    /// Runs the update step if the ticker says one is due. Returns the
    /// outcome of the tick that ran, if any.
    pub fn poll_tick(&mut self, now: Instant) -> Option<TickOutcome> {
        if !self.ticker.poll(now) {
            return None;
        }
        Some(self.tick(now))
    }

    /// One update step, regardless of the ticker.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let pending = self.queue.take();
        let (next, outcome) = self.state.step(pending, &mut self.rng);
        self.state = next;

        if outcome.ends_game() {
            self.ticker.stop();
            self.phase = Phase::GameOver { board_filled: outcome == TickOutcome::BoardFilled };
            info!(score = self.state.score, ?outcome, "game over");
        } else if outcome == (TickOutcome::Ate { sped_up: true }) {
            self.ticker.restart(self.state.tick, now);
        }

        outcome
    }

    #[cfg(test)]
    fn with_state(state: GameState) -> Self {
        let grid_size = state.grid_size;
        Session {
            phase: Phase::Ready,
            state,
            queue: InputQueue::new(),
            ticker: Ticker::new(INITIAL_TICK),
            rng: StdRng::seed_from_u64(3),
            grid_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::{Cell, Snake};
    use std::time::Duration;

    fn running(cells: &[(i32, i32)], direction: Direction, food: (i32, i32)) -> (Session, Instant) {
        let state = GameState {
            grid_size: 20,
            snake: Snake::from_cells(cells.iter().map(|&(x, y)| Cell::new(x, y))).unwrap(),
            food: Cell::new(food.0, food.1),
            direction,
            score: 0,
            tick: INITIAL_TICK,
        };
        let mut session = Session::with_state(state);
        let now = Instant::now();
        session.start(now);
        (session, now)
    }

    #[test]
    fn starts_ready_and_ignores_turns() {
        let mut session = Session::new(20, Some(1));
        assert_eq!(session.phase(), Phase::Ready);
        assert!(!session.turn(Direction::Up));
        assert!(!session.ticker().is_running());
    }

    #[test]
    fn start_is_idempotent() {
        let mut session = Session::new(20, Some(1));
        let t0 = Instant::now();
        session.start(t0);
        session.start(t0 + Duration::from_millis(100));
        assert_eq!(session.phase(), Phase::Running { paused: false });
        assert_eq!(session.ticker().time_until(t0), Some(INITIAL_TICK));
    }

    #[test]
    fn reversal_keeps_heading_right() {
        let (mut session, now) = running(&[(5, 5), (4, 5), (3, 5)], Direction::Right, (15, 15));
        assert!(!session.turn(Direction::Left));
        session.tick(now);
        assert_eq!(session.state().direction, Direction::Right);
        assert_eq!(session.state().snake.head(), Cell::new(6, 5));
    }

    #[test]
    fn wall_hit_ends_the_game() {
        let (mut session, now) = running(&[(19, 5), (18, 5), (17, 5)], Direction::Right, (0, 0));
        assert_eq!(session.tick(now), TickOutcome::Collided);
        assert_eq!(session.phase(), Phase::GameOver { board_filled: false });
        assert!(!session.ticker().is_running());
        assert!(!session.turn(Direction::Up));
    }

    #[test]
    fn self_hit_ends_the_game() {
        let (mut session, now) = running(&[(5, 5), (4, 5), (4, 6), (5, 6), (6, 6)], Direction::Right, (0, 0));
        assert!(session.turn(Direction::Down));
        assert_eq!(session.tick(now), TickOutcome::Collided);
        assert_eq!(session.phase(), Phase::GameOver { board_filled: false });
    }

    #[test]
    fn milestone_restarts_the_ticker() {
        let (mut session, t0) = running(&[(10, 10), (9, 10), (8, 10)], Direction::Right, (11, 10));
        session.state.score = 40;
        let later = t0 + Duration::from_millis(130);

        assert_eq!(session.tick(later), TickOutcome::Ate { sped_up: true });
        assert_eq!(session.state().score, 50);
        assert_eq!(session.ticker().period(), Duration::from_millis(120));
        assert_eq!(session.ticker().time_until(later), Some(Duration::from_millis(120)));
    }

    #[test]
    fn restart_resets_everything() {
        let (mut session, now) = running(&[(19, 5), (18, 5), (17, 5)], Direction::Right, (0, 0));
        session.state.score = 120;
        session.state.tick = Duration::from_millis(100);
        session.tick(now);

        session.restart(now);
        assert_eq!(session.phase(), Phase::Running { paused: false });
        assert_eq!(session.state().score, 0);
        assert_eq!(session.state().tick, INITIAL_TICK);
        assert_eq!(session.state().snake.len(), 3);
        assert_eq!(session.ticker().period(), INITIAL_TICK);
    }

    #[test]
    fn pause_freezes_ticks_and_input() {
        let (mut session, t0) = running(&[(5, 5), (4, 5), (3, 5)], Direction::Right, (15, 15));
        session.toggle_pause(t0);
        assert!(!session.turn(Direction::Up));
        assert_eq!(session.poll_tick(t0 + Duration::from_secs(5)), None);

        session.toggle_pause(t0 + Duration::from_secs(5));
        assert_eq!(session.poll_tick(t0 + Duration::from_secs(5) + INITIAL_TICK), Some(TickOutcome::Moved));
    }

    #[test]
    fn seeded_sessions_agree() {
        let a = Session::new(20, Some(42));
        let b = Session::new(20, Some(42));
        assert_eq!(a.state(), b.state());
    }
}
