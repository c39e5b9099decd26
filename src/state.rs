use std::time::Duration;

use rand::Rng;
use tracing::{debug, trace};

use crate::snake::{Cell, Direction, MoveResult, Snake};

pub const INITIAL_SNAKE_LENGTH: usize = 3;
pub const SCORE_PER_FOOD: u32 = 10;
pub const SPEED_MILESTONE: u32 = 50;
pub const INITIAL_TICK: Duration = Duration::from_millis(130);
pub const MIN_TICK: Duration = Duration::from_millis(60);
pub const TICK_STEP: Duration = Duration::from_millis(10);

/// Everything the update step reads and writes. Rebuilt from scratch on
/// every (re)start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub grid_size: u16,
    pub snake: Snake,
    pub food: Cell,
    pub direction: Direction,
    pub score: u32,
    pub tick: Duration,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Moved,
    Ate { sped_up: bool },
    /// Wall or self hit. Both end the game the same way.
    Collided,
    /// The snake fills the grid and no food can be placed.
    BoardFilled,
}

impl TickOutcome {
    pub fn ends_game(self) -> bool {
        matches!(self, TickOutcome::Collided | TickOutcome::BoardFilled)
    }
}

/// Picks a uniformly random cell not covered by `snake`, by redrawing until
/// a free one comes up. `None` once the snake covers the whole grid.
pub fn place_food<R: Rng>(snake: &Snake, grid_size: u16, rng: &mut R) -> Option<Cell> {
    let n = grid_size as i32;
    if snake.len() >= (n * n) as usize {
        return None;
    }

    loop {
        let candidate = Cell::new(rng.gen_range(0..n), rng.gen_range(0..n));
        if !snake.contains(candidate) {
            return Some(candidate);
        }
    }
}

/// Interval that follows `current` once `score` has just been reached.
pub fn next_tick(score: u32, current: Duration) -> Duration {
    if score % SPEED_MILESTONE == 0 && current > MIN_TICK {
        current.saturating_sub(TICK_STEP).max(MIN_TICK)
    } else {
        current
    }
}

impl GameState {
    /// Fresh game: a three-segment snake centred on the grid, heading right.
    pub fn new<R: Rng>(grid_size: u16, rng: &mut R) -> Self {
        let centre = (grid_size / 2) as i32;
        let snake = Snake::new(Cell::new(centre, centre), INITIAL_SNAKE_LENGTH, Direction::Right);
        // A fresh snake never fills a valid grid, but fall back to a corner
        // rather than panic on a degenerate one.
        let food = place_food(&snake, grid_size, rng).unwrap_or(Cell::new(0, 0));

        GameState {
            grid_size,
            snake,
            food,
            direction: Direction::Right,
            score: 0,
            tick: INITIAL_TICK,
        }
    }

    /// One tick. `pending` has already been filtered against reversals when it
    /// was queued, so it is committed as is. On a collision the returned state
    /// is unchanged apart from the committed direction.
    pub fn step<R: Rng>(&self, pending: Option<Direction>, rng: &mut R) -> (GameState, TickOutcome) {
        let mut next = self.clone();
        if let Some(direction) = pending {
            next.direction = direction;
        }

        match self.snake.step(next.direction, self.food, self.grid_size) {
            MoveResult::Crashed => {
                trace!(head = ?self.snake.head(), direction = ?next.direction, "collision");
                (next, TickOutcome::Collided)
            }
            MoveResult::Moved { snake, ate_food: false } => {
                next.snake = snake;
                (next, TickOutcome::Moved)
            }
            MoveResult::Moved { snake, ate_food: true } => {
                next.snake = snake;
                next.score += SCORE_PER_FOOD;

                let Some(food) = place_food(&next.snake, self.grid_size, rng) else {
                    return (next, TickOutcome::BoardFilled);
                };
                next.food = food;
                debug!(score = next.score, food = ?food, "food eaten");

                next.tick = next_tick(next.score, self.tick);
                let sped_up = next.tick != self.tick;
                if sped_up {
                    debug!(tick_ms = next.tick.as_millis() as u64, "speed milestone");
                }

                (next, TickOutcome::Ate { sped_up })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn state_with(cells: &[(i32, i32)], direction: Direction, food: (i32, i32)) -> GameState {
        GameState {
            grid_size: 20,
            snake: Snake::from_cells(cells.iter().map(|&(x, y)| Cell::new(x, y))).unwrap(),
            food: Cell::new(food.0, food.1),
            direction,
            score: 0,
            tick: INITIAL_TICK,
        }
    }

    #[test]
    fn fresh_state() {
        let state = GameState::new(20, &mut rng());
        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.snake.head(), Cell::new(10, 10));
        assert_eq!(state.direction, Direction::Right);
        assert_eq!(state.score, 0);
        assert_eq!(state.tick, INITIAL_TICK);
        assert!(!state.snake.contains(state.food));
    }

    #[test]
    fn eating_scenario() {
        let state = state_with(&[(10, 10), (9, 10), (8, 10)], Direction::Right, (11, 10));
        let (next, outcome) = state.step(None, &mut rng());

        assert_eq!(outcome, TickOutcome::Ate { sped_up: false });
        assert_eq!(
            next.snake.segments().collect::<Vec<_>>(),
            vec![Cell::new(11, 10), Cell::new(10, 10), Cell::new(9, 10), Cell::new(8, 10)]
        );
        assert_eq!(next.score, 10);
        assert_ne!(next.food, Cell::new(11, 10));
        assert!(!next.snake.contains(next.food));
    }

    #[test]
    fn length_is_kept_without_food() {
        let mut rng = rng();
        let mut state = state_with(&[(3, 3), (2, 3), (1, 3)], Direction::Right, (15, 15));
        for _ in 0..5 {
            let (next, outcome) = state.step(None, &mut rng);
            assert_eq!(outcome, TickOutcome::Moved);
            assert_eq!(next.snake.len(), state.snake.len());
            state = next;
        }
        assert_eq!(state.snake.head(), Cell::new(8, 3));
    }

    #[test]
    fn pending_direction_is_committed() {
        let state = state_with(&[(3, 3), (2, 3), (1, 3)], Direction::Right, (15, 15));
        let (next, _) = state.step(Some(Direction::Down), &mut rng());
        assert_eq!(next.direction, Direction::Down);
        assert_eq!(next.snake.head(), Cell::new(3, 4));
    }

    #[test]
    fn wall_collision_ends_game() {
        let state = state_with(&[(19, 4), (18, 4), (17, 4)], Direction::Right, (0, 0));
        let (next, outcome) = state.step(None, &mut rng());
        assert_eq!(outcome, TickOutcome::Collided);
        assert!(outcome.ends_game());
        assert_eq!(next.snake, state.snake);
    }

    #[test]
    fn food_never_lands_on_snake() {
        let mut rng = rng();
        // Fill all but two cells of a 5x5 grid with a serpentine body.
        let mut cells = Vec::new();
        for y in 0..5 {
            let row: Vec<i32> = if y % 2 == 0 { (0..5).collect() } else { (0..5).rev().collect() };
            for x in row {
                cells.push(Cell::new(x, y));
            }
        }
        cells.truncate(23);
        let snake = Snake::from_cells(cells).unwrap();

        for _ in 0..200 {
            let food = place_food(&snake, 5, &mut rng).unwrap();
            assert!(!snake.contains(food));
            assert!(food.in_grid(5));
        }
    }

    #[test]
    fn full_board_has_no_food() {
        let full = Snake::from_cells(vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(1, 1), Cell::new(0, 1)]).unwrap();
        assert_eq!(place_food(&full, 2, &mut rng()), None);
        assert_eq!(place_food(&full, 3, &mut rng()).map(|c| full.contains(c)), Some(false));
    }

    #[test]
    fn eating_the_last_free_cell_fills_the_board() {
        let state = GameState {
            grid_size: 2,
            snake: Snake::from_cells(vec![Cell::new(1, 0), Cell::new(1, 1), Cell::new(0, 1)]).unwrap(),
            food: Cell::new(0, 0),
            direction: Direction::Left,
            score: 0,
            tick: INITIAL_TICK,
        };
        let (next, outcome) = state.step(None, &mut rng());
        assert_eq!(outcome, TickOutcome::BoardFilled);
        assert_eq!(next.snake.len(), 4);
        assert_eq!(next.score, 10);
    }

    #[test]
    fn milestones_speed_up_to_the_floor() {
        let mut tick = INITIAL_TICK;
        let mut seen = Vec::new();
        for score in (10..=500).step_by(10) {
            tick = next_tick(score, tick);
            seen.push((score, tick.as_millis()));
        }
        let at = |s: u32| seen.iter().find(|(score, _)| *score == s).map(|(_, t)| *t).unwrap();

        assert_eq!(at(40), 130);
        assert_eq!(at(50), 120);
        assert_eq!(at(60), 120);
        assert_eq!(at(100), 110);
        assert_eq!(at(300), 70);
        assert_eq!(at(350), 60);
        assert_eq!(at(500), 60);
    }

    #[test]
    fn eating_at_a_milestone_reports_speed_up() {
        let mut state = state_with(&[(10, 10), (9, 10), (8, 10)], Direction::Right, (11, 10));
        state.score = 40;
        let (next, outcome) = state.step(None, &mut rng());
        assert_eq!(outcome, TickOutcome::Ate { sped_up: true });
        assert_eq!(next.tick, Duration::from_millis(120));
    }
}
