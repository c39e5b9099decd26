use std::collections::VecDeque;

use Direction::*;
use MoveResult::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn reverse(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    pub fn is_reverse_of(self, other: Direction) -> bool {
        self.reverse() == other
    }
}

/// A square of the board. Cells outside `[0, N)` only ever exist as a
/// candidate head that is about to be rejected as a wall hit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    pub fn neighbour(self, direction: Direction) -> Cell {
        let (dx, dy) = direction.delta();
        Cell::new(self.x + dx, self.y + dy)
    }

    pub fn in_grid(self, grid_size: u16) -> bool {
        let n = grid_size as i32;
        (0..n).contains(&self.x) && (0..n).contains(&self.y)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveResult {
    Moved { snake: Snake, ate_food: bool },
    Crashed
}

/// Body segments, head first. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snake {
    body: VecDeque<Cell>,
}

impl Snake {
    /// A straight snake of `size` segments whose head is at `head`, trailing
    /// away from `direction`.
    pub fn new(head: Cell, size: usize, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();

        let body = (0..size.max(1) as i32)
            .map(|i| Cell::new(head.x - dx * i, head.y - dy * i))
            .collect();
        Snake { body }
    }

    /// Builds a snake from explicit segments. Returns `None` for an empty list.
    #[cfg(test)]
    pub fn from_cells<I: IntoIterator<Item = Cell>>(cells: I) -> Option<Self> {
        let body: VecDeque<Cell> = cells.into_iter().collect();
        if body.is_empty() {
            None
        } else {
            Some(Snake { body })
        }
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn tail(&self) -> Cell {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn segments(&self) -> impl ExactSizeIterator<Item = Cell> + DoubleEndedIterator + '_ {
        self.body.iter().copied()
    }

    pub fn segment(&self, index: usize) -> Option<Cell> {
        self.body.get(index).copied()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Advances one cell towards `direction`.
    ///
    /// The collision test runs against the body as it stands before the tail
    /// moves, so stepping onto the current tail cell is a crash.
    pub fn step(&self, direction: Direction, food: Cell, grid_size: u16) -> MoveResult {
        let new_head = self.head().neighbour(direction);

        if !new_head.in_grid(grid_size) || self.body.iter().skip(1).any(|c| *c == new_head) {
            return Crashed;
        }

        let ate_food = new_head == food;
        let mut body = self.body.clone();
        if !ate_food {
            body.pop_back();
        }
        body.push_front(new_head);

        Moved { snake: Snake { body }, ate_food }
    }
}
