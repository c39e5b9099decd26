use serde::Deserialize;

use crate::canvas::{Rgb, Sprite, Surface};
use crate::snake::{Cell, Direction};
use crate::state::GameState;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// Surface area outside the square board.
    pub margin: Rgb,
    pub background: Rgb,
    pub head: Rgb,
    pub body: Rgb,
    pub tail: Rgb,
    pub eye: Rgb,
    pub pupil: Rgb,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            margin: Rgb::new(0x2e, 0x3b, 0x2f),
            background: Rgb::new(0xe8, 0xf5, 0xe9),
            head: Rgb::new(0x38, 0x8e, 0x3c),
            body: Rgb::new(0x4c, 0xaf, 0x50),
            tail: Rgb::new(0x81, 0xc7, 0x84),
            eye: Rgb::WHITE,
            pupil: Rgb::BLACK,
        }
    }
}

/// Where the board sits on a surface: its top-left corner and tile edge.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoardGeometry {
    pub x: f64,
    pub y: f64,
    pub tile: f64,
}

impl BoardGeometry {
    /// Largest square board that fits, centred.
    pub fn fit(size: (u32, u32), grid_size: u16) -> Self {
        let (w, h) = (size.0 as f64, size.1 as f64);
        let tile = w.min(h) / grid_size.max(1) as f64;
        let side = tile * grid_size as f64;
        BoardGeometry { x: ((w - side) / 2.0).floor(), y: ((h - side) / 2.0).floor(), tile }
    }

    pub fn side(&self, grid_size: u16) -> f64 {
        self.tile * grid_size as f64
    }

    fn origin(&self, cell: Cell) -> (f64, f64) {
        (self.x + cell.x as f64 * self.tile, self.y + cell.y as f64 * self.tile)
    }

    fn centre(&self, cell: Cell) -> (f64, f64) {
        let (x, y) = self.origin(cell);
        (x + self.tile / 2.0, y + self.tile / 2.0)
    }
}

pub struct Renderer {
    theme: Theme,
    food: Sprite,
}

impl Renderer {
    pub fn new(theme: Theme) -> Self {
        Renderer { theme, food: Sprite::food() }
    }

    /// Repaints the whole surface from `state`.
    pub fn render<S: Surface>(&self, surface: &mut S, state: &GameState) {
        let (w, h) = surface.size();
        let board = BoardGeometry::fit((w, h), state.grid_size);
        let side = board.side(state.grid_size);

        surface.fill_rect(0.0, 0.0, w as f64, h as f64, self.theme.margin);
        surface.fill_rect(board.x, board.y, side, side, self.theme.background);

        let (fx, fy) = board.origin(state.food);
        surface.blit(&self.food, fx, fy, board.tile, board.tile);

        self.draw_snake(surface, &board, state);
    }

    fn draw_snake<S: Surface>(&self, surface: &mut S, board: &BoardGeometry, state: &GameState) {
        let snake = &state.snake;
        let len = snake.len();

        self.draw_head(surface, board, snake.head(), state.direction);

        for (i, segment) in snake.segments().enumerate().take(len.saturating_sub(1)).skip(1) {
            let colour = self.theme.body.blend(self.theme.tail, i as f64 / len as f64);
            let (cx, cy) = board.centre(segment);
            surface.fill_arc(cx, cy, board.tile / 2.5, colour);

            for neighbour in [snake.segment(i - 1), snake.segment(i + 1)].into_iter().flatten() {
                connect(surface, board, segment, neighbour, colour);
            }
        }

        if len > 1 {
            let (cx, cy) = board.centre(snake.tail());
            surface.fill_arc(cx, cy, board.tile / 3.0, self.theme.tail);
        }
    }

    fn draw_head<S: Surface>(&self, surface: &mut S, board: &BoardGeometry, head: Cell, facing: Direction) {
        let tile = board.tile;
        let (x, y) = board.origin(head);
        let (cx, cy) = board.centre(head);
        surface.fill_arc(cx, cy, tile / 2.0, self.theme.head);

        let eye_radius = tile / 10.0;
        let near = tile / 4.0;
        let far = tile - near;
        let eyes = match facing {
            Direction::Right => [(x + far, y + near), (x + far, y + far)],
            Direction::Left => [(x + near, y + near), (x + near, y + far)],
            Direction::Up => [(x + near, y + near), (x + far, y + near)],
            Direction::Down => [(x + near, y + far), (x + far, y + far)],
        };

        for (ex, ey) in eyes {
            surface.fill_arc(ex, ey, eye_radius, self.theme.eye);
        }
        for (ex, ey) in eyes {
            surface.fill_arc(ex, ey, eye_radius / 2.0, self.theme.pupil);
        }
    }
}

/// Bar joining the centres of two segments, as wide as a body segment.
fn connect<S: Surface>(surface: &mut S, board: &BoardGeometry, from: Cell, to: Cell, colour: Rgb) {
    let (x1, y1) = board.centre(from);
    let (x2, y2) = board.centre(to);
    let width = board.tile / 2.5;

    if (x2 - x1).abs() > (y2 - y1).abs() {
        let (start, end) = if x2 > x1 { (x1, x2) } else { (x2, x1) };
        surface.fill_rect(start - width / 2.0, y1 - width / 2.0, end - start, width, colour);
    } else {
        let (start, end) = if y2 > y1 { (y1, y2) } else { (y2, y1) };
        surface.fill_rect(x1 - width / 2.0, start - width / 2.0, width, end - start, colour);
    }
}
