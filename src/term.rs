use crate::{TermInt, Coords};
use crate::canvas::{PixelCanvas, Rgb, Surface};
use crate::input::Button;
use crate::snake::Direction;
use std::{io::{self, Stdout, Write, stdout}, time::Duration};

use crossterm::{cursor, execute, queue, terminal};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event, read, poll};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};

const HEADER_ROWS: TermInt = 1;
const FOOTER_ROWS: TermInt = 1;
const HALF_BLOCK: char = '▀';

const BAR_FG: Color = Color::Rgb { r: 0xe8, g: 0xf5, b: 0xe9 };
const BAR_BG: Color = Color::Rgb { r: 0x1b, g: 0x5e, b: 0x20 };
const BUTTON_BG: Color = Color::Rgb { r: 0x38, g: 0x8e, b: 0x3c };

/// A clickable label in the control bar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ButtonSlot {
    pub button: Button,
    pub label: &'static str,
    pub col: TermInt,
    pub width: TermInt,
}

/// Lays the control buttons out centred on a row `width` columns wide.
/// Buttons that do not fit are dropped from the right.
pub fn control_bar(width: TermInt, lifecycle: Button) -> Vec<ButtonSlot> {
    let lifecycle_label = match lifecycle {
        Button::Restart => "[ Restart ]",
        _ => "[ Start ]",
    };
    let items = [
        (Button::Turn(Direction::Up), "[ ↑ ]"),
        (Button::Turn(Direction::Down), "[ ↓ ]"),
        (Button::Turn(Direction::Left), "[ ← ]"),
        (Button::Turn(Direction::Right), "[ → ]"),
        (lifecycle, lifecycle_label),
    ];

    let mut slots = Vec::new();
    let mut used: TermInt = 0;
    for (button, label) in items {
        let w = label.chars().count() as TermInt;
        let gap = if slots.is_empty() { 0 } else { 1 };
        if used + gap + w > width {
            break;
        }
        slots.push(ButtonSlot { button, label, col: used + gap, width: w });
        used += gap + w;
    }

    let offset = (width - used) / 2;
    for slot in &mut slots {
        slot.col += offset;
    }
    slots
}

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    buttons: Vec<ButtonSlot>,
    /// Set between `setup` and `restore`.
    active: bool,
}

impl TermManager {
    pub fn new() -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(TermManager { width, height, stdout: stdout(), buttons: vec![], active: false })
    }

    /// A manager that never touched the terminal, laid out as if
    /// `draw_controls(lifecycle)` had run on a `width` x `height` screen.
    #[cfg(test)]
    pub fn with_layout(width: TermInt, height: TermInt, lifecycle: Button) -> Self {
        TermManager { width, height, stdout: stdout(), buttons: control_bar(width, lifecycle), active: false }
    }

    pub fn setup(&mut self) -> io::Result<()> {
        self.active = true;
        execute!(self.stdout, EnterAlternateScreen, EnableMouseCapture, cursor::Hide, cursor::DisableBlinking)?;
        terminal::enable_raw_mode()
    }

    /// Leaves raw mode and the alternate screen. Does nothing unless `setup`
    /// ran, so calling it twice is harmless.
    pub fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        terminal::disable_raw_mode()?;
        execute!(self.stdout, ResetColor, DisableMouseCapture, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
    }

    /// Waits up to `timeout` for the first event, then drains whatever else is
    /// already queued.
    pub fn read_events(&self, timeout: Duration) -> io::Result<Vec<Event>> {
        let mut events = vec![];

        if poll(timeout)? {
            events.push(read()?);
            while poll(Duration::ZERO)? {
                events.push(read()?);
            }
        }

        Ok(events)
    }

    pub fn resize(&mut self, width: TermInt, height: TermInt) {
        self.width = width;
        self.height = height;
    }

    pub fn get_terminal_size(&self) -> Coords {
        (self.width, self.height)
    }

    fn canvas_rows(&self) -> TermInt {
        self.height.saturating_sub(HEADER_ROWS + FOOTER_ROWS)
    }

    /// Pixel size of the drawing area: one pixel per column, two per row.
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.width as u32, self.canvas_rows() as u32 * 2)
    }

    /// Canvas pixel under a terminal cell (the upper of its two pixels),
    /// extrapolated when the cell lies outside the canvas.
    pub fn cell_to_pixel(&self, pos: Coords) -> (i32, i32) {
        (pos.0 as i32, (pos.1 as i32 - HEADER_ROWS as i32) * 2)
    }

    pub fn pixel_at(&self, pos: Coords) -> Option<(i32, i32)> {
        let (col, row) = pos;
        if col < self.width && row >= HEADER_ROWS && row < HEADER_ROWS + self.canvas_rows() {
            Some(self.cell_to_pixel(pos))
        } else {
            None
        }
    }

    pub fn button_at(&self, pos: Coords) -> Option<Button> {
        let (col, row) = pos;
        if row != self.height.saturating_sub(1) {
            return None;
        }
        self.buttons
            .iter()
            .find(|slot| col >= slot.col && col < slot.col + slot.width)
            .map(|slot| slot.button)
    }

    pub fn clear(&mut self) -> io::Result<()> {
        execute!(self.stdout, ResetColor, terminal::Clear(ClearType::All))
    }

    /// Paints `canvas` below the header, two pixels per character cell.
    pub fn present(&mut self, canvas: &PixelCanvas) -> io::Result<()> {
        let (cols, canvas_rows) = canvas_cells(canvas);
        let rows = self.canvas_rows().min(canvas_rows);
        let mut last: Option<(Rgb, Rgb)> = None;

        for row in 0..rows {
            queue!(self.stdout, cursor::MoveTo(0, HEADER_ROWS + row))?;
            for col in 0..cols.min(self.width) {
                let top = canvas.pixel(col as u32, row as u32 * 2);
                let bottom = canvas.pixel(col as u32, row as u32 * 2 + 1);
                if last != Some((top, bottom)) {
                    queue!(self.stdout, SetForegroundColor(colour(top)), SetBackgroundColor(colour(bottom)))?;
                    last = Some((top, bottom));
                }
                queue!(self.stdout, Print(HALF_BLOCK))?;
            }
        }

        queue!(self.stdout, ResetColor)
    }

    pub fn draw_header(&mut self, left: &str, right: &str) -> io::Result<()> {
        let width = self.width as usize;
        let pad = width.saturating_sub(left.chars().count() + right.chars().count());
        let line: String = format!("{left}{:pad$}{right}", "").chars().take(width).collect();

        queue!(
            self.stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(BAR_FG),
            SetBackgroundColor(BAR_BG),
            Print(format!("{line:<width$}")),
            ResetColor
        )
    }

    pub fn draw_controls(&mut self, lifecycle: Button) -> io::Result<()> {
        if self.height == 0 {
            self.buttons.clear();
            return Ok(());
        }
        let row = self.height - 1;
        self.buttons = control_bar(self.width, lifecycle);

        queue!(
            self.stdout,
            cursor::MoveTo(0, row),
            SetBackgroundColor(BAR_BG),
            Print(" ".repeat(self.width as usize))
        )?;
        for slot in &self.buttons {
            queue!(
                self.stdout,
                cursor::MoveTo(slot.col, row),
                SetForegroundColor(BAR_FG),
                SetBackgroundColor(BUTTON_BG),
                Print(slot.label)
            )?;
        }
        queue!(self.stdout, ResetColor)
    }

    /// Draws a centred box of text over whatever is on screen.
    pub fn show_message(&mut self, lines: &[&str]) -> io::Result<()> {
        let longest = lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) as TermInt;
        let msg_width = (longest + 4).min(self.width);
        let msg_height = (lines.len() as TermInt + 2).min(self.height);
        let center = (self.width / 2, self.height / 2);
        let top_left = (center.0.saturating_sub(msg_width / 2), center.1.saturating_sub(msg_height / 2));

        queue!(self.stdout, SetForegroundColor(BAR_FG), SetBackgroundColor(BAR_BG))?;

        for y_diff in 0..msg_height {
            let text = match y_diff {
                0 => "",
                d if d == msg_height - 1 => "",
                d => lines.get(d as usize - 1).copied().unwrap_or(""),
            };
            let padded_line: String = format!("{text: ^width$}", width = msg_width as usize)
                .chars()
                .take(msg_width as usize)
                .collect();
            queue!(self.stdout, cursor::MoveTo(top_left.0, top_left.1 + y_diff), Print(padded_line))?;
        }

        queue!(self.stdout, ResetColor)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}

/// Puts the terminal back if the game unwinds without reaching `restore`.
impl Drop for TermManager {
    fn drop(&mut self) {
        if self.active {
            let _ = self.restore();
        }
    }
}

fn canvas_cells(canvas: &PixelCanvas) -> (TermInt, TermInt) {
    let (w, h) = canvas.size();
    (w.min(TermInt::MAX as u32) as TermInt, (h / 2).min(TermInt::MAX as u32) as TermInt)
}

fn colour(rgb: Rgb) -> Color {
    Color::Rgb { r: rgb.r, g: rgb.g, b: rgb.b }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_bar_is_centred() {
        let slots = control_bar(80, Button::Start);
        assert_eq!(slots.len(), 5);
        // 4 * 5 + 9 + 4 gaps = 33 columns, centred in 80.
        assert_eq!(slots[0].col, 23);
        assert_eq!(slots[1].col, 29);
        assert_eq!(slots[4].label, "[ Start ]");
        assert_eq!(slots[4].col + slots[4].width, 56);
    }

    #[test]
    fn control_bar_drops_what_does_not_fit() {
        let slots = control_bar(12, Button::Restart);
        assert_eq!(slots.iter().map(|s| s.button).collect::<Vec<_>>(), vec![Button::Turn(Direction::Up), Button::Turn(Direction::Down)]);
        assert!(control_bar(3, Button::Start).is_empty());
    }

    #[test]
    fn restart_label() {
        let slots = control_bar(80, Button::Restart);
        assert_eq!(slots[4].label, "[ Restart ]");
        assert_eq!(slots[4].button, Button::Restart);
    }

    #[test]
    fn buttons_only_on_the_last_row() {
        let term = TermManager::with_layout(80, 24, Button::Start);
        assert_eq!(term.button_at((23, 23)), Some(Button::Turn(Direction::Up)));
        assert_eq!(term.button_at((29, 23)), Some(Button::Turn(Direction::Down)));
        assert_eq!(term.button_at((55, 23)), Some(Button::Start));
        assert_eq!(term.button_at((23, 22)), None);
        assert_eq!(term.button_at((23, 0)), None);
        // Gaps and the padding either side hit nothing.
        assert_eq!(term.button_at((28, 23)), None);
        assert_eq!(term.button_at((22, 23)), None);
        assert_eq!(term.button_at((56, 23)), None);
    }

    #[test]
    fn pixels_skip_header_and_footer() {
        let term = TermManager::with_layout(80, 24, Button::Start);
        assert_eq!(term.canvas_size(), (80, 44));
        assert_eq!(term.pixel_at((5, 1)), Some((5, 0)));
        assert_eq!(term.pixel_at((5, 22)), Some((5, 42)));
        assert_eq!(term.pixel_at((5, 0)), None);
        assert_eq!(term.pixel_at((5, 23)), None);
        assert_eq!(term.pixel_at((80, 5)), None);
    }

    #[test]
    fn cell_to_pixel_extrapolates() {
        let term = TermManager::with_layout(80, 24, Button::Start);
        assert_eq!(term.cell_to_pixel((3, 0)), (3, -2));
        assert_eq!(term.cell_to_pixel((3, 23)), (3, 44));
    }

    #[test]
    fn restore_without_setup_is_a_no_op() {
        let mut term = TermManager::with_layout(80, 24, Button::Start);
        assert!(!term.active);
        assert!(term.restore().is_ok());
        assert!(!term.active);
        drop(term);
    }
}
