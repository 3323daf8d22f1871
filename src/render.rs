use anyhow::Result;

use crate::board::CellKind;
use crate::Coords;

pub const SNAKE_BODY_CHAR: char = '█';
pub const APPLE_CHAR: char = 'O';
pub const DEAD_SNAKE_CHAR: char = 'X';
pub const BORDER_CHAR: char = '#';
pub const BLOCK_CHAR: char = '▓';
pub const EMPTY_CHAR: char = ' ';

pub fn symbol(kind: CellKind) -> char {
    match kind {
        CellKind::Empty => EMPTY_CHAR,
        CellKind::Border => BORDER_CHAR,
        CellKind::Block => BLOCK_CHAR,
        CellKind::Apple => APPLE_CHAR,
        CellKind::BodySegment => SNAKE_BODY_CHAR,
        CellKind::Head => '@',
    }
}

/// Output side of the simulation. Positions are board coordinates.
pub trait Renderer {
    fn draw(&mut self, pos: Coords, symbol: char) -> Result<()>;

    fn clear(&mut self, pos: Coords) -> Result<()> {
        self.draw(pos, EMPTY_CHAR)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Keeps the picture in memory. Used for `--headless` runs and in tests.
pub struct HeadlessRenderer {
    width: i16,
    height: i16,
    screen: Vec<char>,
}

impl HeadlessRenderer {
    pub fn new(width: i16, height: i16) -> Self {
        let screen = vec![EMPTY_CHAR; width.max(0) as usize * height.max(0) as usize];
        HeadlessRenderer { width, height, screen }
    }

    pub fn height(&self) -> i16 {
        self.height
    }

    pub fn symbol_at(&self, pos: Coords) -> Option<char> {
        self.index(pos).map(|i| self.screen[i])
    }

    pub fn row(&self, y: i16) -> String {
        (1..=self.width).filter_map(|x| self.symbol_at((x, y))).collect()
    }

    fn index(&self, (x, y): Coords) -> Option<usize> {
        if x >= 1 && y >= 1 && x <= self.width && y <= self.height {
            Some((y - 1) as usize * self.width as usize + (x - 1) as usize)
        } else {
            None
        }
    }
}

impl Renderer for HeadlessRenderer {
    // Off-board draws are dropped
    fn draw(&mut self, pos: Coords, symbol: char) -> Result<()> {
        if let Some(i) = self.index(pos) {
            self.screen[i] = symbol;
        }
        Ok(())
    }
}
