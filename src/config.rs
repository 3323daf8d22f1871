use std::time::Duration;

use clap::ValueEnum;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use thiserror::Error;

use crate::board::{Board, CellKind};
use crate::route::PortalBias;
use crate::Coords;

pub const DEFAULT_WIDTH: i16 = 80;
pub const DEFAULT_HEIGHT: i16 = 40;
pub const DEFAULT_SNAKE_LENGTH: usize = 10;
pub const DEFAULT_TICK_MS: u64 = 200;
pub const DEFAULT_STOP_KEY: char = 'a';

const DEFAULT_SNAKE_START: Coords = (40, 20);
const DEFAULT_BLOCK_SIZE: (i16, i16) = (5, 5);

const DEFAULT_APPLES: [Coords; 10] = [
    (75, 8), (75, 39), (78, 2), (2, 2), (8, 5),
    (78, 39), (74, 33), (2, 38), (72, 35), (5, 2),
];

const DEFAULT_BLOCKS: [Coords; 6] = [(3, 3), (74, 3), (3, 34), (74, 34), (38, 21), (38, 15)];

// Smallest grid on which the four portal mouths are distinct border cells
const MIN_GRID_SIDE: i16 = 5;

/// How the head picks its next cell each tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum DriveMode {
    /// Distance estimator plus the fallback-ladder step planner
    Autopilot,
    /// Breadth-first search over the grid, ladder when no path exists
    Search,
    /// Greedy larger-axis chooser with ordered teleport rules
    Greedy,
    /// Arrow keys / WASD with the same teleport rules as `greedy`
    Manual,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid {width}x{height} is too small, both sides must be at least {}", MIN_GRID_SIDE)]
    GridTooSmall { width: i16, height: i16 },
    #[error("snake length must be non-zero")]
    EmptySnake,
    #[error("snake length {length} does not fit on any board")]
    SnakeTooLong { length: usize },
    #[error("snake segment {index} at {at:?} lies outside the board interior")]
    SnakeOutOfBounds { index: usize, at: Coords },
    #[error("snake segment {index} at {at:?} starts on a {kind:?} cell")]
    SnakeOnObstacle { index: usize, at: Coords, kind: CellKind },
    #[error("at least one apple is required")]
    NoApples,
    #[error("apple {index} at {at:?} lies outside the board")]
    AppleOutOfBounds { index: usize, at: Coords },
    #[error("apple {index} at {at:?} is placed on a {kind:?} cell")]
    AppleOnObstacle { index: usize, at: Coords, kind: CellKind },
    #[error("block {index} with corner {at:?} does not fit inside the border")]
    BlockOutOfBounds { index: usize, at: Coords },
    #[error("cannot place {requested} random apples, only {available} free cells")]
    NotEnoughFreeCells { requested: usize, available: usize },
}

/// Immutable simulation setup handed to `Board::initialize` and the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub width: i16,
    pub height: i16,
    pub snake_start: Coords,
    pub snake_length: usize,
    pub grow_on_apple: bool,
    pub apples: Vec<Coords>,
    pub blocks: Vec<Coords>,
    pub block_size: (i16, i16),
    pub tick_delay: Duration,
    pub portal_bias: PortalBias,
    /// Bounds the planner's back-off region; defaults to the snake length.
    pub fallback_bound: i16,
    pub max_ticks: Option<u64>,
    pub stop_key: char,
    pub mode: DriveMode,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            snake_start: DEFAULT_SNAKE_START,
            snake_length: DEFAULT_SNAKE_LENGTH,
            grow_on_apple: false,
            apples: DEFAULT_APPLES.to_vec(),
            blocks: DEFAULT_BLOCKS.to_vec(),
            block_size: DEFAULT_BLOCK_SIZE,
            tick_delay: Duration::from_millis(DEFAULT_TICK_MS),
            portal_bias: PortalBias::Skewed,
            fallback_bound: DEFAULT_SNAKE_LENGTH as i16,
            max_ticks: None,
            stop_key: DEFAULT_STOP_KEY,
            mode: DriveMode::Autopilot,
        }
    }
}

impl SimConfig {
    /// Initial body, head first, trailing to the left of `snake_start`.
    pub fn snake_segments(&self) -> Vec<Coords> {
        (0..i16::try_from(self.snake_length).unwrap_or(i16::MAX))
            .map(|i| (self.snake_start.0 - i, self.snake_start.1))
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < MIN_GRID_SIDE || self.height < MIN_GRID_SIDE {
            return Err(ConfigError::GridTooSmall { width: self.width, height: self.height });
        }

        let (bw, bh) = self.block_size;
        for (index, &(x, y)) in self.blocks.iter().enumerate() {
            if bw < 1 || bh < 1 || x < 2 || y < 2 || x + bw - 1 > self.width - 1 || y + bh - 1 > self.height - 1 {
                return Err(ConfigError::BlockOutOfBounds { index, at: (x, y) });
            }
        }

        let board = Board::initialize(self);

        if self.snake_length == 0 {
            return Err(ConfigError::EmptySnake);
        }
        if i16::try_from(self.snake_length).is_err() {
            return Err(ConfigError::SnakeTooLong { length: self.snake_length });
        }
        for (index, at) in self.snake_segments().into_iter().enumerate() {
            if !board.contains(at) {
                return Err(ConfigError::SnakeOutOfBounds { index, at });
            }
            let kind = board.cell_kind(at);
            if !board.is_passable(at) {
                return Err(ConfigError::SnakeOnObstacle { index, at, kind });
            }
        }

        if self.apples.is_empty() {
            return Err(ConfigError::NoApples);
        }
        for (index, &at) in self.apples.iter().enumerate() {
            if !board.contains(at) {
                return Err(ConfigError::AppleOutOfBounds { index, at });
            }
            let kind = board.cell_kind(at);
            if !board.is_passable(at) {
                return Err(ConfigError::AppleOnObstacle { index, at, kind });
            }
        }

        Ok(())
    }

    /// Replaces the apple list with `count` distinct free cells drawn from a
    /// seeded shuffle. Cells under the initial snake are never picked.
    pub fn with_random_apples(mut self, seed: u64, count: usize) -> Result<Self, ConfigError> {
        let board = Board::initialize(&self);
        let snake = self.snake_segments();

        let mut choices: Vec<Coords> = board.free_cells()
            .filter(|pos| !snake.contains(pos))
            .collect();

        if choices.len() < count {
            return Err(ConfigError::NotEnoughFreeCells { requested: count, available: choices.len() });
        }

        let mut rng = StdRng::seed_from_u64(seed);
        choices.shuffle(&mut rng);
        choices.truncate(count);

        self.apples = choices;
        Ok(self)
    }
}
