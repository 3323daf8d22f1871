use std::fmt;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::board::{Board, CellKind, Portal};
use crate::config::{ConfigError, DriveMode, SimConfig};
use crate::greedy::{self, GreedyOutcome, TeleportRule, TeleportRules};
use crate::planner::{plan_step, StepOutcome};
use crate::render::{symbol, Renderer};
use crate::route::{estimate, Route};
use crate::search::plan_search;
use crate::snake::{Direction, MoveResult, Snake};
use crate::Coords;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EndCondition {
    /// Every apple was eaten in order.
    Completed,
    /// No open cell around the head; nothing was moved on the stalling tick.
    Stalled { head: Coords },
    /// The head landed on a wall, a block or the body.
    Collided { at: Coords },
    /// The stop key was pressed.
    Stopped,
    /// `max_ticks` moves were made. A planner stuck in a loop ends here, not
    /// in `Stalled`.
    TickLimit,
}

impl fmt::Display for EndCondition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EndCondition::Completed => write!(f, "all apples eaten"),
            EndCondition::Stalled { head } => write!(f, "stalled at {:?}", head),
            EndCondition::Collided { at } => write!(f, "crashed at {:?}", at),
            EndCondition::Stopped => write!(f, "stopped"),
            EndCondition::TickLimit => write!(f, "tick limit reached"),
        }
    }
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TickReport {
    pub moved: Option<MoveResult>,
    /// Portal entered by the planners this tick.
    pub crossed: Option<Portal>,
    /// Teleport rule that fired in greedy or manual mode.
    pub rule: Option<TeleportRule>,
    pub apple_eaten: Option<Coords>,
    pub end: Option<EndCondition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub ticks: u64,
    pub elapsed: Duration,
    pub apples_eaten: usize,
    pub total_apples: usize,
    pub end: Option<EndCondition>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.end {
            Some(end) => writeln!(f, "Simulation over: {}", end)?,
            None => writeln!(f, "Simulation still running")?,
        }
        writeln!(f, "Moves: {}", self.ticks)?;
        writeln!(f, "Apples eaten: {}/{}", self.apples_eaten, self.total_apples)?;
        write!(f, "Elapsed: {:.2} s", self.elapsed.as_secs_f64())
    }
}

enum Step {
    To { new_head: Coords, heading: Direction, crossed: Option<Portal>, rule: Option<TeleportRule> },
    Stall,
    Crash(Coords),
}

/// Owns the board and the snake and advances them one tick at a time.
pub struct Session {
    config: SimConfig,
    board: Board,
    snake: Snake,
    rules: TeleportRules,
    apple_index: usize,
    ticks: u64,
    route: Option<Route>,
    end: Option<EndCondition>,
    started: Instant,
    finished: Option<Instant>,
}

impl Session {
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut board = Board::initialize(&config);
        board.place_apple(config.apples[0]);
        let snake = Snake::new(config.snake_start, config.snake_length, Direction::Right);
        let rules = TeleportRules::standard();

        info!(
            mode = ?config.mode,
            width = config.width,
            height = config.height,
            apples = config.apples.len(),
            snake_length = config.snake_length,
            teleport_rules = rules.rules().len(),
            "Session initialized"
        );

        Ok(Session {
            config,
            board,
            snake,
            rules,
            apple_index: 0,
            ticks: 0,
            route: None,
            end: None,
            started: Instant::now(),
            finished: None,
        })
    }

    #[cfg(test)]
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn active_apple(&self) -> Option<Coords> {
        self.config.apples.get(self.apple_index).copied()
    }

    pub fn apples_eaten(&self) -> usize {
        self.apple_index
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Latest estimator decision, refreshed after a portal crossing.
    pub fn route(&self) -> Option<Route> {
        self.route
    }

    pub fn end(&self) -> Option<EndCondition> {
        self.end
    }

    /// The board cell with the snake laid over it.
    pub fn cell_kind(&self, pos: Coords) -> CellKind {
        if pos == self.snake.head() {
            CellKind::Head
        } else if self.snake.body().contains(&pos) {
            CellKind::BodySegment
        } else {
            self.board.cell_kind(pos)
        }
    }

    /// Draws walls, the active apple and the snake.
    pub fn draw(&self, renderer: &mut dyn Renderer) -> Result<()> {
        for (pos, kind) in self.board.walls() {
            renderer.draw(pos, symbol(kind))?;
        }
        if let Some(apple) = self.active_apple() {
            renderer.draw(apple, symbol(CellKind::Apple))?;
        }

        // Tail first so the head ends up on top
        for pos in self.snake.body().iter().rev() {
            let glyph = match self.cell_kind(*pos) {
                CellKind::Head => self.snake.head_char(),
                kind => symbol(kind),
            };
            renderer.draw(*pos, glyph)?;
        }
        renderer.flush()
    }

    pub fn stop(&mut self) {
        if self.end.is_none() {
            self.finish(EndCondition::Stopped);
        }
    }

    /// Advances exactly one tick. Once an end condition is reached further
    /// calls change nothing and report it again.
    ///
    /// `steer` is only read in manual mode.
    pub fn tick(&mut self, renderer: &mut dyn Renderer, steer: Option<Direction>) -> Result<TickReport> {
        if let Some(end) = self.end {
            return Ok(TickReport { end: Some(end), ..TickReport::default() });
        }
        if self.config.max_ticks.map_or(false, |limit| self.ticks >= limit) {
            return Ok(self.finish(EndCondition::TickLimit));
        }
        let apple = match self.active_apple() {
            Some(apple) => apple,
            None => return Ok(self.finish(EndCondition::Completed)),
        };

        let (new_head, heading, crossed, rule) = match self.next_step(apple, steer) {
            Step::To { new_head, heading, crossed, rule } => (new_head, heading, crossed, rule),
            Step::Stall => {
                warn!(head = ?self.snake.head(), tick = self.ticks, "No open cell around the head");
                return Ok(self.finish(EndCondition::Stalled { head: self.snake.head() }));
            }
            Step::Crash(at) => return Ok(self.finish(EndCondition::Collided { at })),
        };

        let mv = self.snake.move_to(new_head, heading);
        self.ticks += 1;
        self.render_move(renderer, &mv, apple)?;

        let mut report = TickReport { moved: Some(mv), crossed, rule, ..TickReport::default() };

        if let Some(portal) = crossed {
            // Re-aim from the exit mouth so the route reflects where the head is now
            let route = estimate(new_head, apple, &self.board, self.config.portal_bias);
            self.route = Some(route);
            debug!(
                portal = portal.name(),
                ?new_head,
                waypoint = ?route.waypoint,
                via = ?route.portal,
                cost = route.cost,
                "Crossed portal"
            );
        }
        if let Some(rule) = rule {
            debug!(rule = %rule.name(), ?new_head, "Teleport rule fired");
        }

        if new_head == apple {
            report.apple_eaten = Some(apple);
            self.eat_apple(renderer, apple)?;
            if self.active_apple().is_none() {
                report.end = Some(EndCondition::Completed);
                self.finish(EndCondition::Completed);
            }
        }

        renderer.flush()?;
        Ok(report)
    }

    /// Ticks without pacing until an end condition is reached.
    pub fn run(&mut self, renderer: &mut dyn Renderer) -> Result<Summary> {
        while self.end.is_none() {
            self.tick(renderer, None)?;
        }
        Ok(self.summary())
    }

    pub fn summary(&self) -> Summary {
        let until = self.finished.unwrap_or_else(Instant::now);

        Summary {
            ticks: self.ticks,
            elapsed: until.duration_since(self.started),
            apples_eaten: self.apple_index,
            total_apples: self.config.apples.len(),
            end: self.end,
        }
    }

    #[cfg(test)]
    pub fn replace_snake(&mut self, snake: Snake) {
        self.snake = snake;
    }

    ///////////////////////////////////////////////////////////////////////////

    fn next_step(&mut self, apple: Coords, steer: Option<Direction>) -> Step {
        let head = self.snake.head();

        let planned = match self.config.mode {
            DriveMode::Autopilot => Some(self.ladder_step(apple)),
            DriveMode::Search => {
                self.route = None;
                Some(plan_search(&self.snake, apple, &self.board).unwrap_or_else(|| self.ladder_step(apple)))
            }
            DriveMode::Greedy | DriveMode::Manual => None,
        };

        if let Some(outcome) = planned {
            return match outcome {
                StepOutcome::Moved { new_head, heading, crossed } => Step::To { new_head, heading, crossed, rule: None },
                StepOutcome::Stalled => Step::Stall,
            };
        }

        let heading = if self.config.mode == DriveMode::Manual {
            if let Some(dir) = steer {
                self.snake.set_direction(dir);
            }
            self.snake.get_direction()
        } else {
            greedy::choose_direction(head, apple, &self.board)
        };

        match greedy::advance(&self.snake, heading, &self.board, &self.rules) {
            GreedyOutcome::Moved { new_head, heading, rule } => Step::To { new_head, heading, crossed: None, rule },
            GreedyOutcome::Crashed { at } => Step::Crash(at),
        }
    }

    fn ladder_step(&mut self, apple: Coords) -> StepOutcome {
        let route = estimate(self.snake.head(), apple, &self.board, self.config.portal_bias);
        self.route = Some(route);
        plan_step(&self.snake, &route, apple, &self.board, self.config.fallback_bound)
    }

    fn render_move(&self, renderer: &mut dyn Renderer, mv: &MoveResult, apple: Coords) -> Result<()> {
        if let Some(tail) = mv.old_tail {
            if tail == apple {
                renderer.draw(tail, symbol(CellKind::Apple))?;
            } else if !self.snake.body().contains(&tail) {
                renderer.clear(tail)?;
            }
        }
        if self.snake.len() > 1 {
            renderer.draw(mv.old_head, symbol(CellKind::BodySegment))?;
        }
        renderer.draw(mv.new_head, self.snake.head_char())
    }

    fn eat_apple(&mut self, renderer: &mut dyn Renderer, apple: Coords) -> Result<()> {
        self.board.remove_apple(apple);
        self.apple_index += 1;
        if self.config.grow_on_apple {
            self.snake.grow();
        }

        info!(
            apple = ?apple,
            eaten = self.apple_index,
            total = self.config.apples.len(),
            tick = self.ticks,
            "Apple eaten"
        );

        if let Some(next) = self.active_apple() {
            self.board.place_apple(next);
            if !self.snake.body().contains(&next) {
                renderer.draw(next, symbol(CellKind::Apple))?;
            }
        }
        Ok(())
    }

    fn finish(&mut self, end: EndCondition) -> TickReport {
        self.end = Some(end);
        self.finished = Some(Instant::now());

        info!(
            %end,
            ticks = self.ticks,
            eaten = self.apple_index,
            total = self.config.apples.len(),
            "Session finished"
        );

        TickReport { end: Some(end), ..TickReport::default() }
    }
}
