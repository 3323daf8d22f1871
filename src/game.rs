use std::{thread::sleep, time::Duration};

use anyhow::{bail, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::info;

use crate::config::{DriveMode, SimConfig};
use crate::render::{Renderer, DEAD_SNAKE_CHAR};
use crate::session::{EndCondition, Session, Summary};
use crate::snake::Direction::{self, *};
use crate::term::{TermInt, TermManager};

// Input is polled this often while waiting for the next tick
const POLL_INTERVAL_MS: u64 = 5;

/// What the user asked for since the last tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Command {
    Steer(Direction),
    TogglePause,
    Stop,
}

/// Interactive front end: draws the session on the terminal and paces it.
pub struct SnakeGame {
    term: TermManager,
    config: SimConfig,
    paused: bool,
}

impl SnakeGame {
    pub fn new(config: SimConfig) -> Result<Self> {
        Ok(SnakeGame { term: TermManager::new()?, config, paused: false })
    }

    pub fn initialize(&mut self) -> Result<()> {
        let (w, h) = self.term.get_terminal_size();
        let (need_w, need_h) = (self.config.width as TermInt, self.config.height as TermInt + 1);

        if w < need_w || h < need_h {
            bail!("Terminal is {}x{}, the board needs at least {}x{}", w, h, need_w, need_h);
        }

        self.term.setup()
    }

    /// Returns false when the user quit from the intro screen.
    pub fn show_intro(&mut self) -> Result<bool> {
        let stop_line = format!("'{}' or CTRL+C to stop", self.config.stop_key);
        let mut lines = vec![];
        if self.config.mode == DriveMode::Manual {
            lines.push("Arrow keys or WASD to move");
        }
        lines.extend_from_slice(&["Esc to pause", stop_line.as_str(), "", "Press any key to begin"]);

        self.term.show_message(&lines)?;

        let key = self.term.read_key_blocking()?;
        if is_ctrl_c(&key) {
            return Ok(false);
        }

        self.term.hide_message()?;
        Ok(true)
    }

    pub fn play(&mut self) -> Result<Summary> {
        let mut session = Session::new(self.config.clone())?;

        self.term.clear()?;
        session.draw(&mut self.term)?;
        self.show_status(&session)?;

        let tick_delay = self.config.tick_delay;
        let poll = Duration::from_millis(POLL_INTERVAL_MS);
        let mut waited = Duration::from_millis(0);
        let mut steer: Option<Direction> = None;

        while session.end().is_none() {
            sleep(poll);

            for key_ev in self.term.read_key_events_queue()? {
                match self.command_for(&key_ev) {
                    Some(Command::Steer(dir)) => steer = Some(dir),
                    Some(Command::TogglePause) => self.toggle_pause()?,
                    Some(Command::Stop) => session.stop(),
                    None => {}
                }
            }

            if self.paused || session.end().is_some() {
                continue;
            }

            waited += poll;
            if waited < tick_delay {
                continue;
            }
            waited = Duration::from_millis(0);

            session.tick(&mut self.term, steer.take())?;
            self.show_status(&session)?;
        }

        let summary = session.summary();
        info!(ticks = summary.ticks, eaten = summary.apples_eaten, "Game over");
        self.game_over(&session, &summary)?;

        self.term.read_key_blocking()?;
        Ok(summary)
    }

    pub fn restore(&mut self) -> Result<()> {
        self.term.restore()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn command_for(&self, ev: &KeyEvent) -> Option<Command> {
        if is_ctrl_c(ev) {
            return Some(Command::Stop);
        }

        let manual = self.config.mode == DriveMode::Manual;

        match ev.code {
            KeyCode::Up if manual => Some(Command::Steer(Up)),
            KeyCode::Down if manual => Some(Command::Steer(Down)),
            KeyCode::Left if manual => Some(Command::Steer(Left)),
            KeyCode::Right if manual => Some(Command::Steer(Right)),
            // WASD wins over the stop key when they collide
            KeyCode::Char(c) if manual && direction_for_char(c).is_some() => direction_for_char(c).map(Command::Steer),
            KeyCode::Char(c) if c == self.config.stop_key => Some(Command::Stop),
            KeyCode::Esc => Some(Command::TogglePause),
            _ => None,
        }
    }

    fn game_over(&mut self, session: &Session, summary: &Summary) -> Result<()> {
        if let Some(EndCondition::Collided { .. }) = summary.end {
            for pos in session.snake().body() {
                self.term.draw(*pos, DEAD_SNAKE_CHAR)?;
            }
        }

        let headline = match summary.end {
            Some(EndCondition::Completed) => "All apples eaten!".to_string(),
            Some(end) => format!("Simulation over: {}", end),
            None => "Simulation over".to_string(),
        };
        let moves = format!("Moves: {}", summary.ticks);
        let apples = format!("Apples: {}/{}", summary.apples_eaten, summary.total_apples);
        let elapsed = format!("Time: {:.1} s", summary.elapsed.as_secs_f64());

        self.term.show_message(&[&headline, &moves, &apples, &elapsed, "", "Press any key to exit"])
    }

    fn show_status(&mut self, session: &Session) -> Result<()> {
        let aim = match session.route() {
            Some(route) => match route.portal {
                Some(portal) => format!("via {} portal", portal.name()),
                None => "direct".to_string(),
            },
            None => "-".to_string(),
        };
        let status = format!(
            "Apples {}/{}   Moves {}   Mode {:?}   Route {}",
            session.apples_eaten(),
            self.config.apples.len(),
            session.ticks(),
            self.config.mode,
            aim,
        );
        self.term.print_line(self.config.height as TermInt, &status)?;
        self.term.flush()
    }

    fn toggle_pause(&mut self) -> Result<()> {
        if !self.paused {
            self.term.show_message(&["Paused", "Press Esc to resume", "or CTRL+C to stop"])?;
        } else {
            self.term.hide_message()?;
        }

        self.paused = !self.paused;
        Ok(())
    }
}

fn direction_for_char(c: char) -> Option<Direction> {
    match c {
        'w' => Some(Up),
        'a' => Some(Left),
        's' => Some(Down),
        'd' => Some(Right),
        _ => None,
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
