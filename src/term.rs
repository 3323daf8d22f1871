use crate::Coords;
use crate::render::{Renderer, EMPTY_CHAR};
use std::{io::{Stdout, Write, stdout}, time::Duration};

use anyhow::{Context, Result};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, read, poll};

pub type TermInt = u16;

/// Raw-mode terminal with a local copy of everything printed, so a message box
/// can be hidden again without redrawing the board.
pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<char>,
    current_msg: Option<Message>,
}

struct Message {
    top_left: (TermInt, TermInt),
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size().context("Error reading terminal size")?;
        let stdout = stdout();
        let screen = vec![EMPTY_CHAR; width as usize * height as usize];
        Ok(TermManager { width, height, stdout, screen, current_msg: None })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen).context("Error entering alt screen")?;
        terminal::enable_raw_mode().context("Error enabling raw mode")?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking).context("Error hiding cursor")?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode().context("Error disabling raw mode")?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
            .context("Error leaving alt screen")?;
        Ok(())
    }

    pub fn read_key_blocking(&self) -> Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read().context("Error reading key")? {
                return Ok(ev);
            }
        }
    }

    pub fn read_key_events_queue(&self) -> Result<Vec<KeyEvent>> {
        let mut events = vec![];

        while poll(Duration::from_millis(1)).context("Error polling events")? {
            if let Event::Key(ev) = read().context("Error reading key")? {
                events.push(ev);
            }
        }

        Ok(events)
    }

    pub fn get_terminal_size(&self) -> (TermInt, TermInt) {
        (self.width, self.height)
    }

    /// Writes `text` on screen row `row`, padded to the full width.
    pub fn print_line(&mut self, row: TermInt, text: &str) -> Result<()> {
        if row >= self.height {
            return Ok(());
        }

        let padded = format!("{:<width$}", text, width = self.width as usize);
        for (x, ch) in padded.chars().take(self.width as usize).enumerate() {
            self.print_at((x as TermInt, row), ch)?;
        }
        Ok(())
    }

    pub fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let longest = lines.iter().map(|x| x.chars().count()).max().unwrap_or(0);
        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (longest + 2) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (
            center.0.saturating_sub(msg_width / 2),
            center.1.saturating_sub(msg_height / 2),
        );

        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ')?;
            }
        }

        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as TermInt, y), ch)?;
            }
        }

        self.current_msg = Some(Message { width: msg_width, height: msg_height, top_left });
        self.flush()
    }

    pub fn hide_message(&mut self) -> Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };

        // Put back what the box covered
        for y in msg.top_left.1..msg.top_left.1 + msg.height {
            for x in msg.top_left.0..msg.top_left.0 + msg.width {
                if let Some(i) = self.index((x, y)) {
                    let ch = self.screen[i];
                    self.print_at_no_save((x, y), ch)?;
                }
            }
        }

        self.flush()
    }

    pub fn print_at(&mut self, pos: (TermInt, TermInt), ch: char) -> Result<()> {
        if let Some(i) = self.index(pos) {
            self.screen[i] = ch;
            self.print_at_no_save(pos, ch)?;
        }
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All)).context("Error clearing")?;
        self.screen = vec![EMPTY_CHAR; self.width as usize * self.height as usize];
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush().context("Error flushing")
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    // Message boxes print without touching the buffer so they can be undone
    fn print_at_no_save(&mut self, pos: (TermInt, TermInt), ch: char) -> Result<()> {
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch)).context("Error printing")
    }

    fn index(&self, (x, y): (TermInt, TermInt)) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(self.width as usize * y as usize + x as usize)
        } else {
            None
        }
    }
}

/// Board (1, 1) is the top-left screen cell. Approach cells past the top and
/// left edges fall off the screen and are skipped.
pub fn to_screen((x, y): Coords) -> Option<(TermInt, TermInt)> {
    if x >= 1 && y >= 1 {
        Some((x as TermInt - 1, y as TermInt - 1))
    } else {
        None
    }
}

impl Renderer for TermManager {
    fn draw(&mut self, pos: Coords, symbol: char) -> Result<()> {
        match to_screen(pos) {
            Some(screen_pos) => self.print_at(screen_pos, symbol),
            None => Ok(()),
        }
    }

    fn flush(&mut self) -> Result<()> {
        TermManager::flush(self)
    }
}
