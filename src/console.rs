use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue, terminal,
};
use lifegrid::{Grid, Pos2};
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// How long a dead cell keeps glowing after it changed
const FADE: Duration = Duration::from_secs(1);
const FADE_GLYPHS: [&[u8]; 3] = ["\u{2591}".as_bytes(), "\u{2592}".as_bytes(), "\u{2593}".as_bytes()];
const ALIVE_GLYPH: &[u8] = "\u{2588}".as_bytes();
/// How long to block for input while nothing is stepping
const PAUSED_POLL: Duration = Duration::from_millis(100);

pub enum ConsoleCommand {
    Exit,
    Save,
    Handled,
}

pub struct ConsoleRender {
    /// Display pixel shown in the top-left terminal cell
    tl: Pos2,
    report: String,
}
impl ConsoleRender {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), cursor::Hide, EnableMouseCapture)?;
        Ok(Self {
            tl: Pos2::default(),
            report: String::new(),
        })
    }

    /// Draws the part of the grid under the terminal, one pixel per character
    pub fn render(&self, grid: &Grid) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        let rows = rows.saturating_sub(1);
        let size = grid.cell_size() as i32;
        let screen = Pos2::new(cols as i32, rows as i32);
        // cells that overlap the screen, in grid coordinates
        let first = Pos2::new(self.tl.x.div_euclid(size), self.tl.y.div_euclid(size));
        let last = Pos2::new(
            (self.tl.x + screen.x).div_euclid(size) + 1,
            (self.tl.y + screen.y).div_euclid(size) + 1,
        );

        let now = Instant::now();
        let mut stdout = io::stdout();
        queue!(stdout, terminal::Clear(terminal::ClearType::All))?;
        for cell in grid.window(first, last).cells() {
            let glyph = if cell.is_alive() {
                ALIVE_GLYPH
            } else if let Some(intensity) = cell.fade(now, FADE) {
                let i = (intensity * FADE_GLYPHS.len() as f32) as usize;
                FADE_GLYPHS[i.min(FADE_GLYPHS.len() - 1)]
            } else {
                continue;
            };

            let origin = cell.origin(grid.cell_size()) - self.tl;
            for dy in 0..size {
                for dx in 0..size {
                    let px = origin + Pos2::new(dx, dy);
                    if !px.within(screen.x, screen.y) {
                        continue;
                    }
                    queue!(stdout, cursor::MoveTo(px.x as u16, px.y as u16))?;
                    stdout.write_all(glyph)?;
                }
            }
        }

        // write footer
        queue!(stdout, cursor::MoveTo(0, rows))?;
        stdout.write_all(self.report.as_bytes())?;
        if !grid.is_running() {
            stdout.write_all(b"  [paused]")?;
        }

        stdout.flush()
    }

    /// Input timeout for the next poll: none while running, a short block while paused
    pub fn poll_timeout(grid: &Grid) -> Duration {
        if grid.is_running() {
            Duration::ZERO
        } else {
            PAUSED_POLL
        }
    }

    pub fn poll_events(
        &mut self,
        grid: &mut Grid,
        timeout: Duration,
    ) -> io::Result<Option<ConsoleCommand>> {
        // make sure event is preset for us to take
        if !event::poll(timeout)? {
            return Ok(None);
        }

        let mut outp = Ok(Some(ConsoleCommand::Handled));
        match event::read()? {
            // CTRL+C or q
            event::Event::Key(KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            })
            | event::Event::Key(KeyEvent {
                code: KeyCode::Char('q'),
                ..
            }) => {
                outp = Ok(Some(ConsoleCommand::Exit));
            }
            event::Event::Key(KeyEvent {
                code: KeyCode::Char(' '),
                ..
            }) => grid.set_running(!grid.is_running()),
            event::Event::Key(KeyEvent {
                code: KeyCode::Char('r'),
                ..
            }) => grid.reset(),
            event::Event::Key(KeyEvent {
                code: KeyCode::Char('s'),
                ..
            }) => {
                outp = Ok(Some(ConsoleCommand::Save));
            }
            // arrows to move grid
            event::Event::Key(KeyEvent {
                code: code @ (KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right),
                ..
            }) => match code {
                KeyCode::Up => self.tl.y -= 1,
                KeyCode::Down => self.tl.y += 1,
                KeyCode::Left => self.tl.x -= 1,
                KeyCode::Right => self.tl.x += 1,
                _ => {}
            },
            // left click toggles the cell under the pointer, right click pauses
            event::Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(button),
                column,
                row,
                ..
            }) => match button {
                MouseButton::Left => {
                    let px = self.tl + Pos2::new(column as i32, row as i32);
                    grid.toggle_at_pixel(px.x, px.y);
                }
                MouseButton::Right => grid.set_running(!grid.is_running()),
                MouseButton::Middle => {}
            },
            _ => {}
        }
        outp
    }

    pub fn set_report(&mut self, report: String) {
        self.report = report;
    }
}
impl Drop for ConsoleRender {
    fn drop(&mut self) {
        // if we can enable it, we should be able to disable it
        terminal::disable_raw_mode().expect("disable raw mode");
        execute!(io::stdout(), DisableMouseCapture, cursor::Show).expect("enable cursor");
    }
}
