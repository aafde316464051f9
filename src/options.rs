use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use lifegrid::{Grid, GridError};

/// Display size used when not running in the terminal
const DEFAULT_SIZE: (u32, u32) = (1920, 1080);

pub struct Args {
    matches: getopts::Matches,
}

impl Args {
    fn new<T: AsRef<str>>(args: &[T]) -> Result<Option<Self>> {
        let mut opts = getopts::Options::new();
        opts.optflag("", "help", "print this help menu");
        opts.optflag("c", "console", "run in console mode");
        opts.optflag("t", "threads", "evaluate generations on the thread pool");
        opts.optflag("p", "paused", "start with stepping disabled");
        opts.optopt("o", "output", "save the final grid to an RLE file", "FILE");
        opts.optopt("i", "input", "load the grid from an RLE file", "FILE");
        opts.optopt("w", "width", "display width in pixels", "PIXELS");
        opts.optopt("h", "height", "display height in pixels", "PIXELS");
        opts.optopt("z", "cell-size", "size of a cell in pixels", "PIXELS");
        opts.optopt(
            "f",
            "fill",
            "initial pattern: acorn, random, alternating, all or empty",
            "TYPE",
        );
        opts.optopt(
            "s",
            "sleep",
            "the amount of time to sleep between generations",
            "MILLIS",
        );
        opts.optopt("g", "gens", "max number of generations", "COUNT");
        opts.optopt("", "stats", "write stats csv to file", "FILE");

        let matches = opts
            .parse(args.iter().map(T::as_ref))
            .context("invalid arguments")?;
        if matches.opt_present("help") {
            println!("{}", opts.usage("usage: lifegrid [options]"));
            Ok(None)
        } else {
            Ok(Some(Self { matches }))
        }
    }
    pub fn from_env() -> Result<Option<Self>> {
        let env = std::env::args().skip(1).collect::<Vec<_>>();
        Self::new(&env)
    }

    fn get<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.matches
            .opt_get(name)
            .map_err(|e| anyhow!("invalid value for --{}: {}", name, e))
    }

    pub fn console(&self) -> bool {
        self.matches.opt_present("console")
    }
    pub fn multithreading(&self) -> bool {
        self.matches.opt_present("threads")
    }
    pub fn paused(&self) -> bool {
        self.matches.opt_present("paused")
    }

    pub fn generations(&self) -> Result<u64> {
        Ok(self.get("gens")?.unwrap_or(u64::MAX)) // kinda hacky way of saying "infinity"
    }
    pub fn sleep(&self) -> Result<Option<Duration>> {
        Ok(match self.get("sleep")? {
            Some(millis) => Some(Duration::from_millis(millis)),
            None if self.console() => Some(Duration::from_millis(100)),
            None => None,
        })
    }

    /// Display size in pixels; the terminal size in console mode
    pub fn display_size(&self) -> Result<(u32, u32)> {
        let default = if self.console() {
            let (cols, rows) = crossterm::terminal::size().context("query terminal size")?;
            // keep the last row for the status line
            (cols as u32, rows.saturating_sub(1) as u32)
        } else {
            DEFAULT_SIZE
        };

        Ok((
            self.get("width")?.unwrap_or(default.0),
            self.get("height")?.unwrap_or(default.1),
        ))
    }
    pub fn cell_size(&self) -> Result<u32> {
        Ok(self.get("cell-size")?.unwrap_or(1))
    }
    pub fn fill_mode(&self) -> Result<FillMode> {
        let mode_str = self.matches.opt_str("fill");
        let mode_str = mode_str.as_deref().unwrap_or("acorn");
        FillMode::new(mode_str).ok_or_else(|| anyhow!("unknown fill mode {:?}", mode_str))
    }

    pub fn output_file(&self) -> Option<String> {
        self.matches.opt_str("output")
    }
    pub fn input_file(&self) -> Option<String> {
        self.matches.opt_str("input")
    }

    pub fn stats_file(&self) -> Option<String> {
        self.matches.opt_str("stats")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMode {
    Acorn,
    Random,
    Alternating,
    All,
    Empty,
}
impl FillMode {
    fn new<S: AsRef<str>>(s: S) -> Option<Self> {
        match s.as_ref() {
            "acorn" => Some(Self::Acorn),
            "random" => Some(Self::Random),
            "alternating" => Some(Self::Alternating),
            "all" => Some(Self::All),
            "empty" => Some(Self::Empty),
            _ => None,
        }
    }

    fn fill_cell<R: rand::Rng>(&self, x: i32, y: i32, rng: &mut R) -> bool {
        match self {
            Self::Random => rng.random_bool(0.5),
            Self::Alternating => (x + y) % 2 == 0,
            Self::All => true,
            Self::Acorn | Self::Empty => false,
        }
    }

    /// Builds a grid covering `width` x `height` pixels
    pub fn create_grid(self, width: u32, height: u32, cell_size: u32) -> Result<Grid, GridError> {
        if self == Self::Acorn {
            return Grid::new(width, height, cell_size);
        }
        if cell_size == 0 {
            return Err(GridError::ZeroCellSize);
        }

        let mut rng = rand::rng();
        Grid::from_predicate(
            (width / cell_size) as i64,
            (height / cell_size) as i64,
            |x, y| self.fill_cell(x, y, &mut rng),
        )?
        .with_cell_size(cell_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifegrid::Pos2;

    fn args(args: &[&str]) -> Args {
        Args::new(args).unwrap().expect("not a help request")
    }

    fn pos(x: i32, y: i32) -> Pos2 {
        Pos2 { x, y }
    }

    #[test]
    fn fill_mode_parses() {
        assert_eq!(args(&["--fill", "alternating"]).fill_mode().unwrap(), FillMode::Alternating);
        assert_eq!(args(&[]).fill_mode().unwrap(), FillMode::Acorn);
        assert!(args(&["-f", "spiral"]).fill_mode().is_err());
    }

    #[test]
    fn numeric_options_are_validated() {
        let parsed = args(&["-w", "64", "-h", "32", "--cell-size", "4", "-g", "10"]);

        assert_eq!(parsed.display_size().unwrap(), (64, 32));
        assert_eq!(parsed.cell_size().unwrap(), 4);
        assert_eq!(parsed.generations().unwrap(), 10);
        assert!(args(&["-w", "wide"]).display_size().is_err());
    }

    #[test]
    fn headless_defaults() {
        let parsed = args(&[]);

        assert_eq!(parsed.display_size().unwrap(), DEFAULT_SIZE);
        assert_eq!(parsed.sleep().unwrap(), None);
        assert_eq!(parsed.generations().unwrap(), u64::MAX);
    }

    #[test]
    fn help_returns_none() {
        assert!(Args::new(&["--help"]).unwrap().is_none());
    }

    #[test]
    fn create_grid_all_fills_grid() {
        let grid = FillMode::All.create_grid(6, 4, 2).unwrap();

        assert_eq!((grid.width(), grid.height()), (3, 2));
        assert_eq!(grid.live_count(), 6);
        assert_eq!(grid.cell_size(), 2);
    }

    #[test]
    fn create_grid_empty_is_empty() {
        let grid = FillMode::Empty.create_grid(5, 4, 1).unwrap();

        assert_eq!(grid.live_count(), 0);
    }

    #[test]
    fn create_grid_alternating_uses_parity() {
        let grid = FillMode::Alternating.create_grid(3, 3, 1).unwrap();

        let expected = vec![pos(0, 0), pos(2, 0), pos(1, 1), pos(0, 2), pos(2, 2)];
        assert_eq!(grid.live_positions(), expected);
    }

    #[test]
    fn create_grid_rejects_zero_cell_size() {
        assert_eq!(FillMode::Random.create_grid(4, 3, 0).unwrap_err(), GridError::ZeroCellSize);
        assert_eq!(FillMode::Acorn.create_grid(4, 3, 0).unwrap_err(), GridError::ZeroCellSize);
    }

    #[test]
    fn acorn_is_default_seed() {
        let grid = FillMode::Acorn.create_grid(100, 100, 2).unwrap();

        assert_eq!(grid.live_count(), 7);
        assert!(grid.cell(pos(25, 25)).unwrap().is_alive());
    }
}
