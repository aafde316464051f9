use crate::engine::{Grid, GridError};
use crate::pos::Pos2;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use thiserror::Error;

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*x\s*=\s*(\d+)\s*,\s*y\s*=\s*(\d+)").expect("header regex")
});
static TOKENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d*)([bo$!])").expect("token regex"));

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("pattern has no live cells and no size header")]
    Empty,
    #[error("malformed header line {0:?}")]
    InvalidHeader(String),
    #[error("run length {0:?} is out of range")]
    InvalidRun(String),
    #[error("live cell ({x}, {y}) lies outside the {width}x{height} pattern")]
    OutsidePattern { x: i32, y: i32, width: i64, height: i64 },
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// A decoded pattern: live positions plus the size stated in its header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub size: Option<(i64, i64)>,
    pub alive: Vec<Pos2>,
}

impl Pattern {
    /// The grid size: the header's if present, otherwise the bounding box
    pub fn dimensions(&self) -> Result<(i64, i64), PatternError> {
        if let Some(size) = self.size {
            return Ok(size);
        }
        let width = self.alive.iter().map(|p| p.x).max().ok_or(PatternError::Empty)?;
        let height = self.alive.iter().map(|p| p.y).max().ok_or(PatternError::Empty)?;
        Ok((width as i64 + 1, height as i64 + 1))
    }

    /// Seeds a fresh grid whose size is fixed by the pattern
    pub fn into_grid(self) -> Result<Grid, PatternError> {
        let (width, height) = self.dimensions()?;
        let alive: HashSet<Pos2> = self.alive.into_iter().collect();
        if let Some(p) = alive.iter().find(|p| p.x as i64 >= width || p.y as i64 >= height) {
            return Err(PatternError::OutsidePattern {
                x: p.x,
                y: p.y,
                width,
                height,
            });
        }
        Ok(Grid::from_predicate(width, height, |x, y| {
            alive.contains(&Pos2::new(x, y))
        })?)
    }
}

pub trait PatternEncoder {
    fn encode(self, grid: &Grid) -> String;
    fn decode(self, value: &str) -> Result<Pattern, PatternError>;
}

struct RunEncoder {
    sequence: String,
    line_len: usize,
    max_line_len: usize,
}
impl RunEncoder {
    fn new(max_line_len: usize) -> Self {
        Self {
            sequence: String::new(),
            line_len: 0,
            max_line_len,
        }
    }

    fn push_run(&mut self, run: i32, c: char) {
        let append = match run {
            0 => return,
            1 => c.to_string(),
            n => format!("{}{}", n, c),
        };
        if self.line_len + append.len() > self.max_line_len {
            self.sequence.push('\n');
            self.line_len = 0;
        }
        self.line_len += append.len();
        self.sequence.push_str(&append);
    }

    fn end(mut self) -> String {
        self.sequence.push('!');
        self.sequence
    }
}

/// The RLE pattern format, anchored at the grid origin
///
/// The header carries the full grid size so that loading reproduces the same
/// topology, the way an image's dimensions would.
pub struct RunLengthEncoded {
    name: Option<String>,
}
impl RunLengthEncoded {
    pub fn set_name<T: AsRef<str>>(mut self, name: T) -> Self {
        self.name = Some(name.as_ref().to_owned());
        self
    }

    fn encode_header(&self, grid: &Grid) -> String {
        let mut header = String::new();
        if let Some(name) = &self.name {
            header.push_str(&format!("#N {}\n", name));
        }
        header.push_str(&format!(
            "x = {}, y = {}, rule = B3/S23",
            grid.width(),
            grid.height()
        ));
        header
    }

    fn encode_cells(&self, alive_cells: &[Pos2]) -> String {
        // start just left of the origin so a live (0, 0) extends the first run
        let mut last = Pos2::new(-1, 0);
        let mut alive_run = 0;
        let mut seq = RunEncoder::new(70);
        for &pos in alive_cells {
            if last.y == pos.y && last.x + 1 == pos.x {
                alive_run += 1;
                last = pos;
                continue;
            }

            let lines_run = pos.y - last.y;
            let dead_run = match lines_run {
                0 => pos.x - last.x - 1,
                _ => pos.x,
            };
            // NOTE: order matters!
            seq.push_run(alive_run, 'o');
            seq.push_run(lines_run, '$');
            seq.push_run(dead_run, 'b');

            alive_run = 1;
            last = pos;
        }

        seq.push_run(alive_run, 'o');
        seq.end()
    }
}
impl Default for RunLengthEncoded {
    fn default() -> Self {
        Self { name: None }
    }
}

impl PatternEncoder for RunLengthEncoded {
    fn encode(self, grid: &Grid) -> String {
        format!(
            "{}\n{}\n",
            self.encode_header(grid),
            self.encode_cells(&grid.live_positions())
        )
    }

    fn decode(self, value: &str) -> Result<Pattern, PatternError> {
        let mut size = None;
        let mut alive = Vec::new();
        let mut cursor = Pos2::default();
        'lines_loop: for mut line in value.lines() {
            if let Some(i) = line.find('#') {
                line = &line[..i];
            }
            if line.trim_start().starts_with('x') {
                let caps = HEADER
                    .captures(line)
                    .ok_or_else(|| PatternError::InvalidHeader(line.to_owned()))?;
                let parse = |s: &str| {
                    s.parse::<i64>()
                        .map_err(|_| PatternError::InvalidHeader(line.to_owned()))
                };
                size = Some((parse(&caps[1])?, parse(&caps[2])?));
                continue;
            }

            for (_, [run_str, state]) in TOKENS.captures_iter(line).map(|x| x.extract()) {
                let run = match run_str {
                    "" => 1,
                    s => s
                        .parse::<i32>()
                        .map_err(|_| PatternError::InvalidRun(s.to_owned()))?,
                };
                let advance = |from: i32| {
                    from.checked_add(run)
                        .ok_or_else(|| PatternError::InvalidRun(run_str.to_owned()))
                };
                match state {
                    "!" => break 'lines_loop,
                    "o" => {
                        let end = advance(cursor.x)?;
                        // a header bounds every run, so stop before the first stray cell
                        if let Some((width, height)) = size {
                            let below = cursor.y as i64 >= height;
                            if below || end as i64 > width {
                                return Err(PatternError::OutsidePattern {
                                    // end fits an i32, so an overrun width does too
                                    x: if below { cursor.x } else { cursor.x.max(width as i32) },
                                    y: cursor.y,
                                    width,
                                    height,
                                });
                            }
                        }
                        alive.extend((cursor.x..end).map(|x| Pos2::new(x, cursor.y)));
                        cursor.x = end;
                    }
                    "b" => cursor.x = advance(cursor.x)?,
                    "$" => {
                        cursor.x = 0;
                        cursor.y = advance(cursor.y)?;
                    }
                    _ => unreachable!(),
                }
            }
        }

        Ok(Pattern { size, alive })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: i32, y: i32) -> Pos2 {
        Pos2::new(x, y)
    }

    #[test]
    fn encodes_full_grid_size() {
        let grid = Grid::from_predicate(5, 4, |x, y| y == 2 && (1..=3).contains(&x)).unwrap();
        let encoded = RunLengthEncoded::default().set_name("blinker").encode(&grid);

        assert_eq!(encoded, "#N blinker\nx = 5, y = 4, rule = B3/S23\n2$b3o!\n");
    }

    #[test]
    fn encodes_origin_cell_and_gaps() {
        let alive = [(0, 0), (1, 0), (4, 0), (2, 2)];
        let grid = Grid::from_predicate(6, 3, |x, y| alive.contains(&(x, y))).unwrap();
        let encoded = RunLengthEncoded::default().encode(&grid);

        assert_eq!(encoded, "x = 6, y = 3, rule = B3/S23\n2o2bo2$2bo!\n");
    }

    #[test]
    fn decodes_glider() {
        let pattern = RunLengthEncoded::default()
            .decode("#C a glider\nx = 3, y = 3, rule = B3/S23\nbo$2bo$3o!")
            .unwrap();

        assert_eq!(pattern.size, Some((3, 3)));
        assert_eq!(pattern.alive, vec![pos(1, 0), pos(2, 1), pos(0, 2), pos(1, 2), pos(2, 2)]);
    }

    #[test]
    fn header_fixes_grid_size() {
        let grid = RunLengthEncoded::default()
            .decode("x = 8, y = 6\nbo$2bo$3o!\n")
            .and_then(Pattern::into_grid)
            .unwrap();

        assert_eq!((grid.width(), grid.height()), (8, 6));
        assert_eq!(grid.live_count(), 5);
        assert!(!grid.is_running());
    }

    #[test]
    fn missing_header_uses_bounding_box() {
        let pattern = RunLengthEncoded::default().decode("3o$$4bo!").unwrap();

        assert_eq!(pattern.size, None);
        assert_eq!(pattern.dimensions().unwrap(), (5, 3));
    }

    #[test]
    fn saved_grid_loads_back() {
        let mut grid = Grid::new(30, 20, 1).unwrap();
        grid.set_running(true);
        for _ in 0..5 {
            grid.step();
        }
        let encoded = RunLengthEncoded::default().encode(&grid);
        let loaded = RunLengthEncoded::default()
            .decode(&encoded)
            .and_then(Pattern::into_grid)
            .unwrap();

        assert_eq!((loaded.width(), loaded.height()), (30, 20));
        assert_eq!(loaded.live_positions(), grid.live_positions());
    }

    #[test]
    fn overflowing_runs_are_errors() {
        let rle = RunLengthEncoded::default;

        assert!(matches!(rle().decode("2147483647b2bo!"), Err(PatternError::InvalidRun(_))));
        assert!(matches!(rle().decode("2147483647$$o!"), Err(PatternError::InvalidRun(_))));
        assert!(matches!(rle().decode("bo2147483647o!"), Err(PatternError::InvalidRun(_))));
        assert!(matches!(
            rle().decode("x = 3, y = 3\n2000000000o!"),
            Err(PatternError::OutsidePattern { x: 3, y: 0, width: 3, height: 3 })
        ));
        assert!(matches!(
            rle().decode("x = 3, y = 3\n5bo!"),
            Err(PatternError::OutsidePattern { x: 5, y: 0, .. })
        ));
    }

    #[test]
    fn rejects_bad_input() {
        let rle = RunLengthEncoded::default;

        assert!(matches!(rle().decode("x = ?, y = 3\no!"), Err(PatternError::InvalidHeader(_))));
        assert!(matches!(rle().decode("99999999999o!"), Err(PatternError::InvalidRun(_))));
        assert!(matches!(rle().decode("!").unwrap().into_grid(), Err(PatternError::Empty)));
        assert!(matches!(
            rle().decode("x = 2, y = 2\n3o!"),
            Err(PatternError::OutsidePattern { x: 2, y: 0, .. })
        ));
        assert!(matches!(
            rle().decode("x = 3, y = 2\n2$o!"),
            Err(PatternError::OutsidePattern { x: 0, y: 2, .. })
        ));
        assert!(matches!(
            rle().decode("2o$2o!").unwrap().into_grid(),
            Ok(grid) if grid.live_count() == 4
        ));
        assert!(matches!(
            rle().decode("x = 0, y = 4\n!").unwrap().into_grid(),
            Err(PatternError::Grid(GridError::InvalidTopology { .. }))
        ));
    }
}
