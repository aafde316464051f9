use super::{Cell, Grid};
use crate::Pos2;

/// A read-only rectangular view of a [`Grid`], in cell coordinates
///
/// The rectangle is half-open (`top_left` inclusive, `bottom_right`
/// exclusive) and may extend past the grid; the parts outside are empty.
pub struct GridWindow<'a> {
    tl: Pos2,
    br: Pos2,
    grid: &'a Grid,
}
impl<'a> GridWindow<'a> {
    pub fn new(grid: &'a Grid, top_left: Pos2, bottom_right: Pos2) -> Self {
        Self {
            tl: top_left,
            br: bottom_right,
            grid,
        }
    }

    #[inline]
    pub fn top_left(&self) -> Pos2 {
        self.tl
    }

    /// Live cells inside the window, straight from the live set
    pub fn iter(&self) -> impl Iterator<Item = &'a Cell> {
        let (tl, br) = (self.tl, self.br);
        self.grid.live_cells().filter(move |cell| {
            let pos = cell.pos();
            (tl.x..br.x).contains(&pos.x) && (tl.y..br.y).contains(&pos.y)
        })
    }

    /// Every cell inside the window, row by row
    pub fn cells(&self) -> impl Iterator<Item = &'a Cell> {
        let grid = self.grid;
        let xs = self.tl.x.max(0)..self.br.x.min(grid.width());
        (self.tl.y.max(0)..self.br.y.min(grid.height()))
            .flat_map(move |y| xs.clone().map(move |x| Pos2::new(x, y)))
            .filter_map(move |pos| grid.cell(pos))
    }
}

impl std::fmt::Display for GridWindow<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = (self.br.x - self.tl.x).max(0) as usize;
        let mut row = String::with_capacity(width * 3);
        for y in self.tl.y..self.br.y {
            row.clear();
            for x in self.tl.x..self.br.x {
                let alive = self.grid.cell(Pos2::new(x, y)).is_some_and(Cell::is_alive);
                row.push(if alive { '█' } else { ' ' });
            }
            if y > self.tl.y {
                writeln!(f)?;
            }
            write!(f, "{}", row.trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glider() -> Grid {
        Grid::from_predicate(6, 6, |x, y| [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)].contains(&(x, y)))
            .unwrap()
    }

    #[test]
    fn iter_filters_live_cells() {
        let grid = glider();
        let window = grid.window(Pos2::new(1, 1), Pos2::new(3, 3));
        let mut inside: Vec<_> = window.iter().map(Cell::pos).collect();
        inside.sort();

        assert_eq!(inside, vec![Pos2::new(2, 1), Pos2::new(1, 2), Pos2::new(2, 2)]);
    }

    #[test]
    fn cells_are_clipped_to_the_grid() {
        let grid = glider();
        let window = grid.window(Pos2::new(-2, 4), Pos2::new(2, 10));

        assert_eq!(window.cells().count(), 2 * 2);
        assert_eq!(window.cells().next().map(Cell::pos), Some(Pos2::new(0, 4)));
    }

    #[test]
    fn display_draws_rows() {
        let grid = glider();

        assert_eq!(grid.window(Pos2::new(0, 0), Pos2::new(3, 3)).to_string(), " █\n  █\n███");
        assert_eq!(grid.to_string(), " █\n  █\n███\n\n\n");
    }
}
