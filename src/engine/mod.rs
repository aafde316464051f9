mod candidates;
mod cell;
mod error;
mod index;
mod live;
mod topology;
mod window;

use self::candidates::CandidateSet;
pub use self::cell::Cell;
pub use self::error::GridError;
use self::live::LiveSet;
pub use self::topology::{CellIndex, NeighborList, Topology};
pub use self::window::GridWindow;
use crate::Pos2;
use log::{debug, trace};
use rayon::prelude::*;
use std::time::Instant;

/// Result of asking the grid to advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Stepping is disabled; nothing changed but observers may still repaint
    Paused,
    /// A generation was committed and `changed` cells flipped state
    Advanced { changed: usize },
}

/// A pending state change produced by evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub pos: Pos2,
    pub alive: bool,
}

/// A bounded Game of Life grid that only evaluates cells near life
///
/// The grid owns every [`Cell`] in a dense array along with the set of live
/// cells. A step evaluates just the live cells and their neighbors, since no
/// other cell can change, then commits all transitions at once.
#[derive(Debug, Clone)]
pub struct Grid {
    topology: Topology,
    cell_size: u32,
    cells: Vec<Cell>,
    live: LiveSet,
    candidates: CandidateSet,
    next: Vec<bool>,
    changes: Vec<CellIndex>,
    seed: Vec<CellIndex>,
    generation: u64,
    running: bool,
}

impl Grid {
    /// Creates a grid covering a display area, seeded with the default pattern
    ///
    /// The grid size is `pixel_width / cell_size` by `pixel_height / cell_size`.
    pub fn new(pixel_width: u32, pixel_height: u32, cell_size: u32) -> Result<Self, GridError> {
        let cell_size = check_cell_size(cell_size)?;
        let topology = Topology::new(
            (pixel_width / cell_size) as i64,
            (pixel_height / cell_size) as i64,
        )?;
        let seed = acorn(&topology);
        Ok(Self::build(topology, cell_size, seed))
    }

    /// Creates a grid of `width` by `height` cells, alive wherever `alive(x, y)`
    pub fn from_predicate<F>(width: i64, height: i64, alive: F) -> Result<Self, GridError>
    where
        F: FnMut(i32, i32) -> bool,
    {
        let topology = Topology::new(width, height)?;
        let seed = seed_with(&topology, alive);
        Ok(Self::build(topology, 1, seed))
    }

    /// Replaces the whole grid with a new topology and seed
    ///
    /// On [`GridError::InvalidTopology`] the current grid is left untouched.
    /// The cell size and the running flag carry over.
    pub fn seed_from<F>(&mut self, width: i64, height: i64, alive: F) -> Result<(), GridError>
    where
        F: FnMut(i32, i32) -> bool,
    {
        let topology = Topology::new(width, height)?;
        let seed = seed_with(&topology, alive);
        let running = self.running;
        *self = Self::build(topology, self.cell_size, seed);
        self.running = running;
        Ok(())
    }

    /// Changes the pixel size used by [`Grid::cell_at`]
    pub fn with_cell_size(mut self, cell_size: u32) -> Result<Self, GridError> {
        self.cell_size = check_cell_size(cell_size)?;
        Ok(self)
    }

    fn build(topology: Topology, cell_size: u32, seed: Vec<CellIndex>) -> Self {
        let len = topology.len();
        let mut grid = Self {
            topology,
            cell_size,
            cells: Vec::new(),
            live: LiveSet::with_capacity(len),
            candidates: CandidateSet::with_capacity(len),
            next: Vec::new(),
            changes: Vec::new(),
            seed,
            generation: 0,
            running: false,
        };
        grid.setup();
        grid
    }

    /// (Re)creates every cell and applies the seed
    fn setup(&mut self) {
        let topology = self.topology;
        self.cells.clear();
        self.cells.extend((0..topology.len()).map(|i| Cell::new(topology.pos(i))));
        self.live.clear();
        self.candidates.clear();
        self.changes.clear();
        for i in 0..self.seed.len() {
            let i = self.seed[i] as usize;
            self.write_alive(i, true);
        }
        debug!(
            "grid {}x{} seeded with {} live cells",
            topology.width(),
            topology.height(),
            self.live.len()
        );
    }

    /// Rebuilds the grid to its seeded pattern and stops it
    pub fn reset(&mut self) {
        self.running = false;
        self.generation = 0;
        self.setup();
    }

    /// Advances one generation if the grid is running
    pub fn step(&mut self) -> StepOutcome {
        if !self.running {
            return StepOutcome::Paused;
        }
        let changed = self.evaluate().commit();
        self.log_step(changed);
        StepOutcome::Advanced { changed }
    }

    /// Same as [`Grid::step`], evaluating candidates on the rayon thread pool
    ///
    /// Commit stays sequential.
    pub fn step_parallel(&mut self) -> StepOutcome {
        if !self.running {
            return StepOutcome::Paused;
        }
        let changed = self.evaluate_parallel().commit();
        self.log_step(changed);
        StepOutcome::Advanced { changed }
    }

    fn log_step(&self, changed: usize) {
        trace!(
            "generation {}: {} candidates, {} changed, {} alive",
            self.generation,
            self.candidates.len(),
            changed,
            self.live.len()
        );
    }

    /// Evaluates the next generation without applying it
    ///
    /// The returned guard holds the grid mutably, so no toggle or second
    /// evaluation can happen until it is committed or dropped. This ignores the
    /// running flag; [`Grid::step`] is the gated entry point.
    pub fn evaluate(&mut self) -> PendingGeneration<'_> {
        self.collect_candidates();
        let Self {
            topology,
            cells,
            candidates,
            next,
            ..
        } = &mut *self;
        let topology: &Topology = topology;
        let cells: &[Cell] = cells;
        next.clear();
        next.extend(
            candidates
                .as_slice()
                .iter()
                .map(|&i| cells[i as usize].evaluate(cells, topology)),
        );
        self.stage()
    }

    /// Parallel counterpart of [`Grid::evaluate`]
    pub fn evaluate_parallel(&mut self) -> PendingGeneration<'_> {
        self.collect_candidates();
        let Self {
            topology,
            cells,
            candidates,
            next,
            ..
        } = &mut *self;
        let topology: &Topology = topology;
        let cells: &[Cell] = cells;
        candidates
            .as_slice()
            .par_iter()
            .map(|&i| cells[i as usize].evaluate(cells, topology))
            .collect_into_vec(next);
        self.stage()
    }

    /// Rebuilds the cells of interest: every live cell and its neighbors
    fn collect_candidates(&mut self) {
        let Self {
            topology,
            cells,
            live,
            candidates,
            ..
        } = &mut *self;
        candidates.clear();
        for i in live.iter() {
            candidates.insert(i);
            for neighbor in cells[i].neighbors(topology).iter() {
                candidates.insert(neighbor);
            }
        }
    }

    /// Writes the evaluated states into the candidates and gathers the changes
    fn stage(&mut self) -> PendingGeneration<'_> {
        let Self {
            cells,
            candidates,
            next,
            changes,
            ..
        } = &mut *self;
        changes.clear();
        for (&i, &alive) in candidates.as_slice().iter().zip(next.iter()) {
            if cells[i as usize].stage(alive) {
                changes.push(i);
            }
        }
        PendingGeneration {
            grid: self,
            committed: false,
        }
    }

    fn apply_changes(&mut self) -> usize {
        let now = Instant::now();
        let Self {
            cells,
            live,
            changes,
            ..
        } = &mut *self;
        for &i in changes.iter() {
            let i = i as usize;
            let cell = &mut cells[i];
            if cell.alive_next() {
                live.insert(i);
            } else {
                live.remove(i);
            }
            cell.commit(now);
            debug_assert_eq!(live.contains(i), cell.is_alive(), "live set diverged at {i}");
        }
        let changed = changes.len();
        changes.clear();
        self.generation += 1;
        changed
    }

    fn discard_changes(&mut self) {
        let Self {
            cells,
            candidates,
            changes,
            ..
        } = &mut *self;
        for &i in candidates.as_slice() {
            cells[i as usize].unstage();
        }
        changes.clear();
    }

    fn write_alive(&mut self, i: usize, alive: bool) {
        self.cells[i].set_alive(alive);
        if alive {
            self.live.insert(i);
        } else {
            self.live.remove(i);
        }
    }

    /// Sets the state of the cell at `pos`, keeping the live set in sync
    pub fn set_alive(&mut self, pos: Pos2, alive: bool) -> Result<(), GridError> {
        let i = self
            .topology
            .index(pos)
            .ok_or(GridError::OutOfBounds { x: pos.x, y: pos.y })?;
        self.write_alive(i, alive);
        Ok(())
    }

    /// Flips the cell at `pos` and returns its new state
    pub fn toggle_cell(&mut self, pos: Pos2) -> Result<bool, GridError> {
        let alive = !self
            .cell(pos)
            .ok_or(GridError::OutOfBounds { x: pos.x, y: pos.y })?
            .is_alive();
        self.set_alive(pos, alive)?;
        debug!("toggled ({}, {}) to {}", pos.x, pos.y, alive);
        Ok(alive)
    }

    /// Flips the cell under a display coordinate, if there is one
    pub fn toggle_at_pixel(&mut self, pixel_x: i32, pixel_y: i32) -> Option<bool> {
        let pos = self.cell_at(pixel_x, pixel_y)?.pos();
        self.toggle_cell(pos).ok()
    }

    #[inline]
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }
    #[inline]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
    #[inline]
    pub fn width(&self) -> i32 {
        self.topology.width()
    }
    #[inline]
    pub fn height(&self) -> i32 {
        self.topology.height()
    }
    #[inline]
    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }
    #[inline]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    #[inline]
    pub fn cell(&self, pos: Pos2) -> Option<&Cell> {
        self.topology.index(pos).map(|i| &self.cells[i])
    }

    /// The cell owning a display-space coordinate
    pub fn cell_at(&self, pixel_x: i32, pixel_y: i32) -> Option<&Cell> {
        if pixel_x < 0 || pixel_y < 0 {
            return None;
        }
        let size = self.cell_size as i32;
        self.cell(Pos2::new(pixel_x / size, pixel_y / size))
    }

    /// Every cell, column by column
    #[inline]
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Live cells in no particular order
    #[inline]
    pub fn live_cells(&self) -> impl Iterator<Item = &Cell> {
        self.live.iter().map(|i| &self.cells[i])
    }

    /// Live positions in row-major order
    pub fn live_positions(&self) -> Vec<Pos2> {
        let mut alive: Vec<Pos2> = self.live_cells().map(Cell::pos).collect();
        alive.sort_unstable();
        alive
    }

    /// Whether the live set matches the alive flag of every cell
    pub fn live_set_is_consistent(&self) -> bool {
        self.cells
            .iter()
            .enumerate()
            .all(|(i, cell)| cell.is_alive() == self.live.contains(i))
            && self.cells.iter().filter(|c| c.is_alive()).count() == self.live.len()
    }

    pub fn window(&self, top_left: Pos2, bottom_right: Pos2) -> GridWindow<'_> {
        GridWindow::new(self, top_left, bottom_right)
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let br = Pos2::new(self.width(), self.height());
        write!(f, "{}", self.window(Pos2::default(), br))
    }
}

/// An evaluated but not yet applied generation
///
/// [`PendingGeneration::commit`] applies every transition at once. Dropping
/// the guard instead discards the evaluation and leaves the grid as it was.
#[derive(Debug)]
pub struct PendingGeneration<'a> {
    grid: &'a mut Grid,
    committed: bool,
}

impl PendingGeneration<'_> {
    /// Number of cells that flip state
    #[inline]
    pub fn len(&self) -> usize {
        self.grid.changes.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.grid.changes.is_empty()
    }
    /// Number of cells that were evaluated
    #[inline]
    pub fn evaluated(&self) -> usize {
        self.grid.candidates.len()
    }

    pub fn changes(&self) -> impl Iterator<Item = Transition> + '_ {
        self.grid.changes.iter().map(|&i| {
            let cell = &self.grid.cells[i as usize];
            Transition {
                pos: cell.pos(),
                alive: cell.alive_next(),
            }
        })
    }

    /// Read access to the grid with the evaluation staged on its cells
    #[inline]
    pub fn grid(&self) -> &Grid {
        self.grid
    }

    /// Applies the generation, returning the number of cells that changed
    pub fn commit(mut self) -> usize {
        self.committed = true;
        self.grid.apply_changes()
    }
}

impl Drop for PendingGeneration<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.grid.discard_changes();
        }
    }
}

fn check_cell_size(cell_size: u32) -> Result<u32, GridError> {
    match cell_size {
        0 => Err(GridError::ZeroCellSize),
        size if i32::try_from(size).is_err() => Err(GridError::CellSizeTooLarge(size)),
        size => Ok(size),
    }
}

fn seed_with<F>(topology: &Topology, mut alive: F) -> Vec<CellIndex>
where
    F: FnMut(i32, i32) -> bool,
{
    let mut seed = Vec::new();
    for x in 0..topology.width() {
        for y in 0..topology.height() {
            if alive(x, y) {
                seed.extend(topology.index(Pos2::new(x, y)).map(|i| i as CellIndex));
            }
        }
    }
    seed
}

/// The default pattern, anchored on the grid center
///
/// Cells that do not fit on a small grid are dropped.
fn acorn(topology: &Topology) -> Vec<CellIndex> {
    let center = Pos2::new(topology.width() / 2, topology.height() / 2);
    [(0, 0), (-2, -1), (-3, 1), (-2, 1), (1, 1), (2, 1), (3, 1)]
        .into_iter()
        .filter_map(|(dx, dy)| topology.index(center + Pos2::new(dx, dy)))
        .map(|i| i as CellIndex)
        .collect()
}
