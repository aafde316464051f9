use super::index;
use super::topology::{NeighborList, Topology};
use crate::Pos2;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// A single grid position and its life state
///
/// Cells are only ever mutated by the [`Grid`](super::Grid) that owns them;
/// everything public here is read-only.
#[derive(Debug, Clone)]
pub struct Cell {
    pos: Pos2,
    alive: bool,
    alive_next: bool,
    marked: bool,
    neighbors: OnceLock<NeighborList>,
    visited: Option<Instant>,
}

impl Cell {
    pub(super) fn new(pos: Pos2) -> Self {
        Self {
            pos,
            alive: false,
            alive_next: false,
            marked: false,
            neighbors: OnceLock::new(),
            visited: None,
        }
    }

    #[inline]
    pub fn pos(&self) -> Pos2 {
        self.pos
    }
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }
    /// The state computed for the upcoming generation
    ///
    /// Equal to [`Cell::is_alive`] except between evaluation and commit.
    #[inline]
    pub fn alive_next(&self) -> bool {
        self.alive_next
    }
    /// Whether the pending evaluation flips this cell
    #[inline]
    pub fn is_marked(&self) -> bool {
        self.marked
    }
    /// When a commit last changed this cell
    #[inline]
    pub fn visited(&self) -> Option<Instant> {
        self.visited
    }

    /// Top-left pixel of this cell on a display with the given cell size
    #[inline]
    pub fn origin(&self, cell_size: u32) -> Pos2 {
        self.pos.scale(cell_size as i32)
    }

    /// Fade intensity in `(0, 1]` for a dead cell that was recently visited
    ///
    /// Returns [`None`] once `decay` has elapsed, for cells that never changed,
    /// and for live cells (those are drawn at full intensity anyway).
    pub fn fade(&self, now: Instant, decay: Duration) -> Option<f32> {
        if self.alive || decay.is_zero() {
            return None;
        }
        let elapsed = now.saturating_duration_since(self.visited?);
        (elapsed < decay).then(|| 1.0 - elapsed.as_secs_f32() / decay.as_secs_f32())
    }

    /// The cached neighbor index list, built on first access
    #[inline]
    pub fn neighbors(&self, topology: &Topology) -> &NeighborList {
        self.neighbors.get_or_init(|| topology.neighbors_of(self.pos))
    }

    /// Whether the neighbor list has been built yet
    #[inline]
    pub fn has_neighbors_cached(&self) -> bool {
        self.neighbors.get().is_some()
    }

    /// Applies the rule to this cell against the current state of `cells`
    ///
    /// Pure: nothing is written, the result is staged separately with
    /// [`Cell::stage`] once every candidate has been evaluated.
    pub(super) fn evaluate(&self, cells: &[Cell], topology: &Topology) -> bool {
        let live_neighbors = self
            .neighbors(topology)
            .iter()
            .filter(|&i| cells[i].alive)
            .count();
        index::next_state(self.alive, live_neighbors as u8)
    }

    /// Records the evaluated next state and returns whether it is a change
    #[inline]
    pub(super) fn stage(&mut self, next: bool) -> bool {
        self.alive_next = next;
        self.marked = self.alive != next;
        self.marked
    }

    /// Drops a staged evaluation that never got committed
    #[inline]
    pub(super) fn unstage(&mut self) {
        self.alive_next = self.alive;
        self.marked = false;
    }

    /// Makes the staged state current
    #[inline]
    pub(super) fn commit(&mut self, now: Instant) {
        self.alive = self.alive_next;
        self.marked = false;
        self.visited = Some(now);
    }

    /// Direct state change from outside the step cycle (toggles, seeding)
    #[inline]
    pub(super) fn set_alive(&mut self, alive: bool) {
        self.alive = alive;
        self.unstage();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells_with_alive(topo: &Topology, alive: &[Pos2]) -> Vec<Cell> {
        (0..topo.len())
            .map(|i| {
                let mut cell = Cell::new(topo.pos(i));
                cell.set_alive(alive.contains(&cell.pos()));
                cell
            })
            .collect()
    }

    #[test]
    fn neighbors_are_cached_lazily() {
        let topo = Topology::new(3, 3).unwrap();
        let cell = Cell::new(Pos2::new(1, 1));

        assert!(!cell.has_neighbors_cached());
        assert_eq!(cell.neighbors(&topo).len(), 8);
        assert!(cell.has_neighbors_cached());
    }

    #[test]
    fn evaluate_counts_only_present_neighbors() {
        let topo = Topology::new(3, 3).unwrap();
        // the corner (0, 0) only sees (1, 0), (0, 1) and (1, 1)
        let cells = cells_with_alive(&topo, &[Pos2::new(1, 0), Pos2::new(0, 1), Pos2::new(1, 1)]);
        let corner = &cells[topo.index(Pos2::new(0, 0)).unwrap()];

        assert!(corner.evaluate(&cells, &topo));
    }

    #[test]
    fn stage_then_commit() {
        let mut cell = Cell::new(Pos2::new(0, 0));

        assert!(cell.stage(true));
        assert!(!cell.is_alive());
        assert!(cell.alive_next());
        assert!(cell.is_marked());

        let now = Instant::now();
        cell.commit(now);
        assert!(cell.is_alive());
        assert!(!cell.is_marked());
        assert_eq!(cell.visited(), Some(now));
    }

    #[test]
    fn unstage_restores_current_state() {
        let mut cell = Cell::new(Pos2::new(0, 0));
        cell.set_alive(true);

        assert!(cell.stage(false));
        cell.unstage();
        assert!(cell.is_alive());
        assert!(cell.alive_next());
        assert!(!cell.is_marked());
    }

    #[test]
    fn fade_decays_after_death() {
        let mut cell = Cell::new(Pos2::new(0, 0));
        let decay = Duration::from_secs(1);
        let start = Instant::now();
        assert_eq!(cell.fade(start, decay), None);

        cell.stage(true);
        cell.commit(start);
        // alive cells never fade
        assert_eq!(cell.fade(start, decay), None);

        cell.stage(false);
        cell.commit(start);
        let half = cell.fade(start + Duration::from_millis(500), decay).unwrap();
        assert!((half - 0.5).abs() < 1e-3);
        assert_eq!(cell.fade(start + decay, decay), None);
    }
}
