use super::GridError;
use crate::Pos2;

/// Dense index of a cell inside the grid's cell array
pub type CellIndex = u32;

/// The fixed shape of a grid and the mapping from positions to dense indices
///
/// Cells are stored column by column (`[x][y]`), so the index of `(x, y)` is
/// `x * height + y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    width: i32,
    height: i32,
}

impl Topology {
    pub fn new(width: i64, height: i64) -> Result<Self, GridError> {
        let invalid = GridError::InvalidTopology { width, height };
        if width <= 0 || height <= 0 {
            return Err(invalid);
        }
        // every index has to fit in a `CellIndex`
        let len = width.checked_mul(height).ok_or(invalid)?;
        if len > CellIndex::MAX as i64 {
            return Err(invalid);
        }
        Ok(Self {
            width: i32::try_from(width).map_err(|_| invalid)?,
            height: i32::try_from(height).map_err(|_| invalid)?,
        })
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }
    /// Total number of cells
    #[inline]
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }
    #[inline]
    pub fn contains(&self, pos: Pos2) -> bool {
        pos.within(self.width, self.height)
    }

    /// The dense index of `pos`, or [`None`] if it lies outside the grid
    #[inline]
    pub fn index(&self, pos: Pos2) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.x as usize * self.height as usize + pos.y as usize)
    }

    /// The position stored at dense index `i`
    #[inline]
    pub fn pos(&self, i: usize) -> Pos2 {
        debug_assert!(i < self.len(), "index {i} out of bounds");
        let h = self.height as usize;
        Pos2::new((i / h) as i32, (i % h) as i32)
    }

    /// Builds the neighbor index list for `pos`
    ///
    /// Only positions inside the grid are kept: corners get 3 entries, edges 5
    /// and interior cells 8. The grid is bounded, nothing wraps around.
    pub fn neighbors_of(&self, pos: Pos2) -> NeighborList {
        let mut list = NeighborList::default();
        for neighbor in pos.around() {
            if let Some(i) = self.index(neighbor) {
                list.push(i as CellIndex);
            }
        }
        list
    }
}

/// Up to 8 neighbor indices stored inline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeighborList {
    len: u8,
    items: [CellIndex; 8],
}

impl NeighborList {
    #[inline]
    fn push(&mut self, i: CellIndex) {
        self.items[self.len as usize] = i;
        self.len += 1;
    }

    #[inline]
    pub fn as_slice(&self) -> &[CellIndex] {
        &self.items[..self.len as usize]
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.as_slice().iter().map(|&i| i as usize)
    }
}
