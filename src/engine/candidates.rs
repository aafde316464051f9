use super::topology::CellIndex;

/// Deduplicating working set for the cells of interest of one step
///
/// Membership is a bitset over every cell index; the insertion order is kept
/// alongside it so that evaluation walks only the members and clearing only
/// touches the words that were set.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    bits: Vec<u64>,
    members: Vec<CellIndex>,
}

impl CandidateSet {
    pub fn with_capacity(cells: usize) -> Self {
        Self {
            bits: vec![0; cells.div_ceil(64)],
            members: Vec::new(),
        }
    }

    /// Adds `i` unless it is already a member
    #[inline]
    pub fn insert(&mut self, i: usize) -> bool {
        let (word, bit) = (i / 64, 1u64 << (i % 64));
        if self.bits[word] & bit != 0 {
            return false;
        }
        self.bits[word] |= bit;
        self.members.push(i as CellIndex);
        true
    }

    #[inline]
    pub fn as_slice(&self) -> &[CellIndex] {
        &self.members
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn clear(&mut self) {
        for &i in &self.members {
            self.bits[i as usize / 64] = 0;
        }
        self.members.clear();
    }
}
