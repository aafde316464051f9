use super::topology::CellIndex;

const ABSENT: CellIndex = CellIndex::MAX;

/// Set of live cell indices
///
/// Every index has a slot recording where it sits in `members`, so insert,
/// remove and membership are all O(1) and iteration never touches dead cells.
#[derive(Debug, Clone, Default)]
pub struct LiveSet {
    members: Vec<CellIndex>,
    slots: Vec<CellIndex>,
}

impl LiveSet {
    pub fn with_capacity(cells: usize) -> Self {
        Self {
            members: Vec::new(),
            slots: vec![ABSENT; cells],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
    #[inline]
    pub fn contains(&self, i: usize) -> bool {
        self.slots[i] != ABSENT
    }

    /// Adds `i`, returning whether it was absent
    pub fn insert(&mut self, i: usize) -> bool {
        if self.contains(i) {
            return false;
        }
        self.slots[i] = self.members.len() as CellIndex;
        self.members.push(i as CellIndex);
        true
    }

    /// Removes `i`, returning whether it was present
    pub fn remove(&mut self, i: usize) -> bool {
        let slot = self.slots[i];
        if slot == ABSENT {
            return false;
        }
        self.members.swap_remove(slot as usize);
        // the former last member now lives in the freed slot
        if let Some(&moved) = self.members.get(slot as usize) {
            self.slots[moved as usize] = slot;
        }
        self.slots[i] = ABSENT;
        true
    }

    pub fn clear(&mut self) {
        for &i in &self.members {
            self.slots[i as usize] = ABSENT;
        }
        self.members.clear();
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().map(|&i| i as usize)
    }
}
