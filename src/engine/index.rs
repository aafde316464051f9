use std::sync::OnceLock;

/// Bit marking the evaluated cell itself as alive
const ALIVE: usize = 0b1_0000;
/// Mask for the live neighbor count, which never exceeds 8
const COUNT_MASK: usize = 0b0_1111;
/// Every (alive, neighbor count) combination fits in 5 bits
const PERMUTATIONS: usize = 1 << 5;
type RuleIndex = [bool; PERMUTATIONS];

/// Returns a Singleton lookup table for the Game of Life ruleset
///
/// Equivalent to calling [`generate_rule_index`] once and storing the result
fn get_rule_index() -> &'static RuleIndex {
    static CELL: OnceLock<RuleIndex> = OnceLock::new();
    CELL.get_or_init(generate_rule_index)
}

/// Creates a lookup table for the B3/S23 ruleset
///
/// The table is indexed by a 5-bit number: the high bit is the current state
/// of the cell, the low 4 bits the number of live neighbors that are actually
/// present around it (corner and edge cells simply have fewer candidates).
fn generate_rule_index() -> RuleIndex {
    let mut indices = [false; PERMUTATIONS];
    for (i, next) in indices.iter_mut().enumerate() {
        let alive = i & ALIVE != 0;
        let neighbors = i & COUNT_MASK;
        *next = matches!((alive, neighbors), (true, 2) | (_, 3));
    }
    indices
}

/// The state a cell takes in the next generation
#[inline]
pub(crate) fn next_state(alive: bool, live_neighbors: u8) -> bool {
    debug_assert!(live_neighbors <= 8, "more than 8 live neighbors");
    let i = (if alive { ALIVE } else { 0 }) | (live_neighbors as usize & COUNT_MASK);
    get_rule_index()[i]
}
