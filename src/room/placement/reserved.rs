// src/room/placement/reserved.rs
use crate::room::core::{CellCoord, CellState};
use crate::room::grid::GridOccupancy;

/// Mark designer-excluded cells Reserved. Out-of-bounds and non-Empty cells are ignored.
/// Returns how many cells changed.
pub fn reserve_cells(grid: &mut GridOccupancy, cells: &[CellCoord]) -> usize {
    let mut reserved = 0;
    for &c in cells {
        if grid.get(c) == Some(CellState::Empty) {
            grid.set(c, CellState::Reserved);
            reserved += 1;
        }
    }
    reserved
}
