// src/room/grid.rs
//! Row-major occupancy grid for one room.

use std::fmt;

use super::core::{CellCoord, CellState, Footprint, GridSize, PlacementRejection};

/// Mutable cell-state array, `index = y * width + x`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridOccupancy {
    size: GridSize,
    cells: Vec<CellState>,
}

impl Default for GridOccupancy {
    fn default() -> Self { Self::new(GridSize::new(0, 0)) }
}

impl GridOccupancy {
    /// All cells start Empty.
    pub fn new(size: GridSize) -> Self {
        Self { size, cells: vec![CellState::Empty; size.cell_count()] }
    }

    /// Drop every cell and rebuild at `size`, all Empty.
    pub fn reset(&mut self, size: GridSize) {
        self.size = size;
        self.cells.clear();
        self.cells.resize(size.cell_count(), CellState::Empty);
    }

    pub fn size(&self) -> GridSize { self.size }
    pub fn width(&self) -> u32 { self.size.width }
    pub fn height(&self) -> u32 { self.size.height }

    #[inline]
    pub fn contains(&self, c: CellCoord) -> bool {
        c.x >= 0 && c.y >= 0 && (c.x as u32) < self.size.width && (c.y as u32) < self.size.height
    }

    #[inline]
    pub fn index(&self, c: CellCoord) -> Option<usize> {
        if !self.contains(c) { return None; }
        Some(c.y as usize * self.size.width as usize + c.x as usize)
    }

    pub fn get(&self, c: CellCoord) -> Option<CellState> {
        self.index(c).map(|i| self.cells[i])
    }

    /// Returns false (and changes nothing) when `c` is out of bounds.
    pub fn set(&mut self, c: CellCoord, state: CellState) -> bool {
        match self.index(c) {
            Some(i) => { self.cells[i] = state; true }
            None => false,
        }
    }

    /// True when `c` sits on the outermost ring of the grid.
    pub fn is_perimeter(&self, c: CellCoord) -> bool {
        self.contains(c)
            && (c.x == 0
                || c.y == 0
                || c.x as u32 == self.size.width - 1
                || c.y as u32 == self.size.height - 1)
    }

    /// Check that `footprint` anchored at `origin` stays inside the grid and covers only Empty cells.
    pub fn check_region(&self, origin: CellCoord, footprint: Footprint) -> Result<(), PlacementRejection> {
        if origin.x < 0
            || origin.y < 0
            || origin.x as u64 + footprint.x as u64 > self.size.width as u64
            || origin.y as u64 + footprint.y as u64 > self.size.height as u64
        {
            return Err(PlacementRejection::OutOfBounds);
        }

        for dy in 0..footprint.y as i32 {
            for dx in 0..footprint.x as i32 {
                let c = origin.offset(dx, dy);
                if self.get(c) != Some(CellState::Empty) {
                    return Err(PlacementRejection::Overlap(c));
                }
            }
        }
        Ok(())
    }

    /// Mark the whole region Occupied. Callers run [`check_region`](Self::check_region) first.
    pub(crate) fn occupy(&mut self, origin: CellCoord, footprint: Footprint) {
        for dy in 0..footprint.y as i32 {
            for dx in 0..footprint.x as i32 {
                self.set(origin.offset(dx, dy), CellState::Occupied);
            }
        }
    }

    /// Every coordinate, row-major.
    pub fn coords(&self) -> impl Iterator<Item = CellCoord> {
        let (w, h) = (self.size.width as i32, self.size.height as i32);
        (0..h).flat_map(move |y| (0..w).map(move |x| CellCoord::new(x, y)))
    }

    pub fn cells(&self) -> &[CellState] { &self.cells }

    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|s| **s == state).count()
    }
}

/// One character per cell: `.` empty, `#` occupied, `x` reserved. Row 0 first.
impl fmt::Display for GridOccupancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.size.width.max(1) as usize) {
            for cell in row {
                let ch = match cell {
                    CellState::Empty => '.',
                    CellState::Occupied => '#',
                    CellState::Reserved => 'x',
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
