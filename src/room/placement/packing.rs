// src/room/placement/packing.rs
//! Randomized row-major packing of the remaining Empty cells.

use super::{pick_rotation, select_weighted, try_place, PassContext};
use crate::room::core::{CellState, PlaceableDescriptor, PlacementSource};
use crate::room::grid::GridOccupancy;
use crate::room::random::SeededRandom;

/// Candidate pools for the packing pass. Order inside each pool is significant.
#[derive(Clone, Copy, Debug)]
pub struct Pools<'a> {
    pub main: &'a [PlaceableDescriptor],
    /// Used instead of `main` on perimeter cells when non-empty.
    pub edge: &'a [PlaceableDescriptor],
}

impl<'a> Pools<'a> {
    fn for_cell(&self, on_perimeter: bool) -> &'a [PlaceableDescriptor] {
        if on_perimeter && !self.edge.is_empty() { self.edge } else { self.main }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PackingStats {
    pub placed: usize,
    /// Attempts that failed bounds/overlap/resolution; those cells wait for gap-fill.
    pub deferred: usize,
    /// Empty cells whose pool had nothing to offer.
    pub skipped: usize,
}

/// Visit every cell row-major and try one weighted pick per still-Empty cell.
///
/// A failed attempt is not retried; the cell stays Empty for the gap-fill pass.
/// The scan never jumps ahead: cells covered by an earlier footprint are simply no longer Empty.
pub fn pack_random(
    grid: &mut GridOccupancy,
    ctx: &mut PassContext<'_>,
    rng: &mut SeededRandom,
    pools: Pools<'_>,
) -> PackingStats {
    let mut stats = PackingStats::default();
    let coords: Vec<_> = grid.coords().collect();

    for cell in coords {
        if grid.get(cell) != Some(CellState::Empty) {
            continue;
        }

        let pool = pools.for_cell(grid.is_perimeter(cell));
        let Some(desc) = select_weighted(pool, rng) else {
            stats.skipped += 1;
            continue;
        };

        if !ctx.resolver.resolve(&desc.asset) {
            stats.deferred += 1;
            continue;
        }

        let rotation = pick_rotation(desc, rng);
        match try_place(grid, ctx, cell, desc, rotation, PlacementSource::Random) {
            Ok(()) => stats.placed += 1,
            Err(_) => stats.deferred += 1,
        }
    }
    stats
}
