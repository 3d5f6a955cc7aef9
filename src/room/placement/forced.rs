// src/room/placement/forced.rs
//! Designer-pinned placements, applied before any automatic pass.

use bevy::log::warn;

use super::{pick_rotation, try_place, PassContext};
use crate::room::core::{CellCoord, PlaceableDescriptor, PlacementRejection, PlacementSource};
use crate::room::grid::GridOccupancy;
use crate::room::random::SeededRandom;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ForcedStats {
    pub placed: usize,
    pub rejected: usize,
}

/// Place every forced entry in row-major order of its target cell.
///
/// The input may come from an unordered map; it is sorted here so the rotation draws
/// happen in the same order on every run. Rejections are logged and skipped.
pub fn place_forced<'a, I>(
    grid: &mut GridOccupancy,
    ctx: &mut PassContext<'_>,
    rng: &mut SeededRandom,
    forced: I,
) -> ForcedStats
where
    I: IntoIterator<Item = (&'a CellCoord, &'a PlaceableDescriptor)>,
{
    let mut entries: Vec<(CellCoord, &PlaceableDescriptor)> = forced.into_iter().map(|(c, d)| (*c, d)).collect();
    entries.sort_by_key(|(c, _)| *c);

    let mut stats = ForcedStats::default();
    for (cell, desc) in entries {
        match place_one(grid, ctx, rng, cell, desc) {
            Ok(()) => stats.placed += 1,
            Err(why) => {
                warn!("Forced placement of '{}' at {} failed: {}. Skipping.", desc.asset, cell, why);
                stats.rejected += 1;
            }
        }
    }
    stats
}

fn place_one(
    grid: &mut GridOccupancy,
    ctx: &mut PassContext<'_>,
    rng: &mut SeededRandom,
    cell: CellCoord,
    desc: &PlaceableDescriptor,
) -> Result<(), PlacementRejection> {
    // Resolve before drawing: an unresolved asset costs no rotation draw.
    if !ctx.resolver.resolve(&desc.asset) {
        return Err(PlacementRejection::AssetUnresolved);
    }
    let rotation = pick_rotation(desc, rng);
    try_place(grid, ctx, cell, desc, rotation, PlacementSource::Forced)
}
