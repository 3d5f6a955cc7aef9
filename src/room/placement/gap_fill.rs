// src/room/placement/gap_fill.rs
use super::PassContext;
use crate::room::core::{
    world_transform, AssetRef, CellState, Footprint, PlacedInstance, PlacementSource, Rotation,
};
use crate::room::grid::GridOccupancy;

/// Cover every cell still Empty with the 1×1 filler tile at rotation 0. No draws; returns the count.
pub fn fill_gaps(grid: &mut GridOccupancy, ctx: &mut PassContext<'_>, filler: &AssetRef) -> usize {
    let coords: Vec<_> = grid.coords().collect();
    let mut filled = 0;

    for cell in coords {
        if grid.get(cell) != Some(CellState::Empty) {
            continue;
        }
        grid.set(cell, CellState::Occupied);
        ctx.sink.place(PlacedInstance {
            asset: filler.clone(),
            origin: cell,
            footprint: Footprint::ONE,
            rotation: Rotation::Deg0,
            transform: world_transform(ctx.frame, cell, Footprint::ONE, Rotation::Deg0),
            source: PlacementSource::Filler,
        });
        filled += 1;
    }
    filled
}
