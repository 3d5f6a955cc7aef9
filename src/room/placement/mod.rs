// src/room/placement/mod.rs
//! Deterministic placement passes and the helpers they share.

use crate::room::core::{
    world_transform, AssetResolver, CellCoord, PlaceableDescriptor, PlacedInstance, PlacementRejection,
    PlacementSink, PlacementSource, RoomFrame, Rotation,
};
use crate::room::grid::GridOccupancy;
use crate::room::random::SeededRandom;

mod weighted;
pub mod reserved;
pub mod forced;
pub mod packing;
pub mod gap_fill;
pub mod runner;

pub use weighted::select_weighted;
pub use forced::{place_forced, ForcedStats};
pub use packing::{pack_random, PackingStats, Pools};
pub use gap_fill::fill_gaps;
pub use reserved::reserve_cells;
pub use runner::{GenerationPhase, GenerationReport, RoomGenerator};

/// Everything a pass needs besides the grid and the stream.
pub struct PassContext<'a> {
    pub frame: RoomFrame,
    pub resolver: &'a dyn AssetResolver,
    pub sink: &'a mut dyn PlacementSink,
}

/// Draw one rotation uniformly from the descriptor's allowed set (exactly one draw).
#[inline]
pub fn pick_rotation(desc: &PlaceableDescriptor, rng: &mut SeededRandom) -> Rotation {
    let last = desc.rotations.len() as i32 - 1;
    let ix = rng.int_range(0, last) as usize;
    desc.rotations.get(ix).copied().unwrap_or_default()
}

/// Rotate, check and (only if every check passes) occupy + emit. Atomic: on `Err` the grid is untouched.
pub fn try_place(
    grid: &mut GridOccupancy,
    ctx: &mut PassContext<'_>,
    origin: CellCoord,
    desc: &PlaceableDescriptor,
    rotation: Rotation,
    source: PlacementSource,
) -> Result<(), PlacementRejection> {
    let footprint = desc.footprint.rotated(rotation);
    grid.check_region(origin, footprint)?;
    grid.occupy(origin, footprint);

    ctx.sink.place(PlacedInstance {
        asset: desc.asset.clone(),
        origin,
        footprint,
        rotation,
        transform: world_transform(ctx.frame, origin, footprint, rotation),
        source,
    });
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashSet;

    use crate::room::core::{AssetRef, AssetResolver};

    /// Resolver that refuses a fixed set of assets.
    pub struct Refuse(pub HashSet<String>);

    impl Refuse {
        pub fn of(names: &[&str]) -> Self { Self(names.iter().map(|s| s.to_string()).collect()) }
    }

    impl AssetResolver for Refuse {
        fn resolve(&self, asset: &AssetRef) -> bool { !self.0.contains(asset.as_str()) }
    }
}
