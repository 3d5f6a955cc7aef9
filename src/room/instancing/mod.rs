//! CPU instancing (mesh merging) for room placements.
//! Groups spawns by asset into a single batch entity, then builds one combined
//! Mesh per batch from a unit box stretched to each footprint. One draw call per
//! asset, compatible with StandardMaterial / Bevy PBR.

pub mod components;
pub mod resources;
pub mod systems;

pub use components::{BatchStats, InstanceBatch};
pub use resources::{InstanceBatches, RoomInstancingConfig};

use bevy::prelude::*;

use crate::room::plugin::collect_generation;
use systems::{
    clear_batches_on_room_cleared, drain_spawn_queue_into_batches, finalize_batch_bounds,
    rebuild_dirty_batches,
};

pub struct InstancingPlugin;
impl Plugin for InstancingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InstanceBatches>()
            .init_resource::<RoomInstancingConfig>()
            .add_systems(
                Update,
                (
                    clear_batches_on_room_cleared,
                    drain_spawn_queue_into_batches,
                    finalize_batch_bounds,
                    rebuild_dirty_batches,
                )
                    .chain()
                    .after(collect_generation),
            );
    }
}
