// src/room/queue.rs
use bevy::prelude::*;

use crate::room::core::{
    AssetRef, PlacedInstance, PlacementSink, PlacementSource, DEFAULT_CELL_SIZE,
};

/// One spawn request (what to spawn, where, how big).
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnRequest {
    pub asset: AssetRef,
    pub source: PlacementSource,
    /// Centre-pivot world transform from the generator.
    pub transform: Transform,
    /// World-space size of the unrotated footprint (x by z); `transform` carries the yaw.
    pub extent: Vec2,
}

/// Placements waiting to be batched. Filled by a generation run, drained by instancing.
#[derive(Resource, Clone, Debug)]
pub struct SpawnQueue {
    pub items: Vec<SpawnRequest>,
    /// Set by [`PlacementSink::finalize`]; instancing recomputes bounds once the queue is empty.
    pub finalize_requested: bool,
    cell_size: f32,
}

impl Default for SpawnQueue {
    fn default() -> Self { Self::with_cell_size(DEFAULT_CELL_SIZE) }
}

impl SpawnQueue {
    pub fn with_cell_size(cell_size: f32) -> Self {
        Self { items: Vec::new(), finalize_requested: false, cell_size }
    }
}

impl PlacementSink for SpawnQueue {
    fn place(&mut self, instance: PlacedInstance) {
        // Undo the quarter-turn swap; the transform's yaw rotates the box back.
        let fp = instance.footprint.rotated(instance.rotation);
        self.items.push(SpawnRequest {
            asset: instance.asset,
            source: instance.source,
            transform: instance.transform,
            extent: Vec2::new(fp.x as f32, fp.y as f32) * self.cell_size,
        });
    }

    fn finalize(&mut self) {
        self.finalize_requested = true;
    }
}

/// config: how many requests to batch per frame
#[derive(Resource)]
pub struct SpawnQueueConfig {
    pub max_per_frame: usize,
}
impl Default for SpawnQueueConfig {
    fn default() -> Self { Self { max_per_frame: 512 } }
}
