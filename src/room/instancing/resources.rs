// src/room/instancing/resources.rs

use bevy::prelude::*;
use std::collections::HashMap;

use crate::room::core::AssetRef;

#[derive(Resource, Default)]
pub struct InstanceBatches {
    pub by_asset: HashMap<AssetRef, Entity>,
    /// Unit box every batch stretches per instance.
    pub unit_box: Option<Handle<Mesh>>,
}

#[derive(Resource)]
pub struct RoomInstancingConfig {
    pub max_merges_per_frame: usize,
    /// Placeholder heights by pass.
    pub filler_height: f32,
    pub random_height: f32,
    pub forced_height: f32,
    /// Fraction of the footprint the box covers, leaving a visible seam between cells.
    pub inset: f32,
}
impl Default for RoomInstancingConfig {
    fn default() -> Self {
        Self {
            max_merges_per_frame: 4,
            filler_height: 0.05,
            random_height: 0.3,
            forced_height: 0.9,
            inset: 0.94,
        }
    }
}
