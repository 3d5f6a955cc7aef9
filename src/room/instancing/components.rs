use bevy::prelude::*;

use crate::room::core::AssetRef;

/// One instance inside a batch: centre-pivot transform plus the box it stands in for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BatchInstance {
    pub transform: Transform,
    /// World size of the placeholder box (x, height, z) before rotation.
    pub size: Vec3,
}

/// One logical batch per asset.
#[derive(Component)]
pub struct InstanceBatch {
    pub asset: AssetRef,
    /// The shared source mesh to duplicate.
    pub base_mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
    pub instances: Vec<BatchInstance>,
    /// True when instances changed since last build.
    pub dirty: bool,
    /// World-space bounds, recomputed when a run finalizes. `None` until then.
    pub bounds: Option<(Vec3, Vec3)>,
}

impl InstanceBatch {
    #[inline]
    pub fn mark_dirty(&mut self) { self.dirty = true; }

    /// Min/max over every instance's rotated box corners.
    pub fn compute_bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut it = self.instances.iter().flat_map(|inst| {
            let half = inst.size * 0.5;
            [
                Vec3::new(-half.x, -half.y, -half.z),
                Vec3::new(half.x, -half.y, -half.z),
                Vec3::new(-half.x, half.y, -half.z),
                Vec3::new(half.x, half.y, -half.z),
                Vec3::new(-half.x, -half.y, half.z),
                Vec3::new(half.x, -half.y, half.z),
                Vec3::new(-half.x, half.y, half.z),
                Vec3::new(half.x, half.y, half.z),
            ]
            .map(|c| inst.transform.translation + inst.transform.rotation * c)
        });
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }
}

#[derive(Component, Default)]
pub struct BatchStats {
    pub instance_count: u32,
    pub merged_vertex_count: u32,
}
