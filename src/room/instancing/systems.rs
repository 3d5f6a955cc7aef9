// src/room/instancing/systems.rs

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology, VertexAttributeValues};
use bevy::render::primitives::Aabb;

use crate::room::core::{AssetRef, PlacementSource};
use crate::room::plugin::RoomCleared;
use crate::room::queue::{SpawnQueue, SpawnQueueConfig, SpawnRequest};

use super::components::{BatchInstance, BatchStats, InstanceBatch};
use super::resources::{InstanceBatches, RoomInstancingConfig};

/// Despawn every batch when a new layout replaces the old one.
pub fn clear_batches_on_room_cleared(
    mut evr: EventReader<RoomCleared>,
    mut commands: Commands,
    mut batches: ResMut<InstanceBatches>,
    q_has: Query<(), With<InstanceBatch>>,
) {
    if evr.read().count() == 0 { return; }

    let n = batches.by_asset.len();
    for (_, e) in batches.by_asset.drain() {
        if q_has.get(e).is_ok() {
            commands.entity(e).despawn();
        }
    }
    debug!("Instancing: cleared {} batches", n);
}

/// Drain queue -> append instances to batches, in emission order. No mesh building here.
pub fn drain_spawn_queue_into_batches(
    mut commands: Commands,
    mut queue: ResMut<SpawnQueue>,
    qcfg: Res<SpawnQueueConfig>,
    cfg: Res<RoomInstancingConfig>,
    mut batches: ResMut<InstanceBatches>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut q_batch: Query<(&mut InstanceBatch, &mut BatchStats)>,
) {
    if queue.items.is_empty() { return; }

    let drain_n = qcfg.max_per_frame.min(queue.items.len());
    if drain_n == 0 { return; }

    // Group first so a batch spawned this frame still receives all of its instances.
    let mut fresh: HashMap<AssetRef, Vec<BatchInstance>> = HashMap::new();
    for req in queue.items.drain(..drain_n) {
        let inst = to_instance(&req, &cfg);
        match batches.by_asset.get(&req.asset).copied() {
            Some(e) => {
                if let Ok((mut batch, mut stats)) = q_batch.get_mut(e) {
                    batch.instances.push(inst);
                    batch.mark_dirty();
                    stats.instance_count += 1;
                }
            }
            None => fresh.entry(req.asset).or_default().push(inst),
        }
    }

    let unit_box = batches
        .unit_box
        .get_or_insert_with(|| meshes.add(Cuboid::from_length(1.0)))
        .clone();

    for (asset, instances) in fresh {
        let material = materials.add(StandardMaterial {
            base_color: color_for(&asset),
            perceptual_roughness: 0.9,
            ..Default::default()
        });
        let count = instances.len() as u32;
        let e = commands
            .spawn((
                Name::new(format!("Batch {}", asset)),
                InstanceBatch {
                    asset: asset.clone(),
                    base_mesh: unit_box.clone(),
                    material,
                    instances,
                    dirty: true,
                    bounds: None,
                },
                BatchStats { instance_count: count, merged_vertex_count: 0 },
                Transform::default(),
                Visibility::Hidden,
            ))
            .id();
        batches.by_asset.insert(asset, e);
    }
}

/// Once the queue of a finalized run is empty, recompute every batch's bounds.
pub fn finalize_batch_bounds(
    mut queue: ResMut<SpawnQueue>,
    mut q_batch: Query<&mut InstanceBatch>,
) {
    if !queue.finalize_requested || !queue.items.is_empty() { return; }
    queue.finalize_requested = false;

    for mut batch in q_batch.iter_mut() {
        batch.bounds = batch.compute_bounds();
        batch.mark_dirty();
    }
    debug!("Instancing: bounds recomputed for {} batches", q_batch.iter().count());
}

/// Merge the unit box once per finalized, dirty batch, with a small per-frame budget.
pub fn rebuild_dirty_batches(
    mut commands: Commands,
    mut q_batches: Query<(Entity, &mut InstanceBatch, &mut BatchStats)>,
    cfg: Res<RoomInstancingConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    let mut merged_this_frame = 0usize;

    for (e, mut batch, mut stats) in q_batches.iter_mut() {
        if !batch.dirty { continue; }
        let Some((lo, hi)) = batch.bounds else { continue };
        if merged_this_frame >= cfg.max_merges_per_frame { break; }

        let Some(src_mesh) = meshes.get(&batch.base_mesh) else { continue };
        let Some(merged) = merge_box_instances(src_mesh, &batch.instances) else {
            warn!("Instancing: base mesh for '{}' has an unexpected layout; skipping.", batch.asset);
            batch.dirty = false;
            continue;
        };
        stats.merged_vertex_count = merged.count_vertices() as u32;

        commands.entity(e).insert((
            Mesh3d(meshes.add(merged)),
            MeshMaterial3d(batch.material.clone()),
            Aabb::from_min_max(lo, hi),
            Visibility::Visible,
        ));

        batch.dirty = false;
        merged_this_frame += 1;
    }
}

fn to_instance(req: &SpawnRequest, cfg: &RoomInstancingConfig) -> BatchInstance {
    let height = match req.source {
        PlacementSource::Filler => cfg.filler_height,
        PlacementSource::Random => cfg.random_height,
        PlacementSource::Forced => cfg.forced_height,
    };
    let mut transform = req.transform;
    // Sit on the floor instead of straddling it.
    transform.translation.y += height * 0.5;
    BatchInstance {
        transform,
        size: Vec3::new(req.extent.x * cfg.inset, height, req.extent.y * cfg.inset),
    }
}

/// Stable per-asset tint so batches are distinguishable without real meshes.
fn color_for(asset: &AssetRef) -> Color {
    let mut h = DefaultHasher::new();
    asset.hash(&mut h);
    let hue = (h.finish() % 360) as f32;
    Color::hsl(hue, 0.35, 0.55)
}

/// Bake one copy of `src` per instance (scale = box size). Normals follow the yaw only.
fn merge_box_instances(src: &Mesh, instances: &[BatchInstance]) -> Option<Mesh> {
    let positions: &Vec<[f32; 3]> = match src.attribute(Mesh::ATTRIBUTE_POSITION)? {
        VertexAttributeValues::Float32x3(v) => v,
        _ => return None,
    };
    let normals: Option<&Vec<[f32; 3]>> = match src.attribute(Mesh::ATTRIBUTE_NORMAL) {
        Some(VertexAttributeValues::Float32x3(v)) => Some(v),
        _ => None,
    };
    let src_indices: Vec<u32> = match src.indices() {
        Some(Indices::U32(v)) => v.clone(),
        Some(Indices::U16(v)) => v.iter().map(|&x| x as u32).collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let src_vtx = positions.len();
    let n = instances.len();
    let mut out_positions = Vec::with_capacity(src_vtx * n);
    let mut out_normals = Vec::with_capacity(if normals.is_some() { src_vtx * n } else { 0 });
    let mut out_indices = Vec::with_capacity(src_indices.len() * n);

    for (inst_id, inst) in instances.iter().enumerate() {
        let t = inst.transform;
        let trs = Mat4::from_scale_rotation_translation(inst.size, t.rotation, t.translation);

        for p in positions {
            let wp = trs.transform_point3(Vec3::from_array(*p));
            out_positions.push(wp.to_array());
        }
        if let Some(ns) = normals {
            out_normals.extend(ns.iter().map(|nrm| (t.rotation * Vec3::from_array(*nrm)).to_array()));
        }

        let base = (inst_id * src_vtx) as u32;
        out_indices.extend(src_indices.iter().map(|&i| i + base));
    }

    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, Default::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, out_positions);
    if normals.is_some() { mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, out_normals); }
    mesh.insert_indices(Indices::U32(out_indices));
    Some(mesh)
}
