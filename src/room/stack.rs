// src/room/stack.rs
use bevy::prelude::*;
use crate::room::debug::DebugGridPlugin;
use crate::room::instancing::InstancingPlugin;
use crate::room::plugin::RoomLayoutPlugin;

pub struct RoomStackPlugin;
impl Plugin for RoomStackPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RoomLayoutPlugin)   // infra: registry + events + seed + generation tasks
           .add_plugins(InstancingPlugin)   // queue -> per-asset batches
           .add_plugins(DebugGridPlugin);   // gizmo view of the grid
    }
}
