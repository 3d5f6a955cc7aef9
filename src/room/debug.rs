// src/room/debug.rs
//! Gizmo overlay of the occupancy grid (toggle with `G`).

use bevy::prelude::*;

use crate::room::core::{CellCoord, CellState, RoomFrame};
use crate::room::plugin::ActiveRoom;

#[derive(Resource)]
pub struct DebugGridSettings {
    pub enabled: bool,
    /// Lift above the floor so lines don't z-fight with the tiles.
    pub lift: f32,
}
impl Default for DebugGridSettings {
    fn default() -> Self { Self { enabled: true, lift: 0.08 } }
}

pub struct DebugGridPlugin;
impl Plugin for DebugGridPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugGridSettings>()
            .add_systems(Update, (toggle_debug_grid, draw_grid_state).chain());
    }
}

fn toggle_debug_grid(keys: Res<ButtonInput<KeyCode>>, mut settings: ResMut<DebugGridSettings>) {
    if keys.just_pressed(KeyCode::KeyG) {
        settings.enabled = !settings.enabled;
        info!("Rooms: debug grid {}", if settings.enabled { "on" } else { "off" });
    }
}

/// Outline every cell; cross out Reserved ones, mark still-Empty ones in red.
fn draw_grid_state(settings: Res<DebugGridSettings>, active: Res<ActiveRoom>, mut gizmos: Gizmos) {
    if !settings.enabled { return; }
    let Some(grid) = active.grid() else { return };
    let frame = active.frame;

    for cell in grid.coords() {
        let color = match grid.get(cell) {
            Some(CellState::Occupied) => Color::srgba(0.8, 0.8, 0.8, 0.25),
            Some(CellState::Reserved) => Color::srgb(1.0, 0.75, 0.1),
            Some(CellState::Empty) | None => Color::srgb(1.0, 0.1, 0.1),
        };
        let [a, b, c, d] = cell_corners(frame, cell, settings.lift);
        gizmos.linestrip([a, b, c, d, a], color);
        if grid.get(cell) == Some(CellState::Reserved) {
            gizmos.line(a, c, color);
            gizmos.line(b, d, color);
        }
    }
}

fn cell_corners(frame: RoomFrame, cell: CellCoord, lift: f32) -> [Vec3; 4] {
    let s = frame.cell_size;
    let base = frame.origin + Vec3::new(cell.x as f32 * s, lift, cell.y as f32 * s);
    [base, base + Vec3::new(s, 0.0, 0.0), base + Vec3::new(s, 0.0, s), base + Vec3::new(0.0, 0.0, s)]
}
