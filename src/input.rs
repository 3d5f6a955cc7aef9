use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::input::{mouse::MouseMotion, keyboard::KeyCode, ButtonInput};

use roomgen::room::core::RoomSeed;
use roomgen::room::plugin::{ActiveRoom, RegenerateRoom, RoomGenerated};

use crate::actions::{PlayerAction, ActionState};
use crate::setup::MainCamera;

pub const PAN_SPEED: f32 = 1.2; // radii per second
pub const ROTATE_SPEED: f32 = 0.2;
pub const MAX_CAMERA_DT: f32 = 0.05; // never use a dt larger than 50ms
pub const MIN_CAMERA_HEIGHT: f32 = 0.5;

#[derive(Component)]
pub struct CameraOrbit {
    pub focus: Vec3,
    pub radius: f32,
    pub yaw: f32,
    pub pitch: f32,
}

pub fn input_mapping_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut action_state: ResMut<ActionState>,
) {
    let bindings = [
        (PlayerAction::PanForward, KeyCode::KeyW),
        (PlayerAction::PanBackward, KeyCode::KeyS),
        (PlayerAction::PanLeft, KeyCode::KeyA),
        (PlayerAction::PanRight, KeyCode::KeyD),
        (PlayerAction::Regenerate, KeyCode::KeyR),
        (PlayerAction::NextSeed, KeyCode::KeyN),
    ];
    for (action, key) in bindings {
        action_state.set(action, keys.pressed(key), keys.just_pressed(key));
    }
}

/// R regenerates with the current seed, N with the next one.
pub fn room_hotkeys(
    action_state: Res<ActionState>,
    seed: Res<RoomSeed>,
    mut regen: EventWriter<RegenerateRoom>,
) {
    if action_state.just_pressed(PlayerAction::NextSeed) {
        let next = seed.0.wrapping_add(1);
        info!("Rooms: advancing seed {} -> {}", seed.0, next);
        regen.write(RegenerateRoom { seed: Some(next) });
    } else if action_state.just_pressed(PlayerAction::Regenerate) {
        regen.write(RegenerateRoom { seed: None });
    }
}

/// Re-aim the orbit at the middle of a freshly generated room.
pub fn focus_on_room(
    mut evr: EventReader<RoomGenerated>,
    active: Res<ActiveRoom>,
    mut query: Query<&mut CameraOrbit, With<MainCamera>>,
) {
    if evr.read().last().is_none() { return; }
    let Some(grid) = active.grid() else { return };
    let Ok(mut orbit) = query.single_mut() else { return };

    let extent = Vec2::new(grid.width() as f32, grid.height() as f32) * active.frame.cell_size;
    orbit.focus = active.frame.origin + Vec3::new(extent.x * 0.5, 0.0, extent.y * 0.5);
    orbit.radius = extent.max_element().max(4.0) * 1.3;
}

pub fn camera_controller(
    time: Res<Time>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut motion_evr: EventReader<MouseMotion>,
    mut scroll_evr: EventReader<MouseWheel>,
    action_state: Res<ActionState>,
    mut query: Query<(&mut Transform, &mut CameraOrbit), With<MainCamera>>,
) {
    // 0) Clamp delta
    let dt = time.delta_secs().min(MAX_CAMERA_DT);

    let Ok((mut tf, mut orbit)) = query.single_mut() else { return; };

    // 1) Camera-relative panning over the floor plane
    let forward = Vec2::new(-orbit.yaw.cos(), -orbit.yaw.sin());
    let right = Vec2::new(-forward.y, forward.x);

    let mut dir = Vec2::ZERO;
    if action_state.pressed(PlayerAction::PanForward) { dir += forward; }
    if action_state.pressed(PlayerAction::PanBackward) { dir -= forward; }
    if action_state.pressed(PlayerAction::PanLeft) { dir -= right; }
    if action_state.pressed(PlayerAction::PanRight) { dir += right; }

    if dir != Vec2::ZERO {
        let delta = dir.normalize() * PAN_SPEED * orbit.radius * dt;
        orbit.focus.x += delta.x;
        orbit.focus.z += delta.y;
    }

    // 2) Zoom
    for ev in scroll_evr.read() {
        let amount = match ev.unit {
            MouseScrollUnit::Line => ev.y * 1.0,
            MouseScrollUnit::Pixel => ev.y * 0.02,
        };
        orbit.radius = (orbit.radius - amount).clamp(2.0, 200.0);
    }

    // 3) Orbit
    if mouse_buttons.pressed(MouseButton::Middle) || mouse_buttons.pressed(MouseButton::Right) {
        for ev in motion_evr.read() {
            orbit.yaw += ev.delta.x * ROTATE_SPEED * dt;
            orbit.pitch += ev.delta.y * ROTATE_SPEED * dt;
        }
    } else {
        motion_evr.clear();
    }

    orbit.pitch = orbit.pitch.clamp(0.05, std::f32::consts::FRAC_PI_2 - 0.01);

    // 4) Position camera
    let xz_radius = orbit.radius * orbit.pitch.cos();
    let offset = Vec3::new(
        xz_radius * orbit.yaw.cos(),
        orbit.radius * orbit.pitch.sin(),
        xz_radius * orbit.yaw.sin(),
    );

    tf.translation = orbit.focus + offset;
    // 5) Stay above the floor
    tf.translation.y = tf.translation.y.max(orbit.focus.y + MIN_CAMERA_HEIGHT);
    tf.look_at(orbit.focus, Vec3::Y);
}
