use bevy::prelude::*;
use crate::input::CameraOrbit;

#[derive(Component)]
pub struct MainCamera;

pub fn setup(
    mut commands: Commands,
) {
    // 1) Light
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            illuminance: 8_000.0,
            ..default()
        },
        Transform::from_xyz(6.0, 14.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.insert_resource(AmbientLight { brightness: 350.0, ..default() });

    // 2) Camera (re-aimed at the room once one is generated)
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(-8.0, 12.0, 14.0).looking_at(Vec3::ZERO, Vec3::Y),
        MainCamera,
        CameraOrbit {
            focus: Vec3::ZERO,
            radius: 18.0,
            yaw: -2.2,
            pitch: 0.8,
        },
    ));
}
