use bevy::prelude::*;

mod setup;
mod input;
mod actions;

use actions::ActionState;
use input::{camera_controller, focus_on_room, input_mapping_system, room_hotkeys};
use roomgen::room::plugin::{collect_generation, RoomSettings};
use roomgen::room::RoomStackPlugin;

/// `roomgen [room-name] [seed]`; both optional.
fn settings_from_args() -> RoomSettings {
    let mut settings = RoomSettings::default();
    let mut args = std::env::args().skip(1);
    if let Some(room) = args.next() {
        settings.room = room;
    }
    if let Some(seed) = args.next() {
        match seed.parse::<u64>() {
            Ok(s) => settings.seed = s,
            Err(e) => eprintln!("roomgen: ignoring seed '{}': {}", seed, e),
        }
    }
    settings
}

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "roomgen".to_string(),
                ..default()
            }),
            ..default()
        }))
        // settings before the stack so its init_resource keeps ours
        .insert_resource(settings_from_args())
        .add_plugins(RoomStackPlugin)
        .init_resource::<ActionState>()
        // camera, lights
        .add_systems(Startup, setup::setup)
        // input + camera + hotkeys each frame
        .add_systems(
            Update,
            (input_mapping_system, (camera_controller, room_hotkeys, focus_on_room))
                .chain()
                .after(collect_generation),
        )
        .run();
}
