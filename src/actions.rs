use bevy::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    PanForward,
    PanBackward,
    PanLeft,
    PanRight,
    /// Rebuild the room with the current seed.
    Regenerate,
    /// Rebuild with the next seed.
    NextSeed,
}

#[derive(Default, Resource)]
pub struct ActionState {
    pressed: HashSet<PlayerAction>,
    just_pressed: HashSet<PlayerAction>,
}

impl ActionState {
    pub fn set(&mut self, action: PlayerAction, is_pressed: bool, just: bool) {
        if is_pressed { self.pressed.insert(action); } else { self.pressed.remove(&action); }
        if just { self.just_pressed.insert(action); } else { self.just_pressed.remove(&action); }
    }

    pub fn pressed(&self, action: PlayerAction) -> bool { self.pressed.contains(&action) }

    pub fn just_pressed(&self, action: PlayerAction) -> bool { self.just_pressed.contains(&action) }
}
