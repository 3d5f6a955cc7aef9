pub mod core;
pub mod random;
pub mod grid;
pub mod registry;
pub mod placement;
pub mod queue;
pub mod plugin;
pub mod instancing;
pub mod debug;
pub mod stack;

pub use stack::RoomStackPlugin;
