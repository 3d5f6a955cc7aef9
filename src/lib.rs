//! Deterministic room-layout generation on a cell grid, with a Bevy host layer.
//!
//! The passes in [`room::placement`] are engine-agnostic apart from Bevy's math and
//! logging; [`room::RoomStackPlugin`] wires them into an app.

pub mod room;
