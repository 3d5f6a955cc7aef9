// src/room/core.rs
//! Core types/traits for deterministic, grid-based room layout.
//! Keep this file dependency-light; the passes and the host layer both build on it.

use bevy::prelude::*; // Vec3, Quat, Transform
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// World units per grid cell when a room does not say otherwise (1 cell = 1 m).
pub const DEFAULT_CELL_SIZE: f32 = 1.0;

// ---------- Seed, cells, grid size ----------

/// Room generation seed; changing this reshuffles everything the random passes place.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomSeed(pub u64);

impl Default for RoomSeed {
    fn default() -> Self { Self(1337) }
}

/// Integer cell coordinate on the room grid. `y` grows away from the room origin along world +Z.
///
/// Ordering is row-major (by `y`, then `x`), which is the canonical order every pass walks in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    pub const fn new(x: i32, y: i32) -> Self { Self { x, y } }

    /// Cell offset by `(dx, dy)`.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

impl Ord for CellCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for CellCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Room dimensions in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    pub const fn new(width: u32, height: u32) -> Self { Self { width, height } }
    pub const fn cell_count(&self) -> usize { (self.width as usize) * (self.height as usize) }
    pub const fn is_empty(&self) -> bool { self.width == 0 || self.height == 0 }
}

// ---------- Footprints & rotations ----------

/// Rectangular cell area covered by a placeable, `x` cells wide and `y` cells deep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub x: u32,
    pub y: u32,
}

impl Default for Footprint {
    fn default() -> Self { Self::ONE }
}

impl Footprint {
    pub const ONE: Self = Self { x: 1, y: 1 };

    pub const fn new(x: u32, y: u32) -> Self { Self { x, y } }

    /// Footprint after yawing by `rotation`. Quarter turns swap the axes.
    pub const fn rotated(self, rotation: Rotation) -> Self {
        if rotation.swaps_axes() { Self { x: self.y, y: self.x } } else { self }
    }

    pub const fn area(&self) -> u32 { self.x * self.y }
}

/// Yaw about the vertical axis, restricted to quarter turns.
///
/// Serialized as plain degrees (`0`, `90`, `180`, `270`); anything else fails to parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub const fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    #[inline]
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// World rotation for this yaw. Positive yaw turns grid +X toward grid +Y (world +Z),
    /// which is a negative turn about Bevy's +Y.
    pub fn to_quat(self) -> Quat {
        Quat::from_rotation_y(-f32::from(self.degrees()).to_radians())
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(deg: u16) -> Result<Self, Self::Error> {
        match deg {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(format!("unsupported rotation {other}; expected 0, 90, 180 or 270")),
        }
    }
}

impl From<Rotation> for u16 {
    fn from(r: Rotation) -> u16 { r.degrees() }
}

// ---------- Placeables ----------

/// Opaque reference to the asset a placeable renders as (a path under the asset root).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(pub String);

impl AssetRef {
    pub fn new(path: impl Into<String>) -> Self { Self(path.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// One candidate piece in a pool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaceableDescriptor {
    pub asset: AssetRef,

    /// Footprint in cells before rotation.
    #[serde(default)]
    pub footprint: Footprint,

    /// Relative weight for weighted selection (higher means more likely).
    #[serde(default = "default_weight")]
    pub weight: f32,

    /// Yaws the piece may be placed at; one is drawn per placement attempt.
    #[serde(default = "default_rotations")]
    pub rotations: Vec<Rotation>,
}

fn default_weight() -> f32 {
    1.0
}
fn default_rotations() -> Vec<Rotation> {
    vec![Rotation::Deg0]
}

impl PlaceableDescriptor {
    /// 1×1, weight 1, rotation 0.
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            asset: AssetRef::new(asset),
            footprint: Footprint::ONE,
            weight: default_weight(),
            rotations: default_rotations(),
        }
    }

    pub fn with_footprint(mut self, x: u32, y: u32) -> Self {
        self.footprint = Footprint::new(x, y);
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_rotations(mut self, rotations: &[Rotation]) -> Self {
        self.rotations = rotations.to_vec();
        self
    }

    /// Reject descriptors the passes cannot place deterministically.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let reason = if self.rotations.is_empty() {
            Some("no allowed rotations")
        } else if self.footprint.x == 0 || self.footprint.y == 0 {
            Some("zero-sized footprint")
        } else if !self.weight.is_finite() || self.weight < 0.0 {
            Some("weight must be finite and non-negative")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(LayoutError::InvalidDescriptor {
                asset: self.asset.clone(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

// ---------- Grid cells ----------

/// Occupancy of one grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum CellState {
    #[default]
    Empty,
    Occupied,
    /// Designer-excluded; never packed, never filled.
    Reserved,
}

// ---------- Placement output ----------

/// Which pass produced a placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlacementSource {
    Forced,
    Random,
    Filler,
}

/// Finalized placement handed to a [`PlacementSink`].
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedInstance {
    pub asset: AssetRef,
    /// Lowest-index cell covered (the anchor of the footprint).
    pub origin: CellCoord,
    /// Footprint after rotation, i.e. the cells actually covered.
    pub footprint: Footprint,
    pub rotation: Rotation,
    pub transform: Transform,
    pub source: PlacementSource,
}

impl PlacedInstance {
    /// Every cell this instance covers, row-major.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.footprint.y as i32).flat_map(move |dy| {
            (0..self.footprint.x as i32).map(move |dx| self.origin.offset(dx, dy))
        })
    }
}

/// Room-space anchoring used to turn cells into world transforms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoomFrame {
    /// World position of the grid's (0, 0) corner.
    pub origin: Vec3,
    pub cell_size: f32,
}

impl Default for RoomFrame {
    fn default() -> Self { Self { origin: Vec3::ZERO, cell_size: DEFAULT_CELL_SIZE } }
}

/// Centre-pivot transform for a footprint anchored at `cell`.
pub fn world_transform(frame: RoomFrame, cell: CellCoord, footprint: Footprint, rotation: Rotation) -> Transform {
    let cx = (cell.x as f32 + footprint.x as f32 / 2.0) * frame.cell_size;
    let cz = (cell.y as f32 + footprint.y as f32 / 2.0) * frame.cell_size;
    Transform {
        translation: frame.origin + Vec3::new(cx, 0.0, cz),
        rotation: rotation.to_quat(),
        scale: Vec3::ONE,
    }
}

// ---------- Traits: output and asset resolution ----------

/// Receives placements as the passes emit them (forced, then random, then filler).
pub trait PlacementSink {
    fn place(&mut self, instance: PlacedInstance);
    /// Called once after the last pass; recompute any cached bounds here.
    fn finalize(&mut self) {}
}

impl PlacementSink for Vec<PlacedInstance> {
    fn place(&mut self, instance: PlacedInstance) { self.push(instance); }
}

/// Blocking check that an asset reference resolves to something usable.
pub trait AssetResolver: Send + Sync + 'static {
    fn resolve(&self, asset: &AssetRef) -> bool;
}

/// Resolver that accepts every non-empty reference.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnyAsset;

impl AssetResolver for AnyAsset {
    fn resolve(&self, asset: &AssetRef) -> bool { !asset.0.is_empty() }
}

// ---------- Errors ----------

/// Required input absent; the run aborts before touching the grid.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MissingConfig {
    #[error("room has no grid size")]
    GridSize,
    #[error("room grid is {0}x{1}; both sides must be at least one cell")]
    EmptyGrid(u32, u32),
    #[error("cell size {0} must be finite and positive")]
    CellSize(f32),
    #[error("room has no floor style")]
    FloorStyle,
    #[error("filler tile '{0}' could not be resolved")]
    FillerTile(AssetRef),
}

/// Fatal, per-run errors. Nothing is mutated when one of these is returned.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("configuration missing: {0}")]
    ConfigurationMissing(#[from] MissingConfig),
    #[error("invalid placeable '{asset}': {reason}")]
    InvalidDescriptor { asset: AssetRef, reason: String },
}

/// Why a single placement attempt did not happen. Never fatal to the run.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementRejection {
    #[error("footprint leaves the grid")]
    OutOfBounds,
    #[error("cell {0} is not empty")]
    Overlap(CellCoord),
    #[error("asset could not be resolved")]
    AssetUnresolved,
}
