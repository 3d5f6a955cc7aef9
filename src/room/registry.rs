// src/room/registry.rs
//! Data-driven room definitions + loader.

use bevy::asset::{io::Reader, AssetLoader, LoadContext};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::core::{
    AssetRef, CellCoord, GridSize, LayoutError, MissingConfig, PlaceableDescriptor, DEFAULT_CELL_SIZE,
};

// ---------- Public plugin to register asset+loader ----------

pub struct RoomRegistryAssetPlugin;

impl Plugin for RoomRegistryAssetPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<RoomRegistry>()
            .register_asset_loader(RoomRegistryLoader);
    }
}

// ---------- Floor style (data form) ----------

/// Pools the packing passes draw from, plus the tile that plugs whatever is left.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloorStyle {
    /// Main floor/interior pool.
    #[serde(default)]
    pub tile_pool: Vec<PlaceableDescriptor>,

    /// Perimeter override; ignored while empty.
    #[serde(default)]
    pub edge_pool: Vec<PlaceableDescriptor>,

    /// Always placed 1×1 at rotation 0.
    pub filler_tile: AssetRef,
}

impl FloorStyle {
    pub fn new(filler_tile: impl Into<String>) -> Self {
        Self { tile_pool: Vec::new(), edge_pool: Vec::new(), filler_tile: AssetRef::new(filler_tile) }
    }

    pub fn with_tiles(mut self, tiles: Vec<PlaceableDescriptor>) -> Self {
        self.tile_pool = tiles;
        self
    }

    pub fn with_edges(mut self, edges: Vec<PlaceableDescriptor>) -> Self {
        self.edge_pool = edges;
        self
    }
}

// ---------- Room definition (data form) ----------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomData {
    /// Unique human-readable name (used for lookup).
    pub name: String,

    /// Room size in cells. Generation refuses to run without it.
    #[serde(default)]
    pub grid_size: Option<GridSize>,

    /// World units per cell.
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,

    #[serde(default)]
    pub floor: Option<FloorStyle>,

    /// Designer-pinned pieces by anchor cell. Map order does not matter; the pass sorts it.
    #[serde(default)]
    pub forced_placements: HashMap<CellCoord, PlaceableDescriptor>,

    /// Cells the random passes must leave alone.
    #[serde(default)]
    pub reserved_cells: Vec<CellCoord>,
}

fn default_cell_size() -> f32 {
    DEFAULT_CELL_SIZE
}

impl RoomData {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            grid_size: Some(GridSize::new(width, height)),
            cell_size: DEFAULT_CELL_SIZE,
            floor: None,
            forced_placements: HashMap::new(),
            reserved_cells: Vec::new(),
        }
    }

    pub fn with_floor(mut self, floor: FloorStyle) -> Self {
        self.floor = Some(floor);
        self
    }

    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn force(mut self, cell: CellCoord, desc: PlaceableDescriptor) -> Self {
        self.forced_placements.insert(cell, desc);
        self
    }

    pub fn reserve(mut self, cell: CellCoord) -> Self {
        self.reserved_cells.push(cell);
        self
    }

    /// Everything a run needs before it may touch the grid.
    pub fn validate(&self) -> Result<(GridSize, &FloorStyle), LayoutError> {
        let size = self.grid_size.ok_or(MissingConfig::GridSize)?;
        if size.is_empty() {
            return Err(MissingConfig::EmptyGrid(size.width, size.height).into());
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(MissingConfig::CellSize(self.cell_size).into());
        }
        let floor = self.floor.as_ref().ok_or(MissingConfig::FloorStyle)?;

        floor
            .tile_pool
            .iter()
            .chain(&floor.edge_pool)
            .chain(self.forced_placements.values())
            .try_for_each(PlaceableDescriptor::validate)?;

        Ok((size, floor))
    }
}

// ---------- Runtime registry asset ----------

#[derive(Asset, TypePath, Clone, Debug)]
pub struct RoomRegistry {
    /// Ordered as authored.
    pub rooms: Vec<RoomData>,
    /// Name → index for quick lookups.
    pub name_to_index: HashMap<String, u32>,
}

impl RoomRegistry {
    /// Parse a `.rooms.ron` document (a list of rooms) and index it by name.
    pub fn from_ron_bytes(bytes: &[u8]) -> Result<Self, RoomRegistryLoadError> {
        let rooms: Vec<RoomData> =
            ron::de::from_bytes(bytes).map_err(|e| RoomRegistryLoadError::Ron(e.to_string()))?;

        let mut name_to_index = HashMap::with_capacity(rooms.len());
        for (i, room) in rooms.iter().enumerate() {
            if let Some(prev) = name_to_index.insert(room.name.clone(), i as u32) {
                return Err(RoomRegistryLoadError::DuplicateName {
                    name: room.name.clone(),
                    first: prev,
                    second: i as u32,
                });
            }
        }

        Ok(Self { rooms, name_to_index })
    }

    pub fn get(&self, name: &str) -> Option<&RoomData> {
        self.name_to_index.get(name).and_then(|&i| self.rooms.get(i as usize))
    }
}

// ---------- Asset loader for `.rooms.ron` ----------

#[derive(Default)]
pub struct RoomRegistryLoader;

impl AssetLoader for RoomRegistryLoader {
    type Asset = RoomRegistry;
    type Settings = ();
    type Error = RoomRegistryLoadError;

    fn extensions(&self) -> &[&str] {
        &["rooms.ron"]
    }

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        RoomRegistry::from_ron_bytes(&bytes)
    }
}

// ---------- Loader errors ----------

#[derive(thiserror::Error, Debug)]
pub enum RoomRegistryLoadError {
    #[error("I/O while reading room registry: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(String),
    #[error("Duplicate room name '{name}' (first idx {first}, second idx {second})")]
    DuplicateName { name: String, first: u32, second: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::core::{Footprint, Rotation};

    const HALL: &str = r#"[
        (
            name: "hall",
            grid_size: Some((width: 6, height: 4)),
            cell_size: 2.0,
            floor: Some((
                tile_pool: [
                    (asset: "floor/stone", weight: 4.0),
                    (asset: "props/bench", footprint: (x: 2, y: 1), rotations: [0, 90]),
                ],
                edge_pool: [(asset: "floor/trim")],
                filler_tile: "floor/plain",
            )),
            forced_placements: {
                (x: 2, y: 1): (asset: "props/altar", footprint: (x: 2, y: 2)),
            },
            reserved_cells: [(x: 0, y: 0)],
        ),
        (
            name: "closet",
            grid_size: Some((width: 2, height: 2)),
        ),
    ]"#;

    #[test]
    fn parses_rooms_with_defaults() {
        let reg = RoomRegistry::from_ron_bytes(HALL.as_bytes()).expect("valid registry");
        assert_eq!(reg.rooms.len(), 2);

        let hall = reg.get("hall").expect("hall");
        assert_eq!(hall.cell_size, 2.0);
        let floor = hall.floor.as_ref().expect("floor");
        assert_eq!(floor.tile_pool[0].footprint, Footprint::ONE);
        assert_eq!(floor.tile_pool[0].rotations, vec![Rotation::Deg0]);
        assert_eq!(floor.tile_pool[1].rotations, vec![Rotation::Deg0, Rotation::Deg90]);
        assert_eq!(floor.tile_pool[1].weight, 1.0);
        assert_eq!(floor.filler_tile, AssetRef::new("floor/plain"));
        assert_eq!(hall.forced_placements[&CellCoord::new(2, 1)].footprint, Footprint::new(2, 2));
        assert!(hall.validate().is_ok());

        let closet = reg.get("closet").expect("closet");
        assert_eq!(closet.cell_size, DEFAULT_CELL_SIZE);
        assert_eq!(closet.validate().err(), Some(LayoutError::ConfigurationMissing(MissingConfig::FloorStyle)));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let src = r#"[(name: "a"), (name: "a")]"#;
        match RoomRegistry::from_ron_bytes(src.as_bytes()) {
            Err(RoomRegistryLoadError::DuplicateName { first, second, .. }) => assert_eq!((first, second), (0, 1)),
            other => panic!("expected duplicate-name error, got {other:?}"),
        }
    }

    #[test]
    fn odd_rotations_fail_to_parse() {
        let src = r#"[(name: "a", floor: Some((tile_pool: [(asset: "x", rotations: [45])], filler_tile: "f")))]"#;
        assert!(matches!(RoomRegistry::from_ron_bytes(src.as_bytes()), Err(RoomRegistryLoadError::Ron(_))));
    }

    #[test]
    fn validation_reports_what_is_missing() {
        let mut room = RoomData::new("r", 3, 3).with_floor(FloorStyle::new("f"));
        room.grid_size = None;
        assert_eq!(room.validate().err(), Some(MissingConfig::GridSize.into()));

        let room = RoomData::new("r", 0, 3).with_floor(FloorStyle::new("f"));
        assert_eq!(room.validate().err(), Some(MissingConfig::EmptyGrid(0, 3).into()));

        let room = RoomData::new("r", 3, 3)
            .with_floor(FloorStyle::new("f"))
            .force(CellCoord::new(0, 0), PlaceableDescriptor::new("bad").with_rotations(&[]));
        assert!(matches!(room.validate(), Err(LayoutError::InvalidDescriptor { .. })));
    }
}
