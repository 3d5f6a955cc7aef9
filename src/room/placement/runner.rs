// src/room/placement/runner.rs
//! One generation run: validate, reset, reserve, forced, packing, gap-fill, finalize.

use bevy::log::{debug, info, warn};
use bevy::math::Vec3;

use super::{fill_gaps, pack_random, place_forced, reserve_cells, PassContext, Pools};
use crate::room::core::{
    AssetResolver, CellState, LayoutError, MissingConfig, PlacementSink, RoomFrame, RoomSeed,
};
use crate::room::grid::GridOccupancy;
use crate::room::random::SeededRandom;
use crate::room::registry::RoomData;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GenerationPhase {
    #[default]
    Idle,
    Resetting,
    ReservingCells,
    PlacingForced,
    PackingRandom,
    FillingGaps,
    Finalizing,
}

/// Per-run counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub seed: RoomSeed,
    pub reserved: usize,
    pub forced_placed: usize,
    pub forced_rejected: usize,
    pub random_placed: usize,
    pub random_deferred: usize,
    pub gaps_filled: usize,
    /// Stream draws consumed by the whole run.
    pub draws: u64,
}

impl GenerationReport {
    pub fn emitted(&self) -> usize { self.forced_placed + self.random_placed + self.gaps_filled }
}

/// Owns the occupancy grid between runs. Runs are serialized by `&mut self`.
#[derive(Clone, Debug, Default)]
pub struct RoomGenerator {
    grid: GridOccupancy,
    phase: GenerationPhase,
    last_report: Option<GenerationReport>,
}

impl RoomGenerator {
    pub fn new() -> Self { Self::default() }

    /// Read-only view of the grid as the last run (or the current phase) left it.
    pub fn describe_grid_state(&self) -> &GridOccupancy { &self.grid }

    pub fn phase(&self) -> GenerationPhase { self.phase }

    pub fn last_report(&self) -> Option<&GenerationReport> { self.last_report.as_ref() }

    /// Regenerate `room` from scratch with `seed`, emitting every placement into `sink`.
    ///
    /// Configuration problems are reported before anything is reset, so a failed call
    /// leaves the previous grid intact and emits nothing.
    pub fn trigger_regeneration(
        &mut self,
        room: &RoomData,
        origin: Vec3,
        seed: RoomSeed,
        resolver: &dyn AssetResolver,
        sink: &mut dyn PlacementSink,
    ) -> Result<GenerationReport, LayoutError> {
        let validated = room.validate().and_then(|(size, floor)| {
            if resolver.resolve(&floor.filler_tile) {
                Ok((size, floor))
            } else {
                Err(MissingConfig::FillerTile(floor.filler_tile.clone()).into())
            }
        });
        let (size, floor) = match validated {
            Ok(v) => v,
            Err(e) => {
                warn!("Room '{}' not generated: {}", room.name, e);
                return Err(e);
            }
        };

        let mut rng = SeededRandom::new(seed);
        let mut report = GenerationReport { seed, ..Default::default() };
        let mut ctx = PassContext {
            frame: RoomFrame { origin, cell_size: room.cell_size },
            resolver,
            sink,
        };

        self.enter(GenerationPhase::Resetting);
        self.grid.reset(size);

        self.enter(GenerationPhase::ReservingCells);
        report.reserved = reserve_cells(&mut self.grid, &room.reserved_cells);

        self.enter(GenerationPhase::PlacingForced);
        let forced = place_forced(&mut self.grid, &mut ctx, &mut rng, &room.forced_placements);
        report.forced_placed = forced.placed;
        report.forced_rejected = forced.rejected;
        debug!("forced: {} placed, {} rejected", forced.placed, forced.rejected);

        self.enter(GenerationPhase::PackingRandom);
        let pools = Pools { main: &floor.tile_pool, edge: &floor.edge_pool };
        let packed = pack_random(&mut self.grid, &mut ctx, &mut rng, pools);
        report.random_placed = packed.placed;
        report.random_deferred = packed.deferred;
        debug!(
            "packing: {} placed, {} deferred, {} without candidates",
            packed.placed, packed.deferred, packed.skipped
        );

        self.enter(GenerationPhase::FillingGaps);
        report.gaps_filled = fill_gaps(&mut self.grid, &mut ctx, &floor.filler_tile);
        debug_assert_eq!(self.grid.count(CellState::Empty), 0);

        self.enter(GenerationPhase::Finalizing);
        ctx.sink.finalize();

        report.draws = rng.draws();
        info!(
            "Room '{}' ({}x{}, seed {}): {} forced, {} random, {} filler, {} reserved",
            room.name,
            size.width,
            size.height,
            seed.0,
            report.forced_placed,
            report.random_placed,
            report.gaps_filled,
            report.reserved
        );

        self.enter(GenerationPhase::Idle);
        self.last_report = Some(report);
        Ok(report)
    }

    fn enter(&mut self, phase: GenerationPhase) {
        debug!("room generation: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::room::core::{
        AnyAsset, AssetRef, CellCoord, PlaceableDescriptor, PlacedInstance, PlacementSource, Rotation,
    };
    use crate::room::placement::test_support::Refuse;
    use crate::room::registry::FloorStyle;

    /// Sink that also records whether it was finalized.
    #[derive(Default)]
    struct Recording {
        placed: Vec<PlacedInstance>,
        finalized: usize,
    }

    impl PlacementSink for Recording {
        fn place(&mut self, instance: PlacedInstance) { self.placed.push(instance); }
        fn finalize(&mut self) { self.finalized += 1; }
    }

    fn furnished(width: u32, height: u32) -> RoomData {
        let spin = [Rotation::Deg0, Rotation::Deg90, Rotation::Deg180, Rotation::Deg270];
        RoomData::new("test", width, height).with_floor(
            FloorStyle::new("floor/plain")
                .with_tiles(vec![
                    PlaceableDescriptor::new("floor/stone").with_weight(3.0).with_rotations(&spin),
                    PlaceableDescriptor::new("props/bench").with_footprint(2, 1).with_rotations(&spin),
                    PlaceableDescriptor::new("props/rug").with_footprint(2, 2),
                ])
                .with_edges(vec![PlaceableDescriptor::new("floor/trim").with_rotations(&spin)]),
        )
    }

    fn run(room: &RoomData, seed: u64) -> (RoomGenerator, GenerationReport, Recording) {
        let mut generator = RoomGenerator::new();
        let mut sink = Recording::default();
        let report = generator
            .trigger_regeneration(room, Vec3::ZERO, RoomSeed(seed), &AnyAsset, &mut sink)
            .expect("room is configured");
        (generator, report, sink)
    }

    fn assert_no_overlap(placed: &[PlacedInstance]) {
        let mut seen = HashSet::new();
        for p in placed {
            for c in p.cells() {
                assert!(seen.insert(c), "{} covered twice", c);
            }
        }
    }

    #[test]
    fn empty_pools_fill_every_cell_with_the_filler() {
        let room = RoomData::new("bare", 3, 3).with_floor(FloorStyle::new("floor/plain"));
        let (generator, report, sink) = run(&room, 1);

        assert_eq!(sink.placed.len(), 9);
        assert!(sink.placed.iter().all(|p| p.rotation == Rotation::Deg0 && p.source == PlacementSource::Filler));
        assert_eq!(report.gaps_filled, 9);
        assert_eq!(report.draws, 0);
        assert_eq!(sink.finalized, 1);
        assert_eq!(generator.describe_grid_state().count(CellState::Occupied), 9);
        assert_eq!(generator.phase(), GenerationPhase::Idle);
    }

    #[test]
    fn forced_block_is_placed_before_packing() {
        let room = RoomData::new("b", 4, 4)
            .with_floor(FloorStyle::new("floor/plain").with_tiles(vec![PlaceableDescriptor::new("floor/stone")]))
            .force(CellCoord::new(1, 1), PlaceableDescriptor::new("props/table").with_footprint(2, 2));
        let (_, report, sink) = run(&room, 7);

        assert_eq!(sink.placed[0].source, PlacementSource::Forced);
        assert_eq!(sink.placed[0].asset, AssetRef::new("props/table"));
        assert_eq!(report.forced_placed, 1);
        // The packing pass only ever sees the 12 cells the table left.
        assert_eq!(report.random_placed + report.random_deferred, 12);
        assert_eq!(report.emitted(), sink.placed.len());
        assert!(sink.placed[1..].iter().all(|p| !p.cells().any(|c| sink.placed[0].cells().any(|t| t == c))));
    }

    #[test]
    fn forced_footprint_past_the_edge_is_rejected_then_filled() {
        let room = RoomData::new("c", 3, 3)
            .with_floor(FloorStyle::new("floor/plain"))
            .force(CellCoord::new(2, 2), PlaceableDescriptor::new("props/table").with_footprint(2, 2));
        let (generator, report, sink) = run(&room, 3);

        assert_eq!(report.forced_rejected, 1);
        assert!(sink.placed.iter().all(|p| p.source == PlacementSource::Filler));
        assert_eq!(report.gaps_filled, 9);
        assert_eq!(generator.describe_grid_state().count(CellState::Empty), 0);
    }

    #[test]
    fn same_seed_same_layout() {
        let room = furnished(9, 7).force(CellCoord::new(4, 3), PlaceableDescriptor::new("props/altar"));
        let (_, ra, a) = run(&room, 2024);
        let (_, rb, b) = run(&room, 2024);
        assert_eq!(a.placed, b.placed);
        assert_eq!(ra, rb);

        let (_, _, c) = run(&room, 2025);
        assert_ne!(a.placed, c.placed);
    }

    #[test]
    fn every_cell_covered_exactly_once() {
        for seed in 0..20 {
            let room = furnished(8, 6).reserve(CellCoord::new(3, 3));
            let (generator, report, sink) = run(&room, seed);
            let grid = generator.describe_grid_state();

            assert_eq!(grid.count(CellState::Empty), 0);
            assert_eq!(grid.count(CellState::Reserved), 1);
            assert_no_overlap(&sink.placed);

            let covered: usize = sink.placed.iter().map(|p| p.footprint.area() as usize).sum();
            assert_eq!(covered + report.reserved, 48);
            assert!(sink.placed.iter().all(|p| p.origin != CellCoord::new(3, 3)));
        }
    }

    #[test]
    fn reserved_cells_stay_reserved_and_block_forced() {
        let room = furnished(5, 5)
            .reserve(CellCoord::new(2, 2))
            .force(CellCoord::new(2, 2), PlaceableDescriptor::new("props/statue"));
        let (generator, report, sink) = run(&room, 11);

        assert_eq!(report.forced_rejected, 1);
        assert_eq!(generator.describe_grid_state().get(CellCoord::new(2, 2)), Some(CellState::Reserved));
        assert!(sink.placed.iter().all(|p| p.cells().all(|c| c != CellCoord::new(2, 2))));
    }

    #[test]
    fn missing_configuration_leaves_previous_grid() {
        let (mut generator, _, _) = run(&furnished(4, 4), 5);
        let before = generator.describe_grid_state().clone();

        let mut sink = Recording::default();
        let mut sizeless = furnished(6, 6);
        sizeless.grid_size = None;
        let err = generator.trigger_regeneration(&sizeless, Vec3::ZERO, RoomSeed(5), &AnyAsset, &mut sink);
        assert_eq!(err, Err(LayoutError::ConfigurationMissing(MissingConfig::GridSize)));

        let floorless = RoomData::new("f", 6, 6);
        let err = generator.trigger_regeneration(&floorless, Vec3::ZERO, RoomSeed(5), &AnyAsset, &mut sink);
        assert_eq!(err, Err(LayoutError::ConfigurationMissing(MissingConfig::FloorStyle)));

        let refuse = Refuse::of(&["floor/plain"]);
        let err = generator.trigger_regeneration(&furnished(6, 6), Vec3::ZERO, RoomSeed(5), &refuse, &mut sink);
        assert_eq!(
            err,
            Err(LayoutError::ConfigurationMissing(MissingConfig::FillerTile(AssetRef::new("floor/plain"))))
        );

        assert_eq!(generator.describe_grid_state(), &before);
        assert!(sink.placed.is_empty());
        assert_eq!(sink.finalized, 0);
        assert_eq!(generator.phase(), GenerationPhase::Idle);
    }

    #[test]
    fn origin_and_cell_size_shape_transforms() {
        let room = RoomData::new("scaled", 2, 1).with_cell_size(2.0).with_floor(FloorStyle::new("floor/plain"));
        let mut generator = RoomGenerator::new();
        let mut sink: Vec<PlacedInstance> = Vec::new();
        generator
            .trigger_regeneration(&room, Vec3::new(10.0, 1.0, -4.0), RoomSeed(0), &AnyAsset, &mut sink)
            .expect("configured");
        assert_eq!(sink[1].transform.translation, Vec3::new(13.0, 1.0, -3.0));
    }
}
