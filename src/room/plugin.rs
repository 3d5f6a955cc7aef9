//! Room layout plugin wiring (glue).
//! - Registry asset/loader
//! - RoomSettings + RoomSeed
//! - RegenerateRoom / RoomGenerated / RoomCleared events
//! - Generation runs on the async compute pool; results land in the SpawnQueue

use std::path::PathBuf;
use std::sync::Arc;

use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, Task};
use futures_lite::future;

use super::core::{AnyAsset, AssetRef, AssetResolver, LayoutError, RoomFrame, RoomSeed};
use super::grid::GridOccupancy;
use super::placement::{GenerationReport, RoomGenerator};
use super::queue::{SpawnQueue, SpawnQueueConfig};
use super::registry::{RoomData, RoomRegistry, RoomRegistryAssetPlugin};

/// Which room to build, from where, and how strictly to check asset references.
#[derive(Resource, Clone, Debug)]
pub struct RoomSettings {
    pub registry_path: String,
    pub room: String,
    pub seed: u64,
    /// World position of the grid's (0, 0) corner.
    pub origin: Vec3,
    /// When set, every asset reference must exist as a file under `asset_root`.
    pub check_asset_files: bool,
    pub asset_root: PathBuf,
}
impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            registry_path: "rooms/demo.rooms.ron".to_string(),
            room: "great_hall".to_string(),
            seed: 1337,
            origin: Vec3::ZERO,
            check_asset_files: false,
            asset_root: PathBuf::from("assets"),
        }
    }
}

/// Handle to the loaded RoomRegistry asset.
#[derive(Resource, Default)]
pub struct RoomRegistryHandle(pub Handle<RoomRegistry>);

/// Ask for a fresh layout. `seed: None` reuses the current [`RoomSeed`].
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct RegenerateRoom {
    pub seed: Option<u64>,
}

/// A run finished and its placements are queued.
#[derive(Event, Clone, Debug)]
pub struct RoomGenerated {
    pub room: String,
    pub report: GenerationReport,
}

/// The previous layout is being replaced; anything spawned for it should go.
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct RoomCleared;

/// Resolver that requires the referenced file to exist under an asset root.
pub struct AssetRootResolver {
    root: PathBuf,
}

impl AssetRootResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }
}

impl AssetResolver for AssetRootResolver {
    fn resolve(&self, asset: &AssetRef) -> bool {
        !asset.as_str().is_empty() && self.root.join(asset.as_str()).is_file()
    }
}

/// What a finished generation task hands back.
pub struct RoomRun {
    pub generator: RoomGenerator,
    pub room: String,
    pub frame: RoomFrame,
    pub queue: SpawnQueue,
    pub result: Result<GenerationReport, LayoutError>,
}

/// The generator and its in-flight task. Exactly one of the two holds the generator.
#[derive(Resource)]
pub struct ActiveRoom {
    generator: Option<RoomGenerator>,
    task: Option<Task<RoomRun>>,
    /// Frame of the last successful run.
    pub frame: RoomFrame,
    pub name: Option<String>,
}

impl Default for ActiveRoom {
    fn default() -> Self {
        Self { generator: Some(RoomGenerator::new()), task: None, frame: RoomFrame::default(), name: None }
    }
}

impl ActiveRoom {
    pub fn is_running(&self) -> bool { self.task.is_some() }

    /// Grid left by the last run; `None` while a run is in flight.
    pub fn grid(&self) -> Option<&GridOccupancy> {
        self.generator.as_ref().map(RoomGenerator::describe_grid_state)
    }

    pub fn generator(&self) -> Option<&RoomGenerator> { self.generator.as_ref() }
}

pub struct RoomLayoutPlugin;
impl Plugin for RoomLayoutPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RoomRegistryAssetPlugin)
            .init_resource::<RoomSettings>()
            .init_resource::<RoomRegistryHandle>()
            .init_resource::<ActiveRoom>()
            .init_resource::<SpawnQueue>()
            .init_resource::<SpawnQueueConfig>()
            .add_event::<RegenerateRoom>()
            .add_event::<RoomGenerated>()
            .add_event::<RoomCleared>()
            .add_systems(Startup, (init_seed_from_settings, load_registry))
            .add_systems(
                Update,
                (
                    regenerate_on_registry_change,
                    schedule_generation,
                    collect_generation,
                )
                    .chain(),
            );
    }
}

/// Startup: insert RoomSeed based on RoomSettings.
fn init_seed_from_settings(mut commands: Commands, settings: Res<RoomSettings>) {
    commands.insert_resource(RoomSeed(settings.seed));
}

/// Startup: request loading the registry manifest, store handle.
fn load_registry(
    mut handle_res: ResMut<RoomRegistryHandle>,
    settings: Res<RoomSettings>,
    assets: Res<AssetServer>,
) {
    if handle_res.0.is_strong() { return; }
    handle_res.0 = assets.load(settings.registry_path.as_str());
    info!(
        "Rooms: loading registry from '{}', room='{}', seed={}",
        settings.registry_path, settings.room, settings.seed
    );
}

/// Update: build once the registry is ready and again whenever it is edited on disk.
fn regenerate_on_registry_change(
    handle_res: Res<RoomRegistryHandle>,
    mut events: EventReader<AssetEvent<RoomRegistry>>,
    mut regen: EventWriter<RegenerateRoom>,
) {
    let id = handle_res.0.id();
    for ev in events.read() {
        match ev {
            AssetEvent::LoadedWithDependencies { id: loaded } if *loaded == id => {
                info!("Rooms: registry loaded and ready");
                regen.write(RegenerateRoom::default());
            }
            AssetEvent::Modified { id: changed } if *changed == id => {
                info!("Rooms: registry changed, regenerating");
                regen.write(RegenerateRoom::default());
            }
            _ => {}
        }
    }
}

/// Update: move the generator into an async task for the latest request.
pub fn schedule_generation(
    mut events: EventReader<RegenerateRoom>,
    mut active: ResMut<ActiveRoom>,
    mut seed: ResMut<RoomSeed>,
    settings: Res<RoomSettings>,
    registries: Res<Assets<RoomRegistry>>,
    handle: Res<RoomRegistryHandle>,
) {
    // Several requests in one frame collapse into the last one.
    let Some(request) = events.read().last().copied() else { return };

    if active.is_running() {
        warn!("Rooms: generation already in progress; ignoring regenerate request");
        return;
    }
    let Some(registry) = registries.get(&handle.0) else {
        warn!("Rooms: registry '{}' not loaded yet", settings.registry_path);
        return;
    };
    let Some(room) = registry.get(&settings.room).cloned() else {
        warn!("Rooms: no room named '{}' in '{}'", settings.room, settings.registry_path);
        return;
    };
    let Some(generator) = active.generator.take() else { return };

    if let Some(s) = request.seed {
        seed.0 = s;
    }
    let seed = *seed;
    let origin = settings.origin;
    let resolver: Arc<dyn AssetResolver> = if settings.check_asset_files {
        Arc::new(AssetRootResolver::new(settings.asset_root.clone()))
    } else {
        Arc::new(AnyAsset)
    };

    debug!("Rooms: scheduling '{}' with seed {}", room.name, seed.0);
    let task = AsyncComputeTaskPool::get().spawn(async move {
        run_generation(generator, room, origin, seed, resolver.as_ref())
    });
    active.task = Some(task);
}

/// Update: pick up a finished run, hand its placements to instancing.
pub fn collect_generation(
    mut active: ResMut<ActiveRoom>,
    mut queue: ResMut<SpawnQueue>,
    mut cleared: EventWriter<RoomCleared>,
    mut generated: EventWriter<RoomGenerated>,
) {
    let Some(task) = active.task.as_mut() else { return };
    if !task.is_finished() { return; }
    let Some(run) = future::block_on(future::poll_once(task)) else { return };

    active.task = None;
    active.generator = Some(run.generator);

    // On error the generator already logged why; the previous layout stays.
    if let Ok(report) = run.result {
        active.frame = run.frame;
        active.name = Some(run.room.clone());
        cleared.write(RoomCleared);
        *queue = run.queue;
        info!("Rooms: '{}' ready, {} placements queued", run.room, queue.items.len());
        generated.write(RoomGenerated { room: run.room, report });
    }
}

fn run_generation(
    mut generator: RoomGenerator,
    room: RoomData,
    origin: Vec3,
    seed: RoomSeed,
    resolver: &dyn AssetResolver,
) -> RoomRun {
    let frame = RoomFrame { origin, cell_size: room.cell_size };
    let mut queue = SpawnQueue::with_cell_size(room.cell_size);
    let result = generator.trigger_regeneration(&room, origin, seed, resolver, &mut queue);
    RoomRun { generator, room: room.name, frame, queue, result }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::ecs::system::RunSystemOnce;
    use bevy::tasks::TaskPool;

    use super::*;
    use crate::room::core::{CellState, PlaceableDescriptor};
    use crate::room::registry::FloorStyle;

    fn world_with_room(room: RoomData) -> World {
        AsyncComputeTaskPool::get_or_init(TaskPool::default);

        let mut world = World::default();
        let mut registries = Assets::<RoomRegistry>::default();
        let name = room.name.clone();
        let registry = RoomRegistry {
            rooms: vec![room],
            name_to_index: [(name.clone(), 0)].into_iter().collect(),
        };
        let handle = registries.add(registry);

        world.insert_resource(registries);
        world.insert_resource(RoomRegistryHandle(handle));
        world.insert_resource(RoomSettings { room: name, ..Default::default() });
        world.insert_resource(RoomSeed(7));
        world.init_resource::<ActiveRoom>();
        world.init_resource::<SpawnQueue>();
        world.init_resource::<Events<RegenerateRoom>>();
        world.init_resource::<Events<RoomGenerated>>();
        world.init_resource::<Events<RoomCleared>>();
        world
    }

    fn wait_for_run(world: &mut World) {
        for _ in 0..500 {
            world.run_system_once(collect_generation).expect("collect runs");
            if !world.resource::<ActiveRoom>().is_running() {
                return;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        panic!("generation task never finished");
    }

    fn small_room() -> RoomData {
        RoomData::new("cell", 3, 2)
            .with_floor(FloorStyle::new("floor/plain").with_tiles(vec![PlaceableDescriptor::new("floor/stone")]))
    }

    #[test]
    fn regenerate_request_queues_a_full_layout() {
        let mut world = world_with_room(small_room());
        world.send_event(RegenerateRoom { seed: Some(42) });
        world.run_system_once(schedule_generation).expect("schedule runs");
        assert!(world.resource::<ActiveRoom>().is_running());
        assert!(world.resource::<ActiveRoom>().grid().is_none());

        wait_for_run(&mut world);

        assert_eq!(world.resource::<RoomSeed>().0, 42);
        let active = world.resource::<ActiveRoom>();
        assert_eq!(active.grid().map(|g| g.count(CellState::Empty)), Some(0));
        assert_eq!(active.name.as_deref(), Some("cell"));

        let queue = world.resource::<SpawnQueue>();
        assert_eq!(queue.items.len(), 6);
        assert!(queue.finalize_requested);
        assert_eq!(world.resource::<Events<RoomGenerated>>().len(), 1);
        assert_eq!(world.resource::<Events<RoomCleared>>().len(), 1);
    }

    #[test]
    fn second_request_while_running_is_refused() {
        let mut world = world_with_room(small_room());
        world.send_event(RegenerateRoom { seed: None });
        world.run_system_once(schedule_generation).expect("schedule runs");

        world.send_event(RegenerateRoom { seed: Some(99) });
        world.run_system_once(schedule_generation).expect("schedule runs");
        // Refused requests do not touch the seed.
        assert_eq!(world.resource::<RoomSeed>().0, 7);

        wait_for_run(&mut world);
        assert_eq!(world.resource::<Events<RoomGenerated>>().len(), 1);
    }

    #[test]
    fn failed_run_keeps_the_previous_queue() {
        let mut room = small_room();
        room.floor = None;
        let mut world = world_with_room(room);
        world.send_event(RegenerateRoom::default());
        world.run_system_once(schedule_generation).expect("schedule runs");
        wait_for_run(&mut world);

        assert!(world.resource::<SpawnQueue>().items.is_empty());
        assert!(world.resource::<Events<RoomGenerated>>().is_empty());
        assert!(world.resource::<ActiveRoom>().generator().is_some());
    }

    #[test]
    fn asset_root_resolver_needs_an_existing_file() {
        let resolver = AssetRootResolver::new(env!("CARGO_MANIFEST_DIR"));
        assert!(resolver.resolve(&AssetRef::new("Cargo.toml")));
        assert!(!resolver.resolve(&AssetRef::new("no/such/mesh.glb")));
        assert!(!resolver.resolve(&AssetRef::new("")));
    }
}
