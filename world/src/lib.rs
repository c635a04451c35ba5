#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Tilequest.
//!
//! The world owns the loaded level, the object registry and the actor's
//! inventory. It is mutated exclusively through [`apply`] and read through the
//! functions in [`query`].

mod interactions;
mod inventory;
mod objects;

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use tilequest_core::{BucketedCollisionMesh, Command, Event, Level};
use tracing::{info, warn};

use inventory::Inventory;
use objects::ObjectRegistry;

const DEFAULT_SOUND_SEED: u64 = 0x7a1e_90c3_55d2_e4b1;
const DEFAULT_HAZARD_INTERVAL: Duration = Duration::from_millis(2000);
const DEFAULT_INVENTORY_CAPACITY: usize = 2;

/// Tunable world parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seed for the generator that picks sound variants.
    pub seed: u64,
    /// Milliseconds between hazard toggles.
    pub hazard_interval_ms: u64,
    /// Number of items the actor can carry.
    pub inventory_capacity: usize,
}

impl Config {
    /// Creates a configuration from explicit values.
    #[must_use]
    pub const fn new(seed: u64, hazard_interval: Duration, inventory_capacity: usize) -> Self {
        let millis = hazard_interval.as_millis();
        let hazard_interval_ms = if millis > u64::MAX as u128 {
            u64::MAX
        } else {
            millis as u64
        };
        Self {
            seed,
            hazard_interval_ms,
            inventory_capacity,
        }
    }

    /// Time between hazard toggles.
    #[must_use]
    pub const fn hazard_interval(&self) -> Duration {
        Duration::from_millis(self.hazard_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            DEFAULT_SOUND_SEED,
            DEFAULT_HAZARD_INTERVAL,
            DEFAULT_INVENTORY_CAPACITY,
        )
    }
}

/// Represents the authoritative Tilequest world state.
#[derive(Debug)]
pub struct World {
    config: Config,
    level: Level,
    collision: BucketedCollisionMesh,
    objects: ObjectRegistry,
    inventory: Inventory,
    hazard_clock: Duration,
    tick_index: u64,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates an empty world using the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty world using the provided configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            level: Level::default(),
            collision: BucketedCollisionMesh::default(),
            objects: ObjectRegistry::new(),
            inventory: Inventory::with_capacity(config.inventory_capacity),
            hazard_clock: Duration::ZERO,
            tick_index: 0,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { level } => {
            world.collision = BucketedCollisionMesh::from_mesh(level.collision());
            world.level = *level;
            world.objects.clear();
            world.inventory.clear();
            world.hazard_clock = Duration::ZERO;
            world.tick_index = 0;
            world.rng = ChaCha8Rng::seed_from_u64(world.config.seed);

            let grid = world.level.grid();
            info!(
                columns = grid.columns(),
                rows = grid.rows(),
                layers = grid.layer_count(),
                collision_rects = world.collision.len(),
                "level_loaded"
            );
            out_events.push(Event::LevelLoaded {
                spawn: world.level.spawn(),
                columns: grid.columns(),
                rows: grid.rows(),
            });
        }
        Command::SpawnObject { template } => {
            let object = world.objects.insert(template);
            out_events.push(Event::ObjectSpawned { object });
        }
        Command::RemoveObject { object } => {
            if world.objects.remove(object).is_some() {
                out_events.push(Event::ObjectRemoved { object });
            }
        }
        Command::Interact { object } => interactions::interact(world, object, out_events),
        Command::BeginOverlap { object } => {
            interactions::begin_overlap(world, object, out_events);
        }
        Command::EndOverlap { object } => interactions::end_overlap(world, object, out_events),
        Command::TouchHazard { object } => interactions::touch_hazard(world, object, out_events),
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });

            let interval = world.config.hazard_interval();
            if interval.is_zero() {
                return;
            }
            world.hazard_clock = world.hazard_clock.saturating_add(dt);
            while world.hazard_clock >= interval {
                world.hazard_clock -= interval;
                interactions::toggle_hazards(world, out_events);
            }
        }
        Command::SetLayerVisibility { layer, visible } => {
            match world.level.grid_mut().set_layer_visibility(layer, visible) {
                Ok(()) => out_events.push(Event::LayerVisibilityChanged { layer, visible }),
                Err(error) => warn!(error = %error, "layer_visibility_rejected"),
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec2;
    use tilequest_core::{
        BucketedCollisionMesh, Capabilities, Item, LayeredTileGrid, Level, ObjectId, ObjectKind,
        WorldRect,
    };

    use super::World;

    /// Provides read-only access to the loaded level.
    #[must_use]
    pub fn level(world: &World) -> &Level {
        &world.level
    }

    /// Provides read-only access to the painted tile layers.
    #[must_use]
    pub fn tile_grid(world: &World) -> &LayeredTileGrid {
        world.level.grid()
    }

    /// Static collision geometry of the loaded level.
    #[must_use]
    pub fn collision(world: &World) -> &BucketedCollisionMesh {
        &world.collision
    }

    /// Position the actor starts at.
    #[must_use]
    pub fn spawn_point(world: &World) -> Vec2 {
        world.level.spawn()
    }

    /// Position the actor returns to after a hazard fires.
    #[must_use]
    pub fn checkpoint(world: &World) -> Option<Vec2> {
        world.level.checkpoint()
    }

    /// Items currently carried by the actor.
    #[must_use]
    pub fn inventory(world: &World) -> &[Item] {
        world.inventory.items()
    }

    /// Number of simulation ticks processed since the level loaded.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures a snapshot of a single object.
    #[must_use]
    pub fn object(world: &World, id: ObjectId) -> Option<ObjectSnapshot> {
        world.objects.get(id).map(|state| snapshot(id, state))
    }

    /// Captures a read-only view of every registered object in hit-test order.
    #[must_use]
    pub fn object_view(world: &World) -> ObjectView {
        let mut snapshots: Vec<ObjectSnapshot> = world
            .objects
            .iter()
            .map(|(id, state)| snapshot(id, state))
            .collect();
        snapshots.sort_by(|a, b| {
            b.render_layer
                .cmp(&a.render_layer)
                .then_with(|| a.id.cmp(&b.id))
        });
        ObjectView { snapshots }
    }

    fn snapshot(id: ObjectId, state: &super::objects::ObjectState) -> ObjectSnapshot {
        ObjectSnapshot {
            id,
            name: state.name.clone(),
            kind: state.kind.clone(),
            bounds: state.bounds,
            capabilities: state.capabilities,
            render_layer: state.render_layer,
        }
    }

    /// Read-only snapshot describing all registered objects.
    ///
    /// Snapshots are ordered by descending render layer, then ascending
    /// identifier, so the first match of any search is the top-most object.
    #[derive(Clone, Debug, Default)]
    pub struct ObjectView {
        snapshots: Vec<ObjectSnapshot>,
    }

    impl ObjectView {
        /// Iterator over the captured snapshots in hit-test order.
        pub fn iter(&self) -> impl Iterator<Item = &ObjectSnapshot> {
            self.snapshots.iter()
        }

        /// Objects whose footprint contains `point`, hazards excluded.
        pub fn hits_at(&self, point: Vec2) -> impl Iterator<Item = &ObjectSnapshot> {
            self.snapshots
                .iter()
                .filter(move |snapshot| !snapshot.is_hazard() && snapshot.bounds.contains_point(point))
        }

        /// Hazards whose footprint overlaps `body`.
        pub fn hazards_overlapping<'a>(
            &'a self,
            body: &'a WorldRect,
        ) -> impl Iterator<Item = &'a ObjectSnapshot> {
            self.snapshots
                .iter()
                .filter(move |snapshot| snapshot.is_hazard() && snapshot.bounds.overlaps(body))
        }

        /// Looks up the snapshot of a single object.
        #[must_use]
        pub fn get(&self, id: ObjectId) -> Option<&ObjectSnapshot> {
            self.snapshots.iter().find(|snapshot| snapshot.id == id)
        }

        /// Number of captured objects.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether no objects were captured.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Consumes the view, yielding the underlying snapshots.
        pub fn into_vec(self) -> Vec<ObjectSnapshot> {
            self.snapshots
        }
    }

    impl FromIterator<ObjectSnapshot> for ObjectView {
        fn from_iter<T: IntoIterator<Item = ObjectSnapshot>>(iter: T) -> Self {
            Self {
                snapshots: iter.into_iter().collect(),
            }
        }
    }

    /// Immutable representation of a single object used for queries.
    #[derive(Clone, Debug, PartialEq)]
    pub struct ObjectSnapshot {
        /// Identifier assigned by the world.
        pub id: ObjectId,
        /// Name authored in the map.
        pub name: String,
        /// Behaviour and its current state.
        pub kind: ObjectKind,
        /// World-space footprint.
        pub bounds: WorldRect,
        /// Current capability flags.
        pub capabilities: Capabilities,
        /// Paint order.
        pub render_layer: u32,
    }

    impl ObjectSnapshot {
        /// Reports whether the object is a hazard volume.
        #[must_use]
        pub fn is_hazard(&self) -> bool {
            self.kind.is_hazard()
        }
    }
}
