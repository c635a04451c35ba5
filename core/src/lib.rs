#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tilequest engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems such as the actor
//! controller submit [`Command`] values describing desired mutations, the
//! world executes those commands via its `apply` entry point, and then
//! broadcasts [`Event`] values that systems and collaborators (renderer,
//! audio, UI) react to deterministically. The tile grid, collision and
//! object vocabulary used on both sides of that boundary lives here too.

mod collision;
mod grid;
mod objects;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use collision::{
    BucketedCollisionMesh, CollisionMesh, CollisionQuery, WorldRect, COLLISION_BUCKET_SIZE,
};
pub use grid::{GridError, LayeredTileGrid, TileCell, TileGrid, TILE_SIZE};
pub use objects::{
    Capabilities, Item, Level, ObjectKind, ObjectTemplate, Sound, TileOrientation, Tileset,
    HAMMER,
};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the current level, discarding every registered object.
    LoadLevel {
        /// Imported level geometry.
        level: Box<Level>,
    },
    /// Registers a new object built from the template.
    SpawnObject {
        /// Description of the object to create.
        template: ObjectTemplate,
    },
    /// Removes an object from the registry.
    RemoveObject {
        /// Identifier of the object to remove.
        object: ObjectId,
    },
    /// Requests the object's interaction behaviour.
    Interact {
        /// Object the actor is targeting.
        object: ObjectId,
    },
    /// Notifies the object that the actor started overlapping it.
    BeginOverlap {
        /// Object entered by the actor.
        object: ObjectId,
    },
    /// Notifies the object that the actor stopped overlapping it.
    EndOverlap {
        /// Object left by the actor.
        object: ObjectId,
    },
    /// Reports that the actor's body overlaps a hazard during this step.
    TouchHazard {
        /// Hazard touched by the actor.
        object: ObjectId,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Shows or hides one tile layer.
    SetLayerVisibility {
        /// Index of the layer in paint order.
        layer: usize,
        /// Whether the layer should be presented.
        visible: bool,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a level finished loading.
    LevelLoaded {
        /// Position the actor starts at.
        spawn: Vec2,
        /// Number of tile columns in the level.
        columns: u32,
        /// Number of tile rows in the level.
        rows: u32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a tile layer changed visibility.
    LayerVisibilityChanged {
        /// Index of the layer in paint order.
        layer: usize,
        /// Whether the layer is now presented.
        visible: bool,
    },
    /// Confirms that an object was registered.
    ObjectSpawned {
        /// Identifier assigned by the world.
        object: ObjectId,
    },
    /// Confirms that an object left the registry.
    ObjectRemoved {
        /// Identifier of the removed object.
        object: ObjectId,
    },
    /// The actor started overlapping an overlappable object.
    OverlapStarted {
        /// Object being overlapped.
        object: ObjectId,
    },
    /// The actor stopped overlapping an overlappable object.
    OverlapEnded {
        /// Object no longer overlapped.
        object: ObjectId,
    },
    /// An interaction request was rejected by the target.
    InteractionIgnored {
        /// Object that rejected the request.
        object: ObjectId,
    },
    /// A hazard switched between active and inactive.
    HazardToggled {
        /// Hazard that switched.
        object: ObjectId,
        /// Whether touching it now triggers it.
        active: bool,
    },
    /// An active hazard was touched.
    HazardTriggered {
        /// Hazard that fired.
        object: ObjectId,
    },
    /// The actor was moved by the world rather than by input.
    ActorRelocated {
        /// New actor position.
        position: Vec2,
    },
    /// A lever changed state.
    LeverToggled {
        /// Lever that changed.
        object: ObjectId,
        /// Whether the lever is now on.
        on: bool,
    },
    /// A pressure plate changed state.
    PlateChanged {
        /// Plate that changed.
        object: ObjectId,
        /// Whether the plate is now pressed.
        pressed: bool,
    },
    /// An item moved from an object into the inventory.
    ItemTransferred {
        /// Object that handed out the item.
        from: ObjectId,
        /// Item that was moved.
        item: Item,
    },
    /// An item moved from the inventory onto an object.
    ItemPlaced {
        /// Object that received the item.
        object: ObjectId,
        /// Item that was placed.
        item: Item,
    },
    /// The inventory had no room for an offered item.
    InventoryFull {
        /// Object offering the item.
        object: ObjectId,
    },
    /// A breakable object lost health.
    ObjectDamaged {
        /// Object that was struck.
        object: ObjectId,
        /// Strikes remaining before it breaks.
        health: u32,
    },
    /// A breakable object was destroyed.
    ObjectBroken {
        /// Object that broke.
        object: ObjectId,
    },
    /// A note was opened.
    NoteRead {
        /// Note that was opened.
        object: ObjectId,
        /// Text of the note.
        text: String,
    },
    /// The audio collaborator should play a sound effect.
    SoundRequested {
        /// Effect to play.
        sound: Sound,
    },
}

/// Unique identifier assigned to an object by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Creates a new identifier with the provided value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Index of a tileset within a level's tileset list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilesetId(u32);

impl TilesetId {
    /// Creates a new identifier with the provided value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single tile cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Per-axis movement intent; each component is -1, 0 or 1.
///
/// The same type stores the actor's facing, which is one of the four
/// cardinal directions, a diagonal if the input was diagonal, or zero
/// before the first movement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovementVector {
    x: i8,
    y: i8,
}

impl MovementVector {
    /// No movement.
    pub const ZERO: Self = Self { x: 0, y: 0 };
    /// Towards smaller y.
    pub const UP: Self = Self { x: 0, y: -1 };
    /// Towards larger y.
    pub const DOWN: Self = Self { x: 0, y: 1 };
    /// Towards smaller x.
    pub const LEFT: Self = Self { x: -1, y: 0 };
    /// Towards larger x.
    pub const RIGHT: Self = Self { x: 1, y: 0 };

    /// Creates a vector, clamping each component to its sign.
    #[must_use]
    pub const fn new(x: i8, y: i8) -> Self {
        Self {
            x: x.signum(),
            y: y.signum(),
        }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn x(&self) -> i8 {
        self.x
    }

    /// Vertical component.
    #[must_use]
    pub const fn y(&self) -> i8 {
        self.y
    }

    /// Reports whether both components are zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Converts the vector to world-space floats.
    #[must_use]
    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(f32::from(self.x), f32::from(self.y))
    }
}
