//! Interactable object templates, tilesets and loaded level geometry.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{CollisionMesh, LayeredTileGrid, WorldRect};

/// Name of the tool required to damage breakable objects.
pub const HAMMER: &str = "hammer";

/// Item that can be carried in the actor's inventory.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item(String);

impl Item {
    /// Creates an item with the provided name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name identifying the item.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Reports whether the item is the hammer tool.
    #[must_use]
    pub fn is_hammer(&self) -> bool {
        self.0 == HAMMER
    }
}

/// Sound effects the audio collaborator is asked to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sound {
    /// Looping footsteps while the actor walks.
    Footsteps,
    /// Lever switched.
    Lever,
    /// Chest opened.
    Chest,
    /// Pressure plate pressed or released.
    Plate,
    /// Rock struck with the hammer; the index selects one of the recorded variants.
    RockHit(u8),
    /// Stone picked up; the index selects one of the recorded variants.
    StonePickup(u8),
    /// Item added to the inventory.
    ItemPickup,
    /// Note unfolded.
    Paper,
    /// Hazard zapped the actor.
    Zap,
}

/// Capability flags shared by every interactable object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capabilities {
    /// Blocks the actor from moving into the object.
    pub collidable: bool,
    /// Accepts explicit interaction requests.
    pub interactable: bool,
    /// Receives overlap transitions when the actor walks onto it.
    pub overlappable: bool,
}

impl Capabilities {
    /// Creates a capability set from the three flags.
    #[must_use]
    pub const fn new(collidable: bool, interactable: bool, overlappable: bool) -> Self {
        Self {
            collidable,
            interactable,
            overlappable,
        }
    }
}

/// Closed set of object behaviours known to the world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Decoration or scripted object without built-in behaviour.
    Prop,
    /// Two-state switch toggled by interaction.
    Lever {
        /// Whether the lever currently points to its "on" position.
        on: bool,
    },
    /// Container that hands its item to the actor.
    Chest {
        /// Item still stored in the chest.
        item: Option<Item>,
    },
    /// Plate pressed while stood on, or permanently by placing an item.
    PressurePlate {
        /// Whether the plate is currently pressed.
        pressed: bool,
        /// Item placed on the plate, which keeps it pressed.
        placed: Option<Item>,
    },
    /// Lethal volume that toggles between active and inactive.
    Hazard {
        /// Whether touching the hazard currently triggers it.
        active: bool,
    },
    /// Object that breaks after enough hammer strikes.
    Breakable {
        /// Remaining strikes before the object breaks.
        health: u32,
        /// Object spawned in place of this one once it breaks.
        reveals: Option<Box<ObjectTemplate>>,
    },
    /// Item lying in the world that moves into the inventory on interaction.
    Pickup {
        /// Item handed to the actor.
        item: Item,
    },
    /// Item collected simply by walking over it.
    Collectible {
        /// Item handed to the actor.
        item: Item,
    },
    /// Readable note.
    Note {
        /// Text shown to the player.
        text: String,
    },
}

impl ObjectKind {
    /// Reports whether the kind is a hazard volume.
    #[must_use]
    pub const fn is_hazard(&self) -> bool {
        matches!(self, Self::Hazard { .. })
    }
}

/// Description of an object before the world assigns it an identifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectTemplate {
    /// Name authored in the map, used for diagnostics.
    pub name: String,
    /// Behaviour of the object.
    pub kind: ObjectKind,
    /// World-space footprint.
    pub bounds: WorldRect,
    /// Capability flags.
    pub capabilities: Capabilities,
    /// Paint order; higher layers are hit-tested first.
    pub render_layer: u32,
    /// Sound requested whenever an interaction succeeds.
    pub sound: Option<Sound>,
}

impl ObjectTemplate {
    /// Creates a template without an interaction sound.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: ObjectKind,
        bounds: WorldRect,
        capabilities: Capabilities,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            bounds,
            capabilities,
            render_layer: 0,
            sound: None,
        }
    }

    /// Assigns the paint order.
    #[must_use]
    pub fn with_render_layer(mut self, render_layer: u32) -> Self {
        self.render_layer = render_layer;
        self
    }

    /// Assigns the interaction sound.
    #[must_use]
    pub fn with_sound(mut self, sound: Sound) -> Self {
        self.sound = Some(sound);
        self
    }
}

/// Convention used to turn a linear tile index into tileset coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileOrientation {
    /// `x = index % columns`, `y = index / columns`.
    #[default]
    RowMajor,
    /// `x = index / rows`, `y = index % rows`.
    ColumnMajor,
}

/// Tileset image referenced by painted cells.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tileset {
    /// Name of the tileset.
    pub name: String,
    /// Path of the source image, as authored.
    pub image: String,
    /// Width of one tile in source pixels.
    pub tile_width: u32,
    /// Height of one tile in source pixels.
    pub tile_height: u32,
    /// Number of tiles per image row.
    pub columns: u32,
    /// Number of tile rows in the image.
    pub rows: u32,
    /// First global identifier covered by the tileset.
    pub first_gid: u32,
    /// Linear-index convention of the tileset.
    pub orientation: TileOrientation,
}

impl Tileset {
    /// Converts a zero-based local tile index to tileset coordinates.
    #[must_use]
    pub const fn local_coordinates(&self, local_index: u32) -> (u32, u32) {
        let columns = if self.columns == 0 { 1 } else { self.columns };
        match self.orientation {
            TileOrientation::RowMajor => (local_index % columns, local_index / columns),
            TileOrientation::ColumnMajor => {
                let rows = if self.rows == 0 { columns } else { self.rows };
                (local_index / rows, local_index % rows)
            }
        }
    }
}

/// Static level data produced by the map importer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Level {
    grid: LayeredTileGrid,
    tilesets: Vec<Tileset>,
    collision: CollisionMesh,
    spawn: Vec2,
    checkpoint: Option<Vec2>,
}

impl Level {
    /// Bundles imported level data.
    #[must_use]
    pub fn new(
        grid: LayeredTileGrid,
        tilesets: Vec<Tileset>,
        collision: CollisionMesh,
        spawn: Vec2,
        checkpoint: Option<Vec2>,
    ) -> Self {
        Self {
            grid,
            tilesets,
            collision,
            spawn,
            checkpoint,
        }
    }

    /// Layered tile grid painted by the importer.
    #[must_use]
    pub fn grid(&self) -> &LayeredTileGrid {
        &self.grid
    }

    /// Mutable access to the painted grid.
    pub fn grid_mut(&mut self) -> &mut LayeredTileGrid {
        &mut self.grid
    }

    /// Tilesets referenced by painted cells, indexed by [`crate::TilesetId`].
    #[must_use]
    pub fn tilesets(&self) -> &[Tileset] {
        &self.tilesets
    }

    /// Static collision geometry.
    #[must_use]
    pub fn collision(&self) -> &CollisionMesh {
        &self.collision
    }

    /// Position the actor is placed at when the level loads.
    #[must_use]
    pub const fn spawn(&self) -> Vec2 {
        self.spawn
    }

    /// Position the actor returns to after triggering a hazard.
    #[must_use]
    pub const fn checkpoint(&self) -> Option<Vec2> {
        self.checkpoint
    }
}
