#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Map import system that turns layered tile-map documents into level data.
//!
//! A [`MapDocument`] is parsed from JSON, its tilesets are arranged into a
//! [`TilesetResolver`], and [`MapImporter::import`] paints every non-empty
//! tile layer into a [`tilequest_core::LayeredTileGrid`]. Named object layers
//! provide the spawn point, checkpoint and collision mesh; the remaining
//! object layers are handed to collaborators for population.

mod document;
mod importer;
mod properties;
mod resolver;

use thiserror::Error;
use tilequest_core::GridError;

pub use document::{MapDocument, MapLayer, MapObject, RawProperty, TilesetEntry};
pub use importer::{
    ImportReport, ImportedMap, MapImporter, ObjectLayer, SceneObject, CHECKPOINT_LAYER,
    COLLISION_LAYER, MAP_UPSCALE, SPAWN_LAYER,
};
pub use properties::{Properties, PropertyValue};
pub use resolver::{
    ResolvedTile, TilesetCatalog, TilesetResolver, FLIP_DIAGONAL, FLIP_HORIZONTAL, FLIP_VERTICAL,
    GID_MASK,
};

/// Structural problems that make a map document unusable.
#[derive(Debug, Error)]
pub enum MalformedDocument {
    /// The input was not valid JSON or did not match the document shape.
    #[error("could not parse map document: {0}")]
    Json(#[from] serde_json::Error),
    /// The map declares a zero width or height.
    #[error("map dimensions {width}x{height} must both be non-zero")]
    ZeroDimensions {
        /// Declared width in tiles.
        width: u32,
        /// Declared height in tiles.
        height: u32,
    },
    /// A tile layer does not hold exactly one entry per map cell.
    #[error("tile layer '{layer}' holds {actual} entries but the map has {expected} cells")]
    LayerSize {
        /// Name of the offending layer.
        layer: String,
        /// Number of cells the map declares.
        expected: u64,
        /// Number of entries found in the layer.
        actual: u64,
    },
    /// Tileset `firstgid` values are not strictly increasing.
    #[error("tileset firstgid {first_gid} does not follow {previous}")]
    TilesetOrder {
        /// Identifier of the preceding tileset.
        previous: u32,
        /// Identifier that failed to increase.
        first_gid: u32,
    },
    /// A tileset reports zero columns.
    #[error("tileset '{name}' declares no columns")]
    TilesetColumns {
        /// Name of the offending tileset.
        name: String,
    },
    /// An external tileset reference is missing from the catalog.
    #[error("tileset '{name}' is neither embedded nor present in the catalog")]
    UnknownTileset {
        /// Name or source path of the missing tileset.
        name: String,
    },
    /// An object carries a non-finite position or size.
    #[error("object {object} in layer '{layer}' has non-finite geometry")]
    ObjectGeometry {
        /// Name of the layer holding the object.
        layer: String,
        /// Identifier of the offending object.
        object: u32,
    },
    /// A custom property uses an unsupported type.
    #[error("property '{name}' uses unsupported type '{kind}'")]
    PropertyType {
        /// Property name.
        name: String,
        /// Declared type.
        kind: String,
    },
}

/// Errors raised while importing a map.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The document cannot be imported at all.
    #[error("malformed map document: {0}")]
    MalformedDocument(#[from] MalformedDocument),
    /// The tile index is reserved for empty cells.
    #[error("tile index {gid:#x} does not reference a tile")]
    InvalidTileId {
        /// Raw tile index as stored in the document.
        gid: u32,
    },
    /// No tileset covers the tile index.
    #[error("no tileset covers tile index {gid}")]
    UnresolvedTileset {
        /// Tile index with flip flags removed.
        gid: u32,
    },
    /// A coordinate fell outside the staged grid.
    #[error(transparent)]
    Grid(#[from] GridError),
}
