//! Populates a layered tile grid and extracts named object layers.

use glam::Vec2;
use tilequest_core::{
    CellCoord, CollisionMesh, CollisionQuery, LayeredTileGrid, Level, TileCell, TileGrid,
    Tileset, WorldRect, TILE_SIZE,
};
use tracing::{info, warn};

use crate::{
    document::{MapDocument, MapLayer, MapObject},
    ImportError, MalformedDocument, Properties, TilesetCatalog, TilesetResolver,
};

/// Factor converting map units into world pixels.
pub const MAP_UPSCALE: f32 = 4.0;

/// Object layer holding the actor's spawn point.
pub const SPAWN_LAYER: &str = "__SPAWNPOINT";
/// Object layer holding static collision rectangles.
pub const COLLISION_LAYER: &str = "__COLLISION";
/// Object layer holding the respawn checkpoint.
pub const CHECKPOINT_LAYER: &str = "__CHECKPOINT";

const RESERVED_PREFIX: &str = "__";

/// Object from an object layer, converted to world pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneObject {
    /// Identifier assigned by the authoring tool.
    pub id: u32,
    /// Authored name.
    pub name: String,
    /// World-space footprint.
    pub bounds: WorldRect,
    /// Custom properties.
    pub properties: Properties,
}

impl SceneObject {
    fn from_document(object: &MapObject) -> Result<Self, MalformedDocument> {
        Ok(Self {
            id: object.id,
            name: object.name.clone(),
            bounds: scaled_rect(object),
            properties: Properties::from_raw(&object.properties)?,
        })
    }
}

/// Named object layer handed to collaborators for population.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectLayer {
    name: String,
    order: usize,
    properties: Properties,
    objects: Vec<SceneObject>,
}

impl ObjectLayer {
    /// Authored layer name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the layer among all object layers of the document.
    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Custom layer properties.
    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Objects in document order.
    #[must_use]
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Reports whether the layer is one of the reserved geometry layers.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        self.name.starts_with(RESERVED_PREFIX)
    }
}

/// Counters describing a completed import.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Tile layers painted into the grid.
    pub tile_layers: usize,
    /// Tile layers skipped because every cell was empty.
    pub empty_layers: usize,
    /// Cells painted across all layers.
    pub painted_cells: usize,
    /// Cells left empty because their tile could not be resolved.
    pub skipped_cells: usize,
}

/// Result of a successful import besides the painted grid.
#[derive(Clone, Debug)]
pub struct ImportedMap {
    tilesets: Vec<Tileset>,
    collision: CollisionMesh,
    spawn: Option<Vec2>,
    checkpoint: Option<Vec2>,
    object_layers: Vec<ObjectLayer>,
    report: ImportReport,
}

impl ImportedMap {
    /// Spawn point in world pixels, if the map defines one.
    #[must_use]
    pub fn spawn_point(&self) -> Option<Vec2> {
        self.spawn
    }

    /// Checkpoint in world pixels, if the map defines one.
    #[must_use]
    pub fn checkpoint(&self) -> Option<Vec2> {
        self.checkpoint
    }

    /// Static collision rectangles in world pixels.
    #[must_use]
    pub fn collision_mesh(&self) -> &CollisionMesh {
        &self.collision
    }

    /// Tilesets referenced by painted cells.
    #[must_use]
    pub fn tilesets(&self) -> &[Tileset] {
        &self.tilesets
    }

    /// Object layers other than the reserved geometry layers.
    pub fn object_layers(&self) -> impl Iterator<Item = &ObjectLayer> {
        self.object_layers
            .iter()
            .filter(|layer| !layer.is_reserved())
    }

    /// Import counters.
    #[must_use]
    pub fn report(&self) -> ImportReport {
        self.report
    }

    /// Bundles the imported data with its painted grid into a level.
    ///
    /// A map without a spawn point places the actor at the origin.
    #[must_use]
    pub fn to_level(&self, grid: LayeredTileGrid) -> Level {
        Level::new(
            grid,
            self.tilesets.clone(),
            self.collision.clone(),
            self.spawn.unwrap_or(Vec2::ZERO),
            self.checkpoint,
        )
    }
}

/// Imports map documents into layered tile grids.
#[derive(Clone, Debug, Default)]
pub struct MapImporter {
    catalog: TilesetCatalog,
}

impl MapImporter {
    /// Creates an importer that only accepts embedded tilesets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an importer that resolves external tilesets from `catalog`.
    #[must_use]
    pub fn with_catalog(catalog: TilesetCatalog) -> Self {
        Self { catalog }
    }

    /// Parses `json` and imports it into `target`.
    pub fn import_str(
        &self,
        json: &str,
        target: &mut LayeredTileGrid,
    ) -> Result<ImportedMap, ImportError> {
        let document = MapDocument::from_json_str(json)?;
        self.import(&document, target)
    }

    /// Imports the document into `target`.
    ///
    /// The grid is only replaced when the whole import succeeds; on error it
    /// keeps its previous content. Tiles that cannot be resolved are logged
    /// and left empty.
    pub fn import(
        &self,
        document: &MapDocument,
        target: &mut LayeredTileGrid,
    ) -> Result<ImportedMap, ImportError> {
        document.validate()?;
        let tilesets = document
            .tilesets
            .iter()
            .map(|entry| self.catalog.tileset_for(entry))
            .collect::<Result<Vec<_>, _>>()?;
        let resolver = TilesetResolver::new(tilesets)?;

        let mut object_layers = Vec::new();
        for (order, layer) in document.object_layers().enumerate() {
            object_layers.push(ObjectLayer {
                name: layer.name.clone(),
                order,
                properties: Properties::from_raw(&layer.properties)?,
                objects: layer
                    .objects
                    .iter()
                    .map(SceneObject::from_document)
                    .collect::<Result<Vec<_>, _>>()?,
            });
        }
        let collision = CollisionMesh::new(
            named_layer(&object_layers, COLLISION_LAYER)
                .map(|layer| layer.objects.iter().map(|object| object.bounds).collect())
                .unwrap_or_default(),
        );
        let spawn = first_point(&object_layers, SPAWN_LAYER);
        let checkpoint = first_point(&object_layers, CHECKPOINT_LAYER);

        let tile_layers: Vec<&MapLayer> = document.tile_layers().collect();
        let mut report = ImportReport {
            tile_layers: tile_layers.len(),
            empty_layers: document
                .layers
                .iter()
                .filter(|layer| layer.is_tile_layer())
                .count()
                - tile_layers.len(),
            ..ImportReport::default()
        };

        let mut staged = LayeredTileGrid::new();
        staged.set_size(document.width, document.height);
        staged.generate(tile_layers.len());

        for (index, layer) in tile_layers.iter().enumerate() {
            let grid = staged.layer_mut(index)?;
            grid.set_visibility(layer.visible);
            paint_layer(grid, layer, document, &resolver, &collision, &mut report)?;
        }

        *target = staged;
        info!(
            width = document.width,
            height = document.height,
            tile_layers = report.tile_layers,
            empty_layers = report.empty_layers,
            painted_cells = report.painted_cells,
            skipped_cells = report.skipped_cells,
            collision_rects = collision.len(),
            "map_imported"
        );
        if spawn.is_none() {
            warn!(layer = SPAWN_LAYER, "map_has_no_spawn_point");
        }

        Ok(ImportedMap {
            tilesets: resolver.into_tilesets(),
            collision,
            spawn,
            checkpoint,
            object_layers,
            report,
        })
    }
}

fn paint_layer(
    grid: &mut TileGrid,
    layer: &MapLayer,
    document: &MapDocument,
    resolver: &TilesetResolver,
    collision: &CollisionMesh,
    report: &mut ImportReport,
) -> Result<(), ImportError> {
    let width = document.width;
    let cells =
        (0..document.height).flat_map(move |row| (0..width).map(move |column| CellCoord::new(column, row)));

    for (cell, raw) in cells.zip(layer.data.iter().copied()) {
        if raw == 0 {
            continue;
        }
        match resolver.resolve(raw) {
            Ok(resolved) => {
                let collidable = collision.overlaps(&cell_rect(cell));
                grid.apply_tile(
                    cell,
                    TileCell::new(resolved.tileset, resolved.local_x, resolved.local_y, collidable),
                )?;
                report.painted_cells += 1;
            }
            Err(error) => {
                warn!(
                    layer = %layer.name,
                    column = cell.column(),
                    row = cell.row(),
                    error = %error,
                    "tile_unresolved"
                );
                report.skipped_cells += 1;
            }
        }
    }
    Ok(())
}

fn named_layer<'a>(layers: &'a [ObjectLayer], name: &str) -> Option<&'a ObjectLayer> {
    layers.iter().find(|layer| layer.name == name)
}

fn first_point(layers: &[ObjectLayer], name: &str) -> Option<Vec2> {
    named_layer(layers, name)?
        .objects
        .first()
        .map(|object| object.bounds.origin())
}

fn scaled_rect(object: &MapObject) -> WorldRect {
    WorldRect::new(
        object.x * MAP_UPSCALE,
        object.y * MAP_UPSCALE,
        object.width * MAP_UPSCALE,
        object.height * MAP_UPSCALE,
    )
}

fn cell_rect(cell: CellCoord) -> WorldRect {
    let (x, y) = TileGrid::cell_to_world_origin(cell);
    let size = TILE_SIZE as f32;
    WorldRect::new(x as f32, y as f32, size, size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_rect_covers_one_tile() {
        let rect = cell_rect(CellCoord::new(2, 1));
        assert_eq!(rect, WorldRect::new(128.0, 64.0, 64.0, 64.0));
    }

    #[test]
    fn object_coordinates_are_upscaled() {
        let object: MapObject =
            serde_json::from_str(r#"{"x": 10, "y": 20, "width": 4, "height": 2}"#)
                .expect("object parses");
        assert_eq!(
            scaled_rect(&object),
            WorldRect::new(40.0, 80.0, 16.0, 8.0)
        );
    }
}
