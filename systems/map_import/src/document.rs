//! Serde model of the layered tile-map JSON document.

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::MalformedDocument;

/// Layer type holding a dense tile index array.
pub(crate) const TILE_LAYER: &str = "tilelayer";
/// Layer type holding positioned objects.
pub(crate) const OBJECT_LAYER: &str = "objectgroup";

/// Parsed map document.
#[derive(Clone, Debug, Deserialize)]
pub struct MapDocument {
    /// Map width in tiles.
    pub width: u32,
    /// Map height in tiles.
    pub height: u32,
    /// Source tile width in map units.
    #[serde(default)]
    pub tilewidth: u32,
    /// Source tile height in map units.
    #[serde(default)]
    pub tileheight: u32,
    /// Layers in document order.
    #[serde(default)]
    pub layers: Vec<MapLayer>,
    /// Tilesets ordered by ascending `firstgid`.
    #[serde(default)]
    pub tilesets: Vec<TilesetEntry>,
}

/// Single tile or object layer.
#[derive(Clone, Debug, Deserialize)]
pub struct MapLayer {
    /// Authored layer name.
    #[serde(default)]
    pub name: String,
    /// Layer type, `tilelayer` or `objectgroup`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Row-major tile indices for tile layers.
    #[serde(default)]
    pub data: Vec<u32>,
    /// Whether the layer is shown initially.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Custom layer properties.
    #[serde(default)]
    pub properties: Vec<RawProperty>,
    /// Objects of an object layer.
    #[serde(default)]
    pub objects: Vec<MapObject>,
}

impl MapLayer {
    /// Reports whether the layer carries tile indices.
    #[must_use]
    pub fn is_tile_layer(&self) -> bool {
        self.kind == TILE_LAYER
    }

    /// Reports whether the layer carries positioned objects.
    #[must_use]
    pub fn is_object_layer(&self) -> bool {
        self.kind == OBJECT_LAYER
    }

    /// Reports whether every cell of the layer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|raw| *raw == 0)
    }
}

/// Positioned rectangle or point inside an object layer.
#[derive(Clone, Debug, Deserialize)]
pub struct MapObject {
    /// Identifier assigned by the authoring tool.
    #[serde(default)]
    pub id: u32,
    /// Authored object name.
    #[serde(default)]
    pub name: String,
    /// Left edge in map units.
    pub x: f32,
    /// Top edge in map units.
    pub y: f32,
    /// Width in map units; zero for points.
    #[serde(default)]
    pub width: f32,
    /// Height in map units; zero for points.
    #[serde(default)]
    pub height: f32,
    /// Custom object properties.
    #[serde(default)]
    pub properties: Vec<RawProperty>,
}

/// Tileset reference, either embedded or pointing to an external file.
#[derive(Clone, Debug, Deserialize)]
pub struct TilesetEntry {
    /// First global tile identifier covered by the tileset.
    pub firstgid: u32,
    /// Tileset name.
    #[serde(default)]
    pub name: String,
    /// Source image path.
    #[serde(default)]
    pub image: String,
    /// Tile width in source pixels.
    #[serde(default)]
    pub tilewidth: u32,
    /// Tile height in source pixels.
    #[serde(default)]
    pub tileheight: u32,
    /// Tiles per image row; zero for external references.
    #[serde(default)]
    pub columns: u32,
    /// Number of tiles in the image.
    #[serde(default)]
    pub tilecount: u32,
    /// Path of an external tileset file.
    #[serde(default)]
    pub source: Option<String>,
    /// Custom tileset properties.
    #[serde(default)]
    pub properties: Vec<RawProperty>,
}

/// Custom property exactly as stored in the document.
#[derive(Clone, Debug, Deserialize)]
pub struct RawProperty {
    /// Property name.
    pub name: String,
    /// Declared type, if any.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Untyped JSON value.
    pub value: JsonValue,
}

fn default_true() -> bool {
    true
}

impl MapObject {
    fn is_finite(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|value| value.is_finite())
    }
}

impl MapDocument {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, MalformedDocument> {
        let document: Self = serde_json::from_str(json)?;
        document.validate()?;
        Ok(document)
    }

    /// Checks the structural invariants the importer relies on.
    pub fn validate(&self) -> Result<(), MalformedDocument> {
        if self.width == 0 || self.height == 0 {
            return Err(MalformedDocument::ZeroDimensions {
                width: self.width,
                height: self.height,
            });
        }

        let expected = u64::from(self.width) * u64::from(self.height);
        for layer in self.layers.iter().filter(|layer| layer.is_tile_layer()) {
            let actual = u64::try_from(layer.data.len()).unwrap_or(u64::MAX);
            if actual != expected {
                return Err(MalformedDocument::LayerSize {
                    layer: layer.name.clone(),
                    expected,
                    actual,
                });
            }
        }

        for layer in self.object_layers() {
            if let Some(object) = layer.objects.iter().find(|object| !object.is_finite()) {
                return Err(MalformedDocument::ObjectGeometry {
                    layer: layer.name.clone(),
                    object: object.id,
                });
            }
        }

        for pair in self.tilesets.windows(2) {
            if pair[1].firstgid <= pair[0].firstgid {
                return Err(MalformedDocument::TilesetOrder {
                    previous: pair[0].firstgid,
                    first_gid: pair[1].firstgid,
                });
            }
        }
        Ok(())
    }

    /// Tile layers that contain at least one painted cell, in paint order.
    pub fn tile_layers(&self) -> impl Iterator<Item = &MapLayer> {
        self.layers
            .iter()
            .filter(|layer| layer.is_tile_layer() && !layer.is_empty())
    }

    /// Object layers in document order.
    pub fn object_layers(&self) -> impl Iterator<Item = &MapLayer> {
        self.layers.iter().filter(|layer| layer.is_object_layer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_layers_and_defaults() {
        let document = MapDocument::from_json_str(
            r#"{
                "width": 2, "height": 1,
                "layers": [
                    {"name": "ground", "type": "tilelayer", "data": [1, 0]},
                    {"name": "__SPAWNPOINT", "type": "objectgroup", "visible": false,
                     "objects": [{"x": 4, "y": 8}]}
                ],
                "tilesets": [{"firstgid": 1, "name": "t", "columns": 2, "tilecount": 4}]
            }"#,
        )
        .expect("document parses");

        assert_eq!(document.tile_layers().count(), 1);
        let objects: Vec<&MapLayer> = document.object_layers().collect();
        assert_eq!(objects.len(), 1);
        assert!(!objects[0].visible);
        assert_eq!(objects[0].objects[0].width, 0.0);
        assert!(document.layers[0].visible);
    }

    #[test]
    fn non_finite_object_geometry_is_malformed() {
        let mut document = MapDocument::from_json_str(
            r#"{"width": 1, "height": 1, "layers": [
                {"name": "props", "type": "objectgroup", "objects": [{"id": 7, "x": 0, "y": 0}]}
            ]}"#,
        )
        .expect("document parses");
        document.layers[0].objects[0].width = f32::INFINITY;

        let error = document.validate().expect_err("infinite width is rejected");
        assert!(matches!(
            error,
            MalformedDocument::ObjectGeometry { ref layer, object: 7 } if layer == "props"
        ));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let error = MapDocument::from_json_str("{ not json").expect_err("parse fails");
        assert!(matches!(error, MalformedDocument::Json(_)));
    }

    #[test]
    fn object_without_coordinates_is_malformed() {
        let error = MapDocument::from_json_str(
            r#"{"width": 1, "height": 1, "layers": [
                {"name": "props", "type": "objectgroup", "objects": [{"name": "x"}]}
            ]}"#,
        )
        .expect_err("x and y are required");
        assert!(matches!(error, MalformedDocument::Json(_)));
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let error = MapDocument::from_json_str(r#"{"width": 0, "height": 3}"#)
            .expect_err("zero width");
        assert!(matches!(
            error,
            MalformedDocument::ZeroDimensions {
                width: 0,
                height: 3
            }
        ));
    }

    #[test]
    fn short_tile_layer_is_rejected() {
        let error = MapDocument::from_json_str(
            r#"{"width": 2, "height": 2, "layers": [
                {"name": "ground", "type": "tilelayer", "data": [1, 1, 1]}
            ]}"#,
        )
        .expect_err("three entries for four cells");
        assert!(matches!(
            error,
            MalformedDocument::LayerSize {
                expected: 4,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn tileset_order_must_increase() {
        let error = MapDocument::from_json_str(
            r#"{"width": 1, "height": 1, "tilesets": [
                {"firstgid": 5, "columns": 1}, {"firstgid": 5, "columns": 1}
            ]}"#,
        )
        .expect_err("duplicate firstgid");
        assert!(matches!(
            error,
            MalformedDocument::TilesetOrder {
                previous: 5,
                first_gid: 5
            }
        ));
    }

    #[test]
    fn empty_tile_layers_are_skipped() {
        let document = MapDocument::from_json_str(
            r#"{"width": 2, "height": 1, "layers": [
                {"name": "blank", "type": "tilelayer", "data": [0, 0]},
                {"name": "ground", "type": "tilelayer", "data": [0, 3]}
            ]}"#,
        )
        .expect("document parses");

        let names: Vec<&str> = document
            .tile_layers()
            .map(|layer| layer.name.as_str())
            .collect();
        assert_eq!(names, vec!["ground"]);
    }
}
