//! Global tile identifier resolution against an ordered tileset list.

use std::{collections::BTreeMap, path::Path};

use tilequest_core::{TileOrientation, Tileset, TilesetId};

use crate::{document::TilesetEntry, ImportError, MalformedDocument, Properties};

/// Flag stored in bit 31 when a tile is mirrored horizontally.
pub const FLIP_HORIZONTAL: u32 = 0x8000_0000;
/// Flag stored in bit 30 when a tile is mirrored vertically.
pub const FLIP_VERTICAL: u32 = 0x4000_0000;
/// Flag stored in bit 29 when a tile is mirrored along its diagonal.
pub const FLIP_DIAGONAL: u32 = 0x2000_0000;
/// Mask keeping the identifier bits of a raw tile index.
pub const GID_MASK: u32 = 0x1FFF_FFFF;

const ORIENTATION_PROPERTY: &str = "orientation";
const COLUMN_MAJOR: &str = "column-major";

/// Tileset sub-cell referenced by a global tile identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedTile {
    /// Index of the tileset in the resolver's list.
    pub tileset: TilesetId,
    /// Column of the sub-cell inside the tileset image.
    pub local_x: u32,
    /// Row of the sub-cell inside the tileset image.
    pub local_y: u32,
}

/// Tilesets supplied by the application for documents that reference
/// external tileset files instead of embedding them.
#[derive(Clone, Debug, Default)]
pub struct TilesetCatalog {
    entries: BTreeMap<String, Tileset>,
}

impl TilesetCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tileset under its name. The stored `first_gid` is ignored.
    pub fn insert(&mut self, tileset: Tileset) {
        let _ = self.entries.insert(tileset.name.clone(), tileset);
    }

    /// Builds the tileset described by a document entry.
    ///
    /// Embedded entries are used as-is; external references are looked up by
    /// name, falling back to the file stem of their source path.
    pub fn tileset_for(&self, entry: &TilesetEntry) -> Result<Tileset, MalformedDocument> {
        let properties = Properties::from_raw(&entry.properties)?;
        let orientation = match properties.str(ORIENTATION_PROPERTY) {
            Some(COLUMN_MAJOR) => TileOrientation::ColumnMajor,
            _ => TileOrientation::RowMajor,
        };

        if entry.columns > 0 {
            return Ok(Tileset {
                name: entry.name.clone(),
                image: entry.image.clone(),
                tile_width: entry.tilewidth,
                tile_height: entry.tileheight,
                columns: entry.columns,
                rows: entry.tilecount / entry.columns,
                first_gid: entry.firstgid,
                orientation,
            });
        }

        let Some(source) = entry.source.as_deref() else {
            return Err(MalformedDocument::TilesetColumns {
                name: entry.name.clone(),
            });
        };
        let stem = Path::new(source)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(source);
        let known = self
            .entries
            .get(&entry.name)
            .or_else(|| self.entries.get(stem))
            .ok_or_else(|| MalformedDocument::UnknownTileset {
                name: source.to_owned(),
            })?;
        if known.columns == 0 {
            return Err(MalformedDocument::TilesetColumns {
                name: known.name.clone(),
            });
        }
        Ok(Tileset {
            first_gid: entry.firstgid,
            orientation,
            ..known.clone()
        })
    }
}

/// Maps global tile identifiers to tileset sub-cells.
#[derive(Clone, Debug, Default)]
pub struct TilesetResolver {
    tilesets: Vec<Tileset>,
}

impl TilesetResolver {
    /// Creates a resolver, requiring strictly increasing `first_gid` values
    /// and a non-zero column count for every tileset.
    pub fn new(tilesets: Vec<Tileset>) -> Result<Self, MalformedDocument> {
        for pair in tilesets.windows(2) {
            if pair[1].first_gid <= pair[0].first_gid {
                return Err(MalformedDocument::TilesetOrder {
                    previous: pair[0].first_gid,
                    first_gid: pair[1].first_gid,
                });
            }
        }
        if let Some(tileset) = tilesets.iter().find(|tileset| tileset.columns == 0) {
            return Err(MalformedDocument::TilesetColumns {
                name: tileset.name.clone(),
            });
        }
        Ok(Self { tilesets })
    }

    /// Resolves a raw tile index, ignoring its flip flags.
    ///
    /// The last tileset's range is open-ended.
    pub fn resolve(&self, raw: u32) -> Result<ResolvedTile, ImportError> {
        let gid = raw & GID_MASK;
        if gid == 0 {
            return Err(ImportError::InvalidTileId { gid: raw });
        }

        for (index, tileset) in self.tilesets.iter().enumerate() {
            let below_next = self
                .tilesets
                .get(index + 1)
                .map_or(true, |next| gid < next.first_gid);
            if gid >= tileset.first_gid && below_next {
                let (local_x, local_y) = tileset.local_coordinates(gid - tileset.first_gid);
                let id = u32::try_from(index).map_err(|_| ImportError::UnresolvedTileset { gid })?;
                return Ok(ResolvedTile {
                    tileset: TilesetId::new(id),
                    local_x,
                    local_y,
                });
            }
        }
        Err(ImportError::UnresolvedTileset { gid })
    }

    /// Tilesets in resolution order.
    #[must_use]
    pub fn tilesets(&self) -> &[Tileset] {
        &self.tilesets
    }

    /// Consumes the resolver, yielding its tilesets.
    #[must_use]
    pub fn into_tilesets(self) -> Vec<Tileset> {
        self.tilesets
    }
}
