//! Tile grid storage and the transforms between cell and world pixel space.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellCoord, TilesetId};

/// Edge length of a single square tile measured in world pixels.
pub const TILE_SIZE: u32 = 64;

/// Errors raised when grid coordinates or layer indices fall outside the
/// allocated storage.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// The requested cell lies outside the generated dimensions.
    #[error("cell ({column}, {row}) lies outside the {columns}x{rows} grid")]
    OutOfBounds {
        /// Column that was requested.
        column: u32,
        /// Row that was requested.
        row: u32,
        /// Number of columns currently allocated.
        columns: u32,
        /// Number of rows currently allocated.
        rows: u32,
    },
    /// The requested layer does not exist.
    #[error("layer {index} requested but only {layer_count} layers exist")]
    IndexOutOfRange {
        /// Layer index that was requested.
        index: usize,
        /// Number of layers currently generated.
        layer_count: usize,
    },
}

/// Resolved tile painted into a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCell {
    tileset: TilesetId,
    local_x: u32,
    local_y: u32,
    collidable: bool,
}

impl TileCell {
    /// Creates a painted cell referencing a sub-cell of a tileset image.
    #[must_use]
    pub const fn new(tileset: TilesetId, local_x: u32, local_y: u32, collidable: bool) -> Self {
        Self {
            tileset,
            local_x,
            local_y,
            collidable,
        }
    }

    /// Tileset the cell samples from.
    #[must_use]
    pub const fn tileset(&self) -> TilesetId {
        self.tileset
    }

    /// Column of the sampled sub-cell inside the tileset image.
    #[must_use]
    pub const fn local_x(&self) -> u32 {
        self.local_x
    }

    /// Row of the sampled sub-cell inside the tileset image.
    #[must_use]
    pub const fn local_y(&self) -> u32 {
        self.local_y
    }

    /// Whether the cell is flagged as blocking.
    ///
    /// The flag is a projection of the level's collision mesh and is only
    /// informational; movement always consults the mesh itself.
    #[must_use]
    pub const fn collidable(&self) -> bool {
        self.collidable
    }
}

/// Single layer of tile cells addressed by column and row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    cells: Vec<Option<TileCell>>,
    visible: bool,
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl TileGrid {
    /// Creates a visible grid without any allocated cells.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: 0,
            rows: 0,
            cells: Vec::new(),
            visible: true,
        }
    }

    /// Allocates `columns * rows` empty cells, discarding previous content.
    pub fn generate(&mut self, columns: u32, rows: u32) {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        self.columns = columns;
        self.rows = rows;
        self.cells = vec![None; capacity];
    }

    /// Paints the target cell, replacing whatever was stored there.
    pub fn apply_tile(&mut self, target: CellCoord, tile: TileCell) -> Result<(), GridError> {
        let index = self.index(target)?;
        self.cells[index] = Some(tile);
        Ok(())
    }

    /// Returns the tile painted at the target cell, `None` for an empty cell.
    pub fn cell(&self, target: CellCoord) -> Result<Option<&TileCell>, GridError> {
        let index = self.index(target)?;
        Ok(self.cells[index].as_ref())
    }

    /// Resets every cell to empty while keeping the current dimensions.
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Toggles whether collaborators should present this layer.
    pub fn set_visibility(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Reports whether the layer is presented.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Number of columns allocated by the last `generate` call.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows allocated by the last `generate` call.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of cells allocated, painted or not.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Iterates over painted cells in row-major order.
    pub fn painted(&self) -> impl Iterator<Item = (CellCoord, &TileCell)> + '_ {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().filter_map(move |(index, cell)| {
            let index = u32::try_from(index).ok()?;
            cell.as_ref()
                .map(|tile| (CellCoord::new(index % columns, index / columns), tile))
        })
    }

    /// Converts a world pixel position to the cell containing it.
    #[must_use]
    pub const fn world_to_cell(pixel_x: u32, pixel_y: u32) -> CellCoord {
        CellCoord::new(pixel_x / TILE_SIZE, pixel_y / TILE_SIZE)
    }

    /// Converts a cell to the world pixel position of its upper-left corner.
    #[must_use]
    pub const fn cell_to_world_origin(cell: CellCoord) -> (u32, u32) {
        (cell.column() * TILE_SIZE, cell.row() * TILE_SIZE)
    }

    fn index(&self, cell: CellCoord) -> Result<usize, GridError> {
        let out_of_bounds = GridError::OutOfBounds {
            column: cell.column(),
            row: cell.row(),
            columns: self.columns,
            rows: self.rows,
        };
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return Err(out_of_bounds);
        }
        let row = usize::try_from(cell.row()).map_err(|_| out_of_bounds)?;
        let column = usize::try_from(cell.column()).map_err(|_| out_of_bounds)?;
        let width = usize::try_from(self.columns).map_err(|_| out_of_bounds)?;
        Ok(row * width + column)
    }
}

/// Ordered stack of tile grids sharing one set of dimensions.
///
/// Later layers are painted above earlier ones.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayeredTileGrid {
    columns: u32,
    rows: u32,
    layers: Vec<TileGrid>,
}

impl LayeredTileGrid {
    /// Creates an empty container with zero dimensions and no layers.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: 0,
            rows: 0,
            layers: Vec::new(),
        }
    }

    /// Changes the shared dimensions and regenerates every layer.
    ///
    /// All painted content is discarded; callers re-import afterwards.
    pub fn set_size(&mut self, columns: u32, rows: u32) {
        self.columns = columns;
        self.rows = rows;
        for layer in &mut self.layers {
            layer.generate(columns, rows);
        }
    }

    /// Replaces the layer stack with `layer_count` fresh, empty layers.
    pub fn generate(&mut self, layer_count: usize) {
        self.layers = (0..layer_count)
            .map(|_| {
                let mut layer = TileGrid::new();
                layer.generate(self.columns, self.rows);
                layer
            })
            .collect();
    }

    /// Borrows the layer at `index`.
    pub fn layer(&self, index: usize) -> Result<&TileGrid, GridError> {
        let layer_count = self.layers.len();
        self.layers
            .get(index)
            .ok_or(GridError::IndexOutOfRange { index, layer_count })
    }

    /// Mutably borrows the layer at `index`.
    pub fn layer_mut(&mut self, index: usize) -> Result<&mut TileGrid, GridError> {
        let layer_count = self.layers.len();
        self.layers
            .get_mut(index)
            .ok_or(GridError::IndexOutOfRange { index, layer_count })
    }

    /// Shows or hides a single layer.
    pub fn set_layer_visibility(&mut self, index: usize, visible: bool) -> Result<(), GridError> {
        self.layer_mut(index)?.set_visibility(visible);
        Ok(())
    }

    /// Number of generated layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Iterates over the layers in paint order.
    pub fn layers(&self) -> impl Iterator<Item = &TileGrid> {
        self.layers.iter()
    }

    /// Shared column count.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Shared row count.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }
}
