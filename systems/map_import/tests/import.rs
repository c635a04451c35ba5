use glam::Vec2;
use tilequest_core::{CellCoord, CollisionQuery, LayeredTileGrid, TilesetId, WorldRect};
use tilequest_system_map_import::{ImportError, MalformedDocument, MapImporter, MAP_UPSCALE};

const THREE_BY_THREE: &str = r#"{
    "width": 3,
    "height": 3,
    "tilewidth": 16,
    "tileheight": 16,
    "layers": [
        {"name": "ground", "type": "tilelayer", "data": [1, 0, 2, 0, 0, 0, 2, 0, 1]}
    ],
    "tilesets": [
        {"firstgid": 1, "name": "terrain", "image": "terrain.png",
         "tilewidth": 16, "tileheight": 16, "columns": 2, "tilecount": 4}
    ]
}"#;

fn import(json: &str) -> (LayeredTileGrid, tilequest_system_map_import::ImportedMap) {
    let mut grid = LayeredTileGrid::new();
    let imported = MapImporter::new()
        .import_str(json, &mut grid)
        .expect("map imports");
    (grid, imported)
}

#[test]
fn three_by_three_map_resolves_corner_tiles() {
    let (grid, imported) = import(THREE_BY_THREE);

    assert_eq!((grid.columns(), grid.rows()), (3, 3));
    assert_eq!(grid.layer_count(), 1);
    let layer = grid.layer(0).expect("single layer");

    let local = |column, row| {
        layer
            .cell(CellCoord::new(column, row))
            .expect("cell in range")
            .map(|tile| (tile.tileset(), tile.local_x(), tile.local_y()))
    };
    let terrain = TilesetId::new(0);
    assert_eq!(local(0, 0), Some((terrain, 0, 0)));
    assert_eq!(local(2, 2), Some((terrain, 0, 0)));
    assert_eq!(local(2, 0), Some((terrain, 1, 0)));
    assert_eq!(local(0, 2), Some((terrain, 1, 0)));
    for (column, row) in [(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)] {
        assert_eq!(local(column, row), None, "cell ({column}, {row}) should be empty");
    }
    assert!(layer.painted().all(|(_, tile)| !tile.collidable()));
    assert_eq!(imported.report().painted_cells, 4);
    assert_eq!(imported.report().skipped_cells, 0);
}

#[test]
fn column_major_tilesets_wrap_within_their_rows() {
    let (grid, _) = import(
        r#"{
            "width": 8, "height": 1,
            "layers": [{"name": "ground", "type": "tilelayer", "data": [1, 2, 3, 4, 5, 6, 7, 8]}],
            "tilesets": [{"firstgid": 1, "name": "walls", "columns": 4, "tilecount": 8,
                "properties": [{"name": "orientation", "type": "string", "value": "column-major"}]}]
        }"#,
    );
    let layer = grid.layer(0).expect("single layer");

    let coordinates: Vec<(u32, u32)> = (0..8)
        .map(|column| {
            let tile = layer
                .cell(CellCoord::new(column, 0))
                .expect("cell in range")
                .expect("cell painted");
            (tile.local_x(), tile.local_y())
        })
        .collect();

    assert_eq!(&coordinates[..3], &[(0, 0), (0, 1), (1, 0)]);
    assert!(coordinates.iter().all(|&(x, y)| x < 4 && y < 2));
    let mut distinct = coordinates.clone();
    distinct.sort_unstable();
    distinct.dedup();
    assert_eq!(distinct.len(), 8);
}

#[test]
fn empty_layers_do_not_consume_grid_slots() {
    let (grid, imported) = import(
        r#"{
            "width": 2, "height": 1,
            "layers": [
                {"name": "blank", "type": "tilelayer", "data": [0, 0]},
                {"name": "ground", "type": "tilelayer", "data": [1, 1]},
                {"name": "decor", "type": "tilelayer", "data": [0, 2], "visible": false}
            ],
            "tilesets": [{"firstgid": 1, "name": "t", "columns": 2, "tilecount": 2}]
        }"#,
    );

    assert_eq!(grid.layer_count(), 2);
    assert!(grid.layer(0).expect("ground").is_visible());
    assert!(!grid.layer(1).expect("decor").is_visible());
    assert_eq!(imported.report().empty_layers, 1);
}

#[test]
fn unresolved_tiles_are_skipped_without_aborting() {
    let (grid, imported) = import(
        r#"{
            "width": 3, "height": 1,
            "layers": [{"name": "ground", "type": "tilelayer", "data": [2, 5, 9]}],
            "tilesets": [{"firstgid": 5, "name": "t", "columns": 2, "tilecount": 4}]
        }"#,
    );

    let layer = grid.layer(0).expect("ground");
    assert!(layer.cell(CellCoord::new(0, 0)).expect("in range").is_none());
    assert!(layer.cell(CellCoord::new(1, 0)).expect("in range").is_some());
    assert!(layer.cell(CellCoord::new(2, 0)).expect("in range").is_some());
    assert_eq!(imported.report().skipped_cells, 1);
}

#[test]
fn malformed_document_leaves_target_untouched() {
    let (mut grid, _) = import(THREE_BY_THREE);

    let error = MapImporter::new()
        .import_str(
            r#"{"width": 2, "height": 2, "layers": [
                {"name": "ground", "type": "tilelayer", "data": [1]}
            ]}"#,
            &mut grid,
        )
        .expect_err("short layer");

    assert!(matches!(
        error,
        ImportError::MalformedDocument(MalformedDocument::LayerSize { .. })
    ));
    assert_eq!((grid.columns(), grid.rows()), (3, 3));
    assert_eq!(grid.layer(0).expect("previous layer").painted().count(), 4);
}

#[test]
fn object_layers_expose_spawn_checkpoint_and_collision() {
    let (grid, imported) = import(
        r#"{
            "width": 4, "height": 4,
            "layers": [
                {"name": "walls", "type": "tilelayer",
                 "data": [1,1,1,1, 1,0,0,1, 1,0,0,1, 1,1,1,1]},
                {"name": "__SPAWNPOINT", "type": "objectgroup", "objects": [{"x": 20, "y": 24}]},
                {"name": "__CHECKPOINT", "type": "objectgroup", "objects": [{"x": 32, "y": 16}]},
                {"name": "__COLLISION", "type": "objectgroup", "objects": [
                    {"x": 0, "y": 0, "width": 64, "height": 16}
                ]},
                {"name": "Levers", "type": "objectgroup", "objects": [
                    {"id": 7, "name": "gate", "x": 16, "y": 16, "width": 16, "height": 16,
                     "properties": [{"name": "target", "type": "string", "value": "door"}]}
                ]}
            ],
            "tilesets": [{"firstgid": 1, "name": "t", "columns": 1, "tilecount": 1}]
        }"#,
    );

    assert_eq!(imported.spawn_point(), Some(Vec2::new(20.0, 24.0) * MAP_UPSCALE));
    assert_eq!(imported.checkpoint(), Some(Vec2::new(128.0, 64.0)));
    assert_eq!(
        imported.collision_mesh().rects(),
        &[WorldRect::new(0.0, 0.0, 256.0, 64.0)]
    );
    assert!(imported
        .collision_mesh()
        .overlaps(&WorldRect::new(100.0, 40.0, 16.0, 16.0)));

    let layers: Vec<_> = imported.object_layers().collect();
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].name(), "Levers");
    let lever = &layers[0].objects()[0];
    assert_eq!(lever.id, 7);
    assert_eq!(lever.bounds, WorldRect::new(64.0, 64.0, 64.0, 64.0));
    assert_eq!(lever.properties.str("target"), Some("door"));

    let walls = grid.layer(0).expect("walls");
    let collidable = |column, row| {
        walls
            .cell(CellCoord::new(column, row))
            .expect("in range")
            .map(|tile| tile.collidable())
    };
    assert_eq!(collidable(2, 0), Some(true));
    assert_eq!(collidable(0, 1), Some(false));
    assert_eq!(collidable(1, 1), None);

    let level = imported.to_level(grid);
    assert_eq!(level.spawn(), Vec2::new(80.0, 96.0));
    assert_eq!(level.collision().len(), 1);
    assert_eq!(level.tilesets().len(), 1);
}

#[test]
fn missing_spawn_defaults_to_origin() {
    let (grid, imported) = import(THREE_BY_THREE);
    assert_eq!(imported.spawn_point(), None);
    assert_eq!(imported.to_level(grid).spawn(), Vec2::ZERO);
}
