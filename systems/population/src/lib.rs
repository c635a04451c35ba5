#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Population system that turns named object layers into spawn commands.
//!
//! Layers are matched by name against the puzzle vocabulary of the level
//! format. Unknown layers become [`ObjectKind::Prop`] objects whose
//! capabilities come from their `collidable`, `interactable` and
//! `overlappable` properties.

use tilequest_core::{Capabilities, Command, Item, ObjectKind, ObjectTemplate, Sound};
use tilequest_system_map_import::{ObjectLayer, SceneObject};
use tracing::{debug, info};

/// Layer holding levers.
pub const LEVERS_LAYER: &str = "Levers";
/// Layer holding chests.
pub const CHEST_LAYER: &str = "Chest";
/// Layer holding pressure plates.
pub const PRESSURE_PLATES_LAYER: &str = "PressurePlates";
/// Layer holding rocks broken with the hammer.
pub const BREAKABLE_ROCK_LAYER: &str = "BreakableRock";
/// Layer holding lasers that start switched on.
pub const LASERS_TOP_LAYER: &str = "Lasers_Top";
/// Layer holding lasers that start switched off.
pub const LASERS_BOTTOM_LAYER: &str = "Lasers_Bottom";
/// Layer holding readable notes.
pub const NOTE_LAYER: &str = "Note";
/// Layer holding stones collected by walking over them.
pub const STONES_LAYER: &str = "Stones";
/// Layer holding items picked up by interaction.
pub const PICKUPS_LAYER: &str = "Pickups";

const STONE: &str = "stone";

/// Maps object layers to object templates.
#[derive(Debug, Default)]
pub struct Population;

impl Population {
    /// Emits one [`Command::SpawnObject`] per object of every non-reserved
    /// layer and returns the number of commands emitted.
    pub fn populate<'a>(
        &self,
        layers: impl IntoIterator<Item = &'a ObjectLayer>,
        out: &mut Vec<Command>,
    ) -> usize {
        let before = out.len();
        for layer in layers {
            if layer.is_reserved() {
                continue;
            }
            for object in layer.objects() {
                let template = self.template_for(layer, object);
                out.push(Command::SpawnObject { template });
            }
            debug!(
                layer = layer.name(),
                objects = layer.objects().len(),
                "layer_populated"
            );
        }
        let spawned = out.len() - before;
        info!(objects = spawned, "level_populated");
        spawned
    }

    /// Builds the template for a single object of `layer`, painted at the
    /// layer's position among the object layers.
    #[must_use]
    pub fn template_for(&self, layer: &ObjectLayer, object: &SceneObject) -> ObjectTemplate {
        let render_layer = u32::try_from(layer.order()).unwrap_or(u32::MAX);
        let properties = &object.properties;
        let item = || properties.str("item").map(Item::new);
        let solid = Capabilities::new(true, true, false);

        let built = match layer.name() {
            LEVERS_LAYER => template(object, ObjectKind::Lever { on: false }, solid)
                .with_sound(Sound::Lever),
            CHEST_LAYER => template(object, ObjectKind::Chest { item: item() }, solid)
                .with_sound(Sound::Chest),
            PRESSURE_PLATES_LAYER => template(
                object,
                ObjectKind::PressurePlate {
                    pressed: false,
                    placed: None,
                },
                Capabilities::new(false, true, true),
            )
            .with_sound(Sound::Plate),
            BREAKABLE_ROCK_LAYER => {
                let health = properties
                    .int("health")
                    .and_then(|health| u32::try_from(health).ok())
                    .unwrap_or(1)
                    .max(1);
                let reveals = item()
                    .map(|item| Box::new(pickup(object, item).with_render_layer(render_layer)));
                template(object, ObjectKind::Breakable { health, reveals }, solid)
            }
            LASERS_TOP_LAYER => template(
                object,
                ObjectKind::Hazard { active: true },
                Capabilities::default(),
            ),
            LASERS_BOTTOM_LAYER => template(
                object,
                ObjectKind::Hazard { active: false },
                Capabilities::default(),
            ),
            NOTE_LAYER => template(
                object,
                ObjectKind::Note {
                    text: properties.str("text").unwrap_or_default().to_owned(),
                },
                solid,
            )
            .with_sound(Sound::Paper),
            STONES_LAYER => template(
                object,
                ObjectKind::Collectible {
                    item: Item::new(STONE),
                },
                Capabilities::new(false, false, true),
            ),
            PICKUPS_LAYER => {
                let item = item().unwrap_or_else(|| Item::new(object.name.as_str()));
                pickup(object, item)
            }
            _ => {
                let flag = |name: &str| {
                    properties
                        .bool(name)
                        .or_else(|| layer.properties().bool(name))
                        .unwrap_or(false)
                };
                template(
                    object,
                    ObjectKind::Prop,
                    Capabilities::new(
                        flag("collidable"),
                        flag("interactable"),
                        flag("overlappable"),
                    ),
                )
            }
        };
        built.with_render_layer(render_layer)
    }
}

fn template(object: &SceneObject, kind: ObjectKind, capabilities: Capabilities) -> ObjectTemplate {
    ObjectTemplate::new(object.name.clone(), kind, object.bounds, capabilities)
}

fn pickup(object: &SceneObject, item: Item) -> ObjectTemplate {
    template(
        object,
        ObjectKind::Pickup { item },
        Capabilities::new(false, true, false),
    )
    .with_sound(Sound::ItemPickup)
}

#[cfg(test)]
mod tests {
    use tilequest_core::{LayeredTileGrid, WorldRect, HAMMER};
    use tilequest_system_map_import::{ImportedMap, MapImporter};

    use super::*;

    fn import(layers: &str) -> ImportedMap {
        let json = format!(
            r#"{{"width": 2, "height": 2, "layers": [{layers}], "tilesets": []}}"#
        );
        let mut grid = LayeredTileGrid::new();
        MapImporter::new()
            .import_str(&json, &mut grid)
            .expect("map imports")
    }

    fn templates(imported: &ImportedMap) -> Vec<ObjectTemplate> {
        let mut commands = Vec::new();
        let count = Population.populate(imported.object_layers(), &mut commands);
        assert_eq!(count, commands.len());
        commands
            .into_iter()
            .map(|command| match command {
                Command::SpawnObject { template } => template,
                other => panic!("unexpected command {other:?}"),
            })
            .collect()
    }

    #[test]
    fn breakable_rock_reveals_its_item() {
        let imported = import(
            r#"{"name": "BreakableRock", "type": "objectgroup", "objects": [
                {"name": "rock", "x": 4, "y": 8, "width": 16, "height": 16, "properties": [
                    {"name": "health", "type": "int", "value": 3},
                    {"name": "item", "type": "string", "value": "key"}
                ]}
            ]}"#,
        );

        let rock = &templates(&imported)[0];
        let bounds = WorldRect::new(16.0, 32.0, 64.0, 64.0);
        assert_eq!(rock.bounds, bounds);
        assert!(rock.capabilities.collidable);
        let ObjectKind::Breakable { health, reveals } = &rock.kind else {
            panic!("rock should be breakable: {:?}", rock.kind);
        };
        assert_eq!(*health, 3);
        let reveals = reveals.as_ref().expect("companion pickup");
        assert_eq!(
            reveals.kind,
            ObjectKind::Pickup {
                item: Item::new("key")
            }
        );
        assert_eq!(reveals.bounds, bounds);
        assert_eq!(reveals.sound, Some(Sound::ItemPickup));
    }

    #[test]
    fn lasers_start_in_their_layer_state() {
        let imported = import(
            r#"{"name": "Lasers_Top", "type": "objectgroup", "objects": [{"x": 0, "y": 0}]},
               {"name": "Lasers_Bottom", "type": "objectgroup", "objects": [{"x": 0, "y": 0}]}"#,
        );

        let kinds: Vec<_> = templates(&imported).into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ObjectKind::Hazard { active: true },
                ObjectKind::Hazard { active: false },
            ]
        );
    }

    #[test]
    fn unknown_layers_become_props_with_property_capabilities() {
        let imported = import(
            r#"{"name": "__COLLISION", "type": "objectgroup", "objects": [{"x": 0, "y": 0}]},
               {"name": "Decor", "type": "objectgroup",
                "properties": [{"name": "collidable", "type": "bool", "value": true}],
                "objects": [
                    {"name": "statue", "x": 0, "y": 0},
                    {"name": "rug", "x": 0, "y": 0, "properties": [
                        {"name": "collidable", "type": "bool", "value": false},
                        {"name": "overlappable", "type": "bool", "value": true}
                    ]}
                ]}"#,
        );

        let templates = templates(&imported);
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].kind, ObjectKind::Prop);
        assert_eq!(templates[0].capabilities, Capabilities::new(true, false, false));
        assert_eq!(templates[1].capabilities, Capabilities::new(false, false, true));
        assert!(templates.iter().all(|template| template.render_layer == 1));
    }

    #[test]
    fn pickups_fall_back_to_the_object_name() {
        let imported = import(
            r#"{"name": "Pickups", "type": "objectgroup", "objects": [
                {"name": "hammer", "x": 0, "y": 0}
            ]}"#,
        );

        let pickup = &templates(&imported)[0];
        assert_eq!(
            pickup.kind,
            ObjectKind::Pickup {
                item: Item::new(HAMMER)
            }
        );
        assert!(pickup.capabilities.interactable);
    }
}
