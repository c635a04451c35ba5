//! Per-variant interaction and overlap behaviour.

use rand::Rng;
use tilequest_core::{Event, ObjectId, ObjectKind, ObjectTemplate, Sound};
use tracing::debug;

use crate::World;

/// Number of recorded rock impact variants.
const ROCK_HIT_VARIANTS: u8 = 3;
/// Number of recorded stone pickup variants.
const STONE_PICKUP_VARIANTS: u8 = 3;

/// Registry change requested once variant behaviour has run.
enum Followup {
    None,
    Remove,
    Break(Option<ObjectTemplate>),
}

pub(crate) fn interact(world: &mut World, object: ObjectId, out_events: &mut Vec<Event>) {
    let World {
        objects,
        inventory,
        rng,
        ..
    } = world;

    let Some(state) = objects.get_mut(object) else {
        debug!(object = object.get(), "interact_missing_object");
        return;
    };
    if !state.capabilities.interactable {
        debug!(object = object.get(), name = %state.name, "interact_not_interactable");
        out_events.push(Event::InteractionIgnored { object });
        return;
    }

    let mut sound = state.sound;
    let mut accepted = true;
    let mut followup = Followup::None;

    match &mut state.kind {
        ObjectKind::Prop => {}
        ObjectKind::Lever { on } => {
            *on = !*on;
            out_events.push(Event::LeverToggled { object, on: *on });
        }
        ObjectKind::Chest { item } => match item.take() {
            Some(stored) => match inventory.push(stored.clone()) {
                Ok(()) => out_events.push(Event::ItemTransferred {
                    from: object,
                    item: stored,
                }),
                Err(rejected) => {
                    *item = Some(rejected);
                    out_events.push(Event::InventoryFull { object });
                    accepted = false;
                }
            },
            None => accepted = false,
        },
        ObjectKind::PressurePlate { pressed, placed } => {
            let offered = if placed.is_none() {
                inventory.take_first(|item| !item.is_hammer())
            } else {
                None
            };
            match offered {
                Some(item) => {
                    *placed = Some(item.clone());
                    out_events.push(Event::ItemPlaced { object, item });
                    if !*pressed {
                        *pressed = true;
                        out_events.push(Event::PlateChanged {
                            object,
                            pressed: true,
                        });
                    }
                    state.capabilities.interactable = false;
                }
                None => accepted = false,
            }
        }
        ObjectKind::Hazard { .. } => accepted = false,
        ObjectKind::Breakable { health, reveals } => {
            if inventory.has_hammer() {
                *health = health.saturating_sub(1);
                sound = Some(Sound::RockHit(rng.gen_range(0..ROCK_HIT_VARIANTS)));
                out_events.push(Event::ObjectDamaged {
                    object,
                    health: *health,
                });
                if *health == 0 {
                    followup = Followup::Break(reveals.take().map(|companion| *companion));
                }
            } else {
                debug!(object = object.get(), "interact_requires_hammer");
                accepted = false;
            }
        }
        ObjectKind::Pickup { item } => match inventory.push(item.clone()) {
            Ok(()) => {
                out_events.push(Event::ItemTransferred {
                    from: object,
                    item: item.clone(),
                });
                followup = Followup::Remove;
            }
            Err(_) => {
                out_events.push(Event::InventoryFull { object });
                accepted = false;
            }
        },
        ObjectKind::Collectible { item } => match inventory.push(item.clone()) {
            Ok(()) => {
                out_events.push(Event::ItemTransferred {
                    from: object,
                    item: item.clone(),
                });
                sound = Some(Sound::StonePickup(rng.gen_range(0..STONE_PICKUP_VARIANTS)));
                followup = Followup::Remove;
            }
            Err(_) => {
                out_events.push(Event::InventoryFull { object });
                accepted = false;
            }
        },
        ObjectKind::Note { text } => out_events.push(Event::NoteRead {
            object,
            text: text.clone(),
        }),
    }

    if !accepted {
        debug!(object = object.get(), "interaction_rejected");
        out_events.push(Event::InteractionIgnored { object });
        return;
    }
    if let Some(sound) = sound {
        out_events.push(Event::SoundRequested { sound });
    }
    apply_followup(world, object, followup, out_events);
}

pub(crate) fn begin_overlap(world: &mut World, object: ObjectId, out_events: &mut Vec<Event>) {
    let World {
        objects,
        inventory,
        rng,
        ..
    } = world;

    let Some(state) = objects.get_mut(object) else {
        debug!(object = object.get(), "overlap_missing_object");
        return;
    };
    if state.capabilities.collidable || !state.capabilities.overlappable {
        debug!(object = object.get(), name = %state.name, "overlap_not_overlappable");
        return;
    }

    out_events.push(Event::OverlapStarted { object });
    let mut followup = Followup::None;
    match &mut state.kind {
        ObjectKind::PressurePlate { pressed, .. } if !*pressed => {
            *pressed = true;
            out_events.push(Event::PlateChanged {
                object,
                pressed: true,
            });
            if let Some(sound) = state.sound {
                out_events.push(Event::SoundRequested { sound });
            }
        }
        ObjectKind::Collectible { item } => match inventory.push(item.clone()) {
            Ok(()) => {
                out_events.push(Event::ItemTransferred {
                    from: object,
                    item: item.clone(),
                });
                out_events.push(Event::SoundRequested {
                    sound: Sound::StonePickup(rng.gen_range(0..STONE_PICKUP_VARIANTS)),
                });
                followup = Followup::Remove;
            }
            Err(_) => out_events.push(Event::InventoryFull { object }),
        },
        _ => {}
    }
    apply_followup(world, object, followup, out_events);
}

pub(crate) fn end_overlap(world: &mut World, object: ObjectId, out_events: &mut Vec<Event>) {
    let Some(state) = world.objects.get_mut(object) else {
        debug!(object = object.get(), "overlap_missing_object");
        return;
    };
    if state.capabilities.collidable || !state.capabilities.overlappable {
        return;
    }

    out_events.push(Event::OverlapEnded { object });
    if let ObjectKind::PressurePlate {
        pressed,
        placed: None,
    } = &mut state.kind
    {
        if *pressed {
            *pressed = false;
            out_events.push(Event::PlateChanged {
                object,
                pressed: false,
            });
        }
    }
}

pub(crate) fn touch_hazard(world: &mut World, object: ObjectId, out_events: &mut Vec<Event>) {
    let active = matches!(
        world.objects.get(object).map(|state| &state.kind),
        Some(ObjectKind::Hazard { active: true })
    );
    if !active {
        return;
    }

    let position = world.level.checkpoint().unwrap_or_else(|| world.level.spawn());
    out_events.push(Event::HazardTriggered { object });
    out_events.push(Event::SoundRequested { sound: Sound::Zap });
    out_events.push(Event::ActorRelocated { position });
}

/// Flips every hazard between its active and inactive state.
pub(crate) fn toggle_hazards(world: &mut World, out_events: &mut Vec<Event>) {
    for (object, state) in world.objects.iter_mut() {
        if let ObjectKind::Hazard { active } = &mut state.kind {
            *active = !*active;
            out_events.push(Event::HazardToggled {
                object,
                active: *active,
            });
        }
    }
}

fn apply_followup(
    world: &mut World,
    object: ObjectId,
    followup: Followup,
    out_events: &mut Vec<Event>,
) {
    match followup {
        Followup::None => {}
        Followup::Remove => {
            if world.objects.remove(object).is_some() {
                out_events.push(Event::ObjectRemoved { object });
            }
        }
        Followup::Break(companion) => {
            out_events.push(Event::ObjectBroken { object });
            if world.objects.remove(object).is_some() {
                out_events.push(Event::ObjectRemoved { object });
            }
            if let Some(template) = companion {
                let spawned = world.objects.insert(template);
                out_events.push(Event::ObjectSpawned { object: spawned });
            }
        }
    }
}
