use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use glam::Vec2;
use tilequest_core::{
    Capabilities, CollisionMesh, Command, Event, Item, LayeredTileGrid, Level, MovementVector,
    ObjectKind, ObjectTemplate, Sound, WorldRect, HAMMER,
};
use tilequest_system_actor::{ActorController, Config};
use tilequest_world::{self as world, query, World};

#[test]
fn deterministic_replay_produces_identical_outcomes() {
    let first = replay(&scripted_inputs());
    let second = replay(&scripted_inputs());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(
        first.events.len() > 10,
        "script should exercise the world: {:?}",
        first.events
    );
    assert!(first
        .events
        .iter()
        .any(|record| matches!(record, EventRecord::Sound(Sound::RockHit(_)))));
}

#[derive(Clone, Copy)]
enum Input {
    Move(MovementVector, usize),
    Interact,
}

fn scripted_inputs() -> Vec<Input> {
    vec![
        Input::Move(MovementVector::RIGHT, 4),
        Input::Interact,
        Input::Move(MovementVector::DOWN, 6),
        Input::Interact,
        Input::Interact,
        Input::Move(MovementVector::LEFT, 3),
        Input::Move(MovementVector::ZERO, 10),
    ]
}

fn level() -> Level {
    let mut grid = LayeredTileGrid::new();
    grid.set_size(12, 12);
    grid.generate(1);
    Level::new(
        grid,
        Vec::new(),
        CollisionMesh::new(vec![WorldRect::new(0.0, 0.0, 768.0, 32.0)]),
        Vec2::new(128.0, 128.0),
        Some(Vec2::new(64.0, 64.0)),
    )
}

fn objects() -> Vec<ObjectTemplate> {
    vec![
        ObjectTemplate::new(
            "hammer",
            ObjectKind::Pickup {
                item: Item::new(HAMMER),
            },
            WorldRect::new(192.0, 160.0, 64.0, 64.0),
            Capabilities::new(false, true, false),
        )
        .with_sound(Sound::ItemPickup),
        ObjectTemplate::new(
            "rock",
            ObjectKind::Breakable {
                health: 2,
                reveals: None,
            },
            WorldRect::new(128.0, 224.0, 128.0, 64.0),
            Capabilities::new(true, true, false),
        ),
        ObjectTemplate::new(
            "laser",
            ObjectKind::Hazard { active: true },
            WorldRect::new(0.0, 96.0, 16.0, 64.0),
            Capabilities::default(),
        ),
    ]
}

fn replay(inputs: &[Input]) -> ReplayOutcome {
    let mut world = World::new();
    let mut actor = ActorController::new(Config::with_speed(40.0));
    let mut log = Vec::new();

    let mut setup = vec![Command::LoadLevel {
        level: Box::new(level()),
    }];
    setup.extend(
        objects()
            .into_iter()
            .map(|template| Command::SpawnObject { template }),
    );
    execute(&mut world, &mut actor, setup, &mut log);

    let dt = Duration::from_millis(250);
    for input in inputs {
        match *input {
            Input::Move(vector, steps) => {
                for _ in 0..steps {
                    let objects = query::object_view(&world);
                    let mut commands = vec![Command::Tick { dt }];
                    let collision = query::collision(&world);
                    let _ = actor.step(vector, dt, &objects, collision, &mut commands);
                    execute(&mut world, &mut actor, commands, &mut log);
                }
            }
            Input::Interact => {
                let mut commands = Vec::new();
                let _ = actor.interact(&mut commands);
                execute(&mut world, &mut actor, commands, &mut log);
            }
        }
    }

    let state = actor.state();
    ReplayOutcome {
        position: (state.position.x.to_bits(), state.position.y.to_bits()),
        inventory: query::inventory(&world)
            .iter()
            .map(|item| item.name().to_owned())
            .collect(),
        objects: query::object_view(&world)
            .iter()
            .map(|snapshot| snapshot.id.get())
            .collect(),
        events: log,
    }
}

fn execute(
    world: &mut World,
    actor: &mut ActorController,
    commands: Vec<Command>,
    log: &mut Vec<EventRecord>,
) {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    actor.observe(&events);
    log.extend(events.iter().filter_map(EventRecord::from_event));
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    position: (u32, u32),
    inventory: Vec<String>,
    objects: Vec<u32>,
    events: Vec<EventRecord>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum EventRecord {
    Spawned(u32),
    Removed(u32),
    Transferred(u32, String),
    Damaged(u32, u32),
    Hazard(u32, bool),
    Triggered(u32),
    Ignored(u32),
    Sound(Sound),
}

impl EventRecord {
    fn from_event(event: &Event) -> Option<Self> {
        let record = match event {
            Event::ObjectSpawned { object } => Self::Spawned(object.get()),
            Event::ObjectRemoved { object } => Self::Removed(object.get()),
            Event::ItemTransferred { from, item } => {
                Self::Transferred(from.get(), item.name().to_owned())
            }
            Event::ObjectDamaged { object, health } => Self::Damaged(object.get(), *health),
            Event::HazardToggled { object, active } => Self::Hazard(object.get(), *active),
            Event::HazardTriggered { object } => Self::Triggered(object.get()),
            Event::InteractionIgnored { object } => Self::Ignored(object.get()),
            Event::SoundRequested { sound } => Self::Sound(*sound),
            _ => return None,
        };
        Some(record)
    }
}
