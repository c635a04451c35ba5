//! Step loop that drives the world and the actor from a script.

use std::{fmt, time::Duration};

use anyhow::{Context, Result};
use glam::Vec2;
use tilequest_core::{Command, Event, LayeredTileGrid, MovementVector};
use tilequest_system_actor::{ActorController, Affordance, LoopCue};
use tilequest_system_map_import::MapImporter;
use tilequest_system_population::Population;
use tilequest_world::{self as world, query, World};
use tracing::{debug, info};

use crate::{
    config::AppConfig,
    script::{Action, Script},
};

/// Loaded level together with the actor walking through it.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    actor: ActorController,
    step: Duration,
    interactions: usize,
    sounds: usize,
    relocations: usize,
}

impl Session {
    /// Imports the map, loads it into a fresh world and spawns its objects.
    pub(crate) fn load(map_json: &str, config: &AppConfig) -> Result<Self> {
        let mut grid = LayeredTileGrid::new();
        let imported = MapImporter::new()
            .import_str(map_json, &mut grid)
            .context("importing map")?;

        let mut commands = vec![Command::LoadLevel {
            level: Box::new(imported.to_level(grid)),
        }];
        let _ = Population.populate(imported.object_layers(), &mut commands);

        let mut session = Self {
            world: World::with_config(config.world),
            actor: ActorController::new(config.actor),
            step: config.step_duration(),
            interactions: 0,
            sounds: 0,
            relocations: 0,
        };
        session.execute(commands);
        Ok(session)
    }

    /// Feeds every scripted action through the step loop.
    pub(crate) fn run(&mut self, script: &Script) -> Summary {
        for action in script.actions() {
            match action {
                Action::Move(input) => self.advance(input),
                Action::Interact => self.interact(),
            }
        }
        self.summary()
    }

    fn advance(&mut self, input: MovementVector) {
        let objects = query::object_view(&self.world);
        let mut commands = vec![Command::Tick { dt: self.step }];
        let report = self.actor.step(
            input,
            self.step,
            &objects,
            query::collision(&self.world),
            &mut commands,
        );

        match report.affordance {
            Affordance::Show { object, anchor } => {
                debug!(object = object.get(), x = anchor.x, y = anchor.y, "affordance_shown");
            }
            Affordance::Hide => debug!("affordance_hidden"),
            Affordance::Unchanged => {}
        }
        match report.footsteps {
            LoopCue::Start => debug!("footsteps_started"),
            LoopCue::Stop => debug!("footsteps_stopped"),
            LoopCue::Unchanged => {}
        }
        self.execute(commands);
    }

    fn interact(&mut self) {
        let mut commands = Vec::new();
        if self.actor.interact(&mut commands) {
            self.interactions += 1;
        } else {
            debug!("interact_without_target");
        }
        self.execute(commands);
    }

    fn execute(&mut self, commands: Vec<Command>) {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        self.actor.observe(&events);
        for event in &events {
            self.record(event);
        }
    }

    fn record(&mut self, event: &Event) {
        match event {
            Event::SoundRequested { sound } => {
                self.sounds += 1;
                debug!(sound = ?sound, "sound_requested");
            }
            Event::ActorRelocated { position } => {
                self.relocations += 1;
                info!(x = position.x, y = position.y, "actor_relocated");
            }
            Event::ItemTransferred { from, item } => {
                info!(from = from.get(), item = item.name(), "item_transferred");
            }
            Event::ItemPlaced { object, item } => {
                info!(object = object.get(), item = item.name(), "item_placed");
            }
            Event::InventoryFull { object } => info!(object = object.get(), "inventory_full"),
            Event::LeverToggled { object, on } => {
                info!(object = object.get(), on = *on, "lever_toggled");
            }
            Event::PlateChanged { object, pressed } => {
                info!(object = object.get(), pressed = *pressed, "plate_changed");
            }
            Event::ObjectBroken { object } => info!(object = object.get(), "object_broken"),
            Event::NoteRead { object, text } => {
                info!(object = object.get(), text = %text, "note_read");
            }
            Event::HazardTriggered { object } => {
                info!(object = object.get(), "hazard_triggered");
            }
            _ => {}
        }
    }

    fn summary(&self) -> Summary {
        Summary {
            ticks: query::tick_index(&self.world),
            position: self.actor.state().position,
            inventory: query::inventory(&self.world)
                .iter()
                .map(|item| item.name().to_owned())
                .collect(),
            objects: query::object_view(&self.world).len(),
            interactions: self.interactions,
            sounds: self.sounds,
            relocations: self.relocations,
        }
    }
}

/// Outcome of a scripted run.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Summary {
    pub(crate) ticks: u64,
    pub(crate) position: Vec2,
    pub(crate) inventory: Vec<String>,
    pub(crate) objects: usize,
    pub(crate) interactions: usize,
    pub(crate) sounds: usize,
    pub(crate) relocations: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticks: {}", self.ticks)?;
        writeln!(f, "position: ({}, {})", self.position.x, self.position.y)?;
        if self.inventory.is_empty() {
            writeln!(f, "inventory: (empty)")?;
        } else {
            writeln!(f, "inventory: {}", self.inventory.join(", "))?;
        }
        writeln!(f, "objects: {}", self.objects)?;
        writeln!(f, "interactions: {}", self.interactions)?;
        writeln!(f, "sounds: {}", self.sounds)?;
        write!(f, "relocations: {}", self.relocations)
    }
}
