#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Actor movement and interaction-targeting system.
//!
//! Every simulation step the [`ActorController`] moves the actor according to
//! its input, looks ahead along its facing to decide what is in front of it,
//! and emits the overlap, hazard and interaction commands the world needs.
//! Rendering and audio collaborators read the returned [`StepReport`].

use std::time::Duration;

use glam::Vec2;
use serde::Deserialize;
use tilequest_core::{
    CollisionQuery, Command, Event, MovementVector, ObjectId, WorldRect, TILE_SIZE,
};
use tilequest_world::query::ObjectView;
use tracing::debug;

/// Tunable actor parameters, in world pixels.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Movement speed in pixels per second.
    pub speed: f32,
    /// Size of the actor's body, used for hazard checks.
    pub footprint: Vec2,
    /// Offset from the actor position to the object probe origin.
    pub object_probe_anchor: Vec2,
    /// Distance the object probe reaches along the facing, per axis.
    pub object_probe_reach: Vec2,
    /// Offset from the actor position to the collision probe origin.
    pub collision_probe_anchor: Vec2,
    /// Distance the collision probe reaches along the facing, per axis.
    pub collision_probe_reach: Vec2,
    /// Size of the collision probe rectangle.
    pub collision_probe_size: Vec2,
    /// Height above a target at which the interaction affordance is shown.
    pub affordance_lift: f32,
}

impl Config {
    /// Creates a configuration with the provided speed and reference probe
    /// geometry.
    #[must_use]
    pub const fn with_speed(speed: f32) -> Self {
        Self {
            speed,
            footprint: Vec2::new(64.0, 64.0),
            object_probe_anchor: Vec2::new(32.0, 64.0),
            object_probe_reach: Vec2::new(32.0, 16.0),
            collision_probe_anchor: Vec2::new(28.0, 32.0),
            collision_probe_reach: Vec2::new(16.0, 8.0),
            collision_probe_size: Vec2::new(16.0, 16.0),
            affordance_lift: 32.0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::with_speed(300.0)
    }
}

/// Object found at the look-ahead probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbeHit {
    /// Object that was hit.
    pub object: ObjectId,
    /// Whether the object blocks movement.
    pub collidable: bool,
    /// Whether the object accepts interaction.
    pub interactable: bool,
}

/// What the actor found in front of it during a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing blocks or attracts the actor.
    Nothing,
    /// A dynamic object sits at the probe.
    Object(ProbeHit),
    /// Static collision geometry blocks the probe.
    Tile,
}

/// Chooses a single resolution from the probe results.
///
/// Objects win over tiles; among objects the first interactable one wins,
/// otherwise the first one. `hits` must be in hit-test order.
#[must_use]
pub fn resolve_probe(hits: &[ProbeHit], tile_blocked: bool) -> Resolution {
    if let Some(hit) = hits
        .iter()
        .find(|hit| hit.interactable)
        .or_else(|| hits.first())
    {
        return Resolution::Object(*hit);
    }
    if tile_blocked {
        Resolution::Tile
    } else {
        Resolution::Nothing
    }
}

/// Change to the interaction affordance shown to the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Affordance {
    /// Keep whatever is currently shown.
    Unchanged,
    /// Show the affordance for a newly targeted object.
    Show {
        /// Object that can be interacted with.
        object: ObjectId,
        /// World position the affordance is anchored at.
        anchor: Vec2,
    },
    /// Hide the affordance.
    Hide,
}

/// Change to a looping sound effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopCue {
    /// Keep the loop in its current state.
    Unchanged,
    /// Start the loop.
    Start,
    /// Stop the loop.
    Stop,
}

/// Outcome of a single step, consumed by rendering and audio collaborators.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
    /// What was in front of the actor.
    pub resolution: Resolution,
    /// Actor position after the step.
    pub position: Vec2,
    /// Facing after the step.
    pub facing: MovementVector,
    /// Whether the walk cycle should play.
    pub moving: bool,
    /// Change to the interaction affordance.
    pub affordance: Affordance,
    /// Change to the footsteps loop.
    pub footsteps: LoopCue,
}

/// Snapshot of the actor's state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorState {
    /// Upper-left corner of the actor's body.
    pub position: Vec2,
    /// Last non-zero movement vector.
    pub facing: MovementVector,
    /// Whether the previous step reported movement.
    pub moving: bool,
    /// Interactable object currently targeted.
    pub current_target: Option<ObjectId>,
    /// Object the actor is currently overlapping.
    pub overlap_target: Option<ObjectId>,
}

/// Moves the actor and arbitrates which object it targets.
#[derive(Debug)]
pub struct ActorController {
    config: Config,
    position: Vec2,
    facing: MovementVector,
    moving: bool,
    current_target: Option<ObjectId>,
    overlap_target: Option<ObjectId>,
    columns: u32,
    rows: u32,
}

impl Default for ActorController {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl ActorController {
    /// Creates an idle actor at the origin of an empty level.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            position: Vec2::ZERO,
            facing: MovementVector::ZERO,
            moving: false,
            current_target: None,
            overlap_target: None,
            columns: 0,
            rows: 0,
        }
    }

    /// Reacts to world events that move the actor or invalidate its targets.
    pub fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::LevelLoaded {
                    spawn,
                    columns,
                    rows,
                } => {
                    self.position = *spawn;
                    self.columns = *columns;
                    self.rows = *rows;
                    self.facing = MovementVector::ZERO;
                    self.moving = false;
                    self.current_target = None;
                    self.overlap_target = None;
                }
                Event::ActorRelocated { position } => self.position = *position,
                Event::ObjectRemoved { object } => {
                    if self.current_target == Some(*object) {
                        self.current_target = None;
                    }
                    if self.overlap_target == Some(*object) {
                        self.overlap_target = None;
                    }
                }
                _ => {}
            }
        }
    }

    /// Runs one simulation step.
    pub fn step(
        &mut self,
        input: MovementVector,
        dt: Duration,
        objects: &ObjectView,
        collision: &impl CollisionQuery,
        out: &mut Vec<Command>,
    ) -> StepReport {
        let was_moving = self.moving;
        let previous_target = self.current_target;
        let delta = input.as_vec2() * self.config.speed * dt.as_secs_f32();
        let candidate = self.clamp(self.position + delta);
        if !input.is_zero() {
            self.facing = input;
        }

        let hits: Vec<ProbeHit> = objects
            .hits_at(self.object_probe_point())
            .map(|snapshot| ProbeHit {
                object: snapshot.id,
                collidable: snapshot.capabilities.collidable,
                interactable: snapshot.capabilities.interactable,
            })
            .collect();
        let tile_blocked = collision.overlaps(&self.collision_probe());
        let resolution = resolve_probe(&hits, tile_blocked);

        let mut affordance = Affordance::Unchanged;
        match resolution {
            Resolution::Nothing => {
                let moved = candidate != self.position;
                self.position = candidate;
                self.end_overlap(out);
                self.moving = moved;
                if self.current_target.take().is_some() {
                    affordance = Affordance::Hide;
                }
            }
            Resolution::Object(hit) => {
                if hit.collidable {
                    if self.overlap_target != Some(hit.object) {
                        self.end_overlap(out);
                    }
                } else {
                    self.position = candidate;
                    if self.overlap_target != Some(hit.object) {
                        self.end_overlap(out);
                        out.push(Command::BeginOverlap { object: hit.object });
                        self.overlap_target = Some(hit.object);
                    }
                }
                affordance = self.retarget(hit, objects);
                self.moving = false;
            }
            Resolution::Tile => {
                self.end_overlap(out);
                self.moving = false;
                if self.current_target.take().is_some() {
                    affordance = Affordance::Hide;
                }
            }
        }

        let body = WorldRect::from_origin_size(self.position, self.config.footprint);
        for hazard in objects.hazards_overlapping(&body) {
            out.push(Command::TouchHazard { object: hazard.id });
        }

        if previous_target != self.current_target {
            debug!(
                from = ?previous_target.map(|id| id.get()),
                to = ?self.current_target.map(|id| id.get()),
                "actor_target_changed"
            );
        }

        let footsteps = match (was_moving, self.moving) {
            (false, true) => LoopCue::Start,
            (true, false) => LoopCue::Stop,
            _ => LoopCue::Unchanged,
        };

        StepReport {
            resolution,
            position: self.position,
            facing: self.facing,
            moving: self.moving,
            affordance,
            footsteps,
        }
    }

    /// Requests interaction with the current target, if any.
    ///
    /// Returns whether a command was emitted.
    pub fn interact(&self, out: &mut Vec<Command>) -> bool {
        match self.current_target {
            Some(object) => {
                out.push(Command::Interact { object });
                true
            }
            None => false,
        }
    }

    /// Snapshot of the actor's state.
    #[must_use]
    pub fn state(&self) -> ActorState {
        ActorState {
            position: self.position,
            facing: self.facing,
            moving: self.moving,
            current_target: self.current_target,
            overlap_target: self.overlap_target,
        }
    }

    /// Point hit-tested against dynamic objects.
    #[must_use]
    pub fn object_probe_point(&self) -> Vec2 {
        self.position
            + self.config.object_probe_anchor
            + self.facing.as_vec2() * self.config.object_probe_reach
    }

    /// Rectangle tested against static collision geometry.
    #[must_use]
    pub fn collision_probe(&self) -> WorldRect {
        let origin = self.position
            + self.config.collision_probe_anchor
            + self.facing.as_vec2() * self.config.collision_probe_reach;
        WorldRect::from_origin_size(origin, self.config.collision_probe_size)
    }

    fn clamp(&self, position: Vec2) -> Vec2 {
        let max = Vec2::new(
            self.columns.saturating_sub(1) as f32 * TILE_SIZE as f32,
            self.rows.saturating_sub(1) as f32 * TILE_SIZE as f32,
        );
        position.clamp(Vec2::ZERO, max)
    }

    fn end_overlap(&mut self, out: &mut Vec<Command>) {
        if let Some(object) = self.overlap_target.take() {
            out.push(Command::EndOverlap { object });
        }
    }

    fn retarget(&mut self, hit: ProbeHit, objects: &ObjectView) -> Affordance {
        if !hit.interactable {
            return if self.current_target.take().is_some() {
                Affordance::Hide
            } else {
                Affordance::Unchanged
            };
        }
        if self.current_target == Some(hit.object) {
            return Affordance::Unchanged;
        }
        self.current_target = Some(hit.object);
        let anchor = objects.get(hit.object).map_or(self.position, |snapshot| {
            let bounds = snapshot.bounds;
            Vec2::new(
                bounds.left() + bounds.size().x / 4.0,
                bounds.top() - self.config.affordance_lift,
            )
        });
        Affordance::Show {
            object: hit.object,
            anchor,
        }
    }
}
