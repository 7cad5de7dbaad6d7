//! The execution context: the single source of truth an embedder hands the
//! engine.
//!
//! It owns the world's actor records, the dice roller, the clock, and the
//! sinks every operation declares events and errors into. Tests swap the
//! roller and clock at construction; nothing in here is global.

use indexmap::IndexMap;
use std::collections::HashSet;
use uuid::Uuid;

use crate::dice::{self, RngRoller, RollResult, Roller};
use crate::error::CombatError;
use crate::events::{DeclaredError, Event, EventBody};
use crate::model::actor::Actor;
use crate::model::weapon::{self, WeaponSchema};

/// Actor records keyed by urn, insertion-ordered for stable dumps.
#[derive(Debug, Clone, Default)]
pub struct World {
    pub actors: IndexMap<String, Actor>,
}

impl World {
    pub fn new() -> Self {
        World::default()
    }

    pub fn insert(&mut self, actor: Actor) {
        self.actors.insert(actor.id.clone(), actor);
    }

    pub fn actor(&self, id: &str) -> Result<&Actor, CombatError> {
        self.actors
            .get(id)
            .ok_or_else(|| CombatError::UnknownActor(id.to_string()))
    }

    pub fn actor_mut(&mut self, id: &str) -> Result<&mut Actor, CombatError> {
        self.actors
            .get_mut(id)
            .ok_or_else(|| CombatError::UnknownActor(id.to_string()))
    }

    /// The actor's wielded weapon schema, or the unarmed fallback.
    pub fn equipped_weapon(&self, id: &str) -> Result<WeaponSchema, CombatError> {
        let actor = self.actor(id)?;
        Ok(actor
            .equipment
            .wielded
            .clone()
            .unwrap_or_else(weapon::unarmed))
    }
}

/// Millisecond wall-clock source.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Real time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Frozen time for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        self.0
    }
}

pub struct Context {
    pub world: World,
    roller: Box<dyn Roller>,
    clock: Box<dyn Clock>,
    events: Vec<Event>,
    errors: Vec<DeclaredError>,
    event_ids: HashSet<String>,
}

impl Context {
    pub fn new(world: World) -> Self {
        Context {
            world,
            roller: Box::new(RngRoller::from_entropy()),
            clock: Box::new(SystemClock),
            events: Vec::new(),
            errors: Vec::new(),
            event_ids: HashSet::new(),
        }
    }

    /// Reproducible sessions: identical seeds replay identical rolls.
    pub fn seeded(world: World, seed: u64) -> Self {
        Context::new(world).with_roller(Box::new(RngRoller::seeded(seed)))
    }

    pub fn with_roller(mut self, roller: Box<dyn Roller>) -> Self {
        self.roller = roller;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn timestamp(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Fresh id for traces and events.
    pub fn uniqid(&self) -> String {
        Uuid::new_v4().to_string()
    }

    pub fn roll_dice(&mut self, spec: &str) -> Result<RollResult, CombatError> {
        dice::roll(self.roller.as_mut(), spec)
    }

    /// Split borrow for callers that need to roll while reading actors.
    pub fn world_and_roller(&mut self) -> (&World, &mut dyn Roller) {
        (&self.world, self.roller.as_mut())
    }

    /// Record an event and hand back a copy for the caller's return list.
    ///
    /// Duplicate event ids indicate a programming bug, not a game state, so
    /// they abort loudly.
    pub fn declare_event(&mut self, trace: &str, body: EventBody) -> Event {
        let event = Event {
            id: self.uniqid(),
            trace: trace.to_string(),
            timestamp: self.timestamp(),
            body,
        };
        assert!(
            self.event_ids.insert(event.id.clone()),
            "duplicate event id {}",
            event.id
        );
        log::debug!("event {} trace={}", event.body.kind(), event.trace);
        self.events.push(event.clone());
        event
    }

    pub fn declare_error(&mut self, error: &CombatError, trace: &str) {
        log::warn!("declared error [{}] trace={trace}: {error}", error.code());
        self.errors.push(DeclaredError {
            message: error.to_string(),
            code: error.code().to_string(),
            trace: trace.to_string(),
            timestamp: self.timestamp(),
        });
    }

    /// Declared events in order, optionally filtered by wire kind.
    pub fn declared_events(&self, kind: Option<&str>) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| kind.map_or(true, |k| e.body.kind() == k))
            .collect()
    }

    pub fn declared_errors(&self) -> &[DeclaredError] {
        &self.errors
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("actors", &self.world.actors.len())
            .field("events", &self.events.len())
            .field("errors", &self.errors.len())
            .finish()
    }
}
