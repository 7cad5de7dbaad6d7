//! The combat session: owning struct for all per-fight state, the builder
//! that deploys combatants onto the battlefield, and the lifecycle state
//! machine.
//!
//! Status transitions: PENDING -> RUNNING <-> PAUSED, RUNNING ->
//! TERMINATED. Anything else is an illegal transition. Lifecycle
//! operations raise to the caller; they run before any state mutation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::cache::SessionCaches;
use crate::context::Context;
use crate::cost;
use crate::dice::RollResult;
use crate::error::CombatError;
use crate::events::{Event, EventBody};
use crate::initiative::{roll_initiative, roster_key, sort_initiative};
use crate::model::actor::{is_actor_urn, stat_bonus};
use crate::model::battlefield::{Battlefield, CombatPosition, Facing};
use crate::model::combatant::{ApPool, BalancePool, Combatant, EnergyPool};
use crate::monitor::{victory_reached, winning_team, GameStateMonitor, WinningTeam};
use crate::turns::TurnRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Pending,
    Running,
    Paused,
    Terminated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub status: SessionStatus,
    pub battlefield: Battlefield,
    /// Combat state per actor, insertion-ordered for stable dumps.
    pub combatants: IndexMap<String, Combatant>,
    /// Iteration order of this mapping IS the turn order.
    pub initiative: IndexMap<String, RollResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_turn: Option<TurnRecord>,
    #[serde(default)]
    pub completed_turns: Vec<TurnRecord>,
    pub location: String,
    #[serde(skip)]
    pub monitor: GameStateMonitor,
    #[serde(skip)]
    pub caches: SessionCaches,
    /// Roster fingerprint the current initiative mapping was computed for.
    #[serde(skip)]
    initiative_roster: String,
}

struct BuildEntry {
    actor: String,
    team: String,
    initiator: bool,
}

/// Assembles a pending session: validates the roster and deploys each team
/// from its own end of the battlefield.
pub struct SessionBuilder {
    id: Option<String>,
    location: String,
    battlefield: Battlefield,
    entries: Vec<BuildEntry>,
}

impl SessionBuilder {
    pub fn new(location: &str) -> Self {
        SessionBuilder {
            id: None,
            location: location.to_string(),
            battlefield: Battlefield::default(),
            entries: Vec::new(),
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn battlefield(mut self, battlefield: Battlefield) -> Self {
        self.battlefield = battlefield;
        self
    }

    pub fn combatant(mut self, actor_id: &str, team: &str) -> Self {
        self.entries.push(BuildEntry {
            actor: actor_id.to_string(),
            team: team.to_string(),
            initiator: false,
        });
        self
    }

    /// Mark the combatant that started the fight. Exactly one per session;
    /// when never called, the first combatant added is the initiator.
    pub fn initiated_by(mut self, actor_id: &str) -> Self {
        for entry in &mut self.entries {
            entry.initiator = entry.actor == actor_id;
        }
        self
    }

    pub fn build(mut self, ctx: &mut Context) -> Result<Session, CombatError> {
        if self.entries.is_empty() {
            return Err(CombatError::Validation("no combatants".into()));
        }
        if !self.entries.iter().any(|e| e.initiator) {
            self.entries[0].initiator = true;
        }
        if self.entries.iter().filter(|e| e.initiator).count() != 1 {
            return Err(CombatError::Validation(
                "exactly one combatant must initiate".into(),
            ));
        }

        let session_id = self
            .id
            .unwrap_or_else(|| format!("flux:session:{}", ctx.uniqid()));
        let initiating_team = self
            .entries
            .iter()
            .find(|e| e.initiator)
            .map(|e| e.team.clone())
            .unwrap();

        let mut combatants: IndexMap<String, Combatant> = IndexMap::new();
        // Same-team combatants spread 2 m apart from their end of the
        // field, never stacked on one coordinate.
        let mut left_slots = 0;
        let mut right_slots = 0;
        for entry in &self.entries {
            if !is_actor_urn(&entry.actor) {
                return Err(CombatError::Validation(format!(
                    "actor id '{}' is not a valid actor urn",
                    entry.actor
                )));
            }
            if combatants.contains_key(&entry.actor) {
                return Err(CombatError::DuplicateCombatant(entry.actor.clone()));
            }
            let actor = ctx.world.actor(&entry.actor)?;
            let speed = cost::stride_speed(&actor.stats, actor.mass_grams());
            let on_initiating_side = entry.team == initiating_team;
            let (coordinate, facing) = if on_initiating_side {
                let slot = left_slots;
                left_slots += 1;
                (self.battlefield.margin + slot * 2, Facing::Right)
            } else {
                let slot = right_slots;
                right_slots += 1;
                (
                    self.battlefield.length - self.battlefield.margin - slot * 2,
                    Facing::Left,
                )
            };
            let combatant = Combatant {
                actor: entry.actor.clone(),
                team: entry.team.clone(),
                position: CombatPosition {
                    coordinate: self.battlefield.clamp(coordinate),
                    facing,
                    speed,
                },
                ap: ApPool::full(),
                energy: EnergyPool::full(cost::energy_capacity(&actor.stats)),
                balance: BalancePool::new(10.0 + stat_bonus(actor.stats.fin) as f64),
                target: None,
                initiative: None,
                did_initiate_combat: entry.initiator,
            };
            combatants.insert(entry.actor.clone(), combatant);
        }

        for id in combatants.keys() {
            let actor = ctx.world.actor_mut(id)?;
            if !actor.sessions.contains(&session_id) {
                actor.sessions.push(session_id.clone());
            }
        }

        Ok(Session {
            id: session_id,
            status: SessionStatus::Pending,
            battlefield: self.battlefield,
            combatants,
            initiative: IndexMap::new(),
            current_turn: None,
            completed_turns: Vec::new(),
            location: self.location,
            monitor: GameStateMonitor::new(),
            caches: SessionCaches::new(),
            initiative_roster: String::new(),
        })
    }
}

impl Session {
    pub fn combatant(&self, actor_id: &str) -> Result<&Combatant, CombatError> {
        self.combatants
            .get(actor_id)
            .ok_or_else(|| CombatError::UnknownActor(actor_id.to_string()))
    }

    pub fn combatant_mut(&mut self, actor_id: &str) -> Result<&mut Combatant, CombatError> {
        self.combatants
            .get_mut(actor_id)
            .ok_or_else(|| CombatError::UnknownActor(actor_id.to_string()))
    }

    /// Unsigned gap between two combatants, meters.
    pub fn distance_between(&self, a: &str, b: &str) -> Result<i32, CombatError> {
        let pa = self.combatant(a)?.position.coordinate;
        let pb = self.combatant(b)?.position.coordinate;
        Ok((pa - pb).abs())
    }

    pub fn roster_fingerprint(&self) -> String {
        roster_key(self.combatants.keys().map(String::as_str))
    }

    /// Death edges since the last check.
    pub fn check_for_deaths(&mut self, ctx: &Context) -> Vec<String> {
        self.monitor.check_for_deaths(&self.combatants, &ctx.world)
    }

    pub fn winning_team(&self, ctx: &Context) -> WinningTeam {
        winning_team(&self.combatants, &ctx.world, &self.location)
    }

    /// True when zero or one team remains viable in a running session.
    pub fn check_victory_conditions(&self, ctx: &Context) -> bool {
        self.status == SessionStatus::Running
            && victory_reached(&self.combatants, &ctx.world, &self.location)
    }

    /// PENDING -> RUNNING. Validates the start gate, fixes the turn order,
    /// and opens round 1 turn 1 for the first combatant in initiative.
    pub fn start_combat(
        &mut self,
        ctx: &mut Context,
        explicit_initiative: Option<IndexMap<String, RollResult>>,
        trace: Option<&str>,
    ) -> Result<Vec<Event>, CombatError> {
        if self.status != SessionStatus::Pending {
            return Err(CombatError::IllegalTransition {
                from: self.status,
                event: "startCombat",
            });
        }
        if self.combatants.len() < 2 {
            return Err(CombatError::Validation(
                "combat needs at least two combatants".into(),
            ));
        }
        let teams: HashSet<&str> = self.combatants.values().map(|c| c.team.as_str()).collect();
        if teams.len() < 2 {
            return Err(CombatError::NoOpposingTeams);
        }
        for id in self.combatants.keys() {
            let actor = ctx.world.actor(id)?;
            if !actor.is_alive() {
                return Err(CombatError::Validation(format!("{id} is not alive")));
            }
            if actor.location != self.location {
                return Err(CombatError::Validation(format!(
                    "{id} is not at {}",
                    self.location
                )));
            }
        }
        if victory_reached(&self.combatants, &ctx.world, &self.location) {
            return Err(CombatError::Validation(
                "combat is already decided before it started".into(),
            ));
        }

        let roster = self.roster_fingerprint();
        let rolls = match explicit_initiative {
            Some(rolls) => {
                let provided: HashSet<&String> = rolls.keys().collect();
                let expected: HashSet<&String> = self.combatants.keys().collect();
                if provided != expected {
                    return Err(CombatError::Validation(
                        "explicit initiative must cover exactly the roster".into(),
                    ));
                }
                rolls
            }
            None if self.initiative_roster == roster && !self.initiative.is_empty() => {
                // Roster unchanged since the last computation; preserve.
                self.initiative.clone()
            }
            None => {
                let (world, roller) = ctx.world_and_roller();
                roll_initiative(&self.combatants, world, roller)?
            }
        };
        self.initiative = sort_initiative(rolls, &self.combatants, &ctx.world)?;
        self.initiative_roster = roster;
        for (id, result) in &self.initiative {
            if let Some(combatant) = self.combatants.get_mut(id) {
                combatant.initiative = Some(result.clone());
            }
        }

        let first = self
            .initiative
            .keys()
            .next()
            .cloned()
            .ok_or_else(|| CombatError::InternalInvariantBroken("empty initiative".into()))?;
        if let Some(combatant) = self.combatants.get_mut(&first) {
            combatant.begin_turn();
        }
        self.current_turn = Some(TurnRecord::open(1, 1, &first));
        self.status = SessionStatus::Running;
        log::info!("session {} started, {} first to act", self.id, first);

        let trace = trace.map(str::to_string).unwrap_or_else(|| ctx.uniqid());
        let events = vec![
            ctx.declare_event(
                &trace,
                EventBody::SessionStarted {
                    session: self.id.clone(),
                    location: self.location.clone(),
                    combatants: self.combatants.keys().cloned().collect(),
                },
            ),
            ctx.declare_event(
                &trace,
                EventBody::StatusChanged {
                    session: self.id.clone(),
                    from: SessionStatus::Pending,
                    to: SessionStatus::Running,
                },
            ),
            ctx.declare_event(
                &trace,
                EventBody::TurnStarted {
                    session: self.id.clone(),
                    round: 1,
                    turn: 1,
                    actor: first,
                },
            ),
        ];
        Ok(events)
    }

    /// RUNNING -> PAUSED.
    pub fn pause_combat(
        &mut self,
        ctx: &mut Context,
        trace: Option<&str>,
    ) -> Result<Vec<Event>, CombatError> {
        if self.status != SessionStatus::Running {
            return Err(CombatError::IllegalTransition {
                from: self.status,
                event: "pauseCombat",
            });
        }
        self.status = SessionStatus::Paused;
        let trace = trace.map(str::to_string).unwrap_or_else(|| ctx.uniqid());
        Ok(vec![ctx.declare_event(
            &trace,
            EventBody::StatusChanged {
                session: self.id.clone(),
                from: SessionStatus::Running,
                to: SessionStatus::Paused,
            },
        )])
    }

    /// PAUSED -> RUNNING.
    pub fn resume_combat(
        &mut self,
        ctx: &mut Context,
        trace: Option<&str>,
    ) -> Result<Vec<Event>, CombatError> {
        if self.status != SessionStatus::Paused {
            return Err(CombatError::IllegalTransition {
                from: self.status,
                event: "resumeCombat",
            });
        }
        self.status = SessionStatus::Running;
        let trace = trace.map(str::to_string).unwrap_or_else(|| ctx.uniqid());
        Ok(vec![ctx.declare_event(
            &trace,
            EventBody::StatusChanged {
                session: self.id.clone(),
                from: SessionStatus::Paused,
                to: SessionStatus::Running,
            },
        )])
    }

    /// RUNNING -> TERMINATED. The session stays around for inspection; it
    /// just stops scheduling.
    pub fn end_combat(
        &mut self,
        ctx: &mut Context,
        trace: Option<&str>,
    ) -> Result<Vec<Event>, CombatError> {
        if self.status != SessionStatus::Running {
            return Err(CombatError::IllegalTransition {
                from: self.status,
                event: "endCombat",
            });
        }
        let standing = self.winning_team(ctx);
        let (final_round, final_turn) = self
            .current_turn
            .as_ref()
            .map(|t| (t.round, t.turn))
            .or_else(|| self.completed_turns.last().map(|t| (t.round, t.turn)))
            .unwrap_or((0, 0));
        self.status = SessionStatus::Terminated;
        log::info!(
            "session {} ended after round {final_round}: {:?}",
            self.id,
            standing
        );

        let trace = trace.map(str::to_string).unwrap_or_else(|| ctx.uniqid());
        Ok(vec![
            ctx.declare_event(
                &trace,
                EventBody::StatusChanged {
                    session: self.id.clone(),
                    from: SessionStatus::Running,
                    to: SessionStatus::Terminated,
                },
            ),
            ctx.declare_event(
                &trace,
                EventBody::SessionEnded {
                    session: self.id.clone(),
                    winning_team: standing.into_option(),
                    final_round,
                    final_turn,
                },
            ),
        ])
    }
}
