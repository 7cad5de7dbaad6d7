//! Combat event kinds and the per-context event log.
//!
//! Kind strings are wire-exact: hosts filter and route on them, so they are
//! pinned with serde renames rather than derived from variant names.

use serde::{Deserialize, Serialize};

use crate::dice::RollResult;
use crate::session::SessionStatus;

/// Everything the engine can announce, tagged by its wire kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum EventBody {
    #[serde(rename = "combat:session:started")]
    SessionStarted {
        session: String,
        location: String,
        combatants: Vec<String>,
    },

    #[serde(rename = "combat:session:status:changed")]
    StatusChanged {
        session: String,
        from: SessionStatus,
        to: SessionStatus,
    },

    #[serde(rename = "combat:session:ended")]
    SessionEnded {
        session: String,
        winning_team: Option<String>,
        final_round: u32,
        final_turn: u32,
    },

    #[serde(rename = "combat:round:started")]
    RoundStarted { session: String, round: u32 },

    #[serde(rename = "combat:turn:started")]
    TurnStarted {
        session: String,
        round: u32,
        turn: u32,
        actor: String,
    },

    #[serde(rename = "combat:turn:ended")]
    TurnEnded {
        session: String,
        round: u32,
        turn: u32,
        actor: String,
    },

    #[serde(rename = "combatant:did:die")]
    CombatantDied {
        session: String,
        actor: String,
        killer: Option<String>,
    },

    #[serde(rename = "combatant:did:attack")]
    CombatantAttacked {
        session: String,
        actor: String,
        target: String,
        weapon: String,
        roll: RollResult,
        hit: bool,
        damage: Option<i32>,
    },

    #[serde(rename = "actor:did:move")]
    ActorMoved {
        session: String,
        actor: String,
        from: i32,
        to: i32,
        distance: i32,
        ap_cost: f64,
        energy_cost: i64,
    },

    #[serde(rename = "actor:did:die")]
    ActorDied { actor: String, location: String },
}

impl EventBody {
    /// The wire kind string this body serializes under.
    pub fn kind(&self) -> &'static str {
        match self {
            EventBody::SessionStarted { .. } => "combat:session:started",
            EventBody::StatusChanged { .. } => "combat:session:status:changed",
            EventBody::SessionEnded { .. } => "combat:session:ended",
            EventBody::RoundStarted { .. } => "combat:round:started",
            EventBody::TurnStarted { .. } => "combat:turn:started",
            EventBody::TurnEnded { .. } => "combat:turn:ended",
            EventBody::CombatantDied { .. } => "combatant:did:die",
            EventBody::CombatantAttacked { .. } => "combatant:did:attack",
            EventBody::ActorMoved { .. } => "actor:did:move",
            EventBody::ActorDied { .. } => "actor:did:die",
        }
    }

    /// The actor this event is primarily about, when there is one.
    pub fn actor(&self) -> Option<&str> {
        match self {
            EventBody::TurnStarted { actor, .. }
            | EventBody::TurnEnded { actor, .. }
            | EventBody::CombatantDied { actor, .. }
            | EventBody::CombatantAttacked { actor, .. }
            | EventBody::ActorMoved { actor, .. }
            | EventBody::ActorDied { actor, .. } => Some(actor),
            _ => None,
        }
    }
}

/// A declared event: body plus the envelope fields every consumer needs to
/// order and correlate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub trace: String,
    pub timestamp: u64,
    #[serde(flatten)]
    pub body: EventBody,
}

/// An error surfaced to the host, attached to the trace that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredError {
    pub message: String,
    pub code: String,
    pub trace: String,
    pub timestamp: u64,
}
