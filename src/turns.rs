//! Turn and round advancement.
//!
//! The initiative mapping's iteration order is the schedule; this module
//! walks it, skipping combatants whose actors are dead or gone, and rolls
//! the round over when the schedule is exhausted.

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::events::{Event, EventBody};
use crate::model::action::Action;
use crate::monitor::is_viable;
use crate::session::{Session, SessionStatus};

/// One combatant's turn: position in the schedule plus the actions it
/// actually executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRecord {
    pub round: u32,
    pub turn: u32,
    pub actor: String,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl TurnRecord {
    pub fn open(round: u32, turn: u32, actor: &str) -> Self {
        TurnRecord {
            round,
            turn,
            actor: actor.to_string(),
            actions: Vec::new(),
        }
    }
}

/// Close the current turn and hand the floor to the next living combatant.
///
/// Scans initiative order from just past the current actor; on exhaustion
/// wraps to the top with a fresh round. When nobody anywhere is viable the
/// schedule stops silently — the victory check is about to terminate the
/// session anyway.
pub fn advance_turn(session: &mut Session, ctx: &mut Context, trace: &str) -> Vec<Event> {
    if session.status != SessionStatus::Running {
        log::debug!(
            "advance_turn ignored: session {} is {:?}",
            session.id,
            session.status
        );
        return Vec::new();
    }
    let Some(current) = session.current_turn.take() else {
        return Vec::new();
    };

    let mut events = Vec::new();
    events.push(ctx.declare_event(
        trace,
        EventBody::TurnEnded {
            session: session.id.clone(),
            round: current.round,
            turn: current.turn,
            actor: current.actor.clone(),
        },
    ));

    let round = current.round;
    let turn = current.turn;
    let prev_actor = current.actor.clone();
    session.completed_turns.push(current);

    let order: Vec<String> = session.initiative.keys().cloned().collect();
    let resume_at = order
        .iter()
        .position(|id| *id == prev_actor)
        .map(|i| i + 1)
        .unwrap_or(0);

    // Rest of the current round first.
    for id in &order[resume_at..] {
        if is_viable(&ctx.world, &session.location, id) {
            events.push(open_turn(session, ctx, trace, round, turn + 1, id));
            return events;
        }
    }

    // Wrap: a new round starts at the top of the schedule.
    for id in &order {
        if is_viable(&ctx.world, &session.location, id) {
            events.push(ctx.declare_event(
                trace,
                EventBody::RoundStarted {
                    session: session.id.clone(),
                    round: round + 1,
                },
            ));
            events.push(open_turn(session, ctx, trace, round + 1, 1, id));
            return events;
        }
    }

    log::info!("session {}: no viable combatant left to schedule", session.id);
    events
}

fn open_turn(
    session: &mut Session,
    ctx: &mut Context,
    trace: &str,
    round: u32,
    turn: u32,
    actor: &str,
) -> Event {
    if let Some(combatant) = session.combatants.get_mut(actor) {
        combatant.begin_turn();
    }
    session.current_turn = Some(TurnRecord::open(round, turn, actor));
    session.caches.invalidate_tactical();
    ctx.declare_event(
        trace,
        EventBody::TurnStarted {
            session: session.id.clone(),
            round,
            turn,
            actor: actor.to_string(),
        },
    )
}
