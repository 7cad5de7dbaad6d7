//! Batch execution of actions and the intent -> action -> event pipeline.
//!
//! Everything in one batch shares one trace: the caller's, or a fresh
//! uniqid. After the batch the executor observes the session state and
//! yields the turn automatically once the actor is spent.

use crate::context::Context;
use crate::error::CombatError;
use crate::events::Event;
use crate::intent;
use crate::model::action::Action;
use crate::session::Session;
use crate::{actions, monitor};

/// Dispatch a batch of actions for one actor.
///
/// Individual action failures are declared into the context and do not
/// abort the batch. When the actor is out of AP at the end and still owns
/// the current turn, `done` fires automatically.
pub fn execute_actions(
    session: &mut Session,
    ctx: &mut Context,
    actor_id: &str,
    batch: &[Action],
    trace: Option<&str>,
) -> Vec<Event> {
    let trace = trace.map(str::to_string).unwrap_or_else(|| ctx.uniqid());
    let mut events = Vec::new();
    for action in batch {
        events.extend(actions::dispatch(session, ctx, actor_id, action, &trace));
    }

    // Observe: deaths and victory after the batch, before any turn change.
    let deaths = session.check_for_deaths(ctx);
    for id in &deaths {
        log::info!("session {}: {id} is down", session.id);
    }
    if session.check_victory_conditions(ctx) {
        log::info!(
            "session {}: victory conditions met ({:?})",
            session.id,
            monitor::winning_team(&session.combatants, &ctx.world, &session.location)
        );
    }

    let owns_turn = session
        .current_turn
        .as_ref()
        .map(|t| t.actor == actor_id)
        .unwrap_or(false);
    if owns_turn && !actions::can_act(session, actor_id) {
        events.extend(actions::done(session, ctx, actor_id, &trace));
    }
    events
}

/// Parse an intent line and execute the resulting actions.
///
/// Parse failures raise to the caller; nothing has mutated yet at that
/// point.
pub fn execute_intent(
    session: &mut Session,
    ctx: &mut Context,
    actor_id: &str,
    input: &str,
    trace: Option<&str>,
) -> Result<Vec<Event>, CombatError> {
    let batch = intent::parse_intent(session, ctx, actor_id, input)?;
    log::debug!(
        "{actor_id} intent {:?} -> {} action(s)",
        input,
        batch.len()
    );
    Ok(execute_actions(session, ctx, actor_id, &batch, trace))
}
