//! The combatant action surface: target, advance, retreat, attack, strike,
//! defend, cleave, done.
//!
//! Every operation returns the events it emitted. The [`dispatch`] boundary
//! is where errors stop: failures inside an action become a declared error
//! plus an empty event list and never cross back into the host. Lifecycle
//! calls (on [`crate::session::Session`]) are the only ones that raise.

use crate::ap::{clean, ALL_REMAINING_AP};
use crate::context::Context;
use crate::cost::{self, MoveCost};
use crate::error::CombatError;
use crate::events::{Event, EventBody};
use crate::model::action::{Action, CommandType, MoveMode};
use crate::model::weapon::WeaponSchema;
use crate::monitor::is_viable;
use crate::session::{Session, SessionStatus};
use crate::turns;

/// A combatant may keep acting while it has any cleaned AP left.
pub fn can_act(session: &Session, actor_id: &str) -> bool {
    session
        .combatants
        .get(actor_id)
        .map(|c| c.can_act())
        .unwrap_or(false)
}

/// Square up on another combatant in the session. Free.
pub fn target(
    session: &mut Session,
    _ctx: &mut Context,
    actor_id: &str,
    target_id: &str,
    _trace: &str,
) -> Result<Vec<Event>, CombatError> {
    if !session.combatants.contains_key(target_id) {
        return Err(CombatError::UnknownActor(target_id.to_string()));
    }
    let combatant = session.combatant_mut(actor_id)?;
    combatant.target = Some(target_id.to_string());
    log::debug!("{actor_id} now targets {target_id}");
    Ok(Vec::new())
}

/// Move toward the reference (explicit target argument, else the current
/// target, else the facing direction).
pub fn advance(
    session: &mut Session,
    ctx: &mut Context,
    actor_id: &str,
    mode: MoveMode,
    value: f64,
    toward: Option<&str>,
    auto_done: bool,
    trace: &str,
) -> Result<Vec<Event>, CombatError> {
    movement(session, ctx, actor_id, mode, value, toward, false, auto_done, trace)
}

/// Move away from the reference; same cost model, direction reversed.
pub fn retreat(
    session: &mut Session,
    ctx: &mut Context,
    actor_id: &str,
    mode: MoveMode,
    value: f64,
    from: Option<&str>,
    auto_done: bool,
    trace: &str,
) -> Result<Vec<Event>, CombatError> {
    movement(session, ctx, actor_id, mode, value, from, true, auto_done, trace)
}

#[allow(clippy::too_many_arguments)]
fn movement(
    session: &mut Session,
    ctx: &mut Context,
    actor_id: &str,
    mode: MoveMode,
    value: f64,
    reference: Option<&str>,
    reverse: bool,
    auto_done: bool,
    trace: &str,
) -> Result<Vec<Event>, CombatError> {
    let combatant = session.combatant(actor_id)?;
    let speed = combatant.position.speed;
    let origin = combatant.position.coordinate;
    let reference = reference
        .map(str::to_string)
        .or_else(|| combatant.target.clone());

    let actor = ctx.world.actor(actor_id)?;
    let stats = actor.stats;
    let mass = actor.mass_grams();

    // Requested AP always buys its full time; requested distance is only
    // billed for ground actually covered once the field edge clamps it.
    let resolved: MoveCost = match mode {
        MoveMode::Distance => {
            cost::movement_by_distance(&stats, mass, speed, value.round() as i32)
        }
        MoveMode::Ap | MoveMode::Max => {
            let ap = if mode == MoveMode::Max || value == ALL_REMAINING_AP {
                session.combatant(actor_id)?.ap.remaining()
            } else {
                value
            };
            if clean(ap) <= 0.0 {
                return Err(CombatError::InsufficientAp {
                    needed: 0.1,
                    available: clean(ap),
                });
            }
            cost::movement_by_ap(&stats, mass, speed, ap)
        }
    };

    // Direction: toward the reference when one stands elsewhere, otherwise
    // wherever the combatant faces. Retreat flips it.
    let mut direction = match reference
        .as_deref()
        .and_then(|id| session.combatants.get(id))
        .map(|c| c.position.coordinate)
    {
        Some(ref_coord) if ref_coord != origin => (ref_coord - origin).signum(),
        _ => session.combatant(actor_id)?.position.facing.sign(),
    };
    if reverse {
        direction = -direction;
    }

    let destination = session
        .battlefield
        .clamp(origin + direction * resolved.distance);
    let covered = (destination - origin).abs();
    let billed = match mode {
        MoveMode::Distance if covered < resolved.distance => {
            cost::movement_by_distance(&stats, mass, speed, covered)
        }
        _ => resolved,
    };

    {
        let combatant = session.combatant_mut(actor_id)?;
        combatant.ap.deduct(billed.ap)?;
        combatant.energy.drain(billed.energy);
        combatant.position.coordinate = destination;
        if covered > 0 {
            combatant.position.facing = if direction < 0 {
                crate::model::battlefield::Facing::Left
            } else {
                crate::model::battlefield::Facing::Right
            };
            if reverse {
                // A retreating combatant backs away without turning around.
                combatant.position.facing = combatant.position.facing.reversed();
            }
        }
    }
    session.caches.invalidate_tactical();

    let mut events = vec![ctx.declare_event(
        trace,
        EventBody::ActorMoved {
            session: session.id.clone(),
            actor: actor_id.to_string(),
            from: origin,
            to: destination,
            distance: covered,
            ap_cost: billed.ap,
            energy_cost: billed.energy,
        },
    )];

    if auto_done && !can_act(session, actor_id) {
        events.extend(done(session, ctx, actor_id, trace));
    }
    Ok(events)
}

/// High-level attack facade: optionally acquire the target, then strike.
pub fn attack(
    session: &mut Session,
    ctx: &mut Context,
    actor_id: &str,
    target_id: Option<&str>,
    trace: &str,
) -> Result<Vec<Event>, CombatError> {
    let mut events = Vec::new();
    if let Some(t) = target_id {
        events.extend(target(session, ctx, actor_id, t, trace)?);
    }
    events.extend(strike(session, ctx, actor_id, None, trace)?);
    Ok(events)
}

/// Primitive attack: pays the weapon's AP cost, resolves one to-hit roll,
/// and is the only place a death event originates.
pub fn strike(
    session: &mut Session,
    ctx: &mut Context,
    actor_id: &str,
    target_id: Option<&str>,
    trace: &str,
) -> Result<Vec<Event>, CombatError> {
    let target_id = target_id
        .map(str::to_string)
        .or_else(|| session.combatant(actor_id).ok()?.target.clone())
        .ok_or_else(|| CombatError::Validation(format!("{actor_id} has no target")))?;
    session.combatant(actor_id)?;
    if !session.combatants.contains_key(&target_id) {
        return Err(CombatError::UnknownActor(target_id.clone()));
    }

    let schema = ctx.world.equipped_weapon(actor_id)?;
    let (_, max_range) = session.caches.weapon_profile(&schema);
    let distance = session.distance_between(actor_id, &target_id)?;
    if distance > max_range {
        return Err(CombatError::OutOfRange {
            target: target_id,
            distance,
            max_range,
        });
    }

    let rank = ctx.world.actor(actor_id)?.skill_rank(&schema.skill);
    let ap_cost = cost::weapon_ap_cost(&schema, rank);
    session.combatant_mut(actor_id)?.ap.deduct(ap_cost)?;

    resolve_strike(session, ctx, actor_id, &target_id, &schema, rank, trace)
}

fn resolve_strike(
    session: &mut Session,
    ctx: &mut Context,
    actor_id: &str,
    target_id: &str,
    schema: &WeaponSchema,
    rank: u32,
    trace: &str,
) -> Result<Vec<Event>, CombatError> {
    let skill_bonus = (rank / 20) as i32;
    let roll = ctx
        .roll_dice("1d20")?
        .with_mod("accuracy", schema.accuracy)
        .with_mod("skill", skill_bonus);
    let defense = session.combatant(target_id)?.balance.eff;
    let hit = roll.result as f64 >= defense;

    let mut damage = None;
    if hit {
        let dealt = ctx.roll_dice(&schema.damage)?.result.max(0);
        damage = Some(dealt);
        let victim = ctx.world.actor_mut(target_id)?;
        victim.hp.eff.cur = (victim.hp.eff.cur - dealt as f64).max(0.0);
        log::debug!("{actor_id} hits {target_id} for {dealt}");
    } else {
        log::debug!("{actor_id} misses {target_id}");
    }

    let mut events = vec![ctx.declare_event(
        trace,
        EventBody::CombatantAttacked {
            session: session.id.clone(),
            actor: actor_id.to_string(),
            target: target_id.to_string(),
            weapon: schema.urn.clone(),
            roll,
            hit,
            damage,
        },
    )];

    if hit && !ctx.world.actor(target_id)?.is_alive() {
        events.push(ctx.declare_event(
            trace,
            EventBody::CombatantDied {
                session: session.id.clone(),
                actor: target_id.to_string(),
                killer: Some(actor_id.to_string()),
            },
        ));
        events.push(ctx.declare_event(
            trace,
            EventBody::ActorDied {
                actor: target_id.to_string(),
                location: session.location.clone(),
            },
        ));
    }
    Ok(events)
}

/// Spend everything left to fight defensively until the next turn.
pub fn defend(
    session: &mut Session,
    _ctx: &mut Context,
    actor_id: &str,
    _trace: &str,
) -> Result<Vec<Event>, CombatError> {
    let combatant = session.combatant_mut(actor_id)?;
    let remaining = combatant.ap.remaining();
    if remaining > 0.0 {
        combatant.ap.deduct(remaining)?;
    }
    combatant.balance.install_defend();
    log::debug!("{actor_id} takes a defensive posture ({remaining:.1} ap)");
    Ok(Vec::new())
}

/// Sweep every viable enemy within reach for one weapon cost. Needs a
/// weapon that swings rather than shoots.
pub fn cleave(
    session: &mut Session,
    ctx: &mut Context,
    actor_id: &str,
    trace: &str,
) -> Result<Vec<Event>, CombatError> {
    let schema = ctx.world.equipped_weapon(actor_id)?;
    let (class, max_range) = session.caches.weapon_profile(&schema);
    if class == crate::model::weapon::WeaponClass::Ranged {
        return Err(CombatError::Validation(
            "cleave needs a melee or reach weapon".into(),
        ));
    }

    let my_team = session.combatant(actor_id)?.team.clone();
    let targets: Vec<String> = session
        .combatants
        .iter()
        .filter(|(id, c)| {
            c.team != my_team
                && is_viable(&ctx.world, &session.location, id)
                && session
                    .distance_between(actor_id, id)
                    .map(|d| d <= max_range)
                    .unwrap_or(false)
        })
        .map(|(id, _)| id.clone())
        .collect();
    if targets.is_empty() {
        return Err(CombatError::Validation(
            "no enemies within cleave reach".into(),
        ));
    }

    let rank = ctx.world.actor(actor_id)?.skill_rank(&schema.skill);
    let ap_cost = cost::weapon_ap_cost(&schema, rank);
    session.combatant_mut(actor_id)?.ap.deduct(ap_cost)?;

    let mut events = Vec::new();
    for target_id in targets {
        events.extend(resolve_strike(
            session, ctx, actor_id, &target_id, &schema, rank, trace,
        )?);
    }
    Ok(events)
}

/// Explicitly yield the rest of the turn.
pub fn done(session: &mut Session, ctx: &mut Context, actor_id: &str, trace: &str) -> Vec<Event> {
    let owns_turn = session
        .current_turn
        .as_ref()
        .map(|t| t.actor == actor_id)
        .unwrap_or(false);
    if !owns_turn {
        log::debug!("{actor_id} called done outside its turn; ignored");
        return Vec::new();
    }
    turns::advance_turn(session, ctx, trace)
}

/// Dispatch one action to the surface above. This is the boundary where
/// errors become declared errors instead of propagating.
pub fn dispatch(
    session: &mut Session,
    ctx: &mut Context,
    actor_id: &str,
    action: &Action,
    trace: &str,
) -> Vec<Event> {
    if session.status != SessionStatus::Running {
        ctx.declare_error(
            &CombatError::Validation(format!(
                "session {} is not running ({:?})",
                session.id, session.status
            )),
            trace,
        );
        return Vec::new();
    }

    let result = match action.command {
        CommandType::Target => match action.args.target.as_deref() {
            Some(t) => target(session, ctx, actor_id, t, trace),
            None => Err(CombatError::Validation("target command needs a target".into())),
        },
        CommandType::Advance => advance(
            session,
            ctx,
            actor_id,
            action.args.mode.unwrap_or(MoveMode::Ap),
            action.args.value.unwrap_or(ALL_REMAINING_AP),
            action.args.target.as_deref(),
            false,
            trace,
        ),
        CommandType::Retreat => retreat(
            session,
            ctx,
            actor_id,
            action.args.mode.unwrap_or(MoveMode::Ap),
            action.args.value.unwrap_or(ALL_REMAINING_AP),
            action.args.target.as_deref(),
            false,
            trace,
        ),
        CommandType::Attack if action.args.primitive => {
            strike(session, ctx, actor_id, action.args.target.as_deref(), trace)
        }
        CommandType::Attack => {
            attack(session, ctx, actor_id, action.args.target.as_deref(), trace)
        }
        CommandType::Defend => defend(session, ctx, actor_id, trace),
        CommandType::Cleave => cleave(session, ctx, actor_id, trace),
        CommandType::Done => {
            record_action(session, actor_id, action, trace);
            return done(session, ctx, actor_id, trace);
        }
    };

    match result {
        Ok(events) => {
            record_action(session, actor_id, action, trace);
            events
        }
        Err(error) => {
            ctx.declare_error(&error, trace);
            Vec::new()
        }
    }
}

fn record_action(session: &mut Session, actor_id: &str, action: &Action, trace: &str) {
    if let Some(turn) = session.current_turn.as_mut() {
        if turn.actor == actor_id {
            turn.actions.push(action.clone().with_trace(trace));
        }
    }
}

#[cfg(test)]
#[path = "./actions_test.rs"]
mod actions_test;
