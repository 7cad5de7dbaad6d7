//! Free-text intent parsing.
//!
//! Grammar: one verb plus arguments. Verbs match exactly, by the canonical
//! spelling's three-letter prefix, or by listed synonym. Target names
//! resolve against the session roster by exact match, unique prefix, then
//! unique substring.
//!
//! Sanitization invariant: nothing from the raw input survives into the
//! emitted actions. Payloads hold only resolved actor urns, enumerated
//! literals, and bounds-checked numbers.

use crate::ap::{clean, ALL_REMAINING_AP};
use crate::context::Context;
use crate::cost;
use crate::error::CombatError;
use crate::model::action::{Action, CommandType, MoveMode};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Attack,
    Defend,
    Strike,
    Target,
    Advance,
    Retreat,
}

fn resolve_verb(token: &str) -> Option<Verb> {
    match token {
        "attack" | "att" | "atk" => Some(Verb::Attack),
        "defend" | "def" | "block" | "guard" => Some(Verb::Defend),
        "strike" | "str" | "hit" | "swing" => Some(Verb::Strike),
        "target" | "tar" => Some(Verb::Target),
        "advance" | "adv" | "move" | "forward" => Some(Verb::Advance),
        "retreat" | "ret" | "back" | "flee" => Some(Verb::Retreat),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct ParsedArgs {
    name: Vec<String>,
    distance: Option<f64>,
    ap: Option<f64>,
    /// `from X` / `away from X`: move away from the named combatant.
    away: bool,
    /// `toward X` / `to X`.
    toward: bool,
}

/// Parse one intent line into executable actions.
///
/// Parsing reads session state (current AP, equipped weapon) to stamp each
/// action with its cost up front, but mutates nothing.
pub fn parse_intent(
    session: &Session,
    ctx: &Context,
    actor_id: &str,
    input: &str,
) -> Result<Vec<Action>, CombatError> {
    let normalized = input.trim().to_lowercase();
    let mut tokens = normalized.split_whitespace();
    let verb_token = tokens
        .next()
        .ok_or_else(|| CombatError::IntentParse("empty intent".into()))?;
    let verb = resolve_verb(verb_token)
        .ok_or_else(|| CombatError::IntentParse(format!("unknown command '{verb_token}'")))?;

    let mut args = ParsedArgs::default();
    let mut tokens = tokens.peekable();
    while let Some(token) = tokens.next() {
        match token {
            "distance" => {
                let value = tokens
                    .next()
                    .ok_or_else(|| CombatError::IntentParse("distance needs a number".into()))?;
                args.distance = Some(parse_distance(session, value)?);
            }
            "ap" => {
                let value = tokens
                    .next()
                    .ok_or_else(|| CombatError::IntentParse("ap needs a number".into()))?;
                args.ap = Some(parse_ap(value)?);
            }
            "toward" | "to" => {
                args.toward = true;
            }
            "from" => {
                args.away = true;
            }
            "away" => {
                match tokens.next() {
                    Some("from") => args.away = true,
                    _ => {
                        return Err(CombatError::IntentParse(
                            "expected 'away from <name>'".into(),
                        ))
                    }
                }
            }
            _ if token.parse::<f64>().is_ok() => {
                // Bare number: shorthand distance.
                args.distance = Some(parse_distance(session, token)?);
            }
            _ => args.name.push(token.to_string()),
        }
    }
    if args.toward && args.away {
        return Err(CombatError::IntentParse(
            "cannot move both toward and away".into(),
        ));
    }

    let target = if args.name.is_empty() {
        None
    } else {
        Some(resolve_target(
            session,
            ctx,
            actor_id,
            &args.name.join(" "),
        )?)
    };

    build_actions(session, ctx, actor_id, verb, &args, target)
}

fn parse_number(token: &str, what: &str) -> Result<f64, CombatError> {
    let value: f64 = token
        .parse()
        .map_err(|_| CombatError::IntentParse(format!("bad {what} '{token}'")))?;
    if !value.is_finite() {
        return Err(CombatError::IntentParse(format!("bad {what} '{token}'")));
    }
    Ok(value)
}

fn parse_distance(session: &Session, token: &str) -> Result<f64, CombatError> {
    let value = parse_number(token, "distance")?;
    if value <= 0.0 || value > session.battlefield.length as f64 {
        return Err(CombatError::IntentParse(format!(
            "distance must be in (0, {}]",
            session.battlefield.length
        )));
    }
    Ok(value)
}

fn parse_ap(token: &str) -> Result<f64, CombatError> {
    let value = parse_number(token, "ap")?;
    if value <= 0.0 || value > 10.0 {
        return Err(CombatError::IntentParse("ap must be in (0, 10]".into()));
    }
    Ok(value)
}

/// Resolve a spoken name to a combatant's actor urn: exact name match,
/// then unique prefix, then unique substring. Self never matches.
fn resolve_target(
    session: &Session,
    ctx: &Context,
    actor_id: &str,
    query: &str,
) -> Result<String, CombatError> {
    let candidates: Vec<(String, String)> = session
        .combatants
        .keys()
        .filter(|id| id.as_str() != actor_id)
        .filter_map(|id| {
            ctx.world
                .actors
                .get(id)
                .map(|a| (id.clone(), a.name.to_lowercase()))
        })
        .collect();

    let tiers: [fn(&str, &str) -> bool; 3] = [
        |name, q| name == q,
        |name, q| name.starts_with(q),
        |name, q| name.contains(q),
    ];
    for matcher in tiers {
        let hits: Vec<&(String, String)> = candidates
            .iter()
            .filter(|(_, name)| matcher(name, query))
            .collect();
        match hits.len() {
            0 => continue,
            1 => return Ok(hits[0].0.clone()),
            _ => {
                return Err(CombatError::AmbiguousTarget {
                    query: query.to_string(),
                    matches: hits.iter().map(|(_, name)| name.clone()).collect(),
                })
            }
        }
    }
    Err(CombatError::IntentParse(format!(
        "no combatant matches '{query}'"
    )))
}

fn build_actions(
    session: &Session,
    ctx: &Context,
    actor_id: &str,
    verb: Verb,
    args: &ParsedArgs,
    target: Option<String>,
) -> Result<Vec<Action>, CombatError> {
    if args.distance.is_some() && args.ap.is_some() {
        return Err(CombatError::IntentParse(
            "give either a distance or an ap amount, not both".into(),
        ));
    }

    let action = match verb {
        Verb::Target => {
            let target = target
                .ok_or_else(|| CombatError::IntentParse("target whom?".into()))?;
            Action::target(&target)
        }
        Verb::Attack | Verb::Strike => {
            let schema = ctx.world.equipped_weapon(actor_id)?;
            let rank = ctx.world.actor(actor_id)?.skill_rank(&schema.skill);
            let ap_cost = cost::weapon_ap_cost(&schema, rank);
            let mut action = if verb == Verb::Strike {
                Action::strike(target.as_deref())
            } else {
                Action::attack(target.as_deref())
            };
            action.cost.ap = ap_cost;
            action
        }
        Verb::Defend => {
            let mut action = Action::defend();
            action.cost.ap = session.combatant(actor_id)?.ap.remaining();
            action
        }
        Verb::Advance | Verb::Retreat => {
            // `advance from X` means away from X; `retreat toward X` means
            // toward X. The command follows the direction, not the word.
            let away = match verb {
                Verb::Advance => args.away,
                _ => !args.toward,
            };
            let command = if away {
                CommandType::Retreat
            } else {
                CommandType::Advance
            };
            let mut action = build_movement(session, ctx, actor_id, command, args)?;
            action.args.target = target;
            action
        }
    };
    Ok(vec![action])
}

fn build_movement(
    session: &Session,
    ctx: &Context,
    actor_id: &str,
    command: CommandType,
    args: &ParsedArgs,
) -> Result<Action, CombatError> {
    let combatant = session.combatant(actor_id)?;
    let actor = ctx.world.actor(actor_id)?;
    let speed = combatant.position.speed;
    let mass = actor.mass_grams();

    if let Some(distance) = args.distance {
        let resolved =
            cost::movement_by_distance(&actor.stats, mass, speed, distance.round() as i32);
        return Ok(
            Action::movement(command, MoveMode::Distance, distance.round())
                .with_cost(resolved.ap, resolved.energy),
        );
    }
    if let Some(ap) = args.ap {
        let resolved = cost::movement_by_ap(&actor.stats, mass, speed, ap);
        return Ok(Action::movement(command, MoveMode::Ap, resolved.ap)
            .with_cost(resolved.ap, resolved.energy));
    }
    // No amount given: spend everything left.
    let remaining = clean(combatant.ap.remaining());
    let resolved = cost::movement_by_ap(&actor.stats, mass, speed, remaining);
    let mut action = Action::movement(command, MoveMode::Ap, ALL_REMAINING_AP);
    action.cost.ap = remaining;
    action.cost.energy = resolved.energy;
    Ok(action)
}

#[cfg(test)]
#[path = "./intent_test.rs"]
mod intent_test;
