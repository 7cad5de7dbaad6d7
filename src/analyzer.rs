//! Derives the tactical picture one planning call works from.

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::cost;
use crate::dice;
use crate::error::CombatError;
use crate::model::weapon::WeaponClass;
use crate::monitor::is_viable;
use crate::session::Session;

/// Snapshot of everything the heuristics need to score actions for one
/// combatant. Pure data; computing it mutates nothing but the weapon
/// cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TacticalSituation {
    pub actor: String,
    pub enemy: String,
    pub actor_position: i32,
    pub enemy_position: i32,
    /// Signed: positive when the enemy stands to the right.
    pub distance: i32,
    pub weapon_class: WeaponClass,
    pub weapon_urn: String,
    /// Max effective range of the actor's weapon, meters.
    pub weapon_range: i32,
    pub weapon_ap_cost: f64,
    pub weapon_damage_avg: f64,
    /// Flat to-hit: accuracy plus skill.
    pub attack_bonus: i32,
    /// The defense number a strike must meet.
    pub enemy_balance: f64,
    pub enemy_weapon_range: i32,
    /// Inside the weapon's intended engagement band.
    pub in_optimal_band: bool,
    /// Gap minus the enemy's reach; negative means standing in it.
    pub safety: i32,
    pub obstacles_between: usize,
    pub ap_remaining: f64,
    pub speed: f64,
    pub has_target: bool,
}

impl TacticalSituation {
    pub fn gap(&self) -> i32 {
        self.distance.abs()
    }
}

/// Pick the combatant's primary enemy: its current target when that is a
/// viable opponent, else the nearest viable opponent, ties resolved by
/// turn order.
fn primary_enemy(
    session: &Session,
    ctx: &Context,
    actor_id: &str,
) -> Result<Option<String>, CombatError> {
    let me = session.combatant(actor_id)?;
    let viable_opponent = |id: &str| -> bool {
        session
            .combatants
            .get(id)
            .map(|c| c.team != me.team && is_viable(&ctx.world, &session.location, id))
            .unwrap_or(false)
    };

    if let Some(target) = me.target.as_deref() {
        if viable_opponent(target) {
            return Ok(Some(target.to_string()));
        }
    }

    let order: Vec<&String> = if session.initiative.is_empty() {
        session.combatants.keys().collect()
    } else {
        session.initiative.keys().collect()
    };
    let mut best: Option<(i32, &String)> = None;
    for id in order {
        if !viable_opponent(id) {
            continue;
        }
        let gap = session.distance_between(actor_id, id)?;
        if best.map(|(d, _)| gap < d).unwrap_or(true) {
            best = Some((gap, id));
        }
    }
    Ok(best.map(|(_, id)| id.clone()))
}

/// Build the situation for `actor_id`. Fails when the combatant has no
/// viable opponent left to plan against.
pub fn analyze(
    session: &mut Session,
    ctx: &Context,
    actor_id: &str,
) -> Result<TacticalSituation, CombatError> {
    let enemy = primary_enemy(session, ctx, actor_id)?
        .ok_or_else(|| CombatError::Validation(format!("{actor_id} has no viable enemy")))?;

    let schema = ctx.world.equipped_weapon(actor_id)?;
    let (weapon_class, weapon_range) = session.caches.weapon_profile(&schema);
    let enemy_schema = ctx.world.equipped_weapon(&enemy)?;
    let (_, enemy_weapon_range) = session.caches.weapon_profile(&enemy_schema);

    let me = session.combatant(actor_id)?;
    let foe = session.combatant(&enemy)?;
    let actor_record = ctx.world.actor(actor_id)?;
    let rank = actor_record.skill_rank(&schema.skill);

    let distance = foe.position.coordinate - me.position.coordinate;
    let gap = distance.abs();
    let band_floor = schema.range.min.unwrap_or(0);
    let in_optimal_band = gap >= band_floor && gap <= schema.range.optimal.max(1);
    let safety = gap - enemy_weapon_range;

    Ok(TacticalSituation {
        actor: actor_id.to_string(),
        enemy: enemy.clone(),
        actor_position: me.position.coordinate,
        enemy_position: foe.position.coordinate,
        distance,
        weapon_class,
        weapon_urn: schema.urn.clone(),
        weapon_range,
        weapon_ap_cost: cost::weapon_ap_cost(&schema, rank),
        weapon_damage_avg: dice::average(&schema.damage),
        attack_bonus: schema.accuracy + (rank / 20) as i32,
        enemy_balance: foe.balance.eff,
        enemy_weapon_range,
        in_optimal_band,
        safety,
        obstacles_between: session
            .battlefield
            .obstacles_between(me.position.coordinate, foe.position.coordinate),
        ap_remaining: me.ap.remaining(),
        speed: me.position.speed,
        has_target: me.target.is_some(),
    })
}
