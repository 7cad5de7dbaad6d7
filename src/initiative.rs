//! Initiative rolling and the deterministic turn-order sort.
//!
//! The sorted mapping's iteration order IS the turn order for the whole
//! session; nothing downstream re-derives it. Ties cascade through finesse,
//! the combat-initiator flag, and finally the actor id, which is unique, so
//! the order is total.

use indexmap::IndexMap;

use crate::context::World;
use crate::dice::{roll, RollResult, Roller};
use crate::error::CombatError;
use crate::model::actor::stat_bonus;
use crate::model::combatant::Combatant;

/// The initiative die.
pub const INITIATIVE_DICE: &str = "1d20";

/// Roll initiative for every combatant: `1d20` plus the perception bonus,
/// recorded as a labeled modifier so the decomposition survives on the
/// wire.
pub fn roll_initiative(
    combatants: &IndexMap<String, Combatant>,
    world: &World,
    roller: &mut dyn Roller,
) -> Result<IndexMap<String, RollResult>, CombatError> {
    let mut rolls = IndexMap::with_capacity(combatants.len());
    for id in combatants.keys() {
        let actor = world.actor(id)?;
        let result =
            roll(roller, INITIATIVE_DICE)?.with_mod("per", stat_bonus(actor.stats.per));
        rolls.insert(id.clone(), result);
    }
    Ok(rolls)
}

/// Sort rolls into turn order.
///
/// Descending by result, then descending finesse, then the combatant that
/// initiated combat, then ascending actor id. Ids are unique, so rule four
/// cannot tie.
pub fn sort_initiative(
    rolls: IndexMap<String, RollResult>,
    combatants: &IndexMap<String, Combatant>,
    world: &World,
) -> Result<IndexMap<String, RollResult>, CombatError> {
    let mut entries: Vec<(String, RollResult, i32, bool)> = Vec::with_capacity(rolls.len());
    for (id, result) in rolls {
        let fin = world.actor(&id)?.stats.fin;
        let initiated = combatants
            .get(&id)
            .map(|c| c.did_initiate_combat)
            .unwrap_or(false);
        entries.push((id, result, fin, initiated));
    }
    entries.sort_by(|a, b| {
        b.1.result
            .cmp(&a.1.result)
            .then(b.2.cmp(&a.2))
            .then(b.3.cmp(&a.3))
            .then(a.0.cmp(&b.0))
    });
    Ok(entries.into_iter().map(|(id, r, _, _)| (id, r)).collect())
}

/// Fingerprint of the roster. When this changes the initiative mapping is
/// stale and must be recomputed.
pub fn roster_key<'a>(ids: impl Iterator<Item = &'a str>) -> String {
    let mut ids: Vec<&str> = ids.collect();
    ids.sort_unstable();
    ids.join("|")
}
