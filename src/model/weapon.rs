//! Weapon schemas and range classification.
//!
//! Schemas are owned by the world's equipment layer; the combat core only
//! reads them. Classification folds a schema's range profile into one of
//! three classes that drive both range checks and tactic selection.

use serde::{Deserialize, Serialize};

/// Range profile in meters. `optimal` is the intended engagement distance;
/// `falloff` (ranged weapons only) is how far past optimal the weapon stays
/// usable per step of degradation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeProfile {
    pub optimal: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub falloff: Option<i32>,
}

/// Action timers in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Timers {
    pub attack: u32,
    pub setup: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aim: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reload: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponSchema {
    pub urn: String,
    /// Grams.
    pub base_mass: u32,
    pub range: RangeProfile,
    pub timers: Timers,
    /// Skill urn governing this weapon.
    pub skill: String,
    /// Flat to-hit adjustment.
    pub accuracy: i32,
    /// Damage dice spec, e.g. `2d6+1`.
    pub damage: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeaponClass {
    Melee,
    Reach,
    Ranged,
}

/// Fold a range profile into a class. A falloff curve or a max beyond arm's
/// length marks a ranged weapon; an optimal of exactly 2 with no falloff is
/// a reach weapon; everything else fights at arm's length.
pub fn classify(schema: &WeaponSchema) -> WeaponClass {
    let range = &schema.range;
    if range.falloff.is_some() || range.max.map_or(false, |m| m > 2) {
        WeaponClass::Ranged
    } else if range.optimal == 2 {
        WeaponClass::Reach
    } else {
        WeaponClass::Melee
    }
}

/// Furthest distance at which a strike is still legal.
pub fn max_effective_range(schema: &WeaponSchema) -> i32 {
    match classify(schema) {
        WeaponClass::Ranged => schema
            .range
            .max
            .unwrap_or(schema.range.optimal + 2 * schema.range.falloff.unwrap_or(0)),
        WeaponClass::Melee | WeaponClass::Reach => schema.range.optimal,
    }
}

/// Fallback schema for actors with empty hands.
pub fn unarmed() -> WeaponSchema {
    WeaponSchema {
        urn: "flux:weapon:unarmed".to_string(),
        base_mass: 0,
        range: RangeProfile {
            optimal: 1,
            min: None,
            max: None,
            falloff: None,
        },
        timers: Timers {
            attack: 2000,
            setup: 0,
            aim: None,
            reload: None,
        },
        skill: "flux:skill:brawling".to_string(),
        accuracy: 0,
        damage: "1d3".to_string(),
    }
}
