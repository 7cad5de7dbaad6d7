//! World-owned actor records.
//!
//! The session borrows these for viability checks and routes damage into
//! them; everything else about an actor (inventory, narrative state) lives
//! with the world and is out of scope here.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::weapon::WeaponSchema;

/// URN prefix every combat-visible actor id must carry.
pub const ACTOR_URN_PREFIX: &str = "flux:actor:";

/// True for ids of the form `flux:actor:<slug>` where the slug is non-empty
/// lowercase alphanumerics and dashes.
pub fn is_actor_urn(id: &str) -> bool {
    match id.strip_prefix(ACTOR_URN_PREFIX) {
        Some(slug) if !slug.is_empty() => slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
        _ => false,
    }
}

/// Core attribute block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Stats {
    pub pow: i32,
    pub fin: i32,
    pub res: i32,
    pub int: i32,
    pub per: i32,
    pub mem: i32,
}

/// Ability modifier for a raw stat value.
pub fn stat_bonus(stat: i32) -> i32 {
    (stat - 10).div_euclid(2)
}

/// A current/maximum pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gauge {
    pub cur: f64,
    pub max: f64,
}

impl Gauge {
    pub fn full(max: f64) -> Self {
        Gauge { cur: max, max }
    }
}

/// Natural (unmodified) and effective (post-modifier) layers of a gauge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayeredGauge {
    pub nat: Gauge,
    pub eff: Gauge,
}

impl LayeredGauge {
    pub fn full(max: f64) -> Self {
        LayeredGauge {
            nat: Gauge::full(max),
            eff: Gauge::full(max),
        }
    }
}

/// What the actor currently has in hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub wielded: Option<WeaponSchema>,
}

/// A world actor record, read-mostly from the combat core's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub location: String,
    pub stats: Stats,
    pub hp: LayeredGauge,
    /// Body mass in grams, excluding equipment.
    pub mass: u32,
    /// Skill urn -> rank in [0, 100].
    #[serde(default)]
    pub skills: HashMap<String, u32>,
    #[serde(default)]
    pub equipment: Equipment,
    /// Session ids this actor participates in.
    #[serde(default)]
    pub sessions: Vec<String>,
}

impl Actor {
    pub fn is_alive(&self) -> bool {
        self.hp.eff.cur > 0.0
    }

    /// Total carried mass in grams: body plus wielded weapon.
    pub fn mass_grams(&self) -> u32 {
        self.mass
            + self
                .equipment
                .wielded
                .as_ref()
                .map(|w| w.base_mass)
                .unwrap_or(0)
    }

    /// Rank in the named skill, zero when untrained.
    pub fn skill_rank(&self, skill: &str) -> u32 {
        self.skills.get(skill).copied().unwrap_or(0).min(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urn_validation() {
        assert!(is_actor_urn("flux:actor:alice"));
        assert!(is_actor_urn("flux:actor:guard-7"));
        assert!(!is_actor_urn("flux:actor:"));
        assert!(!is_actor_urn("flux:item:sword"));
        assert!(!is_actor_urn("flux:actor:Bob"));
        assert!(!is_actor_urn("flux:actor:<script>"));
    }

    #[test]
    fn stat_bonus_floors_toward_negative() {
        assert_eq!(stat_bonus(10), 0);
        assert_eq!(stat_bonus(15), 2);
        assert_eq!(stat_bonus(9), -1);
        assert_eq!(stat_bonus(7), -2);
    }
}
