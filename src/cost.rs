//! Action cost accounting: how much AP and energy an action burns.
//!
//! AP is time. Movement converts distance through the combatant's stride
//! speed; weapons convert their attack timer through skill. Both round *up*
//! to the 0.1 grid so a cost is never understated.

use crate::ap::tactical_round;
use crate::model::actor::Stats;
use crate::model::weapon::WeaponSchema;

/// Skill ranks run 0..=100; at max rank a weapon swings in half its base
/// time.
pub const MAX_SKILL_RANK: u32 = 100;

/// Unencumbered human walking pace, m/s.
pub const BASE_STRIDE_SPEED: f64 = 1.4;

/// Mass at which the stride-speed mass factor is neutral, grams.
pub const REFERENCE_MASS_G: f64 = 75_000.0;

/// Metabolic cost of covering ground, joules per kilogram-meter.
pub const JOULES_PER_KG_METER: f64 = 3.0;

/// Energy reservoir floor, joules.
pub const ENERGY_CAPACITY_BASE: i64 = 800;

/// Extra reservoir per point of resilience, joules.
pub const ENERGY_CAPACITY_PER_RES: i64 = 40;

/// How much exertion an actor can bank, from resilience.
pub fn energy_capacity(stats: &Stats) -> i64 {
    ENERGY_CAPACITY_BASE + ENERGY_CAPACITY_PER_RES * stats.res.max(0) as i64
}

/// Resolved cost of one movement action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveCost {
    pub distance: i32,
    pub ap: f64,
    pub energy: i64,
}

/// Stride speed in m/s from build-time stats and carried mass. Strong and
/// nimble actors outpace the base rate; the mass factor is clamped so
/// extremes stay plausible.
pub fn stride_speed(stats: &Stats, mass_grams: u32) -> f64 {
    let stat_factor = BASE_STRIDE_SPEED + 0.03 * stats.pow as f64 + 0.06 * stats.fin as f64;
    let mass_factor = (REFERENCE_MASS_G / (mass_grams.max(1) as f64))
        .sqrt()
        .clamp(0.7, 1.3);
    stat_factor * mass_factor
}

/// Joules burned covering `distance` meters: `mass_kg * 3.0 * distance *
/// (1 - fin/200)`, rounded up. Finesse shaves the metabolic bill; power
/// enters the movement economy through stride speed, not here.
pub fn energy_cost(stats: &Stats, mass_grams: u32, distance: i32) -> i64 {
    if distance <= 0 {
        return 0;
    }
    let mass_kg = mass_grams as f64 / 1000.0;
    let efficiency = 1.0 - stats.fin as f64 / 200.0;
    (mass_kg * JOULES_PER_KG_METER * distance as f64 * efficiency).ceil() as i64
}

/// Cost of covering a requested distance.
pub fn movement_by_distance(
    stats: &Stats,
    mass_grams: u32,
    speed: f64,
    distance: i32,
) -> MoveCost {
    let distance = distance.max(0);
    let ap = tactical_round(distance as f64 / speed.max(0.1));
    MoveCost {
        distance,
        ap,
        energy: energy_cost(stats, mass_grams, distance),
    }
}

/// Cost of spending a fixed amount of AP on movement; the distance is what
/// that much time buys at stride speed.
pub fn movement_by_ap(stats: &Stats, mass_grams: u32, speed: f64, ap: f64) -> MoveCost {
    let ap = tactical_round(ap.max(0.0));
    let distance = (speed * ap).floor() as i32;
    MoveCost {
        distance,
        ap,
        energy: energy_cost(stats, mass_grams, distance),
    }
}

/// AP cost of one swing: the weapon's attack timer discounted by skill,
/// up to half off at max rank.
pub fn weapon_ap_cost(schema: &WeaponSchema, skill_rank: u32) -> f64 {
    let rank = skill_rank.min(MAX_SKILL_RANK) as f64;
    let seconds =
        schema.timers.attack as f64 * (1.0 - rank / MAX_SKILL_RANK as f64 * 0.5) / 1000.0;
    tactical_round(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::weapon::{RangeProfile, Timers};

    fn stats(pow: i32, fin: i32) -> Stats {
        Stats {
            pow,
            fin,
            res: 10,
            int: 10,
            per: 10,
            mem: 10,
        }
    }

    fn sword(attack_ms: u32) -> WeaponSchema {
        WeaponSchema {
            urn: "flux:weapon:sword".into(),
            base_mass: 1500,
            range: RangeProfile {
                optimal: 1,
                min: None,
                max: None,
                falloff: None,
            },
            timers: Timers {
                attack: attack_ms,
                setup: 500,
                aim: None,
                reload: None,
            },
            skill: "flux:skill:blades".into(),
            accuracy: 0,
            damage: "1d8".into(),
        }
    }

    #[test]
    fn stride_speed_rewards_stats_and_penalizes_mass() {
        let light = stride_speed(&stats(12, 14), 70_000);
        let heavy = stride_speed(&stats(12, 14), 120_000);
        assert!(light > heavy);
        let slow = stride_speed(&stats(8, 8), 75_000);
        assert!(light > slow);
    }

    #[test]
    fn movement_ap_rounds_up_to_tenth() {
        let cost = movement_by_distance(&stats(10, 10), 75_000, 2.6, 7);
        // 7 / 2.6 = 2.6923 -> 2.7
        assert_eq!(cost.ap, 2.7);
        assert_eq!(cost.distance, 7);
        assert!(cost.energy > 0);
    }

    #[test]
    fn movement_by_ap_floors_distance() {
        let cost = movement_by_ap(&stats(10, 10), 75_000, 2.6, 2.0);
        assert_eq!(cost.ap, 2.0);
        assert_eq!(cost.distance, 5); // 5.2 floored
    }

    #[test]
    fn zero_distance_is_free_energy() {
        assert_eq!(energy_cost(&stats(10, 10), 75_000, 0), 0);
    }

    #[test]
    fn weapon_cost_halves_at_max_rank() {
        let schema = sword(3000);
        assert_eq!(weapon_ap_cost(&schema, 0), 3.0);
        assert_eq!(weapon_ap_cost(&schema, MAX_SKILL_RANK), 1.5);
        assert_eq!(weapon_ap_cost(&schema, 50), 2.3); // 2.25 rounded up
    }
}
