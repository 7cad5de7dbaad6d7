//! Weapon-class heuristic profiles: how a combatant wants to fight and how
//! it values hypothetical actions.
//!
//! Profiles are pure and deterministic; identical inputs always score
//! identically, which is what makes the planner reproducible.

use serde::{Deserialize, Serialize};

use crate::analyzer::TacticalSituation;
use crate::model::action::Action;
use crate::model::weapon::WeaponClass;

/// Planner-level goal derived from the weapon class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tactic {
    CloseCombat,
    ControlDistance,
    KiteEnemy,
}

impl Tactic {
    pub fn for_class(class: WeaponClass) -> Tactic {
        match class {
            WeaponClass::Melee => Tactic::CloseCombat,
            WeaponClass::Reach => Tactic::ControlDistance,
            WeaponClass::Ranged => Tactic::KiteEnemy,
        }
    }
}

/// What a candidate action would change, precomputed by the planner's
/// simulation step.
#[derive(Debug, Clone)]
pub struct Hypothetical<'a> {
    pub action: &'a Action,
    pub gap_before: i32,
    pub gap_after: i32,
    pub ap_before: f64,
    pub ap_after: f64,
    pub sets_target: bool,
    /// Number of enemies a strike or cleave would swing at.
    pub strike_targets: u32,
    pub defends: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Weights {
    damage: f64,
    ap_efficiency: f64,
    position: f64,
    safety: f64,
    target: f64,
    defend: f64,
}

/// Scoring weights for one weapon class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicProfile {
    pub tactic: Tactic,
    weights: Weights,
}

impl HeuristicProfile {
    pub fn for_class(class: WeaponClass) -> Self {
        let tactic = Tactic::for_class(class);
        let weights = match class {
            WeaponClass::Melee => Weights {
                damage: 1.0,
                ap_efficiency: 0.5,
                position: 2.0,
                safety: 0.0,
                target: 5.0,
                defend: 1.0,
            },
            WeaponClass::Reach => Weights {
                damage: 1.0,
                ap_efficiency: 0.5,
                position: 2.5,
                safety: 0.5,
                target: 5.0,
                defend: 1.5,
            },
            WeaponClass::Ranged => Weights {
                damage: 1.2,
                ap_efficiency: 0.6,
                position: 1.5,
                safety: 2.0,
                target: 5.0,
                defend: 1.0,
            },
        };
        HeuristicProfile { tactic, weights }
    }

    /// The gap this profile steers toward. A reach fighter holds the pole
    /// at two meters; a kiter sits just outside the enemy's reach but
    /// inside its own.
    pub fn preferred_gap(&self, situation: &TacticalSituation) -> i32 {
        match self.tactic {
            Tactic::CloseCombat => 1,
            Tactic::ControlDistance => 2,
            Tactic::KiteEnemy => {
                (situation.enemy_weapon_range + 2).min(situation.weapon_range.max(1))
            }
        }
    }

    /// Chance for a strike to land, clamped away from certainty either
    /// way.
    pub fn hit_chance(&self, situation: &TacticalSituation) -> f64 {
        let needed = situation.enemy_balance - situation.attack_bonus as f64;
        ((21.0 - needed) / 20.0).clamp(0.05, 0.95)
    }

    /// Score one hypothetical action in context. Higher is better; the
    /// planner accumulates these along a candidate sequence.
    pub fn score(&self, situation: &TacticalSituation, h: &Hypothetical<'_>) -> f64 {
        let w = &self.weights;
        let mut score = 0.0;

        if h.strike_targets > 0 && h.gap_after <= situation.weapon_range {
            let expected =
                self.hit_chance(situation) * situation.weapon_damage_avg * h.strike_targets as f64;
            score += expected * w.damage;
            let spent = (h.ap_before - h.ap_after).max(0.1);
            score += expected / spent * w.ap_efficiency;
        }

        let preferred = self.preferred_gap(situation);
        let closing = (h.gap_before - preferred).abs() - (h.gap_after - preferred).abs();
        score += closing as f64 * w.position;

        let safety_before = h.gap_before - situation.enemy_weapon_range;
        let safety_after = h.gap_after - situation.enemy_weapon_range;
        score += (safety_after - safety_before) as f64 * w.safety;

        if h.sets_target && !situation.has_target {
            score += w.target;
        }

        if h.defends {
            // Defending is worth more when there is nothing better to buy
            // with the leftovers.
            score += w.defend * (1.0 + h.ap_before.min(1.0));
        }

        score
    }

    /// Upper bound on what any single action could add, for branch
    /// pruning.
    pub fn optimistic_action_score(&self, situation: &TacticalSituation) -> f64 {
        let w = &self.weights;
        let strike_ceiling = self.hit_chance(situation)
            * situation.weapon_damage_avg
            * (w.damage + w.ap_efficiency / situation.weapon_ap_cost.max(0.1));
        let move_ceiling = (situation.speed * 6.0) * w.position;
        strike_ceiling.max(move_ceiling) + w.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::action::Action;

    fn situation(class: WeaponClass) -> TacticalSituation {
        TacticalSituation {
            actor: "flux:actor:a".into(),
            enemy: "flux:actor:b".into(),
            actor_position: 10,
            enemy_position: 22,
            distance: 12,
            weapon_class: class,
            weapon_urn: "flux:weapon:test".into(),
            weapon_range: match class {
                WeaponClass::Melee => 1,
                WeaponClass::Reach => 2,
                WeaponClass::Ranged => 60,
            },
            weapon_ap_cost: 2.0,
            weapon_damage_avg: 5.5,
            attack_bonus: 3,
            enemy_balance: 12.0,
            enemy_weapon_range: 1,
            in_optimal_band: false,
            safety: 11,
            obstacles_between: 0,
            ap_remaining: 6.0,
            speed: 2.0,
            has_target: false,
        }
    }

    #[test]
    fn class_maps_to_tactic() {
        assert_eq!(Tactic::for_class(WeaponClass::Melee), Tactic::CloseCombat);
        assert_eq!(Tactic::for_class(WeaponClass::Reach), Tactic::ControlDistance);
        assert_eq!(Tactic::for_class(WeaponClass::Ranged), Tactic::KiteEnemy);
    }

    #[test]
    fn kiter_prefers_standing_outside_enemy_reach() {
        let sit = situation(WeaponClass::Ranged);
        let profile = HeuristicProfile::for_class(WeaponClass::Ranged);
        let gap = profile.preferred_gap(&sit);
        assert!(gap > sit.enemy_weapon_range);
        assert!(gap <= sit.weapon_range);
    }

    #[test]
    fn closing_scores_higher_for_melee() {
        let sit = situation(WeaponClass::Melee);
        let profile = HeuristicProfile::for_class(WeaponClass::Melee);
        let advance = Action::new(crate::model::action::CommandType::Advance);
        let closer = Hypothetical {
            action: &advance,
            gap_before: 12,
            gap_after: 4,
            ap_before: 6.0,
            ap_after: 2.0,
            sets_target: false,
            strike_targets: 0,
            defends: false,
        };
        let idle = Hypothetical {
            gap_after: 12,
            ap_after: 6.0,
            ..closer.clone()
        };
        assert!(profile.score(&sit, &closer) > profile.score(&sit, &idle));
    }

    #[test]
    fn scoring_is_deterministic() {
        let sit = situation(WeaponClass::Reach);
        let profile = HeuristicProfile::for_class(WeaponClass::Reach);
        let strike = Action::strike(None);
        let h = Hypothetical {
            action: &strike,
            gap_before: 2,
            gap_after: 2,
            ap_before: 6.0,
            ap_after: 4.0,
            sets_target: false,
            strike_targets: 1,
            defends: false,
        };
        assert_eq!(profile.score(&sit, &h), profile.score(&sit, &h));
    }
}
