//! Bounded-depth search over the heuristic action space.
//!
//! The planner enumerates short action sequences for one combatant against
//! its primary enemy, simulates them on a copied sliver of state, scores
//! them with the weapon-class profile, and returns the best sequence found.
//! Enumeration follows a fixed total order — target, advance by ascending
//! AP, retreat by ascending AP, strike, defend, cleave — so identical
//! inputs always produce identical plans.

use serde::{Deserialize, Serialize};

use crate::analyzer::{self, TacticalSituation};
use crate::ap::clean;
use crate::context::Context;
use crate::error::CombatError;
use crate::heuristics::{HeuristicProfile, Hypothetical};
use crate::model::action::{Action, CommandType, MoveMode};
use crate::model::weapon::WeaponClass;
use crate::session::Session;

/// Movement amounts are enumerated on a half-AP grid; every step is still
/// a clean multiple of 0.1.
const AP_QUANTUM: f64 = 0.5;

/// Search envelope. Role presets differ: melee commits early, ranged
/// searches deeper but prunes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    pub max_depth: u32,
    pub min_score_threshold: f64,
    pub enable_early_termination: bool,
    /// Soft cap on node expansions.
    pub node_budget: u32,
}

impl SearchConfig {
    pub fn for_class(class: WeaponClass) -> Self {
        match class {
            WeaponClass::Melee => SearchConfig {
                max_depth: 3,
                min_score_threshold: 0.0,
                enable_early_termination: false,
                node_budget: 10_000,
            },
            WeaponClass::Reach => SearchConfig {
                max_depth: 3,
                min_score_threshold: 25.0,
                enable_early_termination: false,
                node_budget: 10_000,
            },
            WeaponClass::Ranged => SearchConfig {
                max_depth: 4,
                min_score_threshold: 30.0,
                enable_early_termination: true,
                node_budget: 10_000,
            },
        }
    }
}

/// A scored, executable action sequence. Empty when nothing cleared the
/// score threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Plan {
    pub actions: Vec<Action>,
    pub score: f64,
}

impl Plan {
    pub fn empty() -> Plan {
        Plan::default()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Simulated sliver of combatant state the search mutates on copies.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SimState {
    gap: i32,
    ap: f64,
    target_set: bool,
    defended: bool,
}

/// One node in the search arena; plans are read back through the parent
/// chain.
#[derive(Debug, Clone)]
struct SearchNode {
    parent: Option<usize>,
    action: Option<Action>,
    depth: u32,
    score: f64,
    state: SimState,
}

/// Search for the best plan under `config`.
pub fn plan(
    situation: &TacticalSituation,
    profile: &HeuristicProfile,
    config: &SearchConfig,
) -> Plan {
    let root_state = SimState {
        gap: situation.gap(),
        ap: clean(situation.ap_remaining),
        target_set: situation.has_target,
        defended: false,
    };
    let mut arena = vec![SearchNode {
        parent: None,
        action: None,
        depth: 0,
        score: 0.0,
        state: root_state,
    }];
    let mut stack = vec![0usize];
    let mut best: Option<(usize, f64)> = None;
    let mut expanded = 0u32;
    let optimistic = profile.optimistic_action_score(situation);

    while let Some(index) = stack.pop() {
        if expanded >= config.node_budget {
            log::debug!(
                "planner for {} hit node budget {}",
                situation.actor,
                config.node_budget
            );
            break;
        }
        expanded += 1;

        let node = arena[index].clone();
        if config.enable_early_termination {
            if let Some((_, best_score)) = best {
                let remaining = config.max_depth.saturating_sub(node.depth) as f64;
                if node.score + remaining * optimistic <= best_score {
                    continue;
                }
            }
        }

        let children = if node.depth < config.max_depth {
            enumerate(situation, profile, &node)
        } else {
            Vec::new()
        };

        if children.is_empty() {
            // Depth or AP exhausted: this sequence is a candidate.
            if node.depth > 0 && best.map(|(_, s)| node.score > s).unwrap_or(true) {
                best = Some((index, node.score));
            }
            continue;
        }

        // Push in reverse so the stack pops children in enumeration order.
        for (action, state, gain) in children.into_iter().rev() {
            arena.push(SearchNode {
                parent: Some(index),
                action: Some(action),
                depth: node.depth + 1,
                score: node.score + gain,
                state,
            });
            stack.push(arena.len() - 1);
        }
    }

    let Some((index, score)) = best else {
        return Plan::empty();
    };
    if score < config.min_score_threshold {
        log::debug!(
            "planner for {}: best score {score:.1} under threshold {:.1}",
            situation.actor,
            config.min_score_threshold
        );
        return Plan::empty();
    }

    let mut actions = Vec::new();
    let mut cursor = Some(index);
    while let Some(i) = cursor {
        if let Some(action) = arena[i].action.clone() {
            actions.push(action);
        }
        cursor = arena[i].parent;
    }
    actions.reverse();
    Plan { actions, score }
}

/// Legal next actions from a node, in the fixed total order, each paired
/// with the simulated successor state and its score gain.
fn enumerate(
    situation: &TacticalSituation,
    profile: &HeuristicProfile,
    node: &SearchNode,
) -> Vec<(Action, SimState, f64)> {
    let state = node.state;
    let mut children = Vec::new();
    let mut push = |action: Action, after: SimState, strike_targets: u32, defends: bool| {
        let hypothetical = Hypothetical {
            action: &action,
            gap_before: state.gap,
            gap_after: after.gap,
            ap_before: state.ap,
            ap_after: after.ap,
            sets_target: !state.target_set && after.target_set,
            strike_targets,
            defends,
        };
        let gain = profile.score(situation, &hypothetical);
        children.push((action, after, gain));
    };

    // target
    if !state.target_set {
        let action = Action::target(&situation.enemy);
        push(
            action,
            SimState {
                target_set: true,
                ..state
            },
            0,
            false,
        );
    }

    // advance, ascending AP
    let mut step = AP_QUANTUM;
    while step <= state.ap + 1e-9 {
        let distance = (situation.speed * step).floor() as i32;
        let gap_after = (state.gap - distance).max(0);
        if distance > 0 && gap_after != state.gap {
            let action = Action::movement(CommandType::Advance, MoveMode::Ap, step)
                .with_cost(step, 0);
            push(
                action,
                SimState {
                    gap: gap_after,
                    ap: clean(state.ap - step),
                    ..state
                },
                0,
                false,
            );
        }
        step = clean(step + AP_QUANTUM);
    }

    // retreat, ascending AP
    let mut step = AP_QUANTUM;
    while step <= state.ap + 1e-9 {
        let distance = (situation.speed * step).floor() as i32;
        if distance > 0 {
            let action = Action::movement(CommandType::Retreat, MoveMode::Ap, step)
                .with_cost(step, 0);
            push(
                action,
                SimState {
                    gap: state.gap + distance,
                    ap: clean(state.ap - step),
                    ..state
                },
                0,
                false,
            );
        }
        step = clean(step + AP_QUANTUM);
    }

    // strike
    let strike_affordable = state.ap + 1e-9 >= situation.weapon_ap_cost;
    if state.target_set && strike_affordable && state.gap <= situation.weapon_range {
        let action = Action::strike(None).with_cost(situation.weapon_ap_cost, 0);
        push(
            action,
            SimState {
                ap: clean(state.ap - situation.weapon_ap_cost),
                ..state
            },
            1,
            false,
        );
    }

    // defend
    if state.ap > 0.0 && !state.defended {
        let action = Action::defend().with_cost(state.ap, 0);
        push(
            action,
            SimState {
                ap: 0.0,
                defended: true,
                ..state
            },
            0,
            true,
        );
    }

    // cleave
    if situation.weapon_class != WeaponClass::Ranged
        && strike_affordable
        && state.gap <= situation.weapon_range
    {
        let action = Action::cleave().with_cost(situation.weapon_ap_cost, 0);
        push(
            action,
            SimState {
                ap: clean(state.ap - situation.weapon_ap_cost),
                ..state
            },
            1,
            false,
        );
    }

    children
}

/// Analyze, memoize, and search in one call: the per-turn entry point for
/// an AI-controlled combatant.
pub fn plan_for(
    session: &mut Session,
    ctx: &Context,
    actor_id: &str,
) -> Result<Plan, CombatError> {
    let situation = analyzer::analyze(session, ctx, actor_id)?;
    let fingerprint = situation_fingerprint(&situation);
    if let Some(cached) = session.caches.plan_get(&fingerprint) {
        return Ok(cached.clone());
    }
    let profile = HeuristicProfile::for_class(situation.weapon_class);
    let config = SearchConfig::for_class(situation.weapon_class);
    let result = plan(&situation, &profile, &config);
    log::debug!(
        "planned {} action(s) for {actor_id}, score {:.1}",
        result.actions.len(),
        result.score
    );
    session.caches.plan_put(fingerprint, result.clone());
    Ok(result)
}

/// Cache key for a planning call: everything the search result depends on.
pub fn situation_fingerprint(situation: &TacticalSituation) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}|{}",
        situation.actor,
        situation.enemy,
        situation.actor_position,
        situation.enemy_position,
        (situation.ap_remaining * 10.0).round() as i64,
        situation.weapon_urn,
        situation.has_target,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::action::CommandType;

    fn situation(class: WeaponClass, gap: i32, ap: f64) -> TacticalSituation {
        TacticalSituation {
            actor: "flux:actor:a".into(),
            enemy: "flux:actor:b".into(),
            actor_position: 10,
            enemy_position: 10 + gap,
            distance: gap,
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
            safety: gap - 1,
            obstacles_between: 0,
            ap_remaining: ap,
            speed: 2.0,
            has_target: false,
        }
    }

    fn run(class: WeaponClass, gap: i32, ap: f64) -> Plan {
        let sit = situation(class, gap, ap);
        let profile = HeuristicProfile::for_class(class);
        let config = SearchConfig::for_class(class);
        plan(&sit, &profile, &config)
    }

    #[test]
    fn plans_are_depth_bounded() {
        for class in [WeaponClass::Melee, WeaponClass::Reach, WeaponClass::Ranged] {
            let config = SearchConfig::for_class(class);
            let plan = run(class, 8, 6.0);
            assert!(plan.actions.len() <= config.max_depth as usize);
        }
    }

    #[test]
    fn plan_ap_never_exceeds_budget() {
        let plan = run(WeaponClass::Melee, 4, 3.5);
        let total: f64 = plan.actions.iter().map(|a| a.cost.ap).sum();
        assert!(clean(total) <= 3.5);
    }

    #[test]
    fn melee_in_reach_strikes() {
        let plan = run(WeaponClass::Melee, 1, 6.0);
        assert!(!plan.is_empty());
        assert!(plan
            .actions
            .iter()
            .any(|a| a.command == CommandType::Attack && a.args.primitive));
        // Strike requires a target first; the fixed order puts it before.
        let target_idx = plan
            .actions
            .iter()
            .position(|a| a.command == CommandType::Target);
        let strike_idx = plan
            .actions
            .iter()
            .position(|a| a.args.primitive)
            .unwrap();
        assert!(target_idx.unwrap() < strike_idx);
    }

    #[test]
    fn search_is_deterministic() {
        let a = run(WeaponClass::Ranged, 20, 6.0);
        let b = run(WeaponClass::Ranged, 20, 6.0);
        assert_eq!(a, b);
    }

    #[test]
    fn zero_ap_yields_empty_plan() {
        let mut sit = situation(WeaponClass::Melee, 5, 0.0);
        sit.has_target = true;
        let profile = HeuristicProfile::for_class(WeaponClass::Melee);
        let config = SearchConfig::for_class(WeaponClass::Melee);
        let result = plan(&sit, &profile, &config);
        assert!(result.is_empty());
    }

    #[test]
    fn threshold_rejects_weak_plans() {
        // A reach fighter already on its preferred gap with no AP for a
        // strike has nothing worth 25 points.
        let sit = situation(WeaponClass::Reach, 2, 0.5);
        let profile = HeuristicProfile::for_class(WeaponClass::Reach);
        let config = SearchConfig::for_class(WeaponClass::Reach);
        let result = plan(&sit, &profile, &config);
        assert!(result.is_empty());
    }
}
