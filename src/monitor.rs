//! Game-state monitoring: death edges, team viability, victory.
//!
//! The monitor observes but never mutates combat state; its only memory is
//! the alive-state cache used to report deaths exactly once.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::context::World;
use crate::model::combatant::Combatant;

/// Outcome of a team scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinningTeam {
    /// More than one team still stands.
    Contested,
    /// Exactly one team has viable combatants.
    Team(String),
    /// Nobody does; mutual destruction.
    NoTeam,
}

impl WinningTeam {
    /// The payload shape session-end events carry.
    pub fn into_option(self) -> Option<String> {
        match self {
            WinningTeam::Team(team) => Some(team),
            WinningTeam::Contested | WinningTeam::NoTeam => None,
        }
    }
}

/// Viable means alive and standing where the fight is.
pub fn is_viable(world: &World, location: &str, actor_id: &str) -> bool {
    world
        .actors
        .get(actor_id)
        .map(|a| a.is_alive() && a.location == location)
        .unwrap_or(false)
}

/// Single scan for the team still standing.
pub fn winning_team(
    combatants: &IndexMap<String, Combatant>,
    world: &World,
    location: &str,
) -> WinningTeam {
    let mut standing: HashSet<&str> = HashSet::new();
    for (id, combatant) in combatants {
        if is_viable(world, location, id) {
            standing.insert(combatant.team.as_str());
        }
    }
    match standing.len() {
        0 => WinningTeam::NoTeam,
        1 => WinningTeam::Team(standing.into_iter().next().unwrap().to_string()),
        _ => WinningTeam::Contested,
    }
}

/// Tracks each combatant's last observed alive state so deaths are
/// reported as edges, not levels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateMonitor {
    last_known_alive: HashMap<String, bool>,
}

impl GameStateMonitor {
    pub fn new() -> Self {
        GameStateMonitor::default()
    }

    /// Ids that flipped from alive to dead since the previous call.
    /// Unseen ids start as alive. Calling again without a state change
    /// returns nothing.
    pub fn check_for_deaths(
        &mut self,
        combatants: &IndexMap<String, Combatant>,
        world: &World,
    ) -> Vec<String> {
        let mut died = Vec::new();
        for id in combatants.keys() {
            let alive_now = world.actors.get(id).map(|a| a.is_alive()).unwrap_or(false);
            let was_alive = self.last_known_alive.get(id).copied().unwrap_or(true);
            if was_alive && !alive_now {
                died.push(id.clone());
            }
            self.last_known_alive.insert(id.clone(), alive_now);
        }
        died
    }
}

/// Victory is reached when zero or one team remains viable.
pub fn victory_reached(
    combatants: &IndexMap<String, Combatant>,
    world: &World,
    location: &str,
) -> bool {
    !matches!(
        winning_team(combatants, world, location),
        WinningTeam::Contested
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::actor::{Actor, Equipment, LayeredGauge, Stats};
    use crate::model::battlefield::{CombatPosition, Facing};
    use crate::model::combatant::{ApPool, BalancePool, EnergyPool};

    fn actor(id: &str, hp: f64, location: &str) -> Actor {
        Actor {
            id: id.to_string(),
            name: id.rsplit(':').next().unwrap().to_string(),
            location: location.to_string(),
            stats: Stats::default(),
            hp: LayeredGauge::full(hp.max(1.0)),
            mass: 75_000,
            skills: Default::default(),
            equipment: Equipment::default(),
            sessions: vec![],
        }
    }

    fn dead(mut a: Actor) -> Actor {
        a.hp.eff.cur = 0.0;
        a.hp.nat.cur = 0.0;
        a
    }

    fn combatant(id: &str, team: &str) -> (String, Combatant) {
        (
            id.to_string(),
            Combatant {
                actor: id.to_string(),
                team: team.to_string(),
                position: CombatPosition {
                    coordinate: 0,
                    facing: Facing::Right,
                    speed: 2.0,
                },
                ap: ApPool::full(),
                energy: EnergyPool::full(1000),
                balance: BalancePool::new(10.0),
                target: None,
                initiative: None,
                did_initiate_combat: false,
            },
        )
    }

    fn arena(pairs: &[(&str, &str)]) -> IndexMap<String, Combatant> {
        pairs.iter().map(|(id, team)| combatant(id, team)).collect()
    }

    #[test]
    fn death_detection_is_edge_triggered() {
        let mut world = World::new();
        world.insert(actor("flux:actor:a", 20.0, "arena"));
        world.insert(actor("flux:actor:b", 20.0, "arena"));
        let combatants = arena(&[("flux:actor:a", "alpha"), ("flux:actor:b", "beta")]);

        let mut monitor = GameStateMonitor::new();
        assert!(monitor.check_for_deaths(&combatants, &world).is_empty());

        world.actors["flux:actor:b"].hp.eff.cur = 0.0;
        assert_eq!(
            monitor.check_for_deaths(&combatants, &world),
            vec!["flux:actor:b".to_string()]
        );
        // Idempotent without a further state change.
        assert!(monitor.check_for_deaths(&combatants, &world).is_empty());
    }

    #[test]
    fn winning_team_scan() {
        let mut world = World::new();
        world.insert(actor("flux:actor:a", 20.0, "arena"));
        world.insert(dead(actor("flux:actor:b", 20.0, "arena")));
        let combatants = arena(&[("flux:actor:a", "alpha"), ("flux:actor:b", "beta")]);

        assert_eq!(
            winning_team(&combatants, &world, "arena"),
            WinningTeam::Team("alpha".into())
        );
        assert!(victory_reached(&combatants, &world, "arena"));
    }

    #[test]
    fn mutual_destruction_yields_no_team() {
        let mut world = World::new();
        world.insert(dead(actor("flux:actor:a", 20.0, "arena")));
        world.insert(dead(actor("flux:actor:b", 20.0, "arena")));
        let combatants = arena(&[("flux:actor:a", "alpha"), ("flux:actor:b", "beta")]);

        let standing = winning_team(&combatants, &world, "arena");
        assert_eq!(standing, WinningTeam::NoTeam);
        assert_eq!(standing.into_option(), None);
    }

    #[test]
    fn off_location_combatants_are_not_viable() {
        let mut world = World::new();
        world.insert(actor("flux:actor:a", 20.0, "arena"));
        world.insert(actor("flux:actor:b", 20.0, "tavern"));
        let combatants = arena(&[("flux:actor:a", "alpha"), ("flux:actor:b", "beta")]);
        assert_eq!(
            winning_team(&combatants, &world, "arena"),
            WinningTeam::Team("alpha".into())
        );
    }
}
