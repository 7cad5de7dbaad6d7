//! Shared fixtures for the integration suites.
#![allow(dead_code)]

use indexmap::IndexMap;
use skirmish_sim::model::actor::{Equipment, LayeredGauge};
use skirmish_sim::model::weapon::{RangeProfile, Timers};
use skirmish_sim::{
    Actor, Battlefield, Context, Event, RollResult, SequenceRoller, Session, SessionBuilder,
    Stats, WeaponSchema, World,
};

pub const ARENA: &str = "flux:location:arena";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn sword() -> WeaponSchema {
    WeaponSchema {
        urn: "flux:weapon:arming-sword".into(),
        base_mass: 1500,
        range: RangeProfile {
            optimal: 1,
            min: None,
            max: None,
            falloff: None,
        },
        timers: Timers {
            attack: 3000,
            setup: 500,
            aim: None,
            reload: None,
        },
        skill: "flux:skill:blades".into(),
        accuracy: 2,
        damage: "1d8+2".into(),
    }
}

pub fn bow() -> WeaponSchema {
    WeaponSchema {
        urn: "flux:weapon:shortbow".into(),
        base_mass: 900,
        range: RangeProfile {
            optimal: 30,
            min: Some(2),
            max: Some(120),
            falloff: Some(15),
        },
        timers: Timers {
            attack: 4000,
            setup: 1000,
            aim: Some(500),
            reload: None,
        },
        skill: "flux:skill:archery".into(),
        accuracy: 1,
        damage: "1d6+1".into(),
    }
}

pub fn fighter(slug: &str, name: &str, weapon: Option<WeaponSchema>) -> Actor {
    let mut skills = std::collections::HashMap::new();
    skills.insert("flux:skill:blades".to_string(), 50);
    skills.insert("flux:skill:archery".to_string(), 50);
    Actor {
        id: format!("flux:actor:{slug}"),
        name: name.to_string(),
        location: ARENA.to_string(),
        stats: Stats {
            pow: 10,
            fin: 10,
            res: 10,
            int: 10,
            per: 10,
            mem: 10,
        },
        hp: LayeredGauge::full(25.0),
        mass: 75_000,
        skills,
        equipment: Equipment { wielded: weapon },
        sessions: vec![],
    }
}

pub fn with_stats(mut actor: Actor, per: i32, fin: i32) -> Actor {
    actor.stats.per = per;
    actor.stats.fin = fin;
    actor
}

/// Explicit initiative rolls from plain d20 results.
pub fn fixed_rolls(results: &[(&str, u32)]) -> IndexMap<String, RollResult> {
    results
        .iter()
        .map(|(id, face)| {
            (
                id.to_string(),
                RollResult::from_values("1d20", vec![*face], 0),
            )
        })
        .collect()
}

/// A two-team session, pending, with a seeded context.
pub fn build_session(
    actors: Vec<Actor>,
    teams: &[(&str, &str)],
    initiator: &str,
) -> (Session, Context) {
    let mut world = World::new();
    for actor in actors {
        world.insert(actor);
    }
    let mut ctx = Context::seeded(world, 7);
    let mut builder = SessionBuilder::new(ARENA)
        .id("flux:session:test")
        .battlefield(Battlefield::default());
    for (id, team) in teams {
        builder = builder.combatant(id, team);
    }
    let session = builder.initiated_by(initiator).build(&mut ctx).unwrap();
    (session, ctx)
}

/// Alice (team alpha) versus Bob (team beta), swords, started with Alice
/// first in initiative. Dice are scripted by `faces`.
pub fn started_duel(faces: Vec<u32>) -> (Session, Context, Vec<Event>) {
    let (mut session, ctx) = build_session(
        vec![
            fighter("alice", "Alice", Some(sword())),
            fighter("bob", "Bob", Some(sword())),
        ],
        &[
            ("flux:actor:alice", "alpha"),
            ("flux:actor:bob", "beta"),
        ],
        "flux:actor:alice",
    );
    let mut ctx = ctx.with_roller(Box::new(SequenceRoller::new(faces)));
    let events = session
        .start_combat(
            &mut ctx,
            Some(fixed_rolls(&[
                ("flux:actor:alice", 18),
                ("flux:actor:bob", 10),
            ])),
            Some("trace-start"),
        )
        .unwrap();
    (session, ctx, events)
}

pub fn kill(ctx: &mut Context, id: &str) {
    let actor = ctx.world.actor_mut(id).unwrap();
    actor.hp.eff.cur = 0.0;
    actor.hp.nat.cur = 0.0;
}
