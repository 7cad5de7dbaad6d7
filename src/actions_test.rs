use super::*;

use indexmap::IndexMap;

use crate::context::World;
use crate::dice::{RollResult, SequenceRoller};
use crate::model::actor::{Actor, Equipment, LayeredGauge, Stats};
use crate::model::combatant::DEFEND_BALANCE_BONUS;
use crate::model::weapon::{RangeProfile, Timers, WeaponSchema};
use crate::session::SessionBuilder;
use crate::turns::advance_turn;

fn sword() -> WeaponSchema {
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

fn actor(slug: &str, name: &str) -> Actor {
    let mut skills = std::collections::HashMap::new();
    skills.insert("flux:skill:blades".to_string(), 50);
    Actor {
        id: format!("flux:actor:{slug}"),
        name: name.to_string(),
        location: "flux:location:arena".into(),
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
        equipment: Equipment {
            wielded: Some(sword()),
        },
        sessions: vec![],
    }
}

/// Alice against Bob and Carl, running, Alice first, dice scripted.
fn melee(faces: Vec<u32>) -> (Session, Context) {
    let mut world = World::new();
    world.insert(actor("alice", "Alice"));
    world.insert(actor("bob", "Bob"));
    world.insert(actor("carl", "Carl"));
    let mut ctx = Context::seeded(world, 11);
    let mut session = SessionBuilder::new("flux:location:arena")
        .combatant("flux:actor:alice", "alpha")
        .combatant("flux:actor:bob", "beta")
        .combatant("flux:actor:carl", "beta")
        .initiated_by("flux:actor:alice")
        .build(&mut ctx)
        .unwrap();
    let mut ctx = ctx.with_roller(Box::new(SequenceRoller::new(faces)));
    let rolls: IndexMap<String, RollResult> = [
        ("flux:actor:alice", 20u32),
        ("flux:actor:bob", 12),
        ("flux:actor:carl", 8),
    ]
    .into_iter()
    .map(|(id, face)| (id.to_string(), RollResult::from_values("1d20", vec![face], 0)))
    .collect();
    session.start_combat(&mut ctx, Some(rolls), None).unwrap();
    (session, ctx)
}

fn place(session: &mut Session, id: &str, coordinate: i32) {
    session.combatant_mut(id).unwrap().position.coordinate = coordinate;
}

#[test]
fn defend_spends_everything_and_raises_balance() {
    let (mut session, mut ctx) = melee(vec![]);
    let base = session.combatant("flux:actor:alice").unwrap().balance.eff;
    defend(&mut session, &mut ctx, "flux:actor:alice", "t").unwrap();
    let alice = session.combatant("flux:actor:alice").unwrap();
    assert_eq!(alice.ap.remaining(), 0.0);
    assert_eq!(alice.balance.eff, base + DEFEND_BALANCE_BONUS);
    assert!(!alice.can_act());
}

#[test]
fn defend_bonus_lapses_when_the_turn_comes_back() {
    let (mut session, mut ctx) = melee(vec![]);
    let base = session.combatant("flux:actor:alice").unwrap().balance.eff;
    defend(&mut session, &mut ctx, "flux:actor:alice", "t").unwrap();
    // Bob, Carl, then back to Alice.
    advance_turn(&mut session, &mut ctx, "t");
    assert!(session.combatant("flux:actor:alice").unwrap().balance.is_defending());
    advance_turn(&mut session, &mut ctx, "t");
    advance_turn(&mut session, &mut ctx, "t");
    let alice = session.combatant("flux:actor:alice").unwrap();
    assert_eq!(alice.balance.eff, base);
    assert_eq!(alice.ap.remaining(), 6.0);
}

#[test]
fn cleave_sweeps_everyone_in_reach_for_one_cost() {
    // Faces: to-hit 20 (hit Bob), damage 4, to-hit 2 (miss Carl).
    let (mut session, mut ctx) = melee(vec![20, 4, 2]);
    place(&mut session, "flux:actor:alice", 100);
    place(&mut session, "flux:actor:bob", 101);
    place(&mut session, "flux:actor:carl", 99);

    let events = cleave(&mut session, &mut ctx, "flux:actor:alice", "t").unwrap();
    let attacks: Vec<_> = events
        .iter()
        .filter(|e| e.body.kind() == "combatant:did:attack")
        .collect();
    assert_eq!(attacks.len(), 2);
    // One weapon cost for the whole sweep: 3000ms at rank 50 -> 2.3.
    assert_eq!(
        session.combatant("flux:actor:alice").unwrap().ap.remaining(),
        3.7
    );
    let bob_hp = ctx.world.actor("flux:actor:bob").unwrap().hp.eff.cur;
    let carl_hp = ctx.world.actor("flux:actor:carl").unwrap().hp.eff.cur;
    assert_eq!(bob_hp, 19.0); // 4 + 2 damage bonus
    assert_eq!(carl_hp, 25.0);
}

#[test]
fn cleave_needs_a_swinging_weapon_and_someone_in_reach() {
    let (mut session, mut ctx) = melee(vec![]);
    // Everyone is far away at deployment.
    let err = cleave(&mut session, &mut ctx, "flux:actor:alice", "t").unwrap_err();
    assert!(matches!(err, CombatError::Validation(_)));
}

#[test]
fn done_outside_your_turn_is_ignored() {
    let (mut session, mut ctx) = melee(vec![]);
    let events = done(&mut session, &mut ctx, "flux:actor:bob", "t");
    assert!(events.is_empty());
    assert_eq!(
        session.current_turn.as_ref().unwrap().actor,
        "flux:actor:alice"
    );
}

#[test]
fn done_yields_to_the_next_combatant() {
    let (mut session, mut ctx) = melee(vec![]);
    let events = done(&mut session, &mut ctx, "flux:actor:alice", "t");
    assert!(events.iter().any(|e| e.body.kind() == "combat:turn:ended"));
    assert!(events.iter().any(|e| e.body.kind() == "combat:turn:started"));
    assert_eq!(
        session.current_turn.as_ref().unwrap().actor,
        "flux:actor:bob"
    );
}

#[test]
fn movement_clamps_at_the_field_edge_without_failing() {
    let (mut session, mut ctx) = melee(vec![]);
    place(&mut session, "flux:actor:alice", 2);
    // Alice faces right; retreating walks her off the left edge.
    let events = retreat(
        &mut session,
        &mut ctx,
        "flux:actor:alice",
        MoveMode::Distance,
        50.0,
        None,
        false,
        "t",
    )
    .unwrap();
    let alice = session.combatant("flux:actor:alice").unwrap();
    assert_eq!(alice.position.coordinate, 0);
    assert!(!events.is_empty());
    // Only the two meters actually covered were billed.
    assert!(alice.ap.remaining() > 5.0);
}

#[test]
fn failed_actions_declare_instead_of_throwing() {
    let (mut session, mut ctx) = melee(vec![]);
    let action = Action::strike(Some("flux:actor:bob"));
    let events = dispatch(&mut session, &mut ctx, "flux:actor:alice", &action, "t");
    assert!(events.is_empty());
    assert_eq!(ctx.declared_errors().len(), 1);
    assert_eq!(ctx.declared_errors()[0].code, "out_of_range");
    // Nothing was recorded as executed.
    assert!(session.current_turn.as_ref().unwrap().actions.is_empty());
}

#[test]
fn executed_actions_land_in_the_turn_record() {
    let (mut session, mut ctx) = melee(vec![]);
    let action = Action::target("flux:actor:bob");
    dispatch(&mut session, &mut ctx, "flux:actor:alice", &action, "t");
    let record = session.current_turn.as_ref().unwrap();
    assert_eq!(record.actions.len(), 1);
    assert_eq!(record.actions[0].command, CommandType::Target);
    assert_eq!(record.actions[0].trace.as_deref(), Some("t"));
}
