//! Deterministic turn-based tactical combat engine.
//!
//! A session advances opposed combatants on a one-dimensional battlefield
//! through initiative-ordered rounds and turns. Free-text intents parse
//! into cost-accounted actions, actions resolve into events collected by
//! an execution context, and a bounded-depth planner searches short action
//! sequences for AI combatants.

pub mod analyzer;
pub mod ap;
pub mod cache;
pub mod context;
pub mod cost;
pub mod dice;
pub mod error;
pub mod events;
pub mod executor;
pub mod heuristics;
pub mod initiative;
pub mod intent;
pub mod model;
pub mod monitor;
pub mod planner;
pub mod session;
pub mod turns;

pub mod actions;

pub use analyzer::{analyze, TacticalSituation};
pub use ap::{clean, deduct, tactical_round, ALL_REMAINING_AP, TURN_AP};
pub use context::{Clock, Context, FixedClock, SystemClock, World};
pub use dice::{DiceSpec, RngRoller, RollResult, Roller, SequenceRoller};
pub use error::CombatError;
pub use events::{DeclaredError, Event, EventBody};
pub use executor::{execute_actions, execute_intent};
pub use heuristics::{HeuristicProfile, Tactic};
pub use intent::parse_intent;
pub use model::{
    Action, ActionArgs, ActionCost, Actor, Battlefield, Combatant, CommandType, Facing, MoveMode,
    Stats, WeaponClass, WeaponSchema,
};
pub use monitor::{GameStateMonitor, WinningTeam};
pub use planner::{plan, plan_for, Plan, SearchConfig};
pub use session::{Session, SessionBuilder, SessionStatus};
pub use turns::{advance_turn, TurnRecord};
