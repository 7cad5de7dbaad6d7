pub mod action;
pub mod actor;
pub mod battlefield;
pub mod combatant;
pub mod weapon;

pub use action::{Action, ActionArgs, ActionCost, CommandType, MoveMode};
pub use actor::{is_actor_urn, stat_bonus, Actor, Equipment, Gauge, LayeredGauge, Stats, ACTOR_URN_PREFIX};
pub use battlefield::{Battlefield, CombatPosition, Facing, Obstacle};
pub use combatant::{ApPool, BalancePool, Combatant, EnergyPool, Modifier, DEFEND_BALANCE_BONUS};
pub use weapon::{classify, max_effective_range, unarmed, RangeProfile, Timers, WeaponClass, WeaponSchema};
